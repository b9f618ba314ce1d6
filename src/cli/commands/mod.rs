//! cli::commands
//!
//! The subcommand contract and the subcommand implementations.
//!
//! # Architecture
//!
//! Each subcommand is a type implementing [`Command`]. A fresh instance is
//! created by its registry factory for every invocation (one-shot, or one
//! shell line) and dropped after it runs. A command:
//!
//! 1. Consumes its flags from the shared [`Args`] cursor
//! 2. Opens the database from the next argument, unless the shell already has
//!    one open
//! 3. Consumes its remaining arguments and calls `end_of_args`
//! 4. Does its work against the session's handle and prints the result
//!
//! Commands borrow the session's handle; they never close or replace it.

pub mod cat;
pub mod compact;
pub mod cp;
pub mod encrypt;
pub mod info;
pub mod ls;
pub mod put;
pub mod query;
pub mod revs;
pub mod rm;
pub mod serve;

#[cfg(test)]
pub(crate) mod testing;

use serde_json::{Map, Value};

use crate::cli::args::Args;
use crate::session::{Interrupt, Outcome, Session};
use crate::store::Document;

/// Static description of a subcommand's arguments, used for help output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Usage {
    /// One-line description.
    pub about: &'static str,
    /// Whether the one-shot form takes a `DBPATH` before `args`.
    pub takes_db_path: bool,
    /// Positional arguments (after `DBPATH`).
    pub args: &'static str,
    /// Positional arguments in the shell, when they differ from `args`.
    pub shell_args: Option<&'static str>,
    /// Flags and their descriptions.
    pub flags: &'static [(&'static str, &'static str)],
}

impl Usage {
    /// A command taking `DBPATH` followed by `args`.
    pub const fn on_database(about: &'static str, args: &'static str) -> Self {
        Self {
            about,
            takes_db_path: true,
            args,
            shell_args: None,
            flags: &[],
        }
    }

    pub const fn with_flags(mut self, flags: &'static [(&'static str, &'static str)]) -> Self {
        self.flags = flags;
        self
    }

    /// Positional arguments for the given mode.
    pub fn positional(&self, interactive: bool) -> &'static str {
        match (interactive, self.shell_args) {
            (true, Some(shell_args)) => shell_args,
            _ => self.args,
        }
    }
}

/// A unit of work bound to the session.
pub trait Command {
    /// Help text.
    fn usage(&self) -> Usage;

    /// Consume arguments and do the work.
    fn run(&mut self, session: &mut Session, args: &mut Args) -> Outcome;
}

/// Creates a fresh command instance.
pub type Factory = fn() -> Box<dyn Command>;

/// A command instance together with the name it was invoked by.
pub struct Subcommand {
    name: String,
    command: Box<dyn Command>,
}

impl Subcommand {
    pub fn new(command: Box<dyn Command>) -> Self {
        Self {
            name: String::new(),
            command,
        }
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn usage(&self) -> Usage {
        self.command.usage()
    }

    pub fn run(&mut self, session: &mut Session, args: &mut Args) -> Outcome {
        tracing::debug!(command = %self.name, "running subcommand");
        self.command.run(session, args)
    }
}

impl std::fmt::Debug for Subcommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subcommand").field("name", &self.name).finish()
    }
}

/// Parse a JSON object argument.
pub(crate) fn parse_json_object(text: &str, what: &str) -> Outcome<Map<String, Value>> {
    match serde_json::from_str::<Value>(text) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(Interrupt::usage(format!("{} must be a JSON object", what))),
        Err(e) => Err(Interrupt::usage(format!("Invalid JSON in {}: {}", what, e))),
    }
}

/// Properties the tool writes itself; a body's own copies are never shown.
pub(crate) const METADATA_KEYS: &[&str] = &["_id", "_rev", "_deleted"];

/// Body properties that aren't metadata, in stored order.
pub(crate) fn body_properties(
    body: &Map<String, Value>,
) -> impl Iterator<Item = (String, Value)> + '_ {
    body.iter()
        .filter(|(k, _)| !METADATA_KEYS.contains(&k.as_str()))
        .map(|(k, v)| (k.clone(), v.clone()))
}

/// A document's body with `_id` and `_rev` prepended.
pub(crate) fn document_json(id: &str, doc: &Document) -> Value {
    let mut map = Map::with_capacity(doc.body.len() + 2);
    map.insert("_id".into(), Value::String(id.to_string()));
    map.insert("_rev".into(), Value::String(doc.rev_id().to_string()));
    if doc.deleted {
        map.insert("_deleted".into(), Value::Bool(true));
    }
    map.extend(body_properties(&doc.body));
    Value::Object(map)
}
