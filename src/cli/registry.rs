//! cli::registry
//!
//! The subcommand registry: name to factory, gated by mode.
//!
//! # Gating
//!
//! Each entry declares the modes it may run in. Resolution is a pure
//! function of `(name, interactive)`: entries whose gate doesn't admit the
//! current mode are invisible, exactly as if the name were unknown.
//!
//! | Gate | One-shot | Shell |
//! |---|---|---|
//! | `Always` | yes | yes |
//! | `OneShotOnly` (`serve`) | yes | no |
//! | `InteractiveOnly` (`quit`) | no | yes |
//!
//! `help` is handled by the dispatcher and the shell before resolution, so it
//! isn't an entry here.

use super::args::lookup;
use super::commands::{cat, compact, cp, encrypt, info, ls, put, query, revs, rm, serve};
use super::commands::{Factory, Subcommand};

/// Modes an entry is visible in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gate {
    Always,
    OneShotOnly,
    InteractiveOnly,
}

impl Gate {
    pub fn admits(self, interactive: bool) -> bool {
        match self {
            Gate::Always => true,
            Gate::OneShotOnly => !interactive,
            Gate::InteractiveOnly => interactive,
        }
    }
}

/// What a name resolves to.
#[derive(Debug, Clone, Copy)]
pub enum Target {
    Command(Factory),
    /// Close the database and leave the shell.
    Quit,
}

#[derive(Debug, Clone, Copy)]
pub struct Entry {
    pub gate: Gate,
    pub target: Target,
}

impl Entry {
    pub const fn always(factory: Factory) -> Self {
        Self {
            gate: Gate::Always,
            target: Target::Command(factory),
        }
    }

    pub const fn one_shot_only(factory: Factory) -> Self {
        Self {
            gate: Gate::OneShotOnly,
            target: Target::Command(factory),
        }
    }

    pub const fn quit() -> Self {
        Self {
            gate: Gate::InteractiveOnly,
            target: Target::Quit,
        }
    }
}

/// Every subcommand, in help-listing order.
pub const REGISTRY: &[(&str, Entry)] = &[
    ("cat", Entry::always(cat::new_command)),
    ("compact", Entry::always(compact::new_command)),
    ("cp", Entry::always(cp::new_copy_command)),
    ("decrypt", Entry::always(encrypt::new_decrypt_command)),
    ("encrypt", Entry::always(encrypt::new_encrypt_command)),
    ("export", Entry::always(cp::new_export_command)),
    ("file", Entry::always(info::new_command)),
    ("import", Entry::always(cp::new_import_command)),
    ("info", Entry::always(info::new_command)),
    ("ls", Entry::always(ls::new_command)),
    ("put", Entry::always(put::new_command)),
    ("query", Entry::always(query::new_command)),
    ("revs", Entry::always(revs::new_command)),
    ("rm", Entry::always(rm::new_command)),
    ("serve", Entry::one_shot_only(serve::new_command)),
    ("quit", Entry::quit()),
];

/// Result of looking up a subcommand name.
#[derive(Debug)]
pub enum Resolution {
    /// A fresh instance, already named.
    Command(Subcommand),
    Quit,
    Unknown,
}

impl Resolution {
    pub fn is_unknown(&self) -> bool {
        matches!(self, Resolution::Unknown)
    }
}

/// Resolve `name` for the given mode.
pub fn resolve(name: &str, interactive: bool) -> Resolution {
    match lookup(name, REGISTRY) {
        Some(entry) if entry.gate.admits(interactive) => match entry.target {
            Target::Command(factory) => {
                let mut subcommand = Subcommand::new(factory());
                subcommand.set_name(name);
                Resolution::Command(subcommand)
            }
            Target::Quit => Resolution::Quit,
        },
        _ => Resolution::Unknown,
    }
}

/// Names visible in the given mode, in registry order.
pub fn names(interactive: bool) -> impl Iterator<Item = &'static str> {
    REGISTRY
        .iter()
        .filter(move |(_, entry)| entry.gate.admits(interactive))
        .map(|(name, _)| *name)
}
