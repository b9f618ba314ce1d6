//! session
//!
//! Run-scoped state shared by the dispatcher, the shell and every subcommand.
//!
//! # Responsibilities
//!
//! - Own the (at most one) open database handle
//! - Hold the effective open flags and the interactive/one-shot mode
//! - Own the collaborators: the storage [`Engine`] and the [`Console`]
//!
//! # Invariants
//!
//! - At most one database handle is open at a time
//! - Open flags change only during global-flag processing, before any open
//! - The opener is the only writer of the handle; [`Session::close_database`]
//!   is the only place it is closed explicitly
//!
//! A `Session` is an ordinary value passed by `&mut` into every command.
//! There is no global state, so a test can build one around a
//! [`crate::ui::Scripted`] console and drive the full dispatch path.

mod opener;
mod outcome;

pub(crate) use opener::key_from_input;
pub use opener::{fix_up_path, PASSWORD_PROMPT, RETRY_PROMPT};
pub use outcome::{Interrupt, Outcome};

use tracing::debug;

use crate::cli::args::Args;
use crate::core::config::Config;
use crate::store::{Database, Engine, OpenFlags};
use crate::ui::{output, Console};

/// Process-wide state for one run of the tool.
pub struct Session {
    db: Option<Database>,
    flags: OpenFlags,
    needs_password: bool,
    interactive: bool,
    color: bool,
    config: Config,
    engine: Box<dyn Engine>,
    console: Box<dyn Console>,
}

impl Session {
    /// Create a one-shot session with default (read-only) open flags.
    pub fn new(engine: impl Engine + 'static, console: impl Console + 'static) -> Self {
        Self {
            db: None,
            flags: OpenFlags::default(),
            needs_password: false,
            interactive: false,
            color: false,
            config: Config::default(),
            engine: Box::new(engine),
            console: Box::new(console),
        }
    }

    /// Apply loaded configuration (color default, serve port).
    pub fn with_config(mut self, config: Config) -> Self {
        self.color = config.color();
        self.config = config;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    // ---- flags and mode ----

    pub fn flags(&self) -> OpenFlags {
        self.flags
    }

    /// `--create`: create the database if missing; implies writeable.
    pub fn enable_create(&mut self) {
        self.flags.insert(OpenFlags::CREATE);
        self.flags.remove(OpenFlags::READ_ONLY);
    }

    /// `--writeable`: open with write access.
    pub fn enable_writes(&mut self) {
        self.flags.remove(OpenFlags::READ_ONLY);
    }

    /// `--encrypted`: prompt for a password instead of trying a plain open.
    pub fn require_password(&mut self) {
        self.needs_password = true;
    }

    pub fn needs_password(&self) -> bool {
        self.needs_password
    }

    pub fn is_interactive(&self) -> bool {
        self.interactive
    }

    pub fn set_interactive(&mut self, interactive: bool) {
        self.interactive = interactive;
    }

    pub fn color(&self) -> bool {
        self.color
    }

    pub fn set_color(&mut self, color: bool) {
        self.color = color;
    }

    // ---- database handle ----

    pub fn has_database(&self) -> bool {
        self.db.is_some()
    }

    pub fn database(&self) -> Option<&Database> {
        self.db.as_ref()
    }

    /// The open database, or a failure if none is open.
    pub fn db(&self) -> Outcome<&Database> {
        self.db
            .as_ref()
            .ok_or_else(|| Interrupt::failed("No database is open"))
    }

    /// The open database for writing, or a failure if none is open.
    pub fn db_mut(&mut self) -> Outcome<&mut Database> {
        self.db
            .as_mut()
            .ok_or_else(|| Interrupt::failed("No database is open"))
    }

    /// The storage engine, for commands that open a second database.
    pub fn engine(&self) -> &dyn Engine {
        self.engine.as_ref()
    }

    /// Open the database named by the next argument, unless one is already
    /// open (as in the shell, where the path argument is never expected).
    pub fn open_database_from_next_arg(&mut self, args: &mut Args) -> Outcome {
        if self.db.is_none() {
            let path = args.next_arg("database path")?;
            self.open_database(&path)?;
        }
        Ok(())
    }

    /// Like [`Self::open_database_from_next_arg`], but the handle must allow
    /// writes. A fresh open is made writeable; an existing read-only handle
    /// is an error.
    pub fn open_writeable_database_from_next_arg(&mut self, args: &mut Args) -> Outcome {
        match &self.db {
            Some(db) if db.is_read_only() => Err(Interrupt::failed(
                "Database was opened read-only; run `cblite --writeable` to allow writes",
            )),
            Some(_) => Ok(()),
            None => {
                self.enable_writes();
                self.open_database_from_next_arg(args)
            }
        }
    }

    /// Close the open handle, if any.
    pub fn close_database(&mut self) -> Outcome {
        if let Some(db) = self.db.take() {
            debug!(path = %db.path().display(), "closing session database");
            db.close()
                .map_err(|e| Interrupt::failed_with("Couldn't close database", e))?;
        }
        Ok(())
    }

    // ---- console ----

    pub fn console(&mut self) -> &mut dyn Console {
        self.console.as_mut()
    }

    /// Write a line of regular output.
    pub fn print(&mut self, text: impl AsRef<str>) {
        self.console.write_out(text.as_ref());
    }

    /// Write a line of diagnostic output.
    pub fn print_err(&mut self, text: impl AsRef<str>) {
        self.console.write_err(text.as_ref());
    }

    pub fn warn(&mut self, text: impl std::fmt::Display) {
        let line = output::warning(text, self.color);
        self.print_err(line);
    }

    /// Render an isolated interrupt for the user. `Exit` renders nothing.
    pub fn report(&mut self, interrupt: &Interrupt) {
        let color = self.color;
        match interrupt {
            Interrupt::Usage(message) | Interrupt::Failed(message) => {
                self.print_err(output::error(message, color));
            }
            Interrupt::Fatal(error) => {
                self.print_err(output::error(format!("{:#}", error), color));
            }
            Interrupt::Exit => {}
        }
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("db", &self.db.as_ref().map(Database::path))
            .field("flags", &self.flags)
            .field("needs_password", &self.needs_password)
            .field("interactive", &self.interactive)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::FileEngine;
    use crate::ui::Scripted;
    use tempfile::TempDir;

    fn session() -> Session {
        Session::new(FileEngine, Scripted::new())
    }

    #[test]
    fn new_session_is_read_only_one_shot() {
        let s = session();
        assert!(s.flags().is_read_only());
        assert!(!s.is_interactive());
        assert!(!s.needs_password());
        assert!(!s.has_database());
    }

    #[test]
    fn create_clears_read_only() {
        let mut s = session();
        s.enable_create();
        assert!(s.flags().contains(OpenFlags::CREATE));
        assert!(s.flags().is_writeable());
    }

    #[test]
    fn db_without_open_handle_fails() {
        let s = session();
        assert!(matches!(s.db(), Err(Interrupt::Failed(_))));
    }

    #[test]
    fn open_from_next_arg_skips_path_when_open() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("a.cblite2");
        let mut s = session();
        s.enable_create();

        let mut args = Args::new([path.to_str().unwrap(), "doc1"]);
        s.open_database_from_next_arg(&mut args).unwrap();
        assert!(s.has_database());
        assert_eq!(args.peek(), Some("doc1"));

        s.open_database_from_next_arg(&mut args).unwrap();
        assert_eq!(args.peek(), Some("doc1"));
    }

    #[test]
    fn writeable_open_rejects_read_only_handle() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("a.cblite2");
        {
            let mut s = session();
            s.enable_create();
            s.open_database(path.to_str().unwrap()).unwrap();
            s.close_database().unwrap();
        }

        let mut s = session();
        s.open_database(path.to_str().unwrap()).unwrap();
        let result = s.open_writeable_database_from_next_arg(&mut Args::default());
        match result {
            Err(Interrupt::Failed(msg)) => assert!(msg.contains("--writeable")),
            other => panic!("expected failure, got {:?}", other),
        }
    }

    #[test]
    fn writeable_open_clears_read_only_before_opening() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("a.cblite2");
        {
            let mut s = session();
            s.enable_create();
            s.open_database(path.to_str().unwrap()).unwrap();
        }

        let mut s = session();
        let mut args = Args::new([path.to_str().unwrap()]);
        s.open_writeable_database_from_next_arg(&mut args).unwrap();
        assert!(!s.db().unwrap().is_read_only());
    }

    #[test]
    fn close_database_releases_handle() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("a.cblite2");
        let mut s = session();
        s.enable_create();
        s.open_database(path.to_str().unwrap()).unwrap();

        s.close_database().unwrap();
        assert!(!s.has_database());
        s.close_database().unwrap();
    }

    #[test]
    fn report_renders_isolated_failures_once() {
        let console = Scripted::new();
        let transcript = console.transcript();
        let mut s = Session::new(FileEngine, console);

        s.report(&Interrupt::usage("Unknown subcommand 'zz'"));
        s.report(&Interrupt::Exit);
        assert_eq!(transcript.err(), vec!["Error: Unknown subcommand 'zz'"]);
    }
}
