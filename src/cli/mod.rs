//! cli
//!
//! Command-line interface layer: global flags, dispatch, and the shell.
//!
//! # Responsibilities
//!
//! - Consume global flags into the [`Session`]
//! - Decide between one-shot mode (`cblite SUBCOMMAND ...`) and the
//!   interactive shell (`cblite DBPATH`)
//! - Catch the [`Interrupt`] that ends a run and map it to an exit status
//!
//! # Architecture
//!
//! Argument handling is a cursor over the raw tokens ([`args::Args`]) rather
//! than a declarative parser, because each subcommand consumes its own flags
//! and positionals and the shell feeds the same commands from typed lines.
//! Subcommands live in [`commands`] and are looked up through [`registry`].

pub mod args;
pub mod commands;
pub mod help;
pub mod registry;
pub mod shell;

use std::path::MAIN_SEPARATOR;

use tracing::debug;

use self::args::{Args, Flag};
use self::registry::Resolution;
use crate::session::{Interrupt, Outcome, Session};
use crate::store::{is_database_path, schema::FORMAT_VERSION, DB_EXTENSION};

/// The pseudo-command that prints usage.
pub const HELP_KEYWORD: &str = "help";

/// Process exit status of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitStatus {
    Success,
    Failure,
}

impl ExitStatus {
    pub fn code(self) -> u8 {
        match self {
            ExitStatus::Success => 0,
            ExitStatus::Failure => 1,
        }
    }
}

impl From<ExitStatus> for std::process::ExitCode {
    fn from(status: ExitStatus) -> Self {
        std::process::ExitCode::from(status.code())
    }
}

const GLOBAL_FLAGS: &[Flag<Session>] = &[
    ("--create", |s, _| {
        s.enable_create();
        Ok(())
    }),
    ("--writeable", |s, _| {
        s.enable_writes();
        Ok(())
    }),
    ("--encrypted", |s, _| {
        s.require_password();
        Ok(())
    }),
    ("--color", |s, _| {
        s.set_color(true);
        Ok(())
    }),
    ("--version", show_version),
    ("-v", show_version),
];

/// Help text for [`GLOBAL_FLAGS`].
pub const GLOBAL_FLAG_HELP: &[(&str, &str)] = &[
    ("--create", "Create the database if it doesn't exist (implies --writeable)"),
    ("--writeable", "Open the database with write access"),
    ("--encrypted", "Prompt for the database's password or hex key"),
    ("--color", "Use bold, italic and colored output"),
    ("--version, -v", "Print version information and exit"),
];

fn show_version(session: &mut Session, _: &mut Args) -> Outcome {
    session.print(version_text());
    Err(Interrupt::Exit)
}

/// Text printed by `--version`.
pub fn version_text() -> String {
    format!(
        "cblite {} (database format {})",
        env!("CARGO_PKG_VERSION"),
        FORMAT_VERSION
    )
}

/// Run the tool with the given arguments.
///
/// Usage errors and operation failures are reported through the session's
/// console and mapped to [`ExitStatus::Failure`].
///
/// # Errors
///
/// Only fatal errors are returned; the caller reports them and exits
/// non-zero.
pub fn run(session: &mut Session, mut args: Args) -> anyhow::Result<ExitStatus> {
    let outcome = dispatch(session, &mut args);
    if session.has_database() {
        if let Err(interrupt) = session.close_database() {
            session.report(&interrupt);
        }
    }

    match outcome {
        Ok(()) | Err(Interrupt::Exit) => Ok(ExitStatus::Success),
        Err(Interrupt::Fatal(error)) => Err(error),
        Err(interrupt) => {
            session.report(&interrupt);
            Ok(ExitStatus::Failure)
        }
    }
}

fn dispatch(session: &mut Session, args: &mut Args) -> Outcome {
    args.process_flags(session, GLOBAL_FLAGS)?;

    if !args.has_args() {
        for line in help::missing_subcommand_banner(session.color()) {
            session.print_err(line);
        }
        return Err(Interrupt::usage("Missing subcommand or database path"));
    }

    let name = args.next_arg("subcommand or database path")?;
    if is_database_path(&name) {
        args.end_of_args()?;
        session.set_interactive(true);
        session.open_database(&name)?;
        let exit = shell::run_interactively(session)?;
        debug!(?exit, "shell finished");
        return Ok(());
    }

    if name == HELP_KEYWORD {
        return help::help_command(session, args);
    }

    match registry::resolve(&name, session.is_interactive()) {
        Resolution::Command(mut subcommand) => subcommand.run(session, args),
        // `quit` is gated to the shell, so one-shot runs only ever see it as unknown.
        Resolution::Quit | Resolution::Unknown if looks_like_path(&name) => {
            Err(Interrupt::failed(format!(
                "Not a valid database path (must end in {}) or subcommand name: {}",
                DB_EXTENSION, name
            )))
        }
        Resolution::Quit | Resolution::Unknown => {
            Err(Interrupt::usage(format!("Unknown subcommand '{}'", name)))
        }
    }
}

/// Heuristic for an unknown first argument that was meant as a path.
fn looks_like_path(token: &str) -> bool {
    token.contains('/') || token.contains(MAIN_SEPARATOR) || token.contains('.') || token.len() > 10
}
