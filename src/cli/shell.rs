//! cli::shell
//!
//! The interactive shell: read a line, run it as a subcommand against the
//! already-open database, repeat.
//!
//! # Error isolation
//!
//! Each line runs to completion or to an [`Interrupt`]. Usage errors,
//! operation failures and `Exit` are reported and the loop continues with a
//! fresh prompt; only [`Interrupt::Fatal`] or a console failure ends the
//! shell. A blank line re-prompts. End of input ends the shell as if `quit`
//! had been typed.

use anyhow::Context as _;
use tracing::debug;

use super::args::Args;
use super::help;
use super::registry::{self, Resolution};
use super::HELP_KEYWORD;
use crate::session::{Interrupt, Outcome, Session};

/// The shell prompt.
pub const PROMPT: &str = "(cblite) ";

/// How the shell ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShellExit {
    /// End of input.
    Eof,
    /// The `quit` command.
    Quit,
}

enum Step {
    Continue,
    Quit,
}

/// Run the shell until `quit`, end of input or a fatal error.
///
/// The session must already hold an open database. The handle is closed
/// before returning normally.
pub fn run_interactively(session: &mut Session) -> anyhow::Result<ShellExit> {
    session.set_interactive(true);
    let banner = {
        let db = session.db()?;
        format!(
            "Opened {} database {}",
            if db.is_read_only() { "read-only" } else { "writeable" },
            db.path().display()
        )
    };
    session.print(banner);

    let exit = loop {
        let line = session
            .console()
            .read_line(PROMPT)
            .context("couldn't read from the terminal")?;
        let Some(line) = line else {
            debug!("end of input");
            break ShellExit::Eof;
        };

        match run_line(session, &line) {
            Ok(Step::Continue) => {}
            Ok(Step::Quit) => break ShellExit::Quit,
            Err(Interrupt::Fatal(error)) => return Err(error),
            Err(interrupt) => session.report(&interrupt),
        }
    };

    session.close_database()?;
    Ok(exit)
}

fn run_line(session: &mut Session, line: &str) -> Outcome<Step> {
    let mut args = Args::parse_line(line)?;
    if !args.has_args() {
        return Ok(Step::Continue);
    }
    let name = args.next_arg("subcommand")?;
    if name == HELP_KEYWORD {
        help::help_command(session, &mut args)?;
        return Ok(Step::Continue);
    }

    match registry::resolve(&name, true) {
        Resolution::Command(mut subcommand) => {
            subcommand.run(session, &mut args)?;
            Ok(Step::Continue)
        }
        Resolution::Quit => Ok(Step::Quit),
        Resolution::Unknown => Err(Interrupt::usage(format!(
            "Unknown subcommand '{}'; type 'help' for a list of commands.",
            name
        ))),
    }
}
