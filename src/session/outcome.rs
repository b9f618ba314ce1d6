//! session::outcome
//!
//! The tagged result every unit of work returns.
//!
//! # Propagation
//!
//! | Variant | One-shot | Shell |
//! |---|---|---|
//! | `Ok` | exit 0 | next line |
//! | [`Interrupt::Usage`] | report, exit 1 | report, next line |
//! | [`Interrupt::Failed`] | report, exit 1 | report, next line |
//! | [`Interrupt::Exit`] | exit 0 | next line |
//! | [`Interrupt::Fatal`] | report, exit 1 | report, exit 1 |
//!
//! Usage and operation failures are reported once, by whichever boundary
//! catches them; code that raises them never prints the message itself.

use std::fmt::Display;

use thiserror::Error;

/// Why a unit of work stopped early.
#[derive(Debug, Error)]
pub enum Interrupt {
    /// Malformed invocation: missing or extra arguments, unknown subcommand.
    #[error("{0}")]
    Usage(String),

    /// A well-formed invocation that failed at runtime.
    #[error("{0}")]
    Failed(String),

    /// Stop the current unit of work on purpose.
    #[error("exit requested")]
    Exit,

    /// Unrecoverable; ends the process even in the shell.
    #[error(transparent)]
    Fatal(#[from] anyhow::Error),
}

impl Interrupt {
    pub fn usage(message: impl Into<String>) -> Self {
        Interrupt::Usage(message.into())
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Interrupt::Failed(message.into())
    }

    /// An operation failure that names the underlying error.
    pub fn failed_with(message: impl Display, cause: impl Display) -> Self {
        Interrupt::Failed(format!("{}: {}", message, cause))
    }

    /// True for everything the shell survives.
    pub fn is_isolated(&self) -> bool {
        !matches!(self, Interrupt::Fatal(_))
    }
}

/// Result type of commands, flag actions and the opener.
pub type Outcome<T = ()> = Result<T, Interrupt>;

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;

    #[test]
    fn only_fatal_escapes_isolation() {
        assert!(Interrupt::usage("x").is_isolated());
        assert!(Interrupt::failed("x").is_isolated());
        assert!(Interrupt::Exit.is_isolated());
        assert!(!Interrupt::Fatal(anyhow!("x")).is_isolated());
    }

    #[test]
    fn failed_with_includes_cause() {
        let err = Interrupt::failed_with("Couldn't open database a.cblite2", "not found");
        assert_eq!(err.to_string(), "Couldn't open database a.cblite2: not found");
    }

    #[test]
    fn anyhow_errors_become_fatal() {
        fn inner() -> Outcome {
            Err(anyhow!("disk on fire"))?;
            Ok(())
        }
        assert!(matches!(inner(), Err(Interrupt::Fatal(_))));
    }
}
