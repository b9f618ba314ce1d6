//! cli::commands::encrypt
//!
//! `encrypt` seals the database with a new password or hex key; `decrypt`
//! removes the key. Both need a writeable handle.

use anyhow::Context as _;

use super::{Command, Usage};
use crate::cli::args::Args;
use crate::session::{key_from_input, Interrupt, Outcome, Session};

/// Prompt for the new key.
pub const NEW_KEY_PROMPT: &str = "New password or hex key: ";

struct EncryptCommand {
    decrypt: bool,
}

pub fn new_encrypt_command() -> Box<dyn Command> {
    Box::new(EncryptCommand { decrypt: false })
}

pub fn new_decrypt_command() -> Box<dyn Command> {
    Box::new(EncryptCommand { decrypt: true })
}

impl Command for EncryptCommand {
    fn usage(&self) -> Usage {
        if self.decrypt {
            Usage::on_database("Remove encryption from the database", "")
        } else {
            Usage::on_database(
                "Encrypt the database with a password or 64-digit hex key (prompted for)",
                "",
            )
        }
    }

    fn run(&mut self, session: &mut Session, args: &mut Args) -> Outcome {
        session.open_writeable_database_from_next_arg(args)?;
        args.end_of_args()?;

        if self.decrypt {
            if !session.db()?.is_encrypted() {
                return Err(Interrupt::failed("Database is not encrypted"));
            }
            session
                .db_mut()?
                .rekey(None)
                .map_err(|e| Interrupt::failed_with("Couldn't decrypt database", e))?;
            session.print("Database decrypted.");
            return Ok(());
        }

        let input = session
            .console()
            .read_password(NEW_KEY_PROMPT)
            .context("couldn't read password")?;
        if input.is_empty() {
            return Err(Interrupt::failed("No password given; database unchanged"));
        }
        let key = key_from_input(&input)
            .ok_or_else(|| Interrupt::failed("Couldn't derive key from password"))?;
        session
            .db_mut()?
            .rekey(Some(&key))
            .map_err(|e| Interrupt::failed_with("Couldn't encrypt database", e))?;
        session.print("Database encrypted.");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::commands::testing::{Fixture, DB};
    use crate::store::FileEngine;
    use crate::ui::Scripted;
    use serde_json::json;

    fn scripted(passwords: &[&str]) -> Session {
        Session::new(FileEngine, Scripted::new().with_passwords(passwords.iter().copied()))
    }

    #[test]
    fn encrypt_then_decrypt() {
        let f = Fixture::with_docs(&[("a", json!({}))]);

        let mut s = scripted(&["hunter2"]);
        f.run_in(&mut s, new_encrypt_command, &[DB]).unwrap();
        assert!(s.db().unwrap().is_encrypted());
        drop(s);

        // A plain one-shot open is now refused.
        let (outcome, _) = f.run(new_decrypt_command, &[DB]);
        assert!(matches!(outcome, Err(Interrupt::Failed(_))));

        let mut s = scripted(&["hunter2"]);
        s.require_password();
        f.run_in(&mut s, new_decrypt_command, &[DB]).unwrap();
        drop(s);
        assert!(!f.reopen().is_encrypted());
    }

    #[test]
    fn empty_password_leaves_database_unchanged() {
        let f = Fixture::empty();
        let mut s = scripted(&[""]);
        let outcome = f.run_in(&mut s, new_encrypt_command, &[DB]);
        assert!(matches!(outcome, Err(Interrupt::Failed(_))));
        drop(s);
        assert!(!f.reopen().is_encrypted());
    }

    #[test]
    fn decrypting_plain_database_fails() {
        let f = Fixture::empty();
        let (outcome, _) = f.run(new_decrypt_command, &[DB]);
        match outcome {
            Err(Interrupt::Failed(msg)) => assert_eq!(msg, "Database is not encrypted"),
            other => panic!("expected failure, got {:?}", other),
        }
    }
}
