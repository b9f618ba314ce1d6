//! session::opener
//!
//! Opening the session database, including the encrypted-database password
//! loop.
//!
//! # State machine
//!
//! ```text
//! Unopened -> Attempt -> Success
//!               |
//!               v  (not a database / wrong key)
//!          NeedsPassword -> prompt -> key -> Attempt
//! ```
//!
//! - `--encrypted` skips the plain attempt and starts in `NeedsPassword`.
//! - Any error other than "not a database" fails with the error verbatim.
//! - A one-shot run without `--encrypted` never prompts; it fails with a hint.
//! - An empty password aborts the process. There is no attempt limit.
//! - Open flags are fixed before the first attempt; retries only change the key.

use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context as _};
use tracing::{debug, info};

use super::{Interrupt, Outcome, Session};
use crate::store::{
    derive_key_from_password, is_database_path, Algorithm, EncryptionKey, OpenConfig,
    DB_EXTENSION,
};

/// First password prompt.
pub const PASSWORD_PROMPT: &str = "Database password or hex key: ";

/// Prompt after a key was rejected.
pub const RETRY_PROMPT: &str = "Sorry, try again: ";

enum OpenState {
    Attempt,
    NeedsPassword,
}

impl Session {
    /// Open the database at `path` and store the handle in the session.
    ///
    /// # Errors
    ///
    /// - [`Interrupt::Failed`] if the path lacks the database extension, the
    ///   open fails, or the database is encrypted in a one-shot run without
    ///   `--encrypted`
    /// - [`Interrupt::Fatal`] if the user enters an empty password or the
    ///   password can't be read
    pub fn open_database(&mut self, path: &str) -> Outcome {
        let path = fix_up_path(path);
        if !is_database_path(&path) {
            return Err(Interrupt::failed(format!(
                "Database filename must have a '{}' extension",
                DB_EXTENSION
            )));
        }
        if let Some(db) = &self.db {
            return Err(Interrupt::failed(format!(
                "Database {} is already open",
                db.path().display()
            )));
        }

        let mut config = OpenConfig::new(self.flags);
        let mut state = if self.needs_password {
            debug!("--encrypted given; skipping unencrypted open");
            OpenState::NeedsPassword
        } else {
            OpenState::Attempt
        };

        loop {
            state = match state {
                OpenState::Attempt => match self.engine.open(&path, &config) {
                    Ok(db) => {
                        info!(path = %path.display(), read_only = db.is_read_only(), "database open");
                        self.db = Some(db);
                        return Ok(());
                    }
                    Err(e) if e.is_not_a_database() => OpenState::NeedsPassword,
                    Err(e) => {
                        return Err(Interrupt::failed_with(
                            format!("Couldn't open database {}", path.display()),
                            e,
                        ));
                    }
                },
                OpenState::NeedsPassword => {
                    if !self.interactive && !self.needs_password {
                        return Err(Interrupt::failed(
                            "Database is encrypted (use `--encrypted` flag to get a password prompt)",
                        ));
                    }
                    let prompt = if config.encryption_key.is_some() {
                        RETRY_PROMPT
                    } else {
                        PASSWORD_PROMPT
                    };
                    let password = self
                        .console
                        .read_password(prompt)
                        .context("couldn't read password")?;
                    if password.is_empty() {
                        return Err(Interrupt::Fatal(anyhow!(
                            "no password entered; not opening {}",
                            path.display()
                        )));
                    }
                    match key_from_input(&password) {
                        Some(key) => {
                            config.encryption_key = Some(key);
                            OpenState::Attempt
                        }
                        None => {
                            self.print_err("Error: Couldn't derive key from password");
                            OpenState::NeedsPassword
                        }
                    }
                }
            };
        }
    }
}

/// A literal hex key if the input is one, otherwise a password-derived key.
pub(crate) fn key_from_input(input: &str) -> Option<EncryptionKey> {
    EncryptionKey::from_hex(input).or_else(|| derive_key_from_password(input, Algorithm::Aes256))
}

/// Expand a leading `~` to the home directory.
pub fn fix_up_path(path: &str) -> PathBuf {
    match path.strip_prefix('~') {
        Some(rest) if rest.is_empty() || rest.starts_with('/') => match dirs::home_dir() {
            Some(home) => home.join(rest.trim_start_matches('/')),
            None => PathBuf::from(path),
        },
        _ => Path::new(path).to_path_buf(),
    }
}
