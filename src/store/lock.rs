//! store::lock
//!
//! Per-database lock file.
//!
//! # Storage
//!
//! - `<db>.cblite2/db.lock` - Lock file with an OS-level lock
//!
//! # Invariants
//!
//! - A writeable handle holds an exclusive lock for its entire lifetime
//! - Read-only handles hold a shared lock, so several readers may coexist
//! - Acquisition is non-blocking (fails fast if the lock is held elsewhere)
//! - The lock is released on drop (RAII)

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

use fs2::FileExt;
use thiserror::Error;

/// Name of the lock file inside a database directory.
pub const LOCK_FILE: &str = "db.lock";

/// Errors from locking operations.
#[derive(Debug, Error)]
pub enum LockError {
    /// Another handle already holds a conflicting lock.
    #[error("database is locked by another process")]
    AlreadyLocked,

    /// Failed to create or open the lock file.
    #[error("failed to create lock: {0}")]
    CreateFailed(String),

    /// Failed to acquire the OS lock.
    #[error("failed to acquire lock: {0}")]
    AcquireFailed(String),

    /// Failed to release the lock.
    #[error("failed to release lock: {0}")]
    ReleaseFailed(String),
}

/// How the lock is held.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockMode {
    /// Readers share the lock.
    Shared,
    /// A single writer owns the lock.
    Exclusive,
}

/// A held lock on a database directory.
///
/// Released automatically when dropped.
#[derive(Debug)]
pub struct StoreLock {
    path: PathBuf,
    mode: LockMode,
    file: Option<File>,
}

impl StoreLock {
    /// Acquire the lock for the database directory `dir`.
    ///
    /// # Errors
    ///
    /// - [`LockError::AlreadyLocked`] if a conflicting lock is held
    /// - [`LockError::CreateFailed`] if the lock file cannot be opened
    /// - [`LockError::AcquireFailed`] if the OS lock cannot be acquired
    pub fn acquire(dir: &Path, mode: LockMode) -> Result<Self, LockError> {
        let path = dir.join(LOCK_FILE);

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)
            .map_err(|e| {
                LockError::CreateFailed(format!("cannot open {}: {}", path.display(), e))
            })?;

        let attempt = match mode {
            LockMode::Shared => FileExt::try_lock_shared(&file),
            LockMode::Exclusive => FileExt::try_lock_exclusive(&file),
        };

        match attempt {
            Ok(()) => Ok(Self {
                path,
                mode,
                file: Some(file),
            }),
            Err(e) if e.kind() == fs2::lock_contended_error().kind() => {
                Err(LockError::AlreadyLocked)
            }
            Err(e) => Err(LockError::AcquireFailed(e.to_string())),
        }
    }

    /// Check if the lock is currently held.
    pub fn is_held(&self) -> bool {
        self.file.is_some()
    }

    /// The mode the lock was acquired in.
    pub fn mode(&self) -> LockMode {
        self.mode
    }

    /// Path to the lock file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Release the lock explicitly. Safe to call more than once.
    pub fn release(&mut self) -> Result<(), LockError> {
        if let Some(file) = self.file.take() {
            FileExt::unlock(&file).map_err(|e| LockError::ReleaseFailed(e.to_string()))?;
        }
        Ok(())
    }
}

impl Drop for StoreLock {
    fn drop(&mut self) {
        if let Some(file) = self.file.take() {
            let _ = FileExt::unlock(&file);
        }
    }
}
