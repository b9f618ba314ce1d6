//! store
//!
//! The bundled embedded document store.
//!
//! # Responsibilities
//!
//! - Open, create and close database directories (`*.cblite2`)
//! - Gate access by encryption key (wrong key reports [`StoreError::NotADatabase`])
//! - Read and write JSON documents with revision histories
//!
//! # Architecture
//!
//! The command core only sees the [`Engine`] trait, so tests can wrap or
//! replace the storage layer. [`FileEngine`] is the implementation the binary
//! uses.
//!
//! # Example
//!
//! ```no_run
//! use cblite::store::{Engine, FileEngine, OpenConfig, OpenFlags};
//! use std::path::Path;
//!
//! let config = OpenConfig::new(OpenFlags::CREATE);
//! let mut db = FileEngine.open(Path::new("/tmp/demo.cblite2"), &config).unwrap();
//! println!("{} documents", db.document_count());
//! db.close().unwrap();
//! ```

pub mod database;
pub mod key;
pub mod lock;
pub mod schema;

pub use database::{CompactStats, Database, PutMode};
pub use key::{derive_key_from_password, Algorithm, EncryptionKey};
pub use schema::Document;

use std::ops::BitOr;
use std::path::{Path, PathBuf};

use thiserror::Error;

use lock::LockError;

/// Required filename suffix of a database directory.
pub const DB_EXTENSION: &str = ".cblite2";

/// Returns true if the final component of `path` ends in [`DB_EXTENSION`].
///
/// The comparison is case-sensitive and an exact suffix match, so a longer
/// extension such as `.cblite20` does not qualify.
pub fn is_database_path(path: impl AsRef<Path>) -> bool {
    path.as_ref()
        .file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.ends_with(DB_EXTENSION))
}

/// Errors reported by the store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The file is not a database, or the encryption key is missing or wrong.
    #[error("file is not a database, or encryption key is invalid")]
    NotADatabase,

    #[error("database not found: {0}")]
    NotFound(PathBuf),

    #[error("database is read-only")]
    ReadOnly,

    #[error("database is busy: {0}")]
    Busy(#[from] LockError),

    #[error("document not found: {0}")]
    DocumentNotFound(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("invalid document: {0}")]
    InvalidDocument(String),

    #[error("corrupt database: {0}")]
    Corrupt(String),

    #[error("i/o error on {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl StoreError {
    /// True for the "not a database / wrong key" condition that triggers a
    /// password prompt.
    pub fn is_not_a_database(&self) -> bool {
        matches!(self, StoreError::NotADatabase)
    }

    pub(crate) fn io(path: &Path, source: std::io::Error) -> Self {
        StoreError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Open flags: a small bit-set of {create, read-only}. Writeable is the
/// absence of read-only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OpenFlags(u8);

impl OpenFlags {
    pub const NONE: Self = Self(0);
    /// Create the database if it doesn't exist.
    pub const CREATE: Self = Self(0b01);
    /// Open without write access.
    pub const READ_ONLY: Self = Self(0b10);

    pub fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn insert(&mut self, other: Self) {
        self.0 |= other.0;
    }

    pub fn remove(&mut self, other: Self) {
        self.0 &= !other.0;
    }

    pub fn is_read_only(self) -> bool {
        self.contains(Self::READ_ONLY)
    }

    pub fn is_writeable(self) -> bool {
        !self.is_read_only()
    }
}

/// Databases are opened read-only unless a flag says otherwise.
impl Default for OpenFlags {
    fn default() -> Self {
        Self::READ_ONLY
    }
}

impl BitOr for OpenFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

/// Parameters for one open attempt.
///
/// Built once before the first attempt; password retries only replace
/// `encryption_key`.
#[derive(Debug, Clone, Default)]
pub struct OpenConfig {
    pub flags: OpenFlags,
    pub encryption_key: Option<EncryptionKey>,
}

impl OpenConfig {
    pub fn new(flags: OpenFlags) -> Self {
        Self {
            flags,
            encryption_key: None,
        }
    }

    pub fn with_key(mut self, key: EncryptionKey) -> Self {
        self.encryption_key = Some(key);
        self
    }
}

/// Opens database handles.
pub trait Engine {
    /// Attempt to open the database at `path`.
    fn open(&self, path: &Path, config: &OpenConfig) -> Result<Database, StoreError>;
}

/// The file-backed engine.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileEngine;

impl Engine for FileEngine {
    fn open(&self, path: &Path, config: &OpenConfig) -> Result<Database, StoreError> {
        Database::open(path, config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn database_path_requires_exact_suffix() {
        assert!(is_database_path("mydata.cblite2"));
        assert!(is_database_path("/tmp/dir/mydata.cblite2"));
        assert!(is_database_path("dir/mydata.cblite2/"));
        assert!(!is_database_path("mydata.cblite20"));
        assert!(!is_database_path("mydata.CBLITE2"));
        assert!(!is_database_path("mydata.cblite2/inner"));
        assert!(!is_database_path("ls"));
        assert!(!is_database_path(""));
    }

    #[test]
    fn default_flags_are_read_only() {
        let flags = OpenFlags::default();
        assert!(flags.is_read_only());
        assert!(!flags.contains(OpenFlags::CREATE));
    }

    #[test]
    fn flag_set_operations() {
        let mut flags = OpenFlags::default();
        flags.insert(OpenFlags::CREATE);
        flags.remove(OpenFlags::READ_ONLY);
        assert!(flags.contains(OpenFlags::CREATE));
        assert!(flags.is_writeable());
        assert_eq!(flags, OpenFlags::CREATE | OpenFlags::NONE);
    }
}
