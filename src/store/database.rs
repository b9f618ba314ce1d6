//! store::database
//!
//! An open database handle.
//!
//! # Invariants
//!
//! - A handle holds the directory lock for its whole lifetime
//! - Every mutation is persisted before it returns (write temp file, rename)
//! - A mutation whose write fails leaves the in-memory contents untouched
//! - Read-only handles reject every mutation with [`StoreError::ReadOnly`]

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;
use serde_json::{Map, Value};
use tracing::debug;
use uuid::Uuid;

use super::lock::{LockMode, StoreLock};
use super::schema::{self, Contents, Document, DATA_FILE};
use super::{EncryptionKey, OpenConfig, OpenFlags, StoreError};

/// How `put` treats an existing document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PutMode {
    /// Create or update.
    #[default]
    Upsert,
    /// Fail if the document already exists.
    CreateOnly,
    /// Fail if the document doesn't exist.
    UpdateOnly,
}

/// Result of [`Database::compact`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CompactStats {
    pub purged_documents: usize,
    pub pruned_revisions: usize,
}

/// An open database.
#[derive(Debug)]
pub struct Database {
    path: PathBuf,
    flags: OpenFlags,
    contents: Contents,
    lock: StoreLock,
}

impl Database {
    /// Open (or create) the database directory at `path`.
    pub(crate) fn open(path: &Path, config: &OpenConfig) -> Result<Self, StoreError> {
        let create = config.flags.contains(OpenFlags::CREATE);
        let fingerprint = config.encryption_key.as_ref().map(EncryptionKey::fingerprint);

        match fs::metadata(path) {
            Ok(meta) if !meta.is_dir() => {
                return Err(StoreError::Corrupt(format!(
                    "{} is not a database directory",
                    path.display()
                )));
            }
            Ok(_) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                if !create {
                    return Err(StoreError::NotFound(path.to_path_buf()));
                }
                debug!(path = %path.display(), "creating database directory");
                fs::create_dir_all(path).map_err(|e| StoreError::io(path, e))?;
            }
            Err(e) => return Err(StoreError::io(path, e)),
        }

        let mode = if config.flags.is_read_only() {
            LockMode::Shared
        } else {
            LockMode::Exclusive
        };
        let lock = StoreLock::acquire(path, mode)?;

        let data_path = path.join(DATA_FILE);
        let contents = if data_path.exists() {
            let text = fs::read_to_string(&data_path).map_err(|e| StoreError::io(&data_path, e))?;
            serde_json::from_str::<Contents>(&text)
                .map_err(|e| StoreError::Corrupt(format!("{}: {}", data_path.display(), e)))?
        } else if create {
            let contents = Contents::new(fingerprint.clone());
            write_contents(path, &contents)?;
            contents
        } else {
            return Err(StoreError::NotADatabase);
        };

        if contents.header.format > schema::FORMAT_VERSION {
            return Err(StoreError::Corrupt(format!(
                "unsupported format version {}",
                contents.header.format
            )));
        }

        if contents.header.key_fingerprint != fingerprint {
            return Err(StoreError::NotADatabase);
        }

        debug!(
            path = %path.display(),
            read_only = config.flags.is_read_only(),
            encrypted = fingerprint.is_some(),
            "opened database"
        );

        Ok(Self {
            path: path.to_path_buf(),
            flags: config.flags,
            contents,
            lock,
        })
    }

    /// Close the handle, releasing the lock.
    pub fn close(mut self) -> Result<(), StoreError> {
        debug!(path = %self.path.display(), "closing database");
        self.lock.release()?;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn flags(&self) -> OpenFlags {
        self.flags
    }

    pub fn is_read_only(&self) -> bool {
        self.flags.is_read_only()
    }

    pub fn is_encrypted(&self) -> bool {
        self.contents.header.key_fingerprint.is_some()
    }

    pub fn uuid(&self) -> Uuid {
        self.contents.header.uuid
    }

    pub fn last_sequence(&self) -> u64 {
        self.contents.header.last_sequence
    }

    /// Number of live (non-deleted) documents.
    pub fn document_count(&self) -> usize {
        self.contents.documents.values().filter(|d| !d.deleted).count()
    }

    /// Look up a document, including deleted ones.
    pub fn get(&self, id: &str) -> Option<&Document> {
        self.contents.documents.get(id)
    }

    /// All documents in ID order, including deleted ones.
    pub fn documents(&self) -> impl DoubleEndedIterator<Item = (&str, &Document)> {
        self.contents.documents.iter().map(|(id, doc)| (id.as_str(), doc))
    }

    /// Total size of the database files in bytes.
    pub fn size_on_disk(&self) -> u64 {
        fs::read_dir(&self.path)
            .map(|entries| {
                entries
                    .filter_map(Result::ok)
                    .filter_map(|e| e.metadata().ok())
                    .filter(|m| m.is_file())
                    .map(|m| m.len())
                    .sum()
            })
            .unwrap_or(0)
    }

    /// Create or update a document, returning its new revision ID.
    pub fn put(
        &mut self,
        id: &str,
        body: Map<String, Value>,
        mode: PutMode,
    ) -> Result<String, StoreError> {
        self.check_writeable()?;
        if id.is_empty() {
            return Err(StoreError::InvalidDocument("document ID is empty".into()));
        }

        let live = self.get(id).filter(|d| !d.deleted);
        match (mode, live) {
            (PutMode::CreateOnly, Some(_)) => {
                return Err(StoreError::Conflict(format!("document '{}' already exists", id)));
            }
            (PutMode::UpdateOnly, None) => {
                return Err(StoreError::DocumentNotFound(id.to_string()));
            }
            _ => {}
        }

        self.write_revision(id, body, false)
    }

    /// Delete a document, leaving a tombstone. Returns the tombstone's revision.
    pub fn delete(&mut self, id: &str) -> Result<String, StoreError> {
        self.check_writeable()?;
        match self.get(id) {
            Some(doc) if !doc.deleted => {}
            _ => return Err(StoreError::DocumentNotFound(id.to_string())),
        }
        self.write_revision(id, Map::new(), true)
    }

    /// Remove tombstones and trim every revision history to its current revision.
    pub fn compact(&mut self) -> Result<CompactStats, StoreError> {
        self.check_writeable()?;
        let mut staged = self.contents.clone();
        let mut stats = CompactStats::default();

        let before = staged.documents.len();
        staged.documents.retain(|_, doc| !doc.deleted);
        stats.purged_documents = before - staged.documents.len();

        for doc in staged.documents.values_mut() {
            stats.pruned_revisions += doc.revs.len().saturating_sub(1);
            doc.revs.truncate(1);
        }

        self.commit(staged)?;
        debug!(?stats, "compacted database");
        Ok(stats)
    }

    /// Seal the database with a new key, or remove the key with `None`.
    pub fn rekey(&mut self, key: Option<&EncryptionKey>) -> Result<(), StoreError> {
        self.check_writeable()?;
        let mut staged = self.contents.clone();
        staged.header.key_fingerprint = key.map(EncryptionKey::fingerprint);
        self.commit(staged)
    }

    fn write_revision(
        &mut self,
        id: &str,
        body: Map<String, Value>,
        deleted: bool,
    ) -> Result<String, StoreError> {
        let mut staged = self.contents.clone();
        let sequence = staged.header.last_sequence + 1;
        let mut revs = staged
            .documents
            .get(id)
            .map(|d| d.revs.clone())
            .unwrap_or_default();
        let rev = schema::next_rev_id(revs.first().map(String::as_str), deleted, &body);
        revs.insert(0, rev.clone());

        staged.documents.insert(
            id.to_string(),
            Document {
                revs,
                deleted,
                sequence,
                updated: Utc::now(),
                body,
            },
        );
        staged.header.last_sequence = sequence;
        self.commit(staged)?;
        Ok(rev)
    }

    fn check_writeable(&self) -> Result<(), StoreError> {
        if self.is_read_only() {
            Err(StoreError::ReadOnly)
        } else {
            Ok(())
        }
    }

    /// Persist `staged`, then adopt it. A failed write leaves the handle as it was.
    fn commit(&mut self, staged: Contents) -> Result<(), StoreError> {
        write_contents(&self.path, &staged)?;
        self.contents = staged;
        Ok(())
    }
}

fn write_contents(dir: &Path, contents: &Contents) -> Result<(), StoreError> {
    let data_path = dir.join(DATA_FILE);
    let tmp_path = dir.join(format!("{}.tmp", DATA_FILE));
    let text = serde_json::to_string_pretty(contents)
        .map_err(|e| StoreError::Corrupt(format!("cannot serialize database: {}", e)))?;
    fs::write(&tmp_path, text).map_err(|e| StoreError::io(&tmp_path, e))?;
    fs::rename(&tmp_path, &data_path).map_err(|e| StoreError::io(&data_path, e))?;
    Ok(())
}
