//! store::schema
//!
//! On-disk representation of a database directory's `db.json`.
//!
//! The file holds a header and every document (live and deleted), keyed by
//! document ID in sorted order.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};
use uuid::Uuid;

/// Current format version written to new databases.
pub const FORMAT_VERSION: u32 = 1;

/// Name of the data file inside a database directory.
pub const DATA_FILE: &str = "db.json";

/// Database header.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Header {
    pub format: u32,
    pub uuid: Uuid,
    pub last_sequence: u64,
    /// Fingerprint of the key the database is sealed with, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_fingerprint: Option<String>,
}

/// A stored document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Revision IDs, newest first. Never empty.
    pub revs: Vec<String>,
    #[serde(default)]
    pub deleted: bool,
    pub sequence: u64,
    pub updated: DateTime<Utc>,
    #[serde(default)]
    pub body: Map<String, Value>,
}

impl Document {
    /// The current revision ID.
    pub fn rev_id(&self) -> &str {
        self.revs.first().map(String::as_str).unwrap_or_default()
    }

    /// Generation number of the current revision.
    pub fn generation(&self) -> usize {
        self.revs.len()
    }
}

/// Entire contents of `db.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contents {
    pub header: Header,
    #[serde(default)]
    pub documents: BTreeMap<String, Document>,
}

impl Contents {
    /// Fresh, empty contents for a newly created database.
    pub fn new(key_fingerprint: Option<String>) -> Self {
        Self {
            header: Header {
                format: FORMAT_VERSION,
                uuid: Uuid::new_v4(),
                last_sequence: 0,
                key_fingerprint,
            },
            documents: BTreeMap::new(),
        }
    }
}

/// Compute the next revision ID for a document.
///
/// The ID is `<generation>-<digest>`, where the digest covers the parent
/// revision, the deletion state and the body.
pub fn next_rev_id(parent: Option<&str>, deleted: bool, body: &Map<String, Value>) -> String {
    let generation = parent
        .and_then(|rev| rev.split_once('-'))
        .and_then(|(gen, _)| gen.parse::<u64>().ok())
        .unwrap_or(0)
        + 1;

    let mut hasher = Sha256::new();
    hasher.update(parent.unwrap_or_default().as_bytes());
    hasher.update([u8::from(deleted)]);
    hasher.update(Value::Object(body.clone()).to_string().as_bytes());
    let digest = hex::encode(hasher.finalize());

    format!("{}-{}", generation, &digest[..20])
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn body(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("not an object"),
        }
    }

    #[test]
    fn first_revision_is_generation_one() {
        let rev = next_rev_id(None, false, &body(json!({"a": 1})));
        assert!(rev.starts_with("1-"));
        assert_eq!(rev.len(), 22);
    }

    #[test]
    fn generation_follows_parent() {
        let rev = next_rev_id(Some("7-abcdef"), false, &body(json!({})));
        assert!(rev.starts_with("8-"));
    }

    #[test]
    fn deletion_changes_digest() {
        let b = body(json!({"a": 1}));
        assert_ne!(
            next_rev_id(Some("1-x"), false, &b),
            next_rev_id(Some("1-x"), true, &b)
        );
    }

    #[test]
    fn contents_roundtrip_through_json() {
        let contents = Contents::new(Some("abc".into()));
        let text = serde_json::to_string(&contents).unwrap();
        let parsed: Contents = serde_json::from_str(&text).unwrap();
        assert_eq!(contents, parsed);
    }
}
