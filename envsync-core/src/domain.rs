use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Stored scope for files outside any tracked repository.
pub const LOCAL_SCOPE: &str = "__local__";

/// First half of a synced file's identity.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum ScopeKey {
    /// Normalized `host/owner/repo` of the repository's origin remote.
    Remote(String),
    /// Not in a repository; the path is relative to the caller's base dir.
    Local,
}

impl ScopeKey {
    pub fn as_str(&self) -> &str {
        match self {
            ScopeKey::Remote(id) => id,
            ScopeKey::Local => LOCAL_SCOPE,
        }
    }

    pub fn from_stored(s: &str) -> Self {
        if s == LOCAL_SCOPE {
            ScopeKey::Local
        } else {
            ScopeKey::Remote(s.to_string())
        }
    }

    /// `[local]` or `owner/repo` for human output.
    pub fn short(&self) -> String {
        match self {
            ScopeKey::Local => "[local]".to_string(),
            ScopeKey::Remote(id) => {
                let parts: Vec<&str> = id.split('/').collect();
                if parts.len() >= 3 {
                    parts[1..].join("/")
                } else {
                    id.clone()
                }
            }
        }
    }
}

impl fmt::Display for ScopeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for ScopeKey {
    fn from(s: String) -> Self {
        ScopeKey::from_stored(&s)
    }
}

impl From<ScopeKey> for String {
    fn from(k: ScopeKey) -> Self {
        k.as_str().to_string()
    }
}

/// `(scope, relative_path)`: the unique identity of a synced file.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FileKey {
    pub scope: ScopeKey,
    /// Forward-slash separated, relative to the repository root or base dir.
    pub relative_path: String,
}

impl FileKey {
    pub fn new(scope: ScopeKey, relative_path: impl Into<String>) -> Self {
        Self {
            scope,
            relative_path: relative_path.into(),
        }
    }

    pub fn display_name(&self) -> String {
        format!("{} ({})", self.relative_path, self.scope.short())
    }
}

/// A row of the remote store.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FileRecord {
    pub key: FileKey,
    pub encoded_blob: String,
    pub content_hash: String,
    /// Source file mtime at the last push, as stored.
    pub content_modified_at: String,
    pub created_at: String,
    pub updated_at: String,
}

/// A row of the remote store without its blob.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordMeta {
    pub key: FileKey,
    pub content_hash: String,
    pub content_modified_at: String,
    pub created_at: String,
    pub updated_at: String,
}

impl From<&FileRecord> for RecordMeta {
    fn from(r: &FileRecord) -> Self {
        Self {
            key: r.key.clone(),
            content_hash: r.content_hash.clone(),
            content_modified_at: r.content_modified_at.clone(),
            created_at: r.created_at.clone(),
            updated_at: r.updated_at.clone(),
        }
    }
}

/// Values written by an upsert.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewRecord {
    pub key: FileKey,
    pub encoded_blob: String,
    pub content_hash: String,
    pub content_modified_at: String,
}

/// A candidate file as read from disk for one reconciliation pass.
#[derive(Clone, Debug)]
pub struct LocalFile {
    pub absolute_path: PathBuf,
    pub key: FileKey,
    pub plaintext: Vec<u8>,
    pub content_hash: String,
    pub modified_at: OffsetDateTime,
}
