// envsync_core/src/store.rs
use crate::domain::{FileKey, FileRecord, NewRecord, RecordMeta};
use crate::error::StoreError;

pub const TABLE: &str = "env_files";

pub const CREATE_TABLE: &str = "CREATE TABLE IF NOT EXISTS env_files (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    repo_id TEXT NOT NULL,
    relative_path TEXT NOT NULL,
    contents TEXT NOT NULL,
    file_hash TEXT NOT NULL,
    file_modified_at DATETIME NOT NULL,
    created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
    updated_at DATETIME DEFAULT CURRENT_TIMESTAMP,
    UNIQUE(repo_id, relative_path)
)";

pub const CREATE_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS idx_env_files_repo_id ON env_files(repo_id)";

/// Remote record storage. Implementations are shared by every worker of a
/// run and must tolerate concurrent calls.
pub trait RecordStore: Send + Sync {
    /// Idempotent schema bootstrap; called once before any reconciliation.
    fn init_schema(&self) -> Result<(), StoreError>;

    fn get(&self, key: &FileKey) -> Result<Option<FileRecord>, StoreError>;

    /// Insert, or overwrite every mutable column of the existing row and
    /// refresh `updated_at`.
    fn upsert(&self, record: &NewRecord) -> Result<(), StoreError>;

    /// All records without blobs, ordered by scope then relative path.
    fn list(&self) -> Result<Vec<RecordMeta>, StoreError>;
}
