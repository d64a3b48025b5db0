use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};

use crate::domain::{FileKey, FileRecord, NewRecord, RecordMeta};
use crate::error::StoreError;
use crate::store::RecordStore;
use crate::util::timestamp::now_stored;

/// In-process store keyed like the SQL table. Used for `memory:` URLs and
/// as the test double for the engine and executor.
#[derive(Debug, Default)]
pub struct MemoryStore {
    rows: Mutex<BTreeMap<(String, String), FileRecord>>,
    writes: AtomicU64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a row as if another machine had pushed it.
    pub fn insert_record(&self, record: FileRecord) -> Result<(), StoreError> {
        let key = (
            record.key.scope.as_str().to_string(),
            record.key.relative_path.clone(),
        );
        self.lock()?.insert(key, record);
        Ok(())
    }

    /// Number of successful upserts since creation.
    pub fn write_count(&self) -> u64 {
        self.writes.load(Ordering::SeqCst)
    }

    pub fn len(&self) -> usize {
        self.lock().map(|rows| rows.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> Result<MutexGuard<'_, BTreeMap<(String, String), FileRecord>>, StoreError> {
        self.rows
            .lock()
            .map_err(|e| StoreError::backend("lock memory store", e))
    }
}

impl RecordStore for MemoryStore {
    fn init_schema(&self) -> Result<(), StoreError> {
        Ok(())
    }

    fn get(&self, key: &FileKey) -> Result<Option<FileRecord>, StoreError> {
        let rows = self.lock()?;
        Ok(rows
            .get(&(key.scope.as_str().to_string(), key.relative_path.clone()))
            .cloned())
    }

    fn upsert(&self, record: &NewRecord) -> Result<(), StoreError> {
        let now = now_stored()?;
        let mut rows = self.lock()?;
        let slot = (
            record.key.scope.as_str().to_string(),
            record.key.relative_path.clone(),
        );
        let created_at = rows
            .get(&slot)
            .map(|r| r.created_at.clone())
            .unwrap_or_else(|| now.clone());
        rows.insert(
            slot,
            FileRecord {
                key: record.key.clone(),
                encoded_blob: record.encoded_blob.clone(),
                content_hash: record.content_hash.clone(),
                content_modified_at: record.content_modified_at.clone(),
                created_at,
                updated_at: now,
            },
        );
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn list(&self) -> Result<Vec<RecordMeta>, StoreError> {
        Ok(self.lock()?.values().map(RecordMeta::from).collect())
    }
}
