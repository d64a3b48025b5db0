//! Whole-store restore into a directory tree.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, warn};

use crate::codec::Codec;
use crate::domain::{FileKey, RecordMeta};
use crate::error::{Result, StoreError, SyncError};
use crate::reconcile::engine::write_restored;
use crate::store::RecordStore;
use crate::util::paths::safe_join;
use crate::util::timestamp::parse_stored;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RestoreEntry {
    Restored {
        key: FileKey,
        path: PathBuf,
        #[serde(skip_serializing_if = "Option::is_none")]
        note: Option<String>,
    },
    Skipped {
        key: FileKey,
        reason: String,
    },
}

impl RestoreEntry {
    pub fn line(&self) -> String {
        match self {
            RestoreEntry::Restored { path, note: None, .. } => {
                format!("✓ Downloaded: {}", path.display())
            }
            RestoreEntry::Restored {
                path,
                note: Some(note),
                ..
            } => format!("✓ Downloaded: {} (warning: {note})", path.display()),
            RestoreEntry::Skipped { key, reason } => {
                format!("Warning: {}: {reason}", key.display_name())
            }
        }
    }
}

/// `out/<scope short>/<relative_path>`; `None` if the stored path would
/// escape `out`.
pub fn restore_path(out: &Path, key: &FileKey) -> Option<PathBuf> {
    safe_join(out, &format!("{}/{}", key.scope.short(), key.relative_path))
}

/// Decrypt every record into `out`. Per-file trouble becomes a `Skipped`
/// entry; only listing the store is fatal.
///
/// Scopes that differ only by host share a destination; the first record
/// restored there keeps it and later ones are skipped.
pub fn restore_all(
    store: &dyn RecordStore,
    codec: &Codec,
    password: &str,
    out: &Path,
) -> Result<Vec<RestoreEntry>> {
    let records = store.list()?;
    debug!(count = records.len(), out = %out.display(), "restoring");
    let mut claimed: HashMap<PathBuf, FileKey> = HashMap::new();
    Ok(records
        .iter()
        .map(|meta| {
            restore_one(store, codec, password, out, meta, &mut claimed).unwrap_or_else(|err| {
                warn!(file = %meta.key.display_name(), error = %err, "restore skipped");
                RestoreEntry::Skipped {
                    key: meta.key.clone(),
                    reason: err.to_string(),
                }
            })
        })
        .collect())
}

fn restore_one(
    store: &dyn RecordStore,
    codec: &Codec,
    password: &str,
    out: &Path,
    meta: &RecordMeta,
    claimed: &mut HashMap<PathBuf, FileKey>,
) -> Result<RestoreEntry> {
    let dest = restore_path(out, &meta.key).ok_or_else(|| SyncError::Resolution {
        path: PathBuf::from(&meta.key.relative_path),
        reason: "stored path escapes the output directory".to_string(),
    })?;
    if let Some(owner) = claimed.get(&dest) {
        return Err(SyncError::Resolution {
            path: dest.clone(),
            reason: format!("already restored from {}", owner.scope),
        });
    }
    let record = store.get(&meta.key)?.ok_or_else(|| {
        SyncError::Store(StoreError::backend("read record", "record disappeared"))
    })?;
    let plaintext = codec.decode(&record.encoded_blob, password)?;
    let mtime = parse_stored(&record.content_modified_at)?;
    if let Some(dir) = dest.parent() {
        fs::create_dir_all(dir).map_err(|e| SyncError::local_io("create directory", dir, e))?;
    }
    let note = write_restored(&dest, &plaintext, mtime)?;
    claimed.insert(dest.clone(), meta.key.clone());
    Ok(RestoreEntry::Restored {
        key: meta.key.clone(),
        path: dest,
        note,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ScopeKey;

    #[test]
    fn restore_layout() {
        let out = Path::new("/restore");
        let k = FileKey::new(ScopeKey::Remote("github.com/acme/api".into()), "svc/.env");
        assert_eq!(
            restore_path(out, &k),
            Some(PathBuf::from("/restore/acme/api/svc/.env"))
        );
        let local = FileKey::new(ScopeKey::Local, "proj/.env");
        assert_eq!(
            restore_path(out, &local),
            Some(PathBuf::from("/restore/[local]/proj/.env"))
        );
        let evil = FileKey::new(ScopeKey::Local, "../../etc/passwd");
        assert_eq!(restore_path(out, &evil), None);
    }
}
