use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, warn};

use super::{Action, decide};
use crate::codec::Codec;
use crate::domain::{FileKey, FileRecord, LocalFile, NewRecord};
use crate::error::{Result, StoreError, SyncError};
use crate::identity;
use crate::policy::{Direction, Policy};
use crate::store::RecordStore;
use crate::util::timestamp::{format_stored, parse_stored, to_file_time};

/// What happened to one file.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FileOutcome {
    pub path: PathBuf,
    pub key: FileKey,
    pub action: Action,
    pub dry_run: bool,
    /// Whether a remote record existed before this pass. Unknown for forced
    /// pushes, which never read the store.
    pub remote_existed: Option<bool>,
    /// Non-fatal trouble, e.g. the mtime could not be set after a download.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl FileOutcome {
    /// Single display line for the collector.
    pub fn message(&self) -> String {
        let name = self.key.display_name();
        let mut line = match (self.action, self.remote_existed) {
            (Action::Upload, Some(false)) => format!("↑ Uploaded: {name} (new)"),
            (Action::Upload, Some(true)) => format!("↑ Uploaded: {name} (local newer)"),
            (Action::Upload, None) => format!("↑ Uploaded: {name}"),
            (Action::UploadConflict, _) => {
                format!("↑ Uploaded: {name} (content changed, timestamps similar)")
            }
            (Action::Download, _) => format!("↓ Downloaded: {name} (remote newer)"),
            (Action::Skip, _) => format!("= Skipped: {name} (identical)"),
        };
        if self.dry_run && self.action != Action::Skip {
            line.push_str(" [DRY RUN]");
        }
        if let Some(note) = &self.note {
            line.push_str(&format!(" (warning: {note})"));
        }
        line
    }
}

/// Everything one worker needs to reconcile a path. Holds borrows only, so a
/// single instance is shared by the whole pool.
pub struct Reconciler<'a> {
    store: &'a dyn RecordStore,
    codec: &'a Codec,
    password: &'a str,
    base: &'a Path,
    policy: Policy,
}

impl<'a> Reconciler<'a> {
    pub fn new(
        store: &'a dyn RecordStore,
        codec: &'a Codec,
        password: &'a str,
        base: &'a Path,
        policy: Policy,
    ) -> Self {
        Self {
            store,
            codec,
            password,
            base,
            policy,
        }
    }

    pub fn policy(&self) -> Policy {
        self.policy
    }

    /// resolve → read → decide → apply.
    pub fn reconcile(&self, path: &Path) -> Result<FileOutcome> {
        let key = identity::resolve(path, self.base)?;
        let local = LocalFile::load(path, key)?;

        if self.policy.direction == Direction::ForcePush {
            let note = self.apply(Action::Upload, &local, None)?;
            return Ok(self.outcome(local, Action::Upload, None, note));
        }

        let remote = self.store.get(&local.key)?;
        let action = decide(&local, remote.as_ref())?;
        debug!(file = %local.key.display_name(), ?action, "decided");
        let note = self.apply(action, &local, remote.as_ref())?;
        Ok(self.outcome(local, action, Some(remote.is_some()), note))
    }

    /// Perform the I/O for `action`. Dry runs return before touching the store
    /// or the disk. Returns a note for non-fatal trouble.
    pub fn apply(
        &self,
        action: Action,
        local: &LocalFile,
        remote: Option<&FileRecord>,
    ) -> Result<Option<String>> {
        if self.policy.dry_run {
            return Ok(None);
        }
        match action {
            Action::Skip => Ok(None),
            Action::Upload | Action::UploadConflict => {
                self.push(local)?;
                Ok(None)
            }
            Action::Download => match remote {
                Some(record) => self.pull(record, &local.absolute_path),
                None => {
                    Err(StoreError::backend("read record", "no remote record to download").into())
                }
            },
        }
    }

    fn push(&self, local: &LocalFile) -> Result<()> {
        let blob = self.codec.encode(&local.plaintext, self.password)?;
        self.store.upsert(&NewRecord {
            key: local.key.clone(),
            encoded_blob: blob,
            content_hash: local.content_hash.clone(),
            content_modified_at: format_stored(local.modified_at)?,
        })?;
        Ok(())
    }

    fn pull(&self, record: &FileRecord, dest: &Path) -> Result<Option<String>> {
        let mtime = parse_stored(&record.content_modified_at)?;
        let plaintext = self.codec.decode(&record.encoded_blob, self.password)?;
        write_restored(dest, &plaintext, mtime)
    }

    fn outcome(
        &self,
        local: LocalFile,
        action: Action,
        remote_existed: Option<bool>,
        note: Option<String>,
    ) -> FileOutcome {
        FileOutcome {
            path: local.absolute_path,
            key: local.key,
            action,
            dry_run: self.policy.dry_run,
            remote_existed,
            note,
        }
    }
}

/// Write decoded bytes to `dest` and stamp it with the record's mtime. A
/// failure to set times is reported as a note, not an error.
pub fn write_restored(
    dest: &Path,
    plaintext: &[u8],
    mtime: time::OffsetDateTime,
) -> Result<Option<String>> {
    fs::write(dest, plaintext).map_err(|e| SyncError::local_io("write", dest, e))?;
    let ft = to_file_time(mtime);
    match filetime::set_file_times(dest, ft, ft) {
        Ok(()) => Ok(None),
        Err(e) => {
            warn!(path = %dest.display(), error = %e, "could not set modification time");
            Ok(Some(format!("could not set modification time: {e}")))
        }
    }
}
