//! Per-file reconciliation: what to do ([`decide`]) and doing it
//! ([`engine::Reconciler`]).

pub mod engine;
pub mod local;

use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};

use crate::domain::{FileRecord, LocalFile};
use crate::error::StoreError;
use crate::util::timestamp::parse_stored;

/// Filesystem mtime granularity differs between platforms and the stored
/// format keeps whole seconds.
pub const MTIME_TOLERANCE: Duration = Duration::SECOND;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    /// Push local content.
    Upload,
    /// Pull remote content over the local file.
    Download,
    /// Content identical.
    Skip,
    /// Content differs but the timestamps are within tolerance; local wins.
    UploadConflict,
}

impl Action {
    pub fn writes_remote(self) -> bool {
        matches!(self, Action::Upload | Action::UploadConflict)
    }
}

/// Decide from hashes first, then modification times.
///
/// The stored timestamp is only parsed when the hashes differ, so a record
/// with an unreadable timestamp can still be skipped.
pub fn decide(local: &LocalFile, remote: Option<&FileRecord>) -> Result<Action, StoreError> {
    let Some(remote) = remote else {
        return Ok(Action::Upload);
    };
    if local.content_hash == remote.content_hash {
        return Ok(Action::Skip);
    }
    let remote_mtime = parse_stored(&remote.content_modified_at)?;
    Ok(arbitrate(local.modified_at, remote_mtime))
}

/// Timestamp arbitration for differing content.
pub fn arbitrate(local: OffsetDateTime, remote: OffsetDateTime) -> Action {
    let diff = local - remote;
    if diff > MTIME_TOLERANCE {
        Action::Upload
    } else if diff < -MTIME_TOLERANCE {
        Action::Download
    } else {
        Action::UploadConflict
    }
}
