use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

use crate::reconcile::Action;

/// Per-run outcome counters shared by all workers. Only ever incremented.
#[derive(Debug, Default)]
pub struct RunCounters {
    uploaded: AtomicU64,
    downloaded: AtomicU64,
    skipped: AtomicU64,
    conflicted: AtomicU64,
}

impl RunCounters {
    pub fn record(&self, action: Action) {
        let slot = match action {
            Action::Upload => &self.uploaded,
            Action::Download => &self.downloaded,
            Action::Skip => &self.skipped,
            Action::UploadConflict => &self.conflicted,
        };
        slot.fetch_add(1, Ordering::Relaxed);
    }

    /// Read after every worker has finished; `errors` comes from the collector.
    pub fn snapshot(&self, errors: u64) -> Stats {
        Stats {
            uploaded: self.uploaded.load(Ordering::Relaxed),
            downloaded: self.downloaded.load(Ordering::Relaxed),
            skipped: self.skipped.load(Ordering::Relaxed),
            conflicted: self.conflicted.load(Ordering::Relaxed),
            errors,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stats {
    pub uploaded: u64,
    pub downloaded: u64,
    pub skipped: u64,
    pub conflicted: u64,
    pub errors: u64,
}

impl Stats {
    pub fn succeeded(&self) -> u64 {
        self.uploaded + self.downloaded + self.skipped + self.conflicted
    }

    pub fn total(&self) -> u64 {
        self.succeeded() + self.errors
    }
}
