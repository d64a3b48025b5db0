use std::fmt::Write as _;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Serialize;

use crate::error::{ErrorKind, SyncError};
use crate::policy::{Direction, Policy};
use crate::reconcile::engine::FileOutcome;
use crate::stats::Stats;

const RULE_WIDTH: usize = 50;

/// A file that could not be reconciled this run.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FileFailure {
    pub path: PathBuf,
    pub kind: ErrorKind,
    pub message: String,
}

impl FileFailure {
    pub fn new(path: &Path, err: &SyncError) -> Self {
        Self {
            path: path.to_path_buf(),
            kind: err.kind(),
            message: err.to_string(),
        }
    }

    pub fn message(&self) -> String {
        format!("✗ Error syncing {}: {}", self.path.display(), self.message)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FileResult {
    Done(FileOutcome),
    Failed(FileFailure),
}

impl FileResult {
    pub fn line(&self) -> String {
        match self {
            FileResult::Done(o) => o.message(),
            FileResult::Failed(f) => f.message(),
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, FileResult::Failed(_))
    }
}

/// Announced once before the first file is dispatched.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RunStart {
    pub files: usize,
    pub workers: usize,
    pub policy: Policy,
}

/// Receives per-file results from the collector, one at a time and in
/// completion order.
pub trait ResultSink: Send {
    fn begin(&mut self, _start: &RunStart) {}

    fn accept(&mut self, result: &FileResult);
}

/// Prints one line per result.
pub struct ConsoleSink<W: Write + Send> {
    out: W,
}

impl<W: Write + Send> ConsoleSink<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }
}

impl ConsoleSink<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write + Send> ResultSink for ConsoleSink<W> {
    fn begin(&mut self, start: &RunStart) {
        let verb = match start.policy.direction {
            Direction::Reconcile => "Syncing",
            Direction::ForcePush => "Uploading",
        };
        if start.policy.dry_run {
            let _ = writeln!(self.out, "DRY RUN MODE - No changes will be made");
        }
        let _ = writeln!(
            self.out,
            "{verb} {} .env file(s) with {} workers...\n",
            start.files, start.workers
        );
    }

    fn accept(&mut self, result: &FileResult) {
        // A closed stdout must not take the run down with it.
        let _ = writeln!(self.out, "{}", result.line());
        let _ = self.out.flush();
    }
}

/// Drops every line; used when only the final report is printed.
#[derive(Debug, Default)]
pub struct Discard;

impl ResultSink for Discard {
    fn accept(&mut self, _result: &FileResult) {}
}

impl ResultSink for Vec<FileResult> {
    fn accept(&mut self, result: &FileResult) {
        self.push(result.clone());
    }
}

/// Wall-clock phases of a run, in milliseconds.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Timings {
    pub connect_ms: u64,
    pub sync_ms: u64,
    pub total_ms: u64,
}

impl Timings {
    pub fn ms(d: Duration) -> u64 {
        u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
    }
}

/// How a finished run should be judged by the caller.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    /// No file failed.
    Clean,
    /// Some files failed, at least one succeeded.
    Partial,
    /// Every file failed.
    Failed,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RunReport {
    pub files: usize,
    pub workers: usize,
    pub dry_run: bool,
    pub stats: Stats,
    pub timings: Timings,
    /// Completion order.
    pub results: Vec<FileResult>,
}

impl RunReport {
    pub fn failures(&self) -> impl Iterator<Item = &FileFailure> {
        self.results.iter().filter_map(|r| match r {
            FileResult::Failed(f) => Some(f),
            FileResult::Done(_) => None,
        })
    }

    pub fn status(&self) -> RunStatus {
        match (self.stats.errors, self.stats.succeeded()) {
            (0, _) => RunStatus::Clean,
            (_, 0) => RunStatus::Failed,
            _ => RunStatus::Partial,
        }
    }

    /// Store errors on at least half of the files (and at least three)
    /// usually mean the backend itself is down.
    pub fn backend_suspect(&self) -> bool {
        let store_errors = self
            .failures()
            .filter(|f| f.kind == ErrorKind::Store)
            .count();
        store_errors >= 3 && store_errors * 2 >= self.files
    }

    pub fn authentication_failures(&self) -> usize {
        self.failures()
            .filter(|f| f.kind == ErrorKind::Authentication)
            .count()
    }

    pub fn render_summary(&self) -> String {
        let s = &self.stats;
        let rule = "-".repeat(RULE_WIDTH);
        let mut out = String::new();
        let _ = writeln!(out, "\n{rule}");
        if self.dry_run {
            let _ = writeln!(out, "Dry Run Summary (no changes made):");
        } else {
            let _ = writeln!(out, "Sync Summary:");
        }
        let _ = writeln!(out, "  ↑ Uploaded (local newer):   {}", s.uploaded);
        let _ = writeln!(out, "  ↓ Downloaded (remote newer): {}", s.downloaded);
        let _ = writeln!(out, "  = Skipped (same):           {}", s.skipped);
        if s.conflicted > 0 {
            let _ = writeln!(out, "  ⚠ Conflicts:                {}", s.conflicted);
        }
        if s.errors > 0 {
            let _ = writeln!(out, "  ✗ Errors:                   {}", s.errors);
        }
        let _ = writeln!(out, "{rule}");
        if self.backend_suspect() {
            let _ = writeln!(
                out,
                "\n!!! {} of {} files failed with store errors: the database may be unreachable",
                self.failures().filter(|f| f.kind == ErrorKind::Store).count(),
                self.files
            );
        }
        let auth = self.authentication_failures();
        if auth > 0 {
            let _ = writeln!(
                out,
                "\n{auth} file(s) could not be decrypted: check that the password matches the one used to upload"
            );
        }
        out
    }

    pub fn render_performance(&self) -> String {
        let t = &self.timings;
        let mut out = String::new();
        let _ = writeln!(out, "\nPerformance:");
        let _ = writeln!(out, "  Total files:      {}", self.files);
        let _ = writeln!(out, "  Workers used:     {}", self.workers);
        let _ = writeln!(out, "  DB connect time:  {}ms", t.connect_ms);
        let _ = writeln!(out, "  Sync time:        {}ms", t.sync_ms);
        let _ = writeln!(out, "  Total time:       {}ms", t.total_ms);
        if t.sync_ms > 0 {
            let rate = self.files as f64 / (t.sync_ms as f64 / 1000.0);
            let _ = writeln!(out, "  Throughput:       {rate:.1} files/sec");
        }
        out
    }
}
