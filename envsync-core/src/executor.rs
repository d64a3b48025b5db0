use std::path::PathBuf;
use std::sync::mpsc;
use std::thread;
use std::time::Instant;

use rayon::prelude::*;
use tracing::{debug, info};

use crate::error::{Result, SyncError};
use crate::reconcile::engine::Reconciler;
use crate::report::{FileFailure, FileResult, ResultSink, RunReport, RunStart, Timings};
use crate::stats::RunCounters;

pub const DEFAULT_WORKERS: usize = 10;

/// At least one worker, never more than there are files.
pub fn clamp_workers(requested: usize, files: usize) -> usize {
    requested.clamp(1, files.max(1))
}

/// Fans a file list out over a fixed pool. Workers pull from one shared
/// iterator; results funnel through a channel to a single collector that owns
/// the sink.
#[derive(Clone, Copy, Debug)]
pub struct Executor {
    workers: usize,
}

impl Default for Executor {
    fn default() -> Self {
        Self::new(DEFAULT_WORKERS)
    }
}

impl Executor {
    pub fn new(workers: usize) -> Self {
        Self { workers }
    }

    pub fn run(
        &self,
        reconciler: &Reconciler<'_>,
        files: &[PathBuf],
        sink: &mut dyn ResultSink,
    ) -> Result<RunReport> {
        let workers = clamp_workers(self.workers, files.len());
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("envsync-worker-{i}"))
            .build()
            .map_err(|e| SyncError::Pool(e.to_string()))?;

        info!(files = files.len(), workers, "dispatching");
        sink.begin(&RunStart {
            files: files.len(),
            workers,
            policy: reconciler.policy(),
        });
        let counters = RunCounters::default();
        let started = Instant::now();
        let (tx, rx) = mpsc::channel::<FileResult>();

        let (errors, results) = thread::scope(|scope| {
            let collector = scope.spawn(move || {
                let mut errors = 0u64;
                let mut results = Vec::new();
                for result in rx {
                    if result.is_failure() {
                        errors += 1;
                    }
                    sink.accept(&result);
                    results.push(result);
                }
                (errors, results)
            });

            pool.install(|| {
                files
                    .iter()
                    .par_bridge()
                    .for_each_with(tx, |tx, path| {
                        let result = match reconciler.reconcile(path) {
                            Ok(outcome) => {
                                counters.record(outcome.action);
                                FileResult::Done(outcome)
                            }
                            Err(err) => {
                                debug!(path = %path.display(), error = %err, "file failed");
                                FileResult::Failed(FileFailure::new(path, &err))
                            }
                        };
                        // Only fails if the collector is gone, which means it panicked.
                        let _ = tx.send(result);
                    });
            });

            collector
                .join()
                .map_err(|_| SyncError::Pool("result collector panicked".to_string()))
        })?;

        let elapsed = Timings::ms(started.elapsed());
        let stats = counters.snapshot(errors);
        info!(?stats, elapsed_ms = elapsed, "run finished");
        Ok(RunReport {
            files: files.len(),
            workers,
            dry_run: reconciler.policy().dry_run,
            stats,
            timings: Timings {
                connect_ms: 0,
                sync_ms: elapsed,
                total_ms: elapsed,
            },
            results,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(10, 3, 3)]
    #[case(0, 3, 1)]
    #[case(4, 100, 4)]
    #[case(10, 0, 1)]
    fn clamps(#[case] requested: usize, #[case] files: usize, #[case] want: usize) {
        assert_eq!(clamp_workers(requested, files), want);
    }
}
