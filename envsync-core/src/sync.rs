use std::path::PathBuf;
use std::time::Instant;

use tracing::info;

use crate::candidates::CandidateList;
use crate::codec::Codec;
use crate::config::SyncSettings;
use crate::error::{Result, SyncError};
use crate::executor::Executor;
use crate::policy::Policy;
use crate::reconcile::engine::Reconciler;
use crate::report::{ResultSink, RunReport, Timings};
use crate::store::RecordStore;
use crate::store_factory::{open_store_url, redact};

/// Candidate list for `settings`; empty is an error since there is nothing
/// to dispatch.
pub fn load_candidates(settings: &SyncSettings) -> Result<Vec<PathBuf>> {
    let list = CandidateList::load(&settings.candidates_path())?;
    if list.is_empty() {
        return Err(SyncError::NoCandidates);
    }
    Ok(list.files)
}

/// Full run: load candidates, connect, bootstrap schema, dispatch.
pub fn run_sync(
    settings: &SyncSettings,
    policy: Policy,
    codec: &Codec,
    sink: &mut dyn ResultSink,
) -> Result<RunReport> {
    let started = Instant::now();
    let files = load_candidates(settings)?;

    let connecting = Instant::now();
    let store = open_store_url(&settings.database_url)?;
    let connect_ms = Timings::ms(connecting.elapsed());
    info!(db = %redact(&settings.database_url), connect_ms, "connected");
    store.init_schema()?;

    let mut report = sync_files(store.as_ref(), &files, settings, policy, codec, sink)?;
    report.timings.connect_ms = connect_ms;
    report.timings.total_ms = Timings::ms(started.elapsed());
    Ok(report)
}

/// Dispatch `files` against an already initialised store.
pub fn sync_files(
    store: &dyn RecordStore,
    files: &[PathBuf],
    settings: &SyncSettings,
    policy: Policy,
    codec: &Codec,
    sink: &mut dyn ResultSink,
) -> Result<RunReport> {
    let reconciler = Reconciler::new(store, codec, &settings.password, &settings.base, policy);
    Executor::new(settings.workers).run(&reconciler, files, sink)
}
