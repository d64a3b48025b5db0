use std::fmt::Display;
use std::future::Future;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use envsync_core::error::{Result, SyncError};
use envsync_core::store_factory::redact;
use envsync_core::util::timestamp::now_stored;
use envsync_core::{Policy, SyncSettings};
use tokio::time::{Instant, MissedTickBehavior, interval_at};
use tracing::{error, info};

use super::handlers::{Context, run_and_report};
use crate::presentation::cli::RunArgs;

fn stamp() -> String {
    now_stored().unwrap_or_default()
}

/// Resolves on SIGINT or SIGTERM with the signal's name.
async fn shutdown_signal() -> &'static str {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut term) => tokio::select! {
                _ = tokio::signal::ctrl_c() => "SIGINT",
                _ = term.recv() => "SIGTERM",
            },
            Err(_) => {
                let _ = tokio::signal::ctrl_c().await;
                "SIGINT"
            }
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
        "ctrl-c"
    }
}

/// One sync on the blocking pool.
async fn sync_once(ctx: Arc<Context>, settings: Arc<SyncSettings>) -> Result<()> {
    let report =
        tokio::task::spawn_blocking(move || run_and_report(&ctx, &settings, Policy::reconcile()))
            .await
            .map_err(|e| SyncError::Pool(format!("sync task aborted: {e}")))??;
    info!(status = ?report.status(), stats = ?report.stats, "sync finished");
    Ok(())
}

async fn logged<E: Display>(run: impl Future<Output = std::result::Result<(), E>>) {
    if let Err(e) = run.await {
        error!(error = %e, "sync failed");
        println!("Error during sync: {e}");
    }
}

/// Calls `sync` once right away and then every `every` until `shutdown`
/// resolves. A failed run is logged and the schedule carries on. A shutdown
/// arriving mid-run takes effect when that run returns.
pub async fn run_loop<S, F, Fut, E>(every: Duration, shutdown: S, mut sync: F)
where
    S: Future<Output = &'static str>,
    F: FnMut() -> Fut,
    Fut: Future<Output = std::result::Result<(), E>>,
    E: Display,
{
    tokio::pin!(shutdown);

    let mut ticker = interval_at(Instant::now() + every, every);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    println!("[{}] Running initial sync...", stamp());
    let mut label = "initial";
    loop {
        let run = logged(sync());
        tokio::pin!(run);
        let stopped = tokio::select! {
            _ = &mut run => false,
            sig = &mut shutdown => {
                println!("\n[{}] Received {sig}, finishing the {label} sync...", stamp());
                run.await;
                true
            }
        };
        if stopped {
            break;
        }

        println!("\n[{}] Next sync in {every:?}. Press Ctrl+C to stop.", stamp());
        tokio::select! {
            biased;
            sig = &mut shutdown => {
                println!("\n[{}] Received {sig}, shutting down...", stamp());
                break;
            }
            _ = ticker.tick() => {
                label = "scheduled";
                println!("\n[{}] Running scheduled sync...", stamp());
            }
        }
    }
}

pub fn handle_daemon(ctx: &Context, run: RunArgs, every: Duration) -> Result<ExitCode> {
    let settings = Arc::new(ctx.settings(run)?);
    let ctx = Arc::new(Context {
        state_dir: ctx.state_dir.clone(),
        json: ctx.json,
    });

    println!("env-sync daemon starting...");
    println!("  Database: {}", redact(&settings.database_url));
    println!("  Base path: {}", settings.base.display());
    println!("  Interval: {every:?}");
    println!("  Workers: {}", settings.workers);
    println!();

    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| SyncError::Pool(format!("cannot start daemon runtime: {e}")))?;

    rt.block_on(run_loop(every, shutdown_signal(), || {
        sync_once(Arc::clone(&ctx), Arc::clone(&settings))
    }));

    info!("daemon stopped");
    Ok(ExitCode::SUCCESS)
}
