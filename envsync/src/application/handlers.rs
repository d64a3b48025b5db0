use std::path::PathBuf;
use std::process::ExitCode;

use envsync_core::candidates::{CANDIDATES_FILE, CandidateList};
use envsync_core::config::STATE_DIR_NAME;
use envsync_core::error::{Result, SyncError};
use envsync_core::transfer::RestoreEntry;
use envsync_core::{
    Codec, ConsoleSink, Discard, Policy, ResultSink, RunReport, RunStatus, SyncSettings,
    open_store_url, restore_all, run_sync, scan,
};
use serde_json::json;
use tracing::info;

use crate::presentation::cli::{DbArgs, RunArgs, SecretArgs};

/// Process exit code when every dispatched file failed.
pub const EXIT_ALL_FAILED: u8 = 2;

/// Options shared by every command.
pub struct Context {
    pub state_dir: PathBuf,
    pub json: bool,
}

impl Context {
    pub fn new(state_dir: Option<PathBuf>, json: bool) -> Result<Self> {
        let state_dir = match state_dir {
            Some(dir) => dir,
            None => dirs::home_dir()
                .map(|home| home.join(STATE_DIR_NAME))
                .ok_or_else(|| SyncError::Candidates {
                    path: PathBuf::from(STATE_DIR_NAME),
                    message: "home directory unknown; pass --state-dir".to_string(),
                })?,
        };
        Ok(Self { state_dir, json })
    }

    pub fn candidates_path(&self) -> PathBuf {
        self.state_dir.join(CANDIDATES_FILE)
    }

    pub fn settings(&self, run: RunArgs) -> Result<SyncSettings> {
        let base = match run.base {
            Some(b) => b,
            None => current_dir()?,
        };
        Ok(SyncSettings {
            database_url: run.secret.db.db,
            password: run.secret.password,
            base,
            workers: run.workers,
            state_dir: self.state_dir.clone(),
        })
    }
}

fn current_dir() -> Result<PathBuf> {
    std::env::current_dir().map_err(|e| SyncError::local_io("read current directory", ".", e))
}

fn print_json(value: &impl serde::Serialize) -> Result<()> {
    let text =
        serde_json::to_string_pretty(value).map_err(|e| SyncError::Output(e.to_string()))?;
    println!("{text}");
    Ok(())
}

pub fn exit_code(status: RunStatus) -> ExitCode {
    match status {
        RunStatus::Clean | RunStatus::Partial => ExitCode::SUCCESS,
        RunStatus::Failed => ExitCode::from(EXIT_ALL_FAILED),
    }
}

pub fn handle_scan(ctx: &Context, path: PathBuf) -> Result<ExitCode> {
    let found = scan(&path)?;
    if found.is_empty() {
        if ctx.json {
            print_json(&CandidateList::default())?;
        } else {
            println!("No .env files found");
        }
        return Ok(ExitCode::SUCCESS);
    }
    let list = CandidateList::new(found);
    list.save(&ctx.candidates_path())?;
    info!(count = list.len(), state = %ctx.state_dir.display(), "candidate list saved");
    if ctx.json {
        print_json(&list)?;
    } else {
        println!("Found and saved {} .env file(s):", list.len());
        for file in &list.files {
            println!("  - {}", file.display());
        }
    }
    Ok(ExitCode::SUCCESS)
}

/// Run once and print the result the way the context asks for.
pub fn run_and_report(ctx: &Context, settings: &SyncSettings, policy: Policy) -> Result<RunReport> {
    let codec = Codec::new();
    let mut console;
    let mut discard = Discard;
    let sink: &mut dyn ResultSink = if ctx.json {
        &mut discard
    } else {
        console = ConsoleSink::stdout();
        &mut console
    };
    let report = run_sync(settings, policy, &codec, sink)?;
    if ctx.json {
        print_json(&report)?;
    } else {
        print!("{}", report.render_summary());
        print!("{}", report.render_performance());
    }
    Ok(report)
}

pub fn handle_sync(ctx: &Context, run: RunArgs, dry_run: bool) -> Result<ExitCode> {
    let settings = ctx.settings(run)?;
    let policy = if dry_run {
        Policy::dry_run()
    } else {
        Policy::reconcile()
    };
    let report = run_and_report(ctx, &settings, policy)?;
    Ok(exit_code(report.status()))
}

pub fn handle_upload(ctx: &Context, run: RunArgs) -> Result<ExitCode> {
    let settings = ctx.settings(run)?;
    let report = run_and_report(ctx, &settings, Policy::force_push())?;
    if !ctx.json && report.status() == RunStatus::Clean {
        println!("\n✓ Upload complete!");
    }
    Ok(exit_code(report.status()))
}

pub fn handle_download(
    ctx: &Context,
    secret: SecretArgs,
    output: Option<PathBuf>,
) -> Result<ExitCode> {
    let out = match output {
        Some(o) => o,
        None => current_dir()?,
    };
    let store = open_store_url(&secret.db.db)?;
    store.init_schema()?;
    let entries = restore_all(store.as_ref(), &Codec::new(), &secret.password, &out)?;
    let restored = entries
        .iter()
        .filter(|e| matches!(e, RestoreEntry::Restored { .. }))
        .count();

    if ctx.json {
        print_json(&json!({ "output": out, "restored": restored, "files": entries }))?;
    } else if entries.is_empty() {
        println!("No .env files found in database");
    } else {
        println!("Downloading {} .env file(s)...", entries.len());
        for entry in &entries {
            println!("{}", entry.line());
        }
        println!("\n✓ Download complete!");
    }

    if !entries.is_empty() && restored == 0 {
        return Ok(ExitCode::from(EXIT_ALL_FAILED));
    }
    Ok(ExitCode::SUCCESS)
}

pub fn handle_list(ctx: &Context) -> Result<ExitCode> {
    let list = CandidateList::load(&ctx.candidates_path())?;
    if ctx.json {
        print_json(&list)?;
    } else if list.is_empty() {
        println!("No .env files remembered. Run 'env-sync scan <path>' first.");
    } else {
        println!("Remembered {} .env file(s):", list.len());
        for (i, file) in list.files.iter().enumerate() {
            println!("{}. {}", i + 1, file.display());
        }
    }
    Ok(ExitCode::SUCCESS)
}

pub fn handle_remote(ctx: &Context, db: DbArgs) -> Result<ExitCode> {
    let store = open_store_url(&db.db)?;
    store.init_schema()?;
    let records = store.list()?;
    if ctx.json {
        print_json(&records)?;
        return Ok(ExitCode::SUCCESS);
    }
    if records.is_empty() {
        println!("No .env files found in database");
        return Ok(ExitCode::SUCCESS);
    }
    println!("{} .env file(s) in database:", records.len());
    for r in &records {
        let hash: String = r.content_hash.chars().take(12).collect();
        println!(
            "  {:<28} {:<40} {:<12} {}",
            r.key.scope.short(),
            r.key.relative_path,
            hash,
            r.content_modified_at
        );
    }
    Ok(ExitCode::SUCCESS)
}
