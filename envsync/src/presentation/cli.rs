use clap::{ArgAction, Args, Parser, Subcommand};
use envsync_core::config::{DB_ENV, PASSWORD_ENV};
use envsync_core::executor::DEFAULT_WORKERS;
use envsync_core::parse_interval;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser)]
#[command(
    name = "env-sync",
    author,
    version,
    about = "Encrypted .env synchronization through a shared database",
    long_about = None
)]
pub struct Cli {
    /// Directory holding the remembered file list (default: ~/.env-sync)
    #[arg(long, global = true, env = "ENV_SYNC_STATE_DIR")]
    pub state_dir: Option<PathBuf>,

    /// More log output on stderr (-v info, -vv debug). RUST_LOG overrides.
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Print machine-readable JSON instead of text
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Args, Clone)]
pub struct DbArgs {
    /// Database connection string: libsql://host?authToken=..., https://, file:path or memory:
    #[arg(long = "db", env = DB_ENV, hide_env_values = true)]
    pub db: String,
}

#[derive(Args, Clone)]
pub struct SecretArgs {
    #[command(flatten)]
    pub db: DbArgs,

    /// Encryption password
    #[arg(long, env = PASSWORD_ENV, hide_env_values = true)]
    pub password: String,
}

#[derive(Args, Clone)]
pub struct RunArgs {
    #[command(flatten)]
    pub secret: SecretArgs,

    /// Base path for files outside a git repository (default: current directory)
    #[arg(long)]
    pub base: Option<PathBuf>,

    /// Number of parallel workers
    #[arg(long, default_value_t = DEFAULT_WORKERS)]
    pub workers: usize,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Recursively scan a directory for .env files and remember them
    Scan { path: PathBuf },

    /// Reconcile remembered files with the database in both directions
    Sync {
        #[command(flatten)]
        run: RunArgs,

        /// Show what would be synced without making changes
        #[arg(long)]
        dry_run: bool,
    },

    /// Upload every remembered file, overwriting the database copy
    Upload {
        #[command(flatten)]
        run: RunArgs,
    },

    /// Restore every stored file under an output directory
    Download {
        #[command(flatten)]
        secret: SecretArgs,

        /// Output directory (default: current directory)
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// List remembered files
    List,

    /// List files stored in the database (no decryption)
    Remote {
        #[command(flatten)]
        db: DbArgs,
    },

    /// Sync now and then periodically until interrupted
    Daemon {
        #[command(flatten)]
        run: RunArgs,

        /// Sync interval, e.g. 30s, 15m, 1h, 2h30m
        #[arg(long, default_value = "1h", value_parser = interval_arg)]
        interval: Duration,
    },

    /// Show version information
    Version,
}

fn interval_arg(s: &str) -> Result<Duration, String> {
    parse_interval(s)
}
