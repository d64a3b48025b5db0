pub mod daemon;
pub mod handlers;

use std::process::ExitCode;

use crate::presentation::cli::{Cli, Commands};
use envsync_core::error::Result;

pub fn run(cli: Cli) -> Result<ExitCode> {
    let ctx = handlers::Context::new(cli.state_dir, cli.json)?;
    match cli.command {
        Commands::Scan { path } => handlers::handle_scan(&ctx, path),
        Commands::Sync { run, dry_run } => handlers::handle_sync(&ctx, run, dry_run),
        Commands::Upload { run } => handlers::handle_upload(&ctx, run),
        Commands::Download { secret, output } => handlers::handle_download(&ctx, secret, output),
        Commands::List => handlers::handle_list(&ctx),
        Commands::Remote { db } => handlers::handle_remote(&ctx, db),
        Commands::Daemon { run, interval } => daemon::handle_daemon(&ctx, run, interval),
        Commands::Version => {
            println!("env-sync v{}", env!("CARGO_PKG_VERSION"));
            Ok(ExitCode::SUCCESS)
        }
    }
}
