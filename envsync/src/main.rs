mod application;

mod presentation {
    pub mod cli;
}

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use presentation::cli::Cli;

/// Exit code when a run cannot start (bad arguments, unreachable database, ...).
const EXIT_NOT_STARTED: u8 = 1;

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match application::run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::from(EXIT_NOT_STARTED)
        }
    }
}
