//! dsync - Google Drive sync client
//!
//! A command-line interface for synchronizing trading data files
//! (CSV exports and trained models) with a Google Drive folder hierarchy.

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use drivesync_cli::commands::{self, Cli};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize tracing subscriber for logging
    let default_filter = if cli.debug { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)))
        .init();

    let exit_code = commands::execute(cli).await;

    std::process::exit(exit_code.as_i32());
}
