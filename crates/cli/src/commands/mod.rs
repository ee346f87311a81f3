//! CLI command definitions and execution
//!
//! This module contains all CLI commands and their implementations.
//! Each command module exposes an Args struct and an execute function
//! returning an exit code.

use clap::{Parser, Subcommand};
use dsync_core::{ConfigManager, SyncClient};
use dsync_drive::{acquire_session, DriveClient, TokenStore};

use crate::exit_code::ExitCode;
use crate::output::OutputConfig;

mod completions;
mod delete;
mod download;
mod list;
mod sync;
mod upload;

/// dsync - Google Drive sync client
///
/// A command-line interface for synchronizing trading data files
/// (CSV exports and trained models) with a Google Drive folder hierarchy.
#[derive(Parser, Debug)]
#[command(name = "dsync")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output format: human-readable or JSON
    #[arg(long, global = true, default_value = "false")]
    pub json: bool,

    /// Disable colored output
    #[arg(long, global = true, default_value = "false")]
    pub no_color: bool,

    /// Disable progress bar
    #[arg(long, global = true, default_value = "false")]
    pub no_progress: bool,

    /// Suppress non-error output
    #[arg(short, long, global = true, default_value = "false")]
    pub quiet: bool,

    /// Enable debug logging
    #[arg(long, global = true, default_value = "false")]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Upload a local file into a category folder
    Upload(upload::UploadArgs),

    /// Download a file by id
    Download(download::DownloadArgs),

    /// List files in a category folder
    List(list::ListArgs),

    /// Delete a file by id
    Delete(delete::DeleteArgs),

    /// Upload all matching files from a local directory
    Sync(sync::SyncArgs),

    /// Generate shell completion scripts
    Completions(completions::CompletionsArgs),
}

/// Execute the CLI command and return an exit code
pub async fn execute(cli: Cli) -> ExitCode {
    let output_config = OutputConfig {
        json: cli.json,
        no_color: cli.no_color,
        no_progress: cli.no_progress,
        quiet: cli.quiet,
    };

    match cli.command {
        Commands::Upload(args) => upload::execute(args, output_config).await,
        Commands::Download(args) => download::execute(args, output_config).await,
        Commands::List(args) => list::execute(args, output_config).await,
        Commands::Delete(args) => delete::execute(args, output_config).await,
        Commands::Sync(args) => sync::execute(args, output_config).await,
        Commands::Completions(args) => completions::execute(args),
    }
}

/// Load the configuration, refresh credentials, and connect a sync client.
///
/// Shared by every command that talks to the remote store.
pub(crate) async fn connect_client() -> dsync_core::Result<SyncClient<DriveClient>> {
    let manager = ConfigManager::new()?;
    let config = manager.load()?;

    let token_store = TokenStore::new(config.token_path(&manager.config_dir()));
    let session = acquire_session(&token_store).await?;
    let client = DriveClient::new(session)?;

    SyncClient::connect(client, &config.remote.root_folder, config.chunk_size()).await
}
