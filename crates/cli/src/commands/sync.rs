//! sync command - Upload all matching files from a local directory
//!
//! Walks a local directory for files matching a glob pattern and uploads
//! each one into the chosen category folder. Individual failures are
//! reported and counted; remaining files are still attempted.

use std::path::PathBuf;
use std::str::FromStr;

use clap::Args;
use dsync_core::Category;
use serde::Serialize;
use tracing::warn;

use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig, ProgressBar};

/// Upload all matching files from a directory
#[derive(Args, Debug)]
pub struct SyncArgs {
    /// Category folder: csv_files or models
    #[arg(short = 't', long = "type", value_name = "CATEGORY")]
    pub category: String,

    /// Local directory to scan
    #[arg(short, long)]
    pub dir: PathBuf,

    /// Glob pattern for files to upload
    #[arg(short, long, default_value = "*.csv")]
    pub pattern: String,
}

#[derive(Debug, Serialize)]
struct SyncOutput {
    status: &'static str,
    category: String,
    uploaded: usize,
    failed: usize,
    files: Vec<String>,
}

/// Execute the sync command
pub async fn execute(args: SyncArgs, output_config: OutputConfig) -> ExitCode {
    let formatter = Formatter::new(output_config.clone());

    let category = match Category::from_str(&args.category) {
        Ok(c) => c,
        Err(e) => {
            formatter.error(&e.to_string());
            return ExitCode::from_error(&e);
        }
    };

    if !args.dir.is_dir() {
        formatter.error(&format!("Not a directory: {}", args.dir.display()));
        return ExitCode::NotFound;
    }

    let pattern = args.dir.join(&args.pattern).display().to_string();
    let paths = match collect_files(&pattern) {
        Ok(paths) => paths,
        Err(e) => {
            formatter.error(&format!("Invalid pattern '{}': {e}", args.pattern));
            return ExitCode::UsageError;
        }
    };

    if paths.is_empty() {
        formatter.println(&format!(
            "No files matching '{}' in {}",
            args.pattern,
            args.dir.display()
        ));
        return ExitCode::Success;
    }

    let spinner = ProgressBar::spinner(&output_config, "Connecting...");
    let client = match super::connect_client().await {
        Ok(connected) => connected,
        Err(e) => {
            spinner.finish_and_clear();
            formatter.error(&format!("Failed to connect: {e}"));
            return ExitCode::from_error(&e);
        }
    };

    let mut uploaded = Vec::new();
    let mut failed = 0usize;

    for path in &paths {
        spinner.set_message(&format!("Uploading {}...", path.display()));
        match client.upload(path, category).await {
            Ok(file) => uploaded.push(file.name),
            Err(e) => {
                warn!(file = %path.display(), error = %e, "upload failed");
                formatter.error(&format!("Failed to upload {}: {e}", path.display()));
                failed += 1;
            }
        }
    }
    spinner.finish_and_clear();

    if formatter.is_json() {
        formatter.json(&SyncOutput {
            status: if failed == 0 { "synced" } else { "partial" },
            category: category.to_string(),
            uploaded: uploaded.len(),
            failed,
            files: uploaded.clone(),
        });
    } else {
        formatter.success(&format!(
            "Uploaded {} of {} files to {}",
            uploaded.len(),
            paths.len(),
            category.folder_name()
        ));
    }

    if failed > 0 {
        ExitCode::TransferError
    } else {
        ExitCode::Success
    }
}

fn collect_files(pattern: &str) -> Result<Vec<PathBuf>, glob::PatternError> {
    let mut paths: Vec<PathBuf> = glob::glob(pattern)?
        .filter_map(|entry| entry.ok())
        .filter(|path| path.is_file())
        .collect();
    paths.sort();
    Ok(paths)
}
