//! download command - Download a file by id
//!
//! Fetches file content in chunks and writes it to the local destination,
//! creating parent directories as needed.

use std::path::PathBuf;

use clap::Args;
use humansize::{format_size, BINARY};
use serde::Serialize;

use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig, ProgressBar};

/// Download a file
#[derive(Args, Debug)]
pub struct DownloadArgs {
    /// Remote file id
    #[arg(long = "file-id", value_name = "ID")]
    pub file_id: String,

    /// Local destination path
    #[arg(short, long)]
    pub file: PathBuf,
}

#[derive(Debug, Serialize)]
struct DownloadOutput {
    status: &'static str,
    id: String,
    dest: String,
    size_bytes: u64,
    size_human: String,
}

/// Execute the download command
pub async fn execute(args: DownloadArgs, output_config: OutputConfig) -> ExitCode {
    let formatter = Formatter::new(output_config.clone());

    let spinner = ProgressBar::spinner(&output_config, "Connecting...");
    let client = match super::connect_client().await {
        Ok(connected) => connected,
        Err(e) => {
            spinner.finish_and_clear();
            formatter.error(&format!("Failed to connect: {e}"));
            return ExitCode::from_error(&e);
        }
    };
    spinner.finish_and_clear();

    // Total size is only known after the metadata lookup, reported on the
    // first progress callback.
    let bar = ProgressBar::new(&output_config, 0);
    let result = client
        .download(&args.file_id, &args.file, |done, total| {
            bar.set_length(total);
            bar.set_position(done);
        })
        .await;
    bar.finish_and_clear();

    let written = match result {
        Ok(bytes) => bytes,
        Err(e) => {
            formatter.error(&format!("Download failed: {e}"));
            return ExitCode::from_error(&e);
        }
    };

    if formatter.is_json() {
        formatter.json(&DownloadOutput {
            status: "downloaded",
            id: args.file_id,
            dest: args.file.display().to_string(),
            size_bytes: written,
            size_human: format_size(written, BINARY),
        });
    } else {
        formatter.success(&format!(
            "Downloaded {} ({}) to {}",
            args.file_id,
            format_size(written, BINARY),
            args.file.display()
        ));
    }

    ExitCode::Success
}
