//! upload command - Upload a file into a category folder
//!
//! Uploads a local file into the csv_files or models folder. When a file
//! with the same name already exists in the folder, its content is replaced
//! in place and the file keeps its id.

use std::path::PathBuf;
use std::str::FromStr;

use clap::Args;
use dsync_core::Category;
use serde::Serialize;

use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig, ProgressBar};

/// Upload a file
#[derive(Args, Debug)]
pub struct UploadArgs {
    /// Category folder: csv_files or models
    #[arg(short = 't', long = "type", value_name = "CATEGORY")]
    pub category: String,

    /// Local file to upload
    #[arg(short, long)]
    pub file: PathBuf,
}

#[derive(Debug, Serialize)]
struct UploadOutput {
    status: &'static str,
    id: String,
    name: String,
    category: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    size_bytes: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    size_human: Option<String>,
}

/// Execute the upload command
pub async fn execute(args: UploadArgs, output_config: OutputConfig) -> ExitCode {
    let formatter = Formatter::new(output_config.clone());

    // Category is validated before any network traffic
    let category = match Category::from_str(&args.category) {
        Ok(c) => c,
        Err(e) => {
            formatter.error(&e.to_string());
            return ExitCode::from_error(&e);
        }
    };

    let spinner = ProgressBar::spinner(&output_config, "Connecting...");
    let client = match super::connect_client().await {
        Ok(connected) => connected,
        Err(e) => {
            spinner.finish_and_clear();
            formatter.error(&format!("Failed to connect: {e}"));
            return ExitCode::from_error(&e);
        }
    };

    spinner.set_message(&format!("Uploading {}...", args.file.display()));
    let uploaded = match client.upload(&args.file, category).await {
        Ok(file) => file,
        Err(e) => {
            spinner.finish_and_clear();
            formatter.error(&format!("Upload failed: {e}"));
            return ExitCode::from_error(&e);
        }
    };
    spinner.finish_and_clear();

    if formatter.is_json() {
        formatter.json(&UploadOutput {
            status: "uploaded",
            id: uploaded.id.clone(),
            name: uploaded.name.clone(),
            category: category.to_string(),
            size_bytes: uploaded.size,
            size_human: uploaded.size_human(),
        });
    } else {
        formatter.success(&format!(
            "Uploaded {} to {} (id: {})",
            uploaded.name,
            category.folder_name(),
            uploaded.id
        ));
    }

    ExitCode::Success
}
