//! list command - List files in a category folder
//!
//! Shows id, name, size, and modification time for every file in the
//! csv_files or models folder. Lookup failures are reported as errors,
//! never as an empty listing.

use std::str::FromStr;

use clap::Args;
use comfy_table::{presets::UTF8_FULL_CONDENSED, Cell, ContentArrangement, Table};
use dsync_core::{Category, RemoteFile};
use serde::Serialize;

use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig, ProgressBar};

/// List files in a category folder
#[derive(Args, Debug)]
pub struct ListArgs {
    /// Category folder: csv_files or models
    #[arg(short = 't', long = "type", value_name = "CATEGORY")]
    pub category: String,
}

/// Output structure for list command (JSON format)
#[derive(Debug, Serialize)]
struct ListOutput {
    category: String,
    items: Vec<RemoteFile>,
}

/// Execute the list command
pub async fn execute(args: ListArgs, output_config: OutputConfig) -> ExitCode {
    let formatter = Formatter::new(output_config.clone());

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

    let files = match client.list(category).await {
        Ok(files) => files,
        Err(e) => {
            spinner.finish_and_clear();
            formatter.error(&format!("Failed to list {}: {e}", category.folder_name()));
            return ExitCode::from_error(&e);
        }
    };
    spinner.finish_and_clear();

    if formatter.is_json() {
        formatter.json(&ListOutput {
            category: category.to_string(),
            items: files,
        });
        return ExitCode::Success;
    }

    if files.is_empty() {
        formatter.println(&format!("No files in {}", category.folder_name()));
        return ExitCode::Success;
    }

    formatter.println(&render_table(&files).to_string());
    formatter.println(&format!("\nTotal: {} files", files.len()));
    ExitCode::Success
}

fn render_table(files: &[RemoteFile]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["ID", "Name", "Size", "Modified"]);

    for file in files {
        let size = file.size_human().unwrap_or_else(|| "-".to_string());
        let modified = file
            .modified_time
            .map(|t| t.strftime("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_else(|| "-".to_string());
        table.add_row(vec![
            Cell::new(&file.id),
            Cell::new(&file.name),
            Cell::new(size),
            Cell::new(modified),
        ]);
    }

    table
}
