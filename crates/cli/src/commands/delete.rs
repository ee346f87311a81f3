//! delete command - Delete a file by id
//!
//! Deletion failures surface as errors with a distinct exit code; a missing
//! file id is reported as not found rather than silently ignored.

use clap::Args;
use serde::Serialize;

use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig, ProgressBar};

/// Delete a file
#[derive(Args, Debug)]
pub struct DeleteArgs {
    /// Remote file id
    #[arg(long = "file-id", alias = "file_id", value_name = "ID")]
    pub file_id: String,
}

#[derive(Debug, Serialize)]
struct DeleteOutput {
    status: &'static str,
    id: String,
}

/// Execute the delete command
pub async fn execute(args: DeleteArgs, output_config: OutputConfig) -> ExitCode {
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

    if let Err(e) = client.delete(&args.file_id).await {
        spinner.finish_and_clear();
        formatter.error(&format!("Failed to delete {}: {e}", args.file_id));
        return ExitCode::from_error(&e);
    }
    spinner.finish_and_clear();

    if formatter.is_json() {
        formatter.json(&DeleteOutput {
            status: "deleted",
            id: args.file_id,
        });
    } else {
        formatter.success(&format!("Deleted {}", args.file_id));
    }

    ExitCode::Success
}
