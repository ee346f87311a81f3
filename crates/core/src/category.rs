//! Category model
//!
//! Categories are the fixed set of logical buckets this client syncs. Each
//! category maps 1:1 to a remote folder beneath the root folder.

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// A logical bucket of files, mapped to one remote folder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// Exported CSV price data
    CsvFiles,
    /// Trained model artifacts
    Models,
}

impl Category {
    /// All categories, in folder-resolution order
    pub const ALL: [Category; 2] = [Category::CsvFiles, Category::Models];

    /// The remote folder name for this category
    pub const fn folder_name(self) -> &'static str {
        match self {
            Category::CsvFiles => "csv_files",
            Category::Models => "models",
        }
    }
}

impl std::str::FromStr for Category {
    type Err = Error;

    /// Parse a category name. Unknown names fail with `InvalidCategory`
    /// before any remote call is made.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "csv_files" => Ok(Category::CsvFiles),
            "models" => Ok(Category::Models),
            other => Err(Error::InvalidCategory(other.to_string())),
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.folder_name())
    }
}
