//! Error types for dsync-core
//!
//! Provides a unified error type that can be converted to appropriate exit codes.

use thiserror::Error;

/// Result type alias for dsync-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for dsync-core operations
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration file error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Category name is not in the fixed set
    #[error("Invalid category: {0} (expected one of: csv_files, models)")]
    InvalidCategory(String),

    /// Remote transport failure during upload, download, list or delete
    #[error("Transfer error: {0}")]
    Transfer(String),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Stored session is missing, expired, or could not be refreshed
    #[error("Authorization expired: {0}")]
    AuthExpired(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parsing error
    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// TOML serialization error
    #[error("TOML serialization error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// General error
    #[error("{0}")]
    General(String),
}

impl Error {
    /// Get the appropriate exit code for this error
    pub const fn exit_code(&self) -> i32 {
        match self {
            Error::Config(_) => 2,          // UsageError
            Error::InvalidCategory(_) => 2, // UsageError
            Error::Transfer(_) => 3,        // TransferError
            Error::AuthExpired(_) => 4,     // AuthError
            Error::NotFound(_) => 5,        // NotFound
            _ => 1,                         // GeneralError
        }
    }
}
