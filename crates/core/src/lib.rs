//! dsync-core: Core library for the dsync sync client
//!
//! This crate provides the core functionality for the dsync CLI, including:
//! - Configuration management
//! - The category model (fixed set of logical buckets)
//! - RemoteStore trait for folder-hierarchy storage operations
//! - The SyncClient that resolves folders and transfers files
//!
//! This crate is designed to be independent of any HTTP stack,
//! allowing for easy testing and potential future support for other backends.

pub mod category;
pub mod config;
pub mod error;
pub mod sync;
pub mod traits;

pub use category::Category;
pub use config::{Config, ConfigManager};
pub use error::{Error, Result};
pub use sync::{resolve_folder, SyncClient};
pub use traits::{FolderRef, RemoteFile, RemoteStore};
