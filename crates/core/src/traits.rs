//! RemoteStore trait definition
//!
//! This trait defines the interface for folder-hierarchy storage operations
//! (Google Drive semantics: opaque ids, find-by-name queries, update in
//! place by id). It decouples the sync client from the HTTP adapter so the
//! client can be tested against fakes and mocks.

use async_trait::async_trait;
use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// A named container in the remote store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FolderRef {
    /// Store-assigned opaque identifier
    pub id: String,

    /// Folder name
    pub name: String,

    /// Parent folder id (None for the store root)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
}

/// Metadata for a stored file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteFile {
    /// Store-assigned opaque identifier
    pub id: String,

    /// File name within its folder
    pub name: String,

    /// Parent folder id
    #[serde(skip_serializing_if = "Option::is_none")]
    pub folder_id: Option<String>,

    /// Size in bytes, when the store reports it
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,

    /// Creation timestamp
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_time: Option<Timestamp>,

    /// Last modification timestamp
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modified_time: Option<Timestamp>,
}

impl RemoteFile {
    /// Human-readable size, when known
    pub fn size_human(&self) -> Option<String> {
        self.size
            .map(|s| humansize::format_size(s, humansize::BINARY))
    }
}

/// Trait for remote folder-store operations
///
/// Implemented by the Drive adapter; faked in tests. All queries exclude
/// trashed items.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Find a non-trashed folder by exact name and parent
    async fn find_folder(&self, name: &str, parent_id: Option<&str>)
        -> Result<Option<FolderRef>>;

    /// Create a folder with the given name and parent
    async fn create_folder(&self, name: &str, parent_id: Option<&str>) -> Result<FolderRef>;

    /// Find a non-trashed file by exact name within a folder
    async fn find_file(&self, name: &str, folder_id: &str) -> Result<Option<RemoteFile>>;

    /// Create a new file in a folder
    async fn create_file(
        &self,
        name: &str,
        folder_id: &str,
        data: Vec<u8>,
        content_type: Option<&str>,
    ) -> Result<RemoteFile>;

    /// Replace the content of an existing file, keeping its id
    async fn update_file(
        &self,
        file_id: &str,
        data: Vec<u8>,
        content_type: Option<&str>,
    ) -> Result<RemoteFile>;

    /// Get file metadata by id
    async fn file_metadata(&self, file_id: &str) -> Result<RemoteFile>;

    /// Read a byte range of a file's content
    ///
    /// May return fewer bytes than requested at the end of the file.
    async fn read_chunk(&self, file_id: &str, offset: u64, len: u64) -> Result<Vec<u8>>;

    /// List all non-trashed files whose parent is the given folder
    async fn list_files(&self, folder_id: &str) -> Result<Vec<RemoteFile>>;

    /// Delete a file by id
    async fn delete_file(&self, file_id: &str) -> Result<()>;
}
