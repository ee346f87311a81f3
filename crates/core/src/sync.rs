//! Sync client
//!
//! Resolves the two-level folder hierarchy (root folder, one folder per
//! category) and performs idempotent upload, chunked download, listing, and
//! deletion of files within the resolved folders.
//!
//! Folder resolution is strict lookup-then-create, not a transaction:
//! concurrent clients resolving the same category can each create a folder.
//! The per-category folder map is read-only after construction.

use std::collections::HashMap;
use std::path::Path;

use tracing::{debug, info};

use crate::category::Category;
use crate::error::{Error, Result};
use crate::traits::{FolderRef, RemoteFile, RemoteStore};

/// Client for one remote folder hierarchy
pub struct SyncClient<S> {
    store: S,
    root: FolderRef,
    folders: HashMap<Category, FolderRef>,
    chunk_size: u64,
}

/// Find a non-trashed folder with this exact name and parent, or create it.
///
/// Idempotent only under single-threaded sequential use; a concurrent caller
/// performing the same resolution can still create a duplicate.
pub async fn resolve_folder<S: RemoteStore>(
    store: &S,
    name: &str,
    parent_id: Option<&str>,
) -> Result<FolderRef> {
    if let Some(folder) = store.find_folder(name, parent_id).await? {
        debug!(folder = name, id = %folder.id, "using existing folder");
        return Ok(folder);
    }

    let folder = store.create_folder(name, parent_id).await?;
    info!(folder = name, id = %folder.id, "created folder");
    Ok(folder)
}

impl<S: RemoteStore> SyncClient<S> {
    /// Connect to the store: resolve the root folder, then one folder per
    /// category beneath it, caching the ids for the life of the client.
    pub async fn connect(store: S, root_folder: &str, chunk_size: u64) -> Result<Self> {
        let root = resolve_folder(&store, root_folder, None).await?;

        let mut folders = HashMap::new();
        for category in Category::ALL {
            let folder =
                resolve_folder(&store, category.folder_name(), Some(root.id.as_str())).await?;
            folders.insert(category, folder);
        }

        Ok(Self {
            store,
            root,
            folders,
            chunk_size: chunk_size.max(1),
        })
    }

    /// The resolved root folder
    pub fn root(&self) -> &FolderRef {
        &self.root
    }

    /// The resolved folder for a category
    pub fn folder(&self, category: Category) -> &FolderRef {
        // connect() resolves every Category variant
        &self.folders[&category]
    }

    /// Upload a local file into a category folder.
    ///
    /// If a file with the same base name already exists in the folder, its
    /// content is replaced in place (same id); otherwise a new file is
    /// created. Transport failures are surfaced, never retried.
    pub async fn upload(&self, local_path: &Path, category: Category) -> Result<RemoteFile> {
        if !local_path.exists() {
            return Err(Error::NotFound(format!(
                "Local file not found: {}",
                local_path.display()
            )));
        }

        let name = local_path
            .file_name()
            .ok_or_else(|| Error::General(format!("Not a file: {}", local_path.display())))?
            .to_string_lossy()
            .to_string();

        let data = std::fs::read(local_path)?;
        let guessed: Option<String> = mime_guess::from_path(local_path)
            .first()
            .map(|m| m.essence_str().to_string());

        let folder_id = self.folder(category).id.clone();

        match self.store.find_file(&name, &folder_id).await? {
            Some(existing) => {
                debug!(file = %name, id = %existing.id, "replacing existing file");
                self.store
                    .update_file(&existing.id, data, guessed.as_deref())
                    .await
            }
            None => {
                debug!(file = %name, folder = %folder_id, "creating new file");
                self.store
                    .create_file(&name, &folder_id, data, guessed.as_deref())
                    .await
            }
        }
    }

    /// Download a file by id into a local path.
    ///
    /// Content is fetched in successive chunks into an in-memory buffer; the
    /// progress callback receives `(bytes_done, bytes_total)` after each
    /// chunk. Parent directories are created; the buffer is written to disk
    /// in a single write once complete. Partial local state from earlier
    /// failed attempts is not cleaned up. Returns the number of bytes
    /// written.
    pub async fn download(
        &self,
        file_id: &str,
        dest: &Path,
        mut progress: impl FnMut(u64, u64),
    ) -> Result<u64> {
        let meta = self.store.file_metadata(file_id).await?;
        let total = meta.size.unwrap_or(0);

        let mut buffer: Vec<u8> = Vec::with_capacity(total as usize);
        let mut done: u64 = 0;

        while total == 0 || done < total {
            let chunk = self.store.read_chunk(file_id, done, self.chunk_size).await?;
            if chunk.is_empty() {
                if done < total {
                    return Err(Error::Transfer(format!(
                        "Short read at byte {done} of {total} for file {file_id}"
                    )));
                }
                break;
            }
            done += chunk.len() as u64;
            buffer.extend_from_slice(&chunk);
            progress(done, total);
        }

        if let Some(parent) = dest.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)?;
            }
        }

        std::fs::write(dest, &buffer)?;
        info!(file = %meta.name, dest = %dest.display(), bytes = buffer.len(), "downloaded file");
        Ok(buffer.len() as u64)
    }

    /// List all files in a category folder.
    ///
    /// Transport failures propagate as errors; an empty result always means
    /// the folder genuinely has no files.
    pub async fn list(&self, category: Category) -> Result<Vec<RemoteFile>> {
        self.store.list_files(&self.folder(category).id).await
    }

    /// Delete a file by id
    pub async fn delete(&self, file_id: &str) -> Result<()> {
        self.store.delete_file(file_id).await?;
        info!(id = file_id, "deleted file");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// In-memory store for behavioral tests. Counts folder lookups and
    /// creations so tests can assert on the resolution call pattern.
    #[derive(Default)]
    struct FakeStore {
        state: Mutex<FakeState>,
    }

    #[derive(Default)]
    struct FakeState {
        folders: Vec<FolderRef>,
        files: Vec<(RemoteFile, Vec<u8>)>,
        next_id: u64,
        find_folder_calls: usize,
        create_folder_calls: usize,
    }

    impl FakeState {
        fn next_id(&mut self, prefix: &str) -> String {
            self.next_id += 1;
            format!("{prefix}-{}", self.next_id)
        }
    }

    #[async_trait]
    impl RemoteStore for FakeStore {
        async fn find_folder(
            &self,
            name: &str,
            parent_id: Option<&str>,
        ) -> Result<Option<FolderRef>> {
            let mut state = self.state.lock().unwrap();
            state.find_folder_calls += 1;
            Ok(state
                .folders
                .iter()
                .find(|f| f.name == name && f.parent_id.as_deref() == parent_id)
                .cloned())
        }

        async fn create_folder(&self, name: &str, parent_id: Option<&str>) -> Result<FolderRef> {
            let mut state = self.state.lock().unwrap();
            state.create_folder_calls += 1;
            let folder = FolderRef {
                id: state.next_id("folder"),
                name: name.to_string(),
                parent_id: parent_id.map(|p| p.to_string()),
            };
            state.folders.push(folder.clone());
            Ok(folder)
        }

        async fn find_file(&self, name: &str, folder_id: &str) -> Result<Option<RemoteFile>> {
            let state = self.state.lock().unwrap();
            Ok(state
                .files
                .iter()
                .find(|(f, _)| f.name == name && f.folder_id.as_deref() == Some(folder_id))
                .map(|(f, _)| f.clone()))
        }

        async fn create_file(
            &self,
            name: &str,
            folder_id: &str,
            data: Vec<u8>,
            _content_type: Option<&str>,
        ) -> Result<RemoteFile> {
            let mut state = self.state.lock().unwrap();
            let file = RemoteFile {
                id: state.next_id("file"),
                name: name.to_string(),
                folder_id: Some(folder_id.to_string()),
                size: Some(data.len() as u64),
                created_time: None,
                modified_time: None,
            };
            state.files.push((file.clone(), data));
            Ok(file)
        }

        async fn update_file(
            &self,
            file_id: &str,
            data: Vec<u8>,
            _content_type: Option<&str>,
        ) -> Result<RemoteFile> {
            let mut state = self.state.lock().unwrap();
            let entry = state
                .files
                .iter_mut()
                .find(|(f, _)| f.id == file_id)
                .ok_or_else(|| Error::NotFound(file_id.to_string()))?;
            entry.0.size = Some(data.len() as u64);
            entry.1 = data;
            Ok(entry.0.clone())
        }

        async fn file_metadata(&self, file_id: &str) -> Result<RemoteFile> {
            let state = self.state.lock().unwrap();
            state
                .files
                .iter()
                .find(|(f, _)| f.id == file_id)
                .map(|(f, _)| f.clone())
                .ok_or_else(|| Error::NotFound(file_id.to_string()))
        }

        async fn read_chunk(&self, file_id: &str, offset: u64, len: u64) -> Result<Vec<u8>> {
            let state = self.state.lock().unwrap();
            let (_, data) = state
                .files
                .iter()
                .find(|(f, _)| f.id == file_id)
                .ok_or_else(|| Error::NotFound(file_id.to_string()))?;
            let start = (offset as usize).min(data.len());
            let end = (start + len as usize).min(data.len());
            Ok(data[start..end].to_vec())
        }

        async fn list_files(&self, folder_id: &str) -> Result<Vec<RemoteFile>> {
            let state = self.state.lock().unwrap();
            Ok(state
                .files
                .iter()
                .filter(|(f, _)| f.folder_id.as_deref() == Some(folder_id))
                .map(|(f, _)| f.clone())
                .collect())
        }

        async fn delete_file(&self, file_id: &str) -> Result<()> {
            let mut state = self.state.lock().unwrap();
            let before = state.files.len();
            state.files.retain(|(f, _)| f.id != file_id);
            if state.files.len() == before {
                return Err(Error::NotFound(file_id.to_string()));
            }
            Ok(())
        }
    }

    async fn connected_client() -> SyncClient<FakeStore> {
        SyncClient::connect(FakeStore::default(), "drivesync", 4).await.unwrap()
    }

    #[tokio::test]
    async fn test_connect_resolves_hierarchy() {
        let client = connected_client().await;

        assert!(!client.root().id.is_empty());
        for category in Category::ALL {
            let folder = client.folder(category);
            assert!(!folder.id.is_empty());
            assert_eq!(folder.name, category.folder_name());
            assert_eq!(folder.parent_id.as_deref(), Some(client.root().id.as_str()));
        }
    }

    #[tokio::test]
    async fn test_resolve_folder_idempotent() {
        let store = FakeStore::default();
        let first = resolve_folder(&store, "csv_files", None).await.unwrap();
        let second = resolve_folder(&store, "csv_files", None).await.unwrap();
        assert_eq!(first.id, second.id);
    }

    #[tokio::test]
    async fn test_resolve_folder_distinguishes_parents() {
        let store = FakeStore::default();
        let root = resolve_folder(&store, "root", None).await.unwrap();
        let top = resolve_folder(&store, "models", None).await.unwrap();
        let nested = resolve_folder(&store, "models", Some(&root.id)).await.unwrap();
        assert_ne!(top.id, nested.id);
    }

    #[tokio::test]
    async fn test_connect_call_pattern() {
        // Folder resolution is find-before-create, one find per folder
        let client = connected_client().await;

        let state = client.store.state.lock().unwrap();
        assert_eq!(state.find_folder_calls, 1 + Category::ALL.len());
        assert_eq!(state.create_folder_calls, 1 + Category::ALL.len());
    }

    #[tokio::test]
    async fn test_connect_creates_nothing_when_folders_exist() {
        let store = FakeStore::default();
        let root = resolve_folder(&store, "drivesync", None).await.unwrap();
        for category in Category::ALL {
            resolve_folder(&store, category.folder_name(), Some(&root.id))
                .await
                .unwrap();
        }

        let client = SyncClient::connect(store, "drivesync", 4).await.unwrap();
        assert_eq!(client.root().id, root.id);

        let state = client.store.state.lock().unwrap();
        // Only the initial resolution created folders; connect reused them
        assert_eq!(state.create_folder_calls, 1 + Category::ALL.len());
        assert_eq!(state.find_folder_calls, 2 * (1 + Category::ALL.len()));
    }

    #[tokio::test]
    async fn test_upload_then_reupload_same_name_updates() {
        let client = connected_client().await;
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prices.csv");

        std::fs::write(&path, b"open,close\n1,2\n").unwrap();
        let first = client.upload(&path, Category::CsvFiles).await.unwrap();

        std::fs::write(&path, b"open,close\n3,4\n5,6\n").unwrap();
        let second = client.upload(&path, Category::CsvFiles).await.unwrap();

        assert_eq!(first.id, second.id);
        let listed = client.list(Category::CsvFiles).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].name, "prices.csv");
        assert_eq!(listed[0].size, Some(19));
    }

    #[tokio::test]
    async fn test_upload_missing_local_file() {
        let client = connected_client().await;
        let result = client
            .upload(Path::new("/nonexistent/prices.csv"), Category::CsvFiles)
            .await;
        assert!(matches!(result, Err(Error::NotFound(_))));
    }

    #[tokio::test]
    async fn test_upload_same_name_different_categories() {
        let client = connected_client().await;
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.bin");
        std::fs::write(&path, b"weights").unwrap();

        client.upload(&path, Category::CsvFiles).await.unwrap();
        client.upload(&path, Category::Models).await.unwrap();

        assert_eq!(client.list(Category::CsvFiles).await.unwrap().len(), 1);
        assert_eq!(client.list(Category::Models).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_download_round_trip_creates_parents() {
        let client = connected_client().await;
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("prices.csv");
        // Content longer than the 4-byte test chunk size
        let content = b"time,open,high,low,close\n1,2,3,4,5\n".to_vec();
        std::fs::write(&src, &content).unwrap();

        let uploaded = client.upload(&src, Category::CsvFiles).await.unwrap();

        let dest = dir.path().join("nested").join("out").join("prices.csv");
        let mut reports = Vec::new();
        let written = client
            .download(&uploaded.id, &dest, |done, total| reports.push((done, total)))
            .await
            .unwrap();

        assert_eq!(written, content.len() as u64);
        assert_eq!(std::fs::read(&dest).unwrap(), content);
        // One report per chunk, monotonically increasing, ending at total
        assert!(!reports.is_empty());
        assert!(reports.windows(2).all(|w| w[0].0 < w[1].0));
        assert_eq!(reports.last().unwrap(), &(content.len() as u64, content.len() as u64));
    }

    #[tokio::test]
    async fn test_download_unknown_id() {
        let client = connected_client().await;
        let dir = tempfile::tempdir().unwrap();
        let result = client
            .download("file-missing", &dir.path().join("out.csv"), |_, _| {})
            .await;
        assert!(matches!(result, Err(Error::NotFound(_))));
    }

    #[tokio::test]
    async fn test_list_empty_then_one() {
        let client = connected_client().await;
        assert!(client.list(Category::Models).await.unwrap().is_empty());

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("agent.onnx");
        std::fs::write(&path, b"model bytes").unwrap();
        client.upload(&path, Category::Models).await.unwrap();

        let listed = client.list(Category::Models).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].name, "agent.onnx");
    }

    #[tokio::test]
    async fn test_delete_removes_from_listing() {
        let client = connected_client().await;
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("old.csv");
        std::fs::write(&path, b"stale").unwrap();

        let uploaded = client.upload(&path, Category::CsvFiles).await.unwrap();
        client.delete(&uploaded.id).await.unwrap();

        assert!(client.list(Category::CsvFiles).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_unknown_id_reports_not_found() {
        let client = connected_client().await;
        let result = client.delete("file-404").await;
        assert!(matches!(result, Err(Error::NotFound(_))));
    }
}
