//! Drive REST client
//!
//! Wraps the Drive v3 files API behind the RemoteStore trait from
//! dsync-core. Uploads use the resumable protocol (metadata request first,
//! then content to the returned session URI); downloads use ranged media
//! requests.

use async_trait::async_trait;
use jiff::Timestamp;
use serde::Deserialize;
use tracing::debug;

use dsync_core::{Error, FolderRef, RemoteFile, RemoteStore, Result};

use crate::auth::Session;

const DRIVE_API_URL: &str = "https://www.googleapis.com/drive/v3";
const DRIVE_UPLOAD_URL: &str = "https://www.googleapis.com/upload/drive/v3";
const FOLDER_MIME: &str = "application/vnd.google-apps.folder";
const FILE_FIELDS: &str = "id,name,parents,size,createdTime,modifiedTime";
const LIST_PAGE_SIZE: u32 = 1000;

/// Drive file resource, as returned by the files API
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FileResource {
    id: String,
    name: String,
    #[serde(default)]
    parents: Vec<String>,
    /// The API reports size as a decimal string
    #[serde(default)]
    size: Option<String>,
    #[serde(default)]
    created_time: Option<Timestamp>,
    #[serde(default)]
    modified_time: Option<Timestamp>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FileList {
    #[serde(default)]
    files: Vec<FileResource>,
    #[serde(default)]
    next_page_token: Option<String>,
}

impl From<FileResource> for RemoteFile {
    fn from(res: FileResource) -> Self {
        let size = res.size.as_deref().and_then(|s| s.parse().ok());
        RemoteFile {
            id: res.id,
            name: res.name,
            folder_id: res.parents.into_iter().next(),
            size,
            created_time: res.created_time,
            modified_time: res.modified_time,
        }
    }
}

/// Truncate an error body for reporting, respecting char boundaries
pub(crate) fn truncate_detail(body: &str) -> &str {
    const MAX: usize = 200;
    if body.len() <= MAX {
        return body;
    }
    let mut end = MAX;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    &body[..end]
}

/// Escape a name for use inside a single-quoted query literal
fn escape_name(name: &str) -> String {
    name.replace('\\', "\\\\").replace('\'', "\\'")
}

/// Build the query for a folder lookup by name and parent
fn folder_query(name: &str, parent_id: Option<&str>) -> String {
    let mut q = format!(
        "name='{}' and mimeType='{FOLDER_MIME}' and trashed=false",
        escape_name(name)
    );
    if let Some(parent) = parent_id {
        q.push_str(&format!(" and '{}' in parents", escape_name(parent)));
    }
    q
}

/// Build the query for a file lookup by name within a folder
fn file_query(name: &str, folder_id: &str) -> String {
    format!(
        "name='{}' and '{}' in parents and mimeType!='{FOLDER_MIME}' and trashed=false",
        escape_name(name),
        escape_name(folder_id)
    )
}

/// Build the query for listing a folder's files
fn list_query(folder_id: &str) -> String {
    format!(
        "'{}' in parents and mimeType!='{FOLDER_MIME}' and trashed=false",
        escape_name(folder_id)
    )
}

/// Drive client holding a pre-authenticated session
pub struct DriveClient {
    http: reqwest::Client,
    session: Session,
    api_base: String,
    upload_base: String,
}

impl DriveClient {
    /// Create a new Drive client from a validated session
    pub fn new(session: Session) -> Result<Self> {
        Self::with_base_urls(session, DRIVE_API_URL, DRIVE_UPLOAD_URL)
    }

    /// Create a client against custom endpoints (integration tests)
    pub fn with_base_urls(
        session: Session,
        api_base: impl Into<String>,
        upload_base: impl Into<String>,
    ) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent("dsync/0.1")
            .build()
            .map_err(|e| Error::Transfer(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            session,
            api_base: api_base.into(),
            upload_base: upload_base.into(),
        })
    }

    /// Map a non-success response to an error, consuming the body
    async fn fail(path: &str, response: reqwest::Response) -> Error {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        let detail = truncate_detail(&body);
        match status.as_u16() {
            401 => Error::AuthExpired(format!("{path}: {detail}")),
            404 => Error::NotFound(path.to_string()),
            _ => Error::Transfer(format!("{path} returned {status}: {detail}")),
        }
    }

    async fn query_files(&self, q: &str, page_token: Option<&str>) -> Result<FileList> {
        let url = format!("{}/files", self.api_base);
        let fields = format!("nextPageToken, files({FILE_FIELDS})");
        let page_size = LIST_PAGE_SIZE.to_string();
        let mut request = self
            .http
            .get(&url)
            .bearer_auth(self.session.bearer())
            .query(&[
                ("q", q),
                ("spaces", "drive"),
                ("fields", fields.as_str()),
                ("pageSize", page_size.as_str()),
            ]);
        if let Some(token) = page_token {
            request = request.query(&[("pageToken", token)]);
        }

        let response = request
            .send()
            .await
            .map_err(|e| Error::Transfer(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Self::fail("files.list", response).await);
        }

        response
            .json()
            .await
            .map_err(|e| Error::Transfer(e.to_string()))
    }

    /// Open a resumable upload session and return the content URI
    async fn open_upload(
        &self,
        method: reqwest::Method,
        url: &str,
        metadata: serde_json::Value,
        content_type: Option<&str>,
    ) -> Result<String> {
        let mut request = self
            .http
            .request(method, url)
            .bearer_auth(self.session.bearer())
            .query(&[("uploadType", "resumable"), ("fields", FILE_FIELDS)])
            .json(&metadata);
        if let Some(ct) = content_type {
            request = request.header("X-Upload-Content-Type", ct);
        }

        let response = request
            .send()
            .await
            .map_err(|e| Error::Transfer(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Self::fail("upload.open", response).await);
        }

        response
            .headers()
            .get(reqwest::header::LOCATION)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string())
            .ok_or_else(|| Error::Transfer("Upload session URI missing from response".into()))
    }

    /// Send the file bytes to a resumable session URI
    async fn send_upload(
        &self,
        session_uri: &str,
        data: Vec<u8>,
        content_type: Option<&str>,
    ) -> Result<RemoteFile> {
        let mut request = self
            .http
            .put(session_uri)
            .bearer_auth(self.session.bearer())
            .body(data);
        if let Some(ct) = content_type {
            request = request.header(reqwest::header::CONTENT_TYPE, ct);
        }

        let response = request
            .send()
            .await
            .map_err(|e| Error::Transfer(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Self::fail("upload.content", response).await);
        }

        let resource: FileResource = response
            .json()
            .await
            .map_err(|e| Error::Transfer(e.to_string()))?;
        Ok(resource.into())
    }
}

#[async_trait]
impl RemoteStore for DriveClient {
    async fn find_folder(
        &self,
        name: &str,
        parent_id: Option<&str>,
    ) -> Result<Option<FolderRef>> {
        let list = self
            .query_files(&folder_query(name, parent_id), None)
            .await?;

        Ok(list.files.into_iter().next().map(|res| FolderRef {
            id: res.id,
            name: res.name,
            parent_id: parent_id.map(|p| p.to_string()),
        }))
    }

    async fn create_folder(&self, name: &str, parent_id: Option<&str>) -> Result<FolderRef> {
        let url = format!("{}/files", self.api_base);
        let mut metadata = serde_json::json!({
            "name": name,
            "mimeType": FOLDER_MIME,
        });
        if let Some(parent) = parent_id {
            metadata["parents"] = serde_json::json!([parent]);
        }

        let response = self
            .http
            .post(&url)
            .bearer_auth(self.session.bearer())
            .query(&[("fields", "id,name,parents")])
            .json(&metadata)
            .send()
            .await
            .map_err(|e| Error::Transfer(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Self::fail("files.create", response).await);
        }

        let resource: FileResource = response
            .json()
            .await
            .map_err(|e| Error::Transfer(e.to_string()))?;

        debug!(folder = name, id = %resource.id, "created remote folder");
        Ok(FolderRef {
            id: resource.id,
            name: resource.name,
            parent_id: parent_id.map(|p| p.to_string()),
        })
    }

    async fn find_file(&self, name: &str, folder_id: &str) -> Result<Option<RemoteFile>> {
        let list = self.query_files(&file_query(name, folder_id), None).await?;
        Ok(list.files.into_iter().next().map(RemoteFile::from))
    }

    async fn create_file(
        &self,
        name: &str,
        folder_id: &str,
        data: Vec<u8>,
        content_type: Option<&str>,
    ) -> Result<RemoteFile> {
        let url = format!("{}/files", self.upload_base);
        let metadata = serde_json::json!({
            "name": name,
            "parents": [folder_id],
        });

        let session_uri = self
            .open_upload(reqwest::Method::POST, &url, metadata, content_type)
            .await?;
        self.send_upload(&session_uri, data, content_type).await
    }

    async fn update_file(
        &self,
        file_id: &str,
        data: Vec<u8>,
        content_type: Option<&str>,
    ) -> Result<RemoteFile> {
        let url = format!("{}/files/{file_id}", self.upload_base);

        let session_uri = self
            .open_upload(
                reqwest::Method::PATCH,
                &url,
                serde_json::json!({}),
                content_type,
            )
            .await?;
        self.send_upload(&session_uri, data, content_type).await
    }

    async fn file_metadata(&self, file_id: &str) -> Result<RemoteFile> {
        let url = format!("{}/files/{file_id}", self.api_base);
        let response = self
            .http
            .get(&url)
            .bearer_auth(self.session.bearer())
            .query(&[("fields", FILE_FIELDS)])
            .send()
            .await
            .map_err(|e| Error::Transfer(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Self::fail("files.get", response).await);
        }

        let resource: FileResource = response
            .json()
            .await
            .map_err(|e| Error::Transfer(e.to_string()))?;
        Ok(resource.into())
    }

    async fn read_chunk(&self, file_id: &str, offset: u64, len: u64) -> Result<Vec<u8>> {
        let url = format!("{}/files/{file_id}", self.api_base);
        let end = offset + len.max(1) - 1;

        let response = self
            .http
            .get(&url)
            .bearer_auth(self.session.bearer())
            .query(&[("alt", "media")])
            .header(reqwest::header::RANGE, format!("bytes={offset}-{end}"))
            .send()
            .await
            .map_err(|e| Error::Transfer(e.to_string()))?;

        // Reading past the end of the file yields an unsatisfiable range
        if response.status().as_u16() == 416 {
            return Ok(Vec::new());
        }

        if !response.status().is_success() {
            return Err(Self::fail("files.get media", response).await);
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| Error::Transfer(e.to_string()))?;
        Ok(bytes.to_vec())
    }

    async fn list_files(&self, folder_id: &str) -> Result<Vec<RemoteFile>> {
        let q = list_query(folder_id);
        let mut files = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let list = self.query_files(&q, page_token.as_deref()).await?;
            files.extend(list.files.into_iter().map(RemoteFile::from));

            match list.next_page_token {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        Ok(files)
    }

    async fn delete_file(&self, file_id: &str) -> Result<()> {
        let url = format!("{}/files/{file_id}", self.api_base);
        let response = self
            .http
            .delete(&url)
            .bearer_auth(self.session.bearer())
            .send()
            .await
            .map_err(|e| Error::Transfer(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Self::fail("files.delete", response).await);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_detail_char_boundary() {
        // A long body of multi-byte characters must truncate without
        // splitting a character
        let body = "\u{2026}".repeat(100);
        assert_eq!(body.len(), 300);
        let detail = truncate_detail(&body);
        assert!(detail.len() <= 200);
        assert!(body.starts_with(detail));
        assert!(detail.chars().all(|c| c == '\u{2026}'));
    }

    #[test]
    fn test_truncate_detail_short_body_unchanged() {
        assert_eq!(truncate_detail("notFound"), "notFound");
        assert_eq!(truncate_detail(""), "");
    }

    #[test]
    fn test_client_construction() {
        let client = DriveClient::new(Session::from_access_token("tok"));
        assert!(client.is_ok());
    }

    #[test]
    fn test_escape_name() {
        assert_eq!(escape_name("plain.csv"), "plain.csv");
        assert_eq!(escape_name("o'brien.csv"), "o\\'brien.csv");
        assert_eq!(escape_name("back\\slash"), "back\\\\slash");
    }

    #[test]
    fn test_folder_query() {
        let q = folder_query("csv_files", None);
        assert!(q.starts_with("name='csv_files'"));
        assert!(q.contains(FOLDER_MIME));
        assert!(q.contains("trashed=false"));
        assert!(!q.contains("in parents"));

        let q = folder_query("csv_files", Some("root-1"));
        assert!(q.contains("'root-1' in parents"));
    }

    #[test]
    fn test_file_query() {
        let q = file_query("prices.csv", "folder-9");
        assert!(q.contains("name='prices.csv'"));
        assert!(q.contains("'folder-9' in parents"));
        assert!(q.contains(&format!("mimeType!='{FOLDER_MIME}'")));
    }

    #[test]
    fn test_file_resource_conversion() {
        let json = r#"{
            "id": "1AbC",
            "name": "eurusd_h1.csv",
            "parents": ["folder-1"],
            "size": "20480",
            "createdTime": "2026-01-02T03:04:05Z",
            "modifiedTime": "2026-01-03T03:04:05Z"
        }"#;
        let resource: FileResource = serde_json::from_str(json).unwrap();
        let file = RemoteFile::from(resource);

        assert_eq!(file.id, "1AbC");
        assert_eq!(file.folder_id.as_deref(), Some("folder-1"));
        assert_eq!(file.size, Some(20480));
        assert!(file.created_time.is_some());
    }

    #[test]
    fn test_file_resource_without_size() {
        let json = r#"{"id": "x", "name": "folderish"}"#;
        let resource: FileResource = serde_json::from_str(json).unwrap();
        let file = RemoteFile::from(resource);
        assert!(file.size.is_none());
        assert!(file.folder_id.is_none());
    }

    #[test]
    fn test_file_list_pagination_fields() {
        let json = r#"{"files": [], "nextPageToken": "abc"}"#;
        let list: FileList = serde_json::from_str(json).unwrap();
        assert!(list.files.is_empty());
        assert_eq!(list.next_page_token.as_deref(), Some("abc"));
    }
}
