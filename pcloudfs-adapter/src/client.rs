//! Remote storage capability set used by the adapter.
//!
//! Every call returns the API's result envelope: `result == 0` carries a
//! payload, anything else carries an error message. Callers must check
//! the code (see [`crate::error::settle`]) before touching the payload.

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use pcloudfs_common::{DirectoryAttributes, ExtraMetadata, FileAttributes};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::error::{ClientError, ClientResult};

/// Payload for calls whose success carries nothing we read.
pub type Empty = serde::de::IgnoredAny;

#[derive(Debug, Clone)]
pub struct ApiResponse<T> {
    pub result: u32,
    pub error: Option<String>,
    pub payload: Option<T>,
}

impl<T> ApiResponse<T> {
    pub fn ok(payload: T) -> Self {
        Self {
            result: 0,
            error: None,
            payload: Some(payload),
        }
    }

    pub fn failed(code: u32, message: impl Into<String>) -> Self {
        Self {
            result: code,
            error: Some(message.into()),
            payload: None,
        }
    }

    pub fn message(&self) -> &str {
        self.error.as_deref().unwrap_or("unknown error")
    }
}

impl<T: DeserializeOwned> ApiResponse<T> {
    /// Decode a raw response body. The payload is only decoded on success.
    pub fn from_json(method: &str, value: serde_json::Value) -> ClientResult<Self> {
        let result = value
            .get("result")
            .and_then(|v| v.as_u64())
            .ok_or_else(|| ClientError::Malformed {
                method: method.to_string(),
                reason: "missing result code".to_string(),
            })?;
        let result = u32::try_from(result).map_err(|_| ClientError::Malformed {
            method: method.to_string(),
            reason: format!("result code out of range: {result}"),
        })?;

        if result != 0 {
            let error = value
                .get("error")
                .and_then(|v| v.as_str())
                .map(|s| s.to_string());
            return Ok(Self {
                result,
                error,
                payload: None,
            });
        }

        Ok(Self::ok(serde_json::from_value(value)?))
    }
}

// ── Payloads ──

#[derive(Debug, Clone, Deserialize)]
pub struct MetadataEnvelope {
    pub metadata: RemoteMetadata,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UploadCreated {
    #[serde(rename = "uploadid")]
    pub upload_id: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FileLink {
    #[serde(default)]
    pub hosts: Vec<String>,
    #[serde(default)]
    pub path: String,
}

impl FileLink {
    /// Direct URL on the first download host, if the API returned one.
    pub fn url(&self) -> Option<String> {
        self.hosts
            .first()
            .filter(|h| !h.is_empty())
            .map(|host| format!("https://{}{}", host, self.path))
    }
}

/// Metadata record for one file or folder as returned by stat/list calls.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct RemoteMetadata {
    #[serde(default, rename = "isfolder")]
    pub is_folder: bool,
    pub name: Option<String>,
    pub path: Option<String>,
    pub size: Option<u64>,
    pub modified: Option<String>,
    #[serde(rename = "contenttype")]
    pub content_type: Option<String>,
    #[serde(rename = "folderid")]
    pub folder_id: Option<u64>,
    #[serde(rename = "fileid")]
    pub file_id: Option<u64>,
    pub contents: Option<Vec<RemoteMetadata>>,
}

impl RemoteMetadata {
    /// `modified` is an RFC 2822 date, e.g. `Thu, 19 Sep 2013 07:31:46 +0000`.
    pub fn modified_at(&self) -> Option<DateTime<Utc>> {
        self.modified
            .as_deref()
            .and_then(|m| DateTime::parse_from_rfc2822(m).ok())
            .map(|t| t.with_timezone(&Utc))
    }

    fn extra(&self) -> ExtraMetadata {
        ExtraMetadata {
            is_folder: self.is_folder,
            file_id: self.file_id,
            folder_id: self.folder_id,
        }
    }

    pub fn to_file_attributes(&self, path: impl Into<String>) -> FileAttributes {
        FileAttributes {
            path: path.into(),
            file_size: self.size,
            mime_type: self.content_type.clone(),
            last_modified: self.modified_at(),
            extra: self.extra(),
        }
    }

    pub fn to_directory_attributes(&self, path: impl Into<String>) -> DirectoryAttributes {
        DirectoryAttributes {
            path: path.into(),
            last_modified: self.modified_at(),
            extra: self.extra(),
        }
    }
}

/// Path-addressed operations of the remote storage API.
#[async_trait]
pub trait RemoteStorageClient: Send + Sync {
    async fn stat(&self, path: &str) -> ClientResult<ApiResponse<MetadataEnvelope>>;

    /// Succeeds when the folder already exists.
    async fn create_folder_if_absent(&self, path: &str)
        -> ClientResult<ApiResponse<MetadataEnvelope>>;

    async fn delete_file(&self, path: &str) -> ClientResult<ApiResponse<Empty>>;

    /// Fails unless the folder is empty.
    async fn delete_folder(&self, path: &str) -> ClientResult<ApiResponse<Empty>>;

    async fn delete_folder_recursive(&self, path: &str) -> ClientResult<ApiResponse<Empty>>;

    async fn list_folder(
        &self,
        path: &str,
        recursive: bool,
    ) -> ClientResult<ApiResponse<MetadataEnvelope>>;

    async fn get_download_link(&self, path: &str) -> ClientResult<ApiResponse<FileLink>>;

    /// Fetch a download link's body. Plain transport, no result envelope.
    async fn download(&self, url: &str) -> ClientResult<Bytes>;

    async fn upload_create(&self) -> ClientResult<ApiResponse<UploadCreated>>;

    async fn upload_write(
        &self,
        upload_id: u64,
        offset: u64,
        data: Bytes,
    ) -> ClientResult<ApiResponse<Empty>>;

    async fn upload_save(
        &self,
        upload_id: u64,
        name: &str,
        folder_id: u64,
    ) -> ClientResult<ApiResponse<Empty>>;

    async fn rename_file(&self, path: &str, to_path: &str) -> ClientResult<ApiResponse<Empty>>;

    async fn copy_file(&self, path: &str, to_path: &str) -> ClientResult<ApiResponse<Empty>>;
}
