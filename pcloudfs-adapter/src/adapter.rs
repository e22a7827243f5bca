//! pCloud implementation of the filesystem adapter contract.
//!
//! Each operation normalizes its paths, issues the remote calls it needs
//! strictly one after another, and settles every response code before
//! using the payload. Writes always ensure the parent folder exists
//! first; an existing folder counts as success.

use std::io::Cursor;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use pcloudfs_common::{
    DirectoryListing, FileAttributes, FilesystemAdapter, FsError, FsResult, StreamReader,
    Visibility, WriteOptions,
};
use tokio::io::AsyncRead;
use tracing::debug;

use crate::client::{RemoteMetadata, RemoteStorageClient};
use crate::config::{AdapterConfig, Region};
use crate::error::{settle, ClientError};
use crate::http::HttpClient;
use crate::listing::Flatten;
use crate::path;
use crate::upload::{read_chunk, UploadSession, CHUNK_SIZE};

/// Folder id of the account root.
const ROOT_FOLDER_ID: u64 = 0;

pub struct PCloudAdapter {
    region: Region,
    base_url: &'static str,
    client: Arc<dyn RemoteStorageClient>,
}

impl PCloudAdapter {
    pub fn new(config: &AdapterConfig) -> Result<Self, ClientError> {
        let client = HttpClient::new(config)?;
        Ok(Self::with_client(config.region, Arc::new(client)))
    }

    /// Build an adapter over any implementation of the remote API.
    pub fn with_client(region: Region, client: Arc<dyn RemoteStorageClient>) -> Self {
        Self {
            region,
            base_url: region.base_url(),
            client,
        }
    }

    pub fn region(&self) -> Region {
        self.region
    }

    pub fn base_url(&self) -> &str {
        self.base_url
    }

    /// Delete a folder only if it is empty.
    pub async fn delete_empty_directory(&self, path: &str) -> FsResult<()> {
        let path = path::normalize(path);
        settle(self.client.delete_folder(&path).await, "deletefolder", &path)?;
        debug!(%path, "Empty directory deleted");
        Ok(())
    }

    async fn stat(&self, path: &str) -> FsResult<RemoteMetadata> {
        Ok(settle(self.client.stat(path).await, "stat", path)?.metadata)
    }

    /// `Ok(None)` when the path does not exist.
    async fn stat_if_exists(&self, path: &str) -> FsResult<Option<RemoteMetadata>> {
        match self.stat(path).await {
            Ok(meta) => Ok(Some(meta)),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Create every level of `dir` from the top down. Returns the folder
    /// id of the last level, if the API reported one.
    async fn create_levels(&self, dir: &str) -> FsResult<Option<u64>> {
        let mut folder_id = None;
        for level in path::ancestors_inclusive(dir) {
            let created = settle(
                self.client.create_folder_if_absent(&level).await,
                "createfolderifnotexists",
                &level,
            )?;
            folder_id = created.metadata.folder_id;
        }
        Ok(folder_id)
    }

    /// Make sure `dir` exists and return its folder id.
    async fn ensure_folder(&self, dir: &str) -> FsResult<u64> {
        if dir == path::ROOT {
            return Ok(ROOT_FOLDER_ID);
        }
        if let Some(id) = self.create_levels(dir).await? {
            return Ok(id);
        }
        self.stat(dir)
            .await?
            .folder_id
            .ok_or_else(|| FsError::MetadataUnavailable {
                path: dir.to_string(),
                attribute: "folder id",
            })
    }

    /// Normalized path, its parent and its file name. Fails for the root.
    fn write_target(path: &str) -> FsResult<(String, String, String)> {
        let path = path::normalize(path);
        let name = path::base_name(&path)
            .ok_or_else(|| FsError::invalid_input(&path, "path has no file name"))?;
        let parent = path::parent_of(&path);
        Ok((path, parent, name))
    }

    async fn attributes(&self, path: &str) -> FsResult<(String, FileAttributes)> {
        let path = path::normalize(path);
        let meta = self.stat(&path).await?;
        let attrs = meta.to_file_attributes(path.clone());
        Ok((path, attrs))
    }
}

#[async_trait]
impl FilesystemAdapter for PCloudAdapter {
    async fn file_exists(&self, path: &str) -> FsResult<bool> {
        let path = path::normalize(path);
        Ok(self
            .stat_if_exists(&path)
            .await?
            .map(|meta| !meta.is_folder)
            .unwrap_or(false))
    }

    async fn directory_exists(&self, path: &str) -> FsResult<bool> {
        let path = path::normalize(path);
        Ok(self
            .stat_if_exists(&path)
            .await?
            .map(|meta| meta.is_folder)
            .unwrap_or(false))
    }

    async fn write(&self, path: &str, contents: Bytes, _options: &WriteOptions) -> FsResult<()> {
        let (path, parent, name) = Self::write_target(path)?;
        let folder_id = self.ensure_folder(&parent).await?;

        let client = self.client.as_ref();
        let len = contents.len();
        UploadSession::open(client, &path)
            .await?
            .write(client, &path, contents)
            .await?
            .save(client, &path, &name, folder_id)
            .await?;

        debug!(%path, bytes = len, "File written");
        Ok(())
    }

    async fn write_stream(
        &self,
        path: &str,
        contents: &mut (dyn AsyncRead + Send + Unpin),
        _options: &WriteOptions,
    ) -> FsResult<()> {
        let (path, parent, name) = Self::write_target(path)?;
        let folder_id = self.ensure_folder(&parent).await?;

        let client = self.client.as_ref();
        let mut session = UploadSession::open(client, &path).await?;
        let mut buf = vec![0u8; CHUNK_SIZE];
        loop {
            let n = read_chunk(&mut *contents, &mut buf)
                .await
                .map_err(|e| FsError::transport("read", &path, ClientError::Io(e)))?;
            if n == 0 {
                break;
            }
            session = session
                .write(client, &path, Bytes::copy_from_slice(&buf[..n]))
                .await?;
        }

        let written = session.offset();
        session.save(client, &path, &name, folder_id).await?;
        debug!(%path, bytes = written, "File stream written");
        Ok(())
    }

    async fn read(&self, path: &str) -> FsResult<Bytes> {
        let path = path::normalize(path);
        let link = settle(
            self.client.get_download_link(&path).await,
            "getfilelink",
            &path,
        )?;
        let url = link.url().ok_or_else(|| {
            FsError::transport(
                "getfilelink",
                &path,
                ClientError::Malformed {
                    method: "getfilelink".to_string(),
                    reason: "no download host returned".to_string(),
                },
            )
        })?;

        let body = self
            .client
            .download(&url)
            .await
            .map_err(|e| FsError::transport("download", &path, e))?;
        debug!(%path, bytes = body.len(), "File read");
        Ok(body)
    }

    async fn read_stream(&self, path: &str) -> FsResult<StreamReader> {
        // No ranged or streamed fetch exists; the body is fetched whole.
        let body = self.read(path).await?;
        Ok(Box::new(Cursor::new(body)))
    }

    async fn delete(&self, path: &str) -> FsResult<()> {
        let path = path::normalize(path);
        settle(self.client.delete_file(&path).await, "deletefile", &path)?;
        debug!(%path, "File deleted");
        Ok(())
    }

    async fn delete_directory(&self, path: &str) -> FsResult<()> {
        let path = path::normalize(path);
        settle(
            self.client.delete_folder_recursive(&path).await,
            "deletefolderrecursive",
            &path,
        )?;
        debug!(%path, "Directory deleted");
        Ok(())
    }

    async fn create_directory(&self, path: &str, _options: &WriteOptions) -> FsResult<()> {
        let path = path::normalize(path);
        self.create_levels(&path).await?;
        debug!(%path, "Directory ensured");
        Ok(())
    }

    async fn set_visibility(&self, _path: &str, _visibility: Visibility) -> FsResult<()> {
        Err(FsError::Unsupported("set_visibility"))
    }

    async fn visibility(&self, _path: &str) -> FsResult<FileAttributes> {
        Err(FsError::Unsupported("visibility"))
    }

    async fn mime_type(&self, path: &str) -> FsResult<FileAttributes> {
        let (path, attrs) = self.attributes(path).await?;
        if attrs.mime_type.is_none() {
            return Err(FsError::MetadataUnavailable {
                path,
                attribute: "mime type",
            });
        }
        Ok(attrs)
    }

    async fn last_modified(&self, path: &str) -> FsResult<FileAttributes> {
        let (path, attrs) = self.attributes(path).await?;
        if attrs.last_modified.is_none() {
            return Err(FsError::MetadataUnavailable {
                path,
                attribute: "last modified",
            });
        }
        Ok(attrs)
    }

    async fn file_size(&self, path: &str) -> FsResult<FileAttributes> {
        let (path, attrs) = self.attributes(path).await?;
        if attrs.file_size.is_none() {
            return Err(FsError::MetadataUnavailable {
                path,
                attribute: "file size",
            });
        }
        Ok(attrs)
    }

    async fn list_contents(&self, path: &str, deep: bool) -> FsResult<DirectoryListing> {
        let path = path::normalize(path);
        let listing = settle(
            self.client.list_folder(&path, deep).await,
            "listfolder",
            &path,
        )?;
        let entries = listing.metadata.contents.unwrap_or_default();
        debug!(%path, deep, entries = entries.len(), "Folder listed");
        Ok(Box::new(Flatten::new(&path, entries, deep)))
    }

    async fn move_file(
        &self,
        source: &str,
        destination: &str,
        options: &WriteOptions,
    ) -> FsResult<()> {
        let source = path::normalize(source);
        let destination = path::normalize(destination);
        // Not transactional: the destination folder stays if the rename fails.
        self.create_directory(&path::parent_of(&destination), options)
            .await?;
        settle(
            self.client.rename_file(&source, &destination).await,
            "renamefile",
            &source,
        )?;
        debug!(%source, %destination, "File moved");
        Ok(())
    }

    async fn copy(&self, source: &str, destination: &str, options: &WriteOptions) -> FsResult<()> {
        let source = path::normalize(source);
        let destination = path::normalize(destination);
        self.create_directory(&path::parent_of(&destination), options)
            .await?;
        settle(
            self.client.copy_file(&source, &destination).await,
            "copyfile",
            &source,
        )?;
        debug!(%source, %destination, "File copied");
        Ok(())
    }
}
