//! Chunked upload sessions.
//!
//! A session is opened with `upload_create`, advanced by one
//! `upload_write` per chunk and bound to a folder and name by
//! `upload_save`. Writing and saving consume the session, so a session
//! that failed a chunk or was already saved cannot be used again.

use bytes::Bytes;
use pcloudfs_common::FsResult;
use tokio::io::{AsyncRead, AsyncReadExt};
use tracing::debug;

use crate::client::RemoteStorageClient;
use crate::error::settle;

/// Size of each chunk sent by streamed writes.
pub const CHUNK_SIZE: usize = 1024 * 1024;

#[derive(Debug)]
pub struct UploadSession {
    upload_id: u64,
    offset: u64,
}

impl UploadSession {
    pub async fn open(client: &dyn RemoteStorageClient, path: &str) -> FsResult<Self> {
        let created = settle(client.upload_create().await, "upload_create", path)?;
        debug!(%path, upload_id = created.upload_id, "Upload session opened");
        Ok(Self {
            upload_id: created.upload_id,
            offset: 0,
        })
    }

    pub fn upload_id(&self) -> u64 {
        self.upload_id
    }

    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Send `data` at the current offset and advance by its actual length.
    pub async fn write(
        mut self,
        client: &dyn RemoteStorageClient,
        path: &str,
        data: Bytes,
    ) -> FsResult<Self> {
        let len = data.len() as u64;
        settle(
            client.upload_write(self.upload_id, self.offset, data).await,
            "upload_write",
            path,
        )?;
        self.offset += len;
        Ok(self)
    }

    /// Bind the uploaded bytes to `name` inside `folder_id`.
    pub async fn save(
        self,
        client: &dyn RemoteStorageClient,
        path: &str,
        name: &str,
        folder_id: u64,
    ) -> FsResult<()> {
        settle(
            client.upload_save(self.upload_id, name, folder_id).await,
            "upload_save",
            path,
        )?;
        debug!(%path, upload_id = self.upload_id, bytes = self.offset, "Upload saved");
        Ok(())
    }
}

/// Fill `buf` from `reader`, stopping early only at end of input.
/// Returns the number of bytes read; `0` means the input is drained.
pub async fn read_chunk<R>(reader: &mut R, buf: &mut [u8]) -> std::io::Result<usize>
where
    R: AsyncRead + Unpin + ?Sized,
{
    let mut filled = 0;
    while filled < buf.len() {
        let n = reader.read(&mut buf[filled..]).await?;
        if n == 0 {
            break;
        }
        filled += n;
    }
    Ok(filled)
}
