use bytes::Bytes;
use tokio::io::AsyncRead;

use crate::attributes::{FileAttributes, StorageAttributes};
use crate::error::FsResult;
use crate::options::{Visibility, WriteOptions};

/// Readable byte source handed to or returned from streamed operations.
pub type StreamReader = Box<dyn AsyncRead + Send + Unpin>;

/// Single-pass sequence of listing entries. Not restartable.
pub type DirectoryListing = Box<dyn Iterator<Item = StorageAttributes> + Send>;

/// Trait implemented by all filesystem adapters.
///
/// Paths are accepted in any form (with or without leading or trailing
/// slashes); each adapter normalizes them before talking to its store.
/// Every operation either completes or returns one `FsError`; no partial
/// results are mixed with failures.
#[async_trait::async_trait]
pub trait FilesystemAdapter: Send + Sync {
    /// True if `path` exists and is a file. Absence is `Ok(false)`.
    async fn file_exists(&self, path: &str) -> FsResult<bool>;

    /// True if `path` exists and is a directory. Absence is `Ok(false)`.
    async fn directory_exists(&self, path: &str) -> FsResult<bool>;

    /// Write `contents` to `path`, creating missing parent directories.
    async fn write(&self, path: &str, contents: Bytes, options: &WriteOptions) -> FsResult<()>;

    /// Write everything readable from `contents` to `path`.
    ///
    /// The stream stays owned by the caller and is not closed here.
    async fn write_stream(
        &self,
        path: &str,
        contents: &mut (dyn AsyncRead + Send + Unpin),
        options: &WriteOptions,
    ) -> FsResult<()>;

    /// Read the whole content of `path`.
    async fn read(&self, path: &str) -> FsResult<Bytes>;

    /// Open `path` for reading.
    async fn read_stream(&self, path: &str) -> FsResult<StreamReader>;

    async fn delete(&self, path: &str) -> FsResult<()>;

    /// Delete a directory and everything below it.
    async fn delete_directory(&self, path: &str) -> FsResult<()>;

    /// Create `path` and any missing ancestors. Existing levels are fine.
    async fn create_directory(&self, path: &str, options: &WriteOptions) -> FsResult<()>;

    async fn set_visibility(&self, path: &str, visibility: Visibility) -> FsResult<()>;

    async fn visibility(&self, path: &str) -> FsResult<FileAttributes>;

    async fn mime_type(&self, path: &str) -> FsResult<FileAttributes>;

    async fn last_modified(&self, path: &str) -> FsResult<FileAttributes>;

    async fn file_size(&self, path: &str) -> FsResult<FileAttributes>;

    /// List the entries under `path`, descending into subdirectories when
    /// `deep` is set. Directories are yielded before their children.
    async fn list_contents(&self, path: &str, deep: bool) -> FsResult<DirectoryListing>;

    async fn move_file(&self, source: &str, destination: &str, options: &WriteOptions)
        -> FsResult<()>;

    async fn copy(&self, source: &str, destination: &str, options: &WriteOptions) -> FsResult<()>;
}
