pub mod attributes;
pub mod backend;
pub mod error;
pub mod options;

pub use attributes::{DirectoryAttributes, ExtraMetadata, FileAttributes, StorageAttributes};
pub use backend::{DirectoryListing, FilesystemAdapter, StreamReader};
pub use error::{FsError, FsResult};
pub use options::{Visibility, WriteOptions};
