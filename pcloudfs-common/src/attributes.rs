use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ── File Attributes ──

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FileAttributes {
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_size: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<DateTime<Utc>>,
    #[serde(default)]
    pub extra: ExtraMetadata,
}

/// Provider-specific flags carried alongside the portable attributes.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ExtraMetadata {
    pub is_folder: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub folder_id: Option<u64>,
}

impl FileAttributes {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            file_size: None,
            mime_type: None,
            last_modified: None,
            extra: ExtraMetadata::default(),
        }
    }

    pub fn last_modified_timestamp(&self) -> Option<i64> {
        self.last_modified.map(|t| t.timestamp())
    }
}

// ── Directory Attributes ──

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DirectoryAttributes {
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<DateTime<Utc>>,
    #[serde(default)]
    pub extra: ExtraMetadata,
}

impl DirectoryAttributes {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            last_modified: None,
            extra: ExtraMetadata {
                is_folder: true,
                ..Default::default()
            },
        }
    }
}

// ── Listing entries ──

/// One entry of a directory listing: either a file or a directory.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum StorageAttributes {
    File(FileAttributes),
    Dir(DirectoryAttributes),
}

impl StorageAttributes {
    pub fn path(&self) -> &str {
        match self {
            StorageAttributes::File(f) => &f.path,
            StorageAttributes::Dir(d) => &d.path,
        }
    }

    pub fn is_file(&self) -> bool {
        matches!(self, StorageAttributes::File(_))
    }

    pub fn is_dir(&self) -> bool {
        matches!(self, StorageAttributes::Dir(_))
    }

    pub fn last_modified(&self) -> Option<DateTime<Utc>> {
        match self {
            StorageAttributes::File(f) => f.last_modified,
            StorageAttributes::Dir(d) => d.last_modified,
        }
    }
}
