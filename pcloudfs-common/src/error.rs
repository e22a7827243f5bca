pub type FsResult<T> = Result<T, FsError>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Failure of a filesystem operation.
#[derive(Debug, thiserror::Error)]
pub enum FsError {
    #[error("Not found: {path}: {message}")]
    NotFound { path: String, message: String },
    #[error("Remote rejected {operation} on {path}: {message} (code {code})")]
    Remote {
        operation: &'static str,
        path: String,
        code: u32,
        message: String,
    },
    #[error("Transport failure during {operation} on {path}: {source}")]
    Transport {
        operation: &'static str,
        path: String,
        #[source]
        source: BoxError,
    },
    #[error("Operation not supported: {0}")]
    Unsupported(&'static str),
    #[error("Invalid input for {path}: {reason}")]
    InvalidInput { path: String, reason: String },
    #[error("Unable to retrieve {attribute} for {path}")]
    MetadataUnavailable {
        path: String,
        attribute: &'static str,
    },
}

impl FsError {
    pub fn transport(
        operation: &'static str,
        path: impl Into<String>,
        source: impl Into<BoxError>,
    ) -> Self {
        FsError::Transport {
            operation,
            path: path.into(),
            source: source.into(),
        }
    }

    pub fn invalid_input(path: impl Into<String>, reason: impl Into<String>) -> Self {
        FsError::InvalidInput {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, FsError::NotFound { .. })
    }

    pub fn is_unsupported(&self) -> bool {
        matches!(self, FsError::Unsupported(_))
    }

    /// The path the failure refers to, if any.
    pub fn path(&self) -> Option<&str> {
        match self {
            FsError::NotFound { path, .. }
            | FsError::Remote { path, .. }
            | FsError::Transport { path, .. }
            | FsError::InvalidInput { path, .. }
            | FsError::MetadataUnavailable { path, .. } => Some(path),
            FsError::Unsupported(_) => None,
        }
    }
}
