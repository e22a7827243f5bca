use pcloudfs_common::{FsError, FsResult};
use tracing::{debug, warn};

use crate::client::ApiResponse;

pub type ClientResult<T> = Result<T, ClientError>;

/// Failure to complete a call against the remote API at all.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("JSON decode error: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Malformed {method} response: {reason}")]
    Malformed { method: String, reason: String },
    #[error("Download failed: HTTP {status}")]
    Download { status: u16 },
}

/// Result codes meaning the path (or one of its parents) does not exist.
pub const NOT_FOUND_CODES: [u32; 3] = [2002, 2005, 2009];

pub fn is_not_found_code(code: u32) -> bool {
    NOT_FOUND_CODES.contains(&code)
}

/// Turn the outcome of one remote call into the operation's result.
///
/// Transport failures keep their source; a non-zero result code becomes
/// `NotFound` or `Remote` naming `path`; a success without a payload is
/// treated as a malformed response.
pub fn settle<T>(
    outcome: ClientResult<ApiResponse<T>>,
    operation: &'static str,
    path: &str,
) -> FsResult<T> {
    let response = outcome.map_err(|e| FsError::transport(operation, path, e))?;
    if response.result != 0 {
        let message = response.message().to_string();
        if is_not_found_code(response.result) {
            debug!(%path, operation, code = response.result, "Remote path not found");
            return Err(FsError::NotFound {
                path: path.to_string(),
                message,
            });
        }
        warn!(%path, operation, code = response.result, error = %message, "Remote call rejected");
        return Err(FsError::Remote {
            operation,
            path: path.to_string(),
            code: response.result,
            message,
        });
    }
    response.payload.ok_or_else(|| {
        FsError::transport(
            operation,
            path,
            ClientError::Malformed {
                method: operation.to_string(),
                reason: "missing payload".to_string(),
            },
        )
    })
}
