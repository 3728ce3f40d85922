//! Error types for store operations.

use thiserror::Error;

/// Errors reported by a [`Store`](crate::Store).
#[derive(Debug, Error)]
pub enum StoreError {
    /// Transport failure talking to the store.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Response body could not be decoded.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The key or directory already exists.
    #[error("key already exists: {0}")]
    AlreadyExists(String),

    /// The key does not exist.
    #[error("key not found: {0}")]
    NotFound(String),

    /// A value was addressed where a directory is required.
    #[error("not a directory: {0}")]
    NotADirectory(String),

    /// A directory was addressed where a value is required.
    #[error("not a file: {0}")]
    NotAFile(String),

    /// Any other error reported by etcd.
    #[error("etcd error {code} on {key}: {message}")]
    Etcd {
        code: u64,
        message: String,
        key: String,
    },

    /// A non-success response that is not an etcd error document.
    #[error("unexpected response ({status}): {body}")]
    UnexpectedResponse { status: u16, body: String },
}

/// Convenience alias for results with [`StoreError`].
pub type Result<T> = std::result::Result<T, StoreError>;
