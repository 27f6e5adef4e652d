//! Error types for the fumigation client.
//!
//! Expected HTTP failures (bad credentials, 5xx, timeouts) are not errors here:
//! they come back as [`ApiResponse::Failure`](crate::http::ApiResponse). These
//! types cover what a caller cannot reasonably handle inline.

use thiserror::Error;

/// Result type for fumigation client operations.
pub type Result<T> = std::result::Result<T, ClientError>;

/// Fumigation client errors.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Configuration error (missing API URL, unparsable setting)
    #[error("Configuration error: {0}")]
    Config(String),

    /// The backend answered 2xx but the payload did not have the expected shape
    #[error("Decode error at {path}: {message}")]
    Decode { path: String, message: String },

    /// A request body could not be serialized
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Could not build the underlying HTTP client
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    /// Client-side form validation rejected the input
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Session storage failed in a way the caller asked to observe
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

impl ClientError {
    pub fn decode(path: impl Into<String>, err: impl std::fmt::Display) -> Self {
        ClientError::Decode {
            path: path.into(),
            message: err.to_string(),
        }
    }
}

/// Errors raised by a [`SessionStorage`](crate::session::SessionStorage) backend.
///
/// The token store swallows these and treats the key as absent.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Storage lock poisoned")]
    Poisoned,
}
