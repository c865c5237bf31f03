//! Store-layer error types

use thiserror::Error;

/// Result type alias for store operations
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Errors raised by document-store implementations
#[derive(Debug, Error)]
pub enum StoreError {
    /// Document not found where one was required
    #[error("document not found: {0}")]
    NotFound(String),

    /// A create hit an already-existing document
    #[error("document already exists: {0}")]
    AlreadyExists(String),

    /// Transport-level failure reaching the store
    #[error("store unreachable: {0}")]
    Transport(String),

    /// The store rejected the request (bad credential, quota, ...)
    #[error("store rejected request with status {status}: {message}")]
    Rejected { status: u16, message: String },

    /// A stored document could not be decoded into a domain type
    #[error("invalid stored document: {0}")]
    InvalidDocument(String),

    /// Store client misconfiguration
    #[error("store configuration error: {0}")]
    Configuration(String),
}

impl From<reqwest::Error> for StoreError {
    fn from(err: reqwest::Error) -> Self {
        StoreError::Transport(err.to_string())
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::InvalidDocument(err.to_string())
    }
}
