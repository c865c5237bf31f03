//! Service-layer error types

use healthtrack_db::StoreError;
use thiserror::Error;

/// Result type alias for service operations
pub type ServiceResult<T> = std::result::Result<T, ServiceError>;

/// Service-layer error types
#[derive(Error, Debug)]
pub enum ServiceError {
    /// Requested entity does not exist (or is outside the caller's scope)
    #[error("not found: {0}")]
    NotFound(String),

    /// Caller-supplied input failed a service-level check
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// An upstream collaborator (store, AI, identity) failed
    #[error("service unavailable: {0}")]
    Unavailable(String),

    /// Internal service error
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<StoreError> for ServiceError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(msg) => ServiceError::NotFound(msg),
            StoreError::AlreadyExists(msg) => {
                ServiceError::Internal(format!("unexpected duplicate: {}", msg))
            }
            StoreError::Transport(msg) => ServiceError::Unavailable(msg),
            StoreError::Rejected { status, message } => {
                ServiceError::Unavailable(format!("store returned {}: {}", status, message))
            }
            StoreError::InvalidDocument(msg) => ServiceError::Internal(msg),
            StoreError::Configuration(msg) => ServiceError::Internal(msg),
        }
    }
}
