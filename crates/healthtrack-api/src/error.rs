//! API error handling
//!
//! GraphQL-visible failures carry a machine-readable `code` extension.
//! Failures of the HTTP adapter itself never leak detail to the client; they
//! produce a fixed 500 envelope and the detail goes to the logs.

use async_graphql::{Error as GqlError, ErrorExtensions};
use chrono::Utc;
use healthtrack_service::ServiceError;
use serde::Serialize;

pub const UNAUTHENTICATED: &str = "UNAUTHENTICATED";
pub const FORBIDDEN: &str = "FORBIDDEN";
pub const BAD_USER_INPUT: &str = "BAD_USER_INPUT";
pub const SERVICE_UNAVAILABLE: &str = "SERVICE_UNAVAILABLE";
pub const INTERNAL_ERROR: &str = "INTERNAL_ERROR";

fn coded(message: impl Into<String>, code: &'static str) -> GqlError {
    GqlError::new(message.into()).extend_with(|_, e| e.set("code", code))
}

pub fn unauthenticated() -> GqlError {
    coded("Authentication required", UNAUTHENTICATED)
}

pub fn forbidden() -> GqlError {
    coded("Insufficient permissions", FORBIDDEN)
}

pub fn bad_input(message: impl Into<String>) -> GqlError {
    coded(message, BAD_USER_INPUT)
}

/// Map a service failure to a GraphQL error.
///
/// Internal detail is logged, never returned.
pub fn from_service_error(err: ServiceError) -> GqlError {
    match err {
        ServiceError::NotFound(msg) => coded(msg, BAD_USER_INPUT),
        ServiceError::InvalidInput(msg) => coded(msg, BAD_USER_INPUT),
        ServiceError::Unavailable(msg) => {
            tracing::warn!(error = %msg, "upstream dependency unavailable");
            coded("A dependent service is unavailable", SERVICE_UNAVAILABLE)
        }
        ServiceError::Internal(msg) => {
            tracing::error!(error = %msg, "internal service error");
            coded("Internal server error", INTERNAL_ERROR)
        }
    }
}

/// Body of the fixed 500 response emitted when the HTTP adapter itself fails
#[derive(Debug, Serialize)]
pub struct ErrorEnvelope {
    pub errors: Vec<EnvelopeError>,
}

#[derive(Debug, Serialize)]
pub struct EnvelopeError {
    pub message: String,
    pub extensions: EnvelopeExtensions,
}

#[derive(Debug, Serialize)]
pub struct EnvelopeExtensions {
    pub code: String,
    pub timestamp: String,
}

impl ErrorEnvelope {
    pub fn internal() -> Self {
        Self {
            errors: vec![EnvelopeError {
                message: "Internal server error".to_string(),
                extensions: EnvelopeExtensions {
                    code: INTERNAL_ERROR.to_string(),
                    timestamp: Utc::now().to_rfc3339(),
                },
            }],
        }
    }
}
