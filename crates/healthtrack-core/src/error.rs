//! Domain error types

use thiserror::Error;

/// Errors raised by domain-level parsing and validation
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A string did not match any variant of a closed enum set
    #[error("invalid {kind}: {value}")]
    InvalidEnumValue { kind: &'static str, value: String },

    /// An identifier string could not be parsed
    #[error("invalid identifier: {0}")]
    InvalidId(String),
}

impl DomainError {
    pub fn invalid_enum(kind: &'static str, value: impl Into<String>) -> Self {
        Self::InvalidEnumValue {
            kind,
            value: value.into(),
        }
    }
}
