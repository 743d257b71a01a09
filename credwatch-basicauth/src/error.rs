//! Error types for basic authentication.

use thiserror::Error;

/// Result type alias using [`BasicAuthError`].
pub type Result<T> = std::result::Result<T, BasicAuthError>;

/// Errors that can occur while setting up basic authentication.
#[derive(Error, Debug)]
pub enum BasicAuthError {
    /// Configuration validation error.
    #[error("Configuration validation failed: {0}")]
    Validation(String),

    /// A username or password source failed.
    #[error("{field}: {source}")]
    Credential {
        field: &'static str,
        #[source]
        source: credwatch::CredentialError,
    },
}

impl BasicAuthError {
    /// Create a configuration validation error.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub(crate) fn credential(field: &'static str, source: credwatch::CredentialError) -> Self {
        Self::Credential { field, source }
    }
}
