//! Error types for credential resolution.

use std::path::PathBuf;

use thiserror::Error;

use crate::fs_event::WatchError;

/// Result type alias using [`CredentialError`].
pub type Result<T> = std::result::Result<T, CredentialError>;

/// Errors surfaced to the owner of a resolver.
///
/// Only failures that happen before the background watch loop runs are
/// reported here. Reload failures after a successful start are logged and
/// the last good value is kept.
#[derive(Error, Debug)]
pub enum CredentialError {
    /// Neither an inline value nor a file path was configured.
    #[error("no value or file path provided")]
    NoValueProvided,

    /// The file could not be loaded when starting.
    #[error("failed to read credentials file {path:?}: {source}")]
    InitialLoad {
        path: PathBuf,
        #[source]
        source: ReloadError,
    },

    /// The filesystem watch could not be registered when starting.
    #[error("failed to watch credentials file {path:?}: {source}")]
    WatchRegistration {
        path: PathBuf,
        #[source]
        source: WatchError,
    },
}

/// Reasons a single reload attempt can fail.
#[derive(Error, Debug)]
pub enum ReloadError {
    /// The file could not be opened or read.
    #[error("read failed: {0}")]
    Read(#[from] std::io::Error),

    /// The file content is not valid UTF-8.
    #[error("credentials file {path:?} is not valid UTF-8: {source}")]
    InvalidUtf8 {
        path: PathBuf,
        #[source]
        source: std::string::FromUtf8Error,
    },

    /// The file holds nothing but whitespace.
    #[error("credentials file {0:?} is empty")]
    Empty(PathBuf),
}
