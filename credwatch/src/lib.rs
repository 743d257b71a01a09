//! credwatch
//!
//! Secret values that follow their files at runtime.
//!
//! # Overview
//!
//! This crate provides:
//! - [`ValueResolver`] for reading the current value of a credential
//! - [`StaticValue`] for values configured inline
//! - [`FileWatcher`] for values read from a file and refreshed on rotation
//!   (overwrite, atomic rename, Kubernetes projected-volume symlink swap)
//! - [`new_value_resolver`] and [`CredentialSource`] to pick between them
//! - [`WatchProvider`] to plug in the source of filesystem notifications
//!
//! Reads are lock-free. Once a file has loaded successfully, later failures
//! (missing file, empty content, read errors) are logged and the last good
//! value keeps being served.
//!
//! # Example
//!
//! ```ignore
//! use credwatch::{CredentialSource, ResolverOptions, ValueResolver};
//! use tokio_util::sync::CancellationToken;
//!
//! let source = CredentialSource::from_file("/var/run/secrets/token");
//! let token = source.resolver(ResolverOptions::new())?;
//! token.start(CancellationToken::new()).await?;
//!
//! // Read on every request to pick up rotated secrets.
//! let header = format!("Bearer {}", token.value());
//!
//! token.shutdown().await?;
//! ```

mod config;
mod error;
mod file_watcher;
pub mod fs_event;
#[cfg(test)]
mod mock;
mod resolver;

pub use config::CredentialSource;
pub use error::{CredentialError, ReloadError, Result};
pub use file_watcher::FileWatcher;
pub use fs_event::{FsEvent, FsEventKind, FsWatcher, NotifyProvider, WatchError, WatchProvider};
pub use resolver::{
    OnChange, Resolver, ResolverOptions, StaticValue, ValueResolver, new_value_resolver,
};

// Re-export commonly used types
pub use tokio_util::sync::CancellationToken;
