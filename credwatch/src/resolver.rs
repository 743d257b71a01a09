//! Value resolvers and the factory that picks one.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::error::{CredentialError, Result};
use crate::file_watcher::FileWatcher;
use crate::fs_event::{NotifyProvider, WatchProvider};

/// Callback invoked with the new value after each successful file load.
pub type OnChange = Arc<dyn Fn(&str) + Send + Sync>;

/// Access to a secret value that may come from an inline configuration
/// string or a watched file.
#[async_trait]
pub trait ValueResolver: Send + Sync {
    /// Current value. Never blocks.
    ///
    /// Empty only before the first successful load.
    fn value(&self) -> String;

    /// Begin any background work (e.g. file watching).
    async fn start(&self, cancel: CancellationToken) -> Result<()>;

    /// Stop background work. Returns once it has fully stopped.
    async fn shutdown(&self) -> Result<()>;
}

/// A fixed value. Starting and stopping do nothing.
#[derive(Clone, PartialEq, Eq)]
pub struct StaticValue(String);

impl StaticValue {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }
}

impl std::fmt::Debug for StaticValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("StaticValue(..)")
    }
}

#[async_trait]
impl ValueResolver for StaticValue {
    fn value(&self) -> String {
        self.0.clone()
    }

    async fn start(&self, _cancel: CancellationToken) -> Result<()> {
        Ok(())
    }

    async fn shutdown(&self) -> Result<()> {
        Ok(())
    }
}

/// Optional behavior for resolvers built by [`new_value_resolver`].
#[derive(Clone, Default)]
pub struct ResolverOptions {
    on_change: Option<OnChange>,
    provider: Option<Arc<dyn WatchProvider>>,
}

impl ResolverOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a callback invoked with the new value after every successful
    /// file load, the initial one in `start` included. Never called for
    /// static values.
    pub fn on_change<F>(mut self, callback: F) -> Self
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        self.on_change = Some(Arc::new(callback));
        self
    }

    /// Use a custom source of filesystem notifications.
    pub fn with_provider(mut self, provider: Arc<dyn WatchProvider>) -> Self {
        self.provider = Some(provider);
        self
    }
}

impl std::fmt::Debug for ResolverOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolverOptions")
            .field("on_change", &self.on_change.is_some())
            .field("custom_provider", &self.provider.is_some())
            .finish()
    }
}

/// Resolver chosen by [`new_value_resolver`].
#[derive(Debug)]
pub enum Resolver {
    Static(StaticValue),
    File(FileWatcher),
}

impl Resolver {
    /// Whether this resolver watches a file.
    pub fn is_file(&self) -> bool {
        matches!(self, Resolver::File(_))
    }
}

#[async_trait]
impl ValueResolver for Resolver {
    fn value(&self) -> String {
        match self {
            Resolver::Static(v) => v.value(),
            Resolver::File(w) => w.value(),
        }
    }

    async fn start(&self, cancel: CancellationToken) -> Result<()> {
        match self {
            Resolver::Static(v) => v.start(cancel).await,
            Resolver::File(w) => w.start(cancel).await,
        }
    }

    async fn shutdown(&self) -> Result<()> {
        match self {
            Resolver::Static(v) => v.shutdown().await,
            Resolver::File(w) => w.shutdown().await,
        }
    }
}

/// Build the resolver for an inline value and a file path.
///
/// A non-empty `file_path` always wins, even when `inline_value` is set.
/// Otherwise a non-empty `inline_value` becomes a [`StaticValue`]. With
/// neither, [`CredentialError::NoValueProvided`] is returned.
///
/// The filesystem is not touched here; the file is first read by `start`.
pub fn new_value_resolver(
    inline_value: &str,
    file_path: impl AsRef<Path>,
    options: ResolverOptions,
) -> Result<Resolver> {
    let file_path = file_path.as_ref();
    if !file_path.as_os_str().is_empty() {
        let provider: Arc<dyn WatchProvider> = match options.provider {
            Some(provider) => provider,
            None => Arc::new(NotifyProvider),
        };
        return Ok(Resolver::File(FileWatcher::with_provider(
            file_path,
            provider,
            options.on_change,
        )));
    }

    if inline_value.is_empty() {
        return Err(CredentialError::NoValueProvided);
    }

    Ok(Resolver::Static(StaticValue::new(inline_value)))
}
