//! File-backed value resolver.
//!
//! A [`FileWatcher`] keeps the trimmed contents of a file in a lock-free cell
//! and refreshes it whenever the filesystem reports a change. It handles the
//! three rotation styles seen in practice:
//!
//! - in-place overwrite (a write event on the watched inode)
//! - atomic rename of a sibling file over the path
//! - Kubernetes projected volumes, where `secret -> .data/secret` and the
//!   kubelet swaps `.data` to a new timestamped directory before deleting the
//!   old one
//!
//! The last two replace the inode behind the path, which shows up as a
//! remove or attribute event on the old inode. The watch is then re-armed on
//! the original path so it follows the new target.
//!
//! A failed reload never clears the cached value: the previous credential is
//! served until a later reload succeeds.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use arc_swap::ArcSwapOption;
use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::error::{CredentialError, ReloadError, Result};
use crate::fs_event::{
    FsEvent, FsEventKind, FsEventReceiver, FsWatcher, NotifyProvider, WatchError, WatchProvider,
    WatchTarget,
};
use crate::resolver::{OnChange, ValueResolver};

/// Resolver that serves the contents of a watched file.
pub struct FileWatcher {
    shared: Arc<Shared>,
    provider: Arc<dyn WatchProvider>,
    running: Mutex<Option<Running>>,
}

/// State shared between the owner, readers and the watch loop.
struct Shared {
    path: PathBuf,
    current: ArcSwapOption<String>,
    on_change: Option<OnChange>,
}

/// Handles for a started watch loop.
struct Running {
    shutdown_tx: oneshot::Sender<()>,
    done: JoinHandle<()>,
}

impl FileWatcher {
    /// Create a watcher for `path` using the platform's native notifications.
    ///
    /// Nothing touches the filesystem until [`start`](ValueResolver::start).
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self::with_provider(path, Arc::new(NotifyProvider), None)
    }

    pub(crate) fn with_provider(
        path: impl Into<PathBuf>,
        provider: Arc<dyn WatchProvider>,
        on_change: Option<OnChange>,
    ) -> Self {
        Self {
            shared: Arc::new(Shared {
                path: path.into(),
                current: ArcSwapOption::empty(),
                on_change,
            }),
            provider,
            running: Mutex::new(None),
        }
    }

    /// The watched path, as configured.
    pub fn path(&self) -> &Path {
        &self.shared.path
    }

    /// Whether the background watch loop is active.
    pub fn is_running(&self) -> bool {
        self.running
            .lock()
            .as_ref()
            .is_some_and(|running| !running.done.is_finished())
    }
}

impl std::fmt::Debug for FileWatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // The cached value is a secret and stays out of debug output.
        f.debug_struct("FileWatcher")
            .field("path", &self.shared.path)
            .field("loaded", &self.shared.current.load().is_some())
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl ValueResolver for FileWatcher {
    fn value(&self) -> String {
        self.shared
            .current
            .load()
            .as_deref()
            .cloned()
            .unwrap_or_default()
    }

    async fn start(&self, cancel: CancellationToken) -> Result<()> {
        let path = self.shared.path.clone();

        self.shared
            .reload()
            .await
            .map_err(|source| CredentialError::InitialLoad {
                path: path.clone(),
                source,
            })?;

        // Events for a relative path come back under the working directory.
        let target = WatchTarget::resolve(&path).await;

        let registration = |source| CredentialError::WatchRegistration {
            path: path.clone(),
            source,
        };
        let (mut watcher, events) = self.provider.open().map_err(registration)?;
        // For a symlink the watch lands on the current target's inode.
        watcher.watch(&path).map_err(registration)?;

        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let shared = self.shared.clone();
        let done = tokio::spawn(shared.watch(watcher, events, target, shutdown_rx, cancel));

        tracing::debug!(path = %path.display(), "Watching credentials file");

        // A previous loop, if any, sees its shutdown sender dropped and exits.
        *self.running.lock() = Some(Running { shutdown_tx, done });

        Ok(())
    }

    async fn shutdown(&self) -> Result<()> {
        let Some(running) = self.running.lock().take() else {
            return Ok(());
        };

        // The loop may already be gone after cancellation.
        let _ = running.shutdown_tx.send(());
        if let Err(e) = running.done.await {
            tracing::error!(
                path = %self.shared.path.display(),
                error = %e,
                "Credentials watch loop terminated abnormally"
            );
        }

        Ok(())
    }
}

impl Shared {
    /// Read, trim and publish the file contents.
    async fn reload(&self) -> std::result::Result<(), ReloadError> {
        let data = tokio::fs::read(&self.path).await?;
        let data = String::from_utf8(data).map_err(|source| ReloadError::InvalidUtf8 {
            path: self.path.clone(),
            source,
        })?;
        let value = data.trim();
        if value.is_empty() {
            return Err(ReloadError::Empty(self.path.clone()));
        }

        let value = Arc::new(value.to_string());
        self.current.store(Some(value.clone()));

        if let Some(on_change) = &self.on_change {
            on_change(value.as_str());
        }

        Ok(())
    }

    /// Reload from the watch loop; failures keep the previous value.
    async fn reload_quietly(&self) {
        match self.reload().await {
            Ok(()) => {
                tracing::debug!(path = %self.path.display(), "Reloaded credentials file");
            }
            Err(e) => {
                tracing::warn!(
                    file = %self.path.display(),
                    error = %e,
                    "Failed to reload credentials file, keeping last value"
                );
            }
        }
    }

    /// Background loop. Owns the OS watch handle until it returns.
    async fn watch(
        self: Arc<Self>,
        mut watcher: Box<dyn FsWatcher>,
        mut events: FsEventReceiver,
        target: WatchTarget,
        mut shutdown: oneshot::Receiver<()>,
        cancel: CancellationToken,
    ) {
        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    tracing::debug!(path = %self.path.display(), "Credentials watcher shutting down");
                    break;
                }
                _ = cancel.cancelled() => {
                    tracing::debug!(path = %self.path.display(), "Credentials watcher cancelled");
                    break;
                }
                event = events.recv() => match event {
                    Some(Ok(event)) => self.handle_event(watcher.as_mut(), &target, event).await,
                    Some(Err(e)) => {
                        tracing::warn!(path = %self.path.display(), error = %e, "Filesystem watch error");
                    }
                    None => {
                        tracing::warn!(path = %self.path.display(), "Filesystem event stream closed");
                        break;
                    }
                },
            }
        }

        drop(watcher);
    }

    async fn handle_event(
        &self,
        watcher: &mut dyn FsWatcher,
        target: &WatchTarget,
        event: FsEvent,
    ) {
        if !event.concerns(target) {
            tracing::trace!(paths = ?event.paths, kind = %event.kind, "Ignoring unrelated event");
            return;
        }

        tracing::trace!(path = %self.path.display(), kind = %event.kind, "Credentials file event");

        match event.kind {
            FsEventKind::Write => self.reload_quietly().await,
            FsEventKind::Remove | FsEventKind::Chmod => {
                self.rearm(watcher);
                self.reload_quietly().await;
            }
            FsEventKind::Create | FsEventKind::Rename | FsEventKind::Other => {}
        }
    }

    /// Drop the stale registration and watch the path again so that it
    /// resolves to whatever now sits behind it.
    fn rearm(&self, watcher: &mut dyn FsWatcher) {
        match watcher.unwatch(&self.path) {
            Ok(()) | Err(WatchError::NotWatched) => {}
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "Failed to remove watcher");
            }
        }

        if let Err(e) = watcher.watch(&self.path) {
            tracing::error!(path = %self.path.display(), error = %e, "Failed to re-add watcher");
        }
    }
}
