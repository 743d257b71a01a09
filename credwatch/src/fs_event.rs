//! Filesystem change notifications.
//!
//! The watch loop only needs three things from the operating system: register
//! a path, unregister it, and a stream of events tagged with what happened and
//! to which path. [`FsWatcher`] and [`WatchProvider`] capture exactly that so
//! the re-arm logic can be driven by a scripted provider in tests, while
//! [`NotifyProvider`] delivers real events through the `notify` crate.

use std::path::{Path, PathBuf};

use notify::event::{AccessKind, AccessMode, ModifyKind};
use notify::{EventKind, RecursiveMode, Watcher};
use thiserror::Error;
use tokio::sync::mpsc;

/// Coarse classification of a filesystem event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FsEventKind {
    /// File content was written.
    Write,
    /// The watched inode went away (unlink, replaced by rename, symlink target removed).
    Remove,
    /// Permissions or other attributes changed, including link count.
    Chmod,
    /// A new entry appeared.
    Create,
    /// An entry was renamed.
    Rename,
    /// Anything else (opens, reads, rescans).
    Other,
}

impl std::fmt::Display for FsEventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FsEventKind::Write => write!(f, "write"),
            FsEventKind::Remove => write!(f, "remove"),
            FsEventKind::Chmod => write!(f, "chmod"),
            FsEventKind::Create => write!(f, "create"),
            FsEventKind::Rename => write!(f, "rename"),
            FsEventKind::Other => write!(f, "other"),
        }
    }
}

/// A filesystem event with the paths it concerns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FsEvent {
    pub kind: FsEventKind,
    pub paths: Vec<PathBuf>,
}

impl FsEvent {
    /// Create an event for a single path.
    pub fn new(kind: FsEventKind, path: impl Into<PathBuf>) -> Self {
        Self {
            kind,
            paths: vec![path.into()],
        }
    }

    /// Whether any of the event paths is a spelling of `target`.
    pub fn concerns(&self, target: &WatchTarget) -> bool {
        self.paths.iter().any(|p| target.matches(p))
    }
}

/// The spellings under which a backend may report events for a watched path.
///
/// Backends report the path as registered, the path joined onto the working
/// directory (inotify does this for relative paths), or the path under its
/// canonical parent (FSEvents reports `/private/var` for `/var`). The file
/// name itself is never resolved: it may be a symlink whose target changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchTarget {
    aliases: Vec<PathBuf>,
}

impl WatchTarget {
    /// Work out the aliases of `path`. Done once, before watching starts.
    pub async fn resolve(path: &Path) -> Self {
        let mut target = Self {
            aliases: vec![path.to_path_buf()],
        };

        let absolute = if path.is_absolute() {
            path.to_path_buf()
        } else {
            match std::env::current_dir() {
                Ok(cwd) => cwd.join(path),
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "Cannot resolve working directory");
                    return target;
                }
            }
        };

        if let (Some(parent), Some(name)) = (absolute.parent(), absolute.file_name()) {
            if let Ok(parent) = tokio::fs::canonicalize(parent).await {
                target.add(parent.join(name));
            }
        }
        target.add(absolute);

        target
    }

    fn add(&mut self, alias: PathBuf) {
        if !self.aliases.contains(&alias) {
            self.aliases.push(alias);
        }
    }

    /// Whether `path` names the watched entry.
    pub fn matches(&self, path: &Path) -> bool {
        self.aliases.iter().any(|alias| alias == path)
    }
}

impl From<notify::Event> for FsEvent {
    fn from(event: notify::Event) -> Self {
        let kind = match event.kind {
            EventKind::Modify(ModifyKind::Data(_))
            | EventKind::Modify(ModifyKind::Any)
            | EventKind::Access(AccessKind::Close(AccessMode::Write)) => FsEventKind::Write,
            EventKind::Modify(ModifyKind::Metadata(_)) => FsEventKind::Chmod,
            EventKind::Modify(ModifyKind::Name(_)) => FsEventKind::Rename,
            EventKind::Remove(_) => FsEventKind::Remove,
            EventKind::Create(_) => FsEventKind::Create,
            _ => FsEventKind::Other,
        };
        Self {
            kind,
            paths: event.paths,
        }
    }
}

/// Errors from the filesystem watch facility.
#[derive(Error, Debug)]
pub enum WatchError {
    /// The path had no active watch.
    #[error("path is not being watched")]
    NotWatched,

    /// The underlying watch backend failed.
    #[error("watch backend error: {0}")]
    Backend(#[source] notify::Error),
}

impl From<notify::Error> for WatchError {
    fn from(err: notify::Error) -> Self {
        match err.kind {
            notify::ErrorKind::WatchNotFound => WatchError::NotWatched,
            _ => WatchError::Backend(err),
        }
    }
}

/// Receiving side of an event stream produced by a [`WatchProvider`].
pub type FsEventReceiver = mpsc::UnboundedReceiver<Result<FsEvent, WatchError>>;

/// Per-path subscription handle. Dropping it stops event delivery.
pub trait FsWatcher: Send {
    /// Start delivering events for `path`.
    fn watch(&mut self, path: &Path) -> Result<(), WatchError>;

    /// Stop delivering events for `path`.
    fn unwatch(&mut self, path: &Path) -> Result<(), WatchError>;
}

/// Opens a watch handle together with its event stream.
pub trait WatchProvider: Send + Sync {
    fn open(&self) -> Result<(Box<dyn FsWatcher>, FsEventReceiver), WatchError>;
}

/// [`WatchProvider`] backed by the platform's recommended `notify` watcher
/// (inotify, FSEvents, kqueue or ReadDirectoryChangesW).
#[derive(Debug, Clone, Copy, Default)]
pub struct NotifyProvider;

impl WatchProvider for NotifyProvider {
    fn open(&self) -> Result<(Box<dyn FsWatcher>, FsEventReceiver), WatchError> {
        let (tx, rx) = mpsc::unbounded_channel();
        let watcher = notify::recommended_watcher(move |res: notify::Result<notify::Event>| {
            // The receiver is gone once the watch loop exits.
            let _ = tx.send(res.map(FsEvent::from).map_err(WatchError::from));
        })?;
        Ok((Box::new(NotifyWatcher { inner: watcher }), rx))
    }
}

struct NotifyWatcher {
    inner: notify::RecommendedWatcher,
}

impl FsWatcher for NotifyWatcher {
    fn watch(&mut self, path: &Path) -> Result<(), WatchError> {
        self.inner
            .watch(path, RecursiveMode::NonRecursive)
            .map_err(WatchError::from)
    }

    fn unwatch(&mut self, path: &Path) -> Result<(), WatchError> {
        self.inner.unwatch(path).map_err(WatchError::from)
    }
}
