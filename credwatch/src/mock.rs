//! Scripted watch provider for unit tests.
//!
//! Records every watch/unwatch call and lets tests inject events directly,
//! without depending on OS event delivery.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;
use tokio::sync::mpsc;

use crate::fs_event::{FsEvent, FsEventReceiver, FsWatcher, WatchError, WatchProvider};

/// A recorded call on the scripted watcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchCall {
    Watch(PathBuf),
    Unwatch(PathBuf),
}

#[derive(Default)]
struct Script {
    calls: Vec<WatchCall>,
    sender: Option<mpsc::UnboundedSender<Result<FsEvent, WatchError>>>,
    watched: Vec<PathBuf>,
    fail_open: bool,
    fail_watch: bool,
}

/// Provider whose events are pushed by the test.
#[derive(Clone, Default)]
pub struct ScriptedProvider {
    script: Arc<Mutex<Script>>,
    dropped: Arc<AtomicBool>,
}

impl ScriptedProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next `open` fail.
    pub fn fail_open(&self) {
        self.script.lock().fail_open = true;
    }

    /// Make every subsequent `watch` fail.
    pub fn fail_watch(&self, fail: bool) {
        self.script.lock().fail_watch = fail;
    }

    /// Deliver an event to the watch loop. Returns false once the loop is gone.
    pub fn emit(&self, event: FsEvent) -> bool {
        match &self.script.lock().sender {
            Some(tx) => tx.send(Ok(event)).is_ok(),
            None => false,
        }
    }

    /// Deliver a backend error to the watch loop.
    pub fn emit_error(&self, err: WatchError) -> bool {
        match &self.script.lock().sender {
            Some(tx) => tx.send(Err(err)).is_ok(),
            None => false,
        }
    }

    /// Close the event stream from the backend side.
    pub fn close_stream(&self) {
        self.script.lock().sender = None;
    }

    pub fn calls(&self) -> Vec<WatchCall> {
        self.script.lock().calls.clone()
    }

    /// Whether the watcher handle handed out by `open` has been dropped.
    pub fn watcher_dropped(&self) -> bool {
        self.dropped.load(Ordering::SeqCst)
    }
}

impl WatchProvider for ScriptedProvider {
    fn open(&self) -> Result<(Box<dyn FsWatcher>, FsEventReceiver), WatchError> {
        let mut script = self.script.lock();
        if script.fail_open {
            return Err(WatchError::Backend(notify::Error::generic(
                "scripted open failure",
            )));
        }
        let (tx, rx) = mpsc::unbounded_channel();
        script.sender = Some(tx);
        self.dropped.store(false, Ordering::SeqCst);
        Ok((
            Box::new(ScriptedWatcher {
                script: self.script.clone(),
                dropped: self.dropped.clone(),
            }),
            rx,
        ))
    }
}

struct ScriptedWatcher {
    script: Arc<Mutex<Script>>,
    dropped: Arc<AtomicBool>,
}

impl FsWatcher for ScriptedWatcher {
    fn watch(&mut self, path: &Path) -> Result<(), WatchError> {
        let mut script = self.script.lock();
        script.calls.push(WatchCall::Watch(path.to_path_buf()));
        if script.fail_watch {
            return Err(WatchError::Backend(notify::Error::path_not_found()));
        }
        script.watched.push(path.to_path_buf());
        Ok(())
    }

    fn unwatch(&mut self, path: &Path) -> Result<(), WatchError> {
        let mut script = self.script.lock();
        script.calls.push(WatchCall::Unwatch(path.to_path_buf()));
        match script.watched.iter().position(|p| p == path) {
            Some(idx) => {
                script.watched.remove(idx);
                Ok(())
            }
            None => Err(WatchError::NotWatched),
        }
    }
}

impl Drop for ScriptedWatcher {
    fn drop(&mut self) {
        self.dropped.store(true, Ordering::SeqCst);
    }
}
