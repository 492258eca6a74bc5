//! Re-parse on save for `styledown --watch`.
//!
//! Watches the parent directory of the markdown file, since editors often
//! replace the file instead of writing it in place.
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::time::{Duration, Instant};

use notify::{Event, RecommendedWatcher, RecursiveMode, Watcher};

/// Watches one markdown file and reports debounced changes.
pub struct FileWatcher {
    _watcher: RecommendedWatcher,
    rx: Receiver<notify::Result<Event>>,
    watch_root: PathBuf,
    target_path: PathBuf,
    target_name: Option<OsString>,
    debounce: Duration,
    pending_since: Option<Instant>,
}

impl FileWatcher {
    /// Create a watcher for `path`.
    ///
    /// # Errors
    /// Returns an error if the file watcher cannot be created or the path cannot be watched.
    pub fn new(path: impl AsRef<Path>, debounce: Duration) -> notify::Result<Self> {
        // Event paths from the OS are canonical.
        let target_path = path
            .as_ref()
            .canonicalize()
            .unwrap_or_else(|_| path.as_ref().to_path_buf());
        let target_name = target_path.file_name().map(std::ffi::OsStr::to_os_string);
        let watch_root = watch_root_for(&target_path);

        let (tx, rx) = mpsc::channel();
        let mut watcher = notify::recommended_watcher(move |res| {
            let _ = tx.send(res);
        })?;
        watcher.watch(&watch_root, RecursiveMode::NonRecursive)?;
        tracing::debug!(target = %target_path.display(), root = %watch_root.display(), "watching");

        Ok(Self {
            _watcher: watcher,
            rx,
            watch_root,
            target_path,
            target_name,
            debounce,
            pending_since: None,
        })
    }

    pub fn target_path(&self) -> &Path {
        &self.target_path
    }

    /// Drain queued events; returns true once a change has settled for the
    /// debounce interval.
    pub fn take_change_ready(&mut self) -> bool {
        let mut relevant = 0u32;
        let mut total = 0u32;
        while let Ok(event) = self.rx.try_recv() {
            total += 1;
            if self.record(event) {
                relevant += 1;
            }
        }
        if total > 0 {
            crate::perf::log_event(
                "watcher.poll",
                format!("total={total} relevant={relevant} target={}", self.target_path.display()),
            );
        }
        self.settled()
    }

    /// Block until a debounced change is ready (`true`) or `timeout` passes
    /// (`false`).
    ///
    /// # Errors
    /// Returns an error once the underlying watcher has stopped sending events.
    pub fn wait_for_change(&mut self, timeout: Duration) -> notify::Result<bool> {
        let deadline = Instant::now() + timeout;
        loop {
            if self.take_change_ready() {
                return Ok(true);
            }
            let now = Instant::now();
            if now >= deadline {
                return Ok(false);
            }
            // Wake for the next event, or when a pending change settles.
            let mut wait = deadline - now;
            if let Some(since) = self.pending_since {
                wait = wait.min(self.debounce.saturating_sub(since.elapsed()));
            }
            match self.rx.recv_timeout(wait) {
                Ok(event) => {
                    self.record(event);
                }
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => {
                    return Err(notify::Error::generic("file watcher stopped"));
                }
            }
        }
    }

    fn record(&mut self, event: notify::Result<Event>) -> bool {
        match event {
            Ok(ev) if self.is_relevant(&ev) => {
                self.pending_since = Some(Instant::now());
                true
            }
            Ok(ev) => {
                crate::perf::log_event(
                    "watcher.irrelevant",
                    format!("kind={:?} paths={:?}", ev.kind, ev.paths),
                );
                false
            }
            Err(err) => {
                tracing::warn!(error = %err, "file watcher error");
                false
            }
        }
    }

    fn settled(&mut self) -> bool {
        match self.pending_since {
            Some(since) if since.elapsed() >= self.debounce => {
                self.pending_since = None;
                true
            }
            _ => false,
        }
    }

    fn is_relevant(&self, event: &Event) -> bool {
        event.paths.iter().any(|path| {
            path == &self.watch_root
                || path == &self.target_path
                || self
                    .target_name
                    .as_ref()
                    .is_some_and(|name| path.file_name().is_some_and(|f| f == name))
        })
    }
}

fn watch_root_for(path: &Path) -> PathBuf {
    path.parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map_or_else(|| PathBuf::from("."), Path::to_path_buf)
}
