use notify::{EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

use crate::errors::AppResult;

/// Watches a dump directory for freshly written camera files and delivers
/// their paths over a channel. The camera itself (tethering, download) is
/// an external collaborator; this only sees files appear on disk.
pub struct PhotoWatcher {
    // Dropping the watcher stops the notify thread.
    _watcher: RecommendedWatcher,
    rx: mpsc::Receiver<(PathBuf, Instant)>,
    settle: Duration,
}

impl PhotoWatcher {
    /// Start a recursive watch. `settle` is how long a file must have been
    /// on disk before it is handed on, so half-written files from a slow
    /// camera transfer are not picked up mid-copy. The wait happens on the
    /// consumer side: detections are timestamped and queued immediately,
    /// so a burst of files never backs up the notify event thread, and
    /// settle windows for queued files elapse concurrently.
    pub fn start(directory: &Path, extensions: &[String], settle: Duration) -> AppResult<Self> {
        let (tx, rx) = mpsc::channel();
        let extensions: Vec<String> = extensions.iter().map(|e| e.to_lowercase()).collect();

        let mut watcher =
            notify::recommended_watcher(move |result: notify::Result<notify::Event>| {
                match result {
                    Ok(event) => {
                        if !matches!(event.kind, EventKind::Create(_)) {
                            return;
                        }
                        for path in event.paths {
                            if !is_photo_file(&path, &extensions) {
                                continue;
                            }
                            log::info!(
                                "📸 New photo detected: {}",
                                path.file_name().unwrap_or_default().to_string_lossy()
                            );
                            if tx.send((path, Instant::now())).is_err() {
                                // Receiver dropped, the pipeline is shutting down.
                                return;
                            }
                        }
                    }
                    Err(e) => log::error!("Watch error: {}", e),
                }
            })?;

        watcher.watch(directory, RecursiveMode::Recursive)?;
        log::info!("📁 Monitoring directory: {}", directory.display());

        Ok(Self {
            _watcher: watcher,
            rx,
            settle,
        })
    }

    /// Next detected photo, or None if nothing showed up within `timeout`.
    /// Sleeps out whatever remains of the file's settle window before
    /// returning it.
    pub fn next_photo(&self, timeout: Duration) -> Option<PathBuf> {
        let (path, detected_at) = self.rx.recv_timeout(timeout).ok()?;

        let elapsed = detected_at.elapsed();
        if elapsed < self.settle {
            thread::sleep(self.settle - elapsed);
        }

        Some(path)
    }
}

fn is_photo_file(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .map(|ext| extensions.contains(&ext.to_string_lossy().to_lowercase()))
        .unwrap_or(false)
}
