//! Polling-based filesystem change watcher.
//!
//! This module provides [`ChangeWatcher`], which periodically stats a
//! small fixed set of files and emits the paths whose modification time
//! (or existence) changed since the previous poll. Polling trades a
//! little latency for portability and for immunity to missed or
//! coalesced kernel notification events; the cache additionally applies
//! a staleness timeout as a second line of defense.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::{Duration, SystemTime};

use tokio::time::{Interval, interval};
use tokio_stream::Stream;

/// The observed state of one watched path: its mtime, or `None` while
/// the file does not exist.
type PathState = Option<SystemTime>;

/// A stream of changed paths produced by polling.
///
/// Returned by [`ChangeWatcher::into_stream`]; yields batches of paths
/// whose state changed between consecutive polls. Never terminates on
/// its own.
pub struct ChangeStream {
    paths: Vec<PathBuf>,
    interval: Interval,
    /// State at the previous poll; `None` before the baseline poll.
    prev: Option<HashMap<PathBuf, PathState>>,
}

impl ChangeStream {
    fn stat_all(&self) -> HashMap<PathBuf, PathState> {
        self.paths
            .iter()
            .map(|path| (path.clone(), stat_mtime(path)))
            .collect()
    }
}

fn stat_mtime(path: &Path) -> PathState {
    std::fs::metadata(path).and_then(|m| m.modified()).ok()
}

impl Stream for ChangeStream {
    type Item = Vec<PathBuf>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        loop {
            // Poll the interval timer - registers the waker for the next
            // tick when Pending.
            if Pin::new(&mut self.interval).poll_tick(cx).is_pending() {
                return Poll::Pending;
            }

            let current = self.stat_all();
            if let Some(prev) = &self.prev {
                let changed: Vec<PathBuf> = self
                    .paths
                    .iter()
                    .filter(|path| prev.get(*path) != current.get(*path))
                    .cloned()
                    .collect();
                self.prev = Some(current);
                if !changed.is_empty() {
                    return Poll::Ready(Some(changed));
                }
            } else {
                // Baseline poll - nothing to compare against yet.
                self.prev = Some(current);
            }
            // No changes - loop back to re-register the waker via poll_tick.
        }
    }
}

/// Polling-based watcher over a fixed set of file paths.
///
/// Detects modification-time changes, creations, and deletions. The
/// watch set is fixed at construction: the cache watches the main and
/// managed files, and a change to either triggers a full set re-discovery
/// anyway.
#[derive(Debug, Clone)]
pub struct ChangeWatcher {
    paths: Vec<PathBuf>,
    poll_interval: Duration,
}

impl ChangeWatcher {
    /// Creates a watcher over `paths`, polling at `poll_interval`.
    #[must_use]
    pub fn new(paths: Vec<PathBuf>, poll_interval: Duration) -> Self {
        Self {
            paths,
            poll_interval,
        }
    }

    /// Converts this watcher into a stream of changed-path batches.
    #[must_use]
    pub fn into_stream(self) -> ChangeStream {
        ChangeStream {
            paths: self.paths,
            interval: interval(self.poll_interval),
            prev: None,
        }
    }
}
