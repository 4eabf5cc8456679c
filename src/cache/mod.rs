//! Staleness-aware caching of resolved config-set snapshots.
//!
//! This module provides:
//! - The immutable snapshot unit ([`ConfigSnapshot`])
//! - The owning cache ([`SnapshotCache`])
//! - A polling filesystem change watcher ([`ChangeWatcher`])
//!
//! # State machine
//!
//! The cache is in one of three states: **Fresh** (a snapshot exists,
//! is not flagged dirty, and is younger than the staleness threshold),
//! **Dirty** (a rebuild is required before the next read), or
//! **Building** (a rebuild is in progress, serialized by the lock).
//! Reads that find a Fresh snapshot never block; concurrent readers
//! during a rebuild block briefly rather than observe a half-built
//! snapshot. Cancelling a read (dropping the future) releases the lock
//! on every exit path, so the Building state can never be stranded.
//!
//! # Self-write suppression
//!
//! A write through [`SnapshotCache::write_managed`] records its
//! completion instant; a watcher notification for the managed file that
//! arrives within the suppression window after that instant is the echo
//! of our own write and is ignored. The timestamp is taken at write
//! completion, not start, so a genuinely concurrent external edit that
//! lands later is never masked by a too-early window.

mod watcher;

pub use watcher::{ChangeStream, ChangeWatcher};

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use serde::Serialize;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_stream::StreamExt;

use crate::dhcphost::{self, DhcpHostEntry};
use crate::files::{ConfigSet, FileContents, canonical_path};
use crate::resolve::{EffectiveConfig, EffectiveSources, ValueProvenance};
use crate::time::{Clock, SystemClock};
use crate::writer::{self, ManagedFile, WriteError};

#[cfg(test)]
#[path = "cache_tests.rs"]
mod tests;

/// A snapshot older than this is treated as Dirty on the next read,
/// even without a change notification — defends against missed or
/// coalesced filesystem events.
const STALENESS_THRESHOLD: Duration = Duration::from_secs(15);

/// Window after our own write completion during which a managed-file
/// change notification is treated as the write's echo. Long enough to
/// absorb the watcher's echo of our write, short enough not to ignore a
/// genuinely concurrent external edit.
const SELF_WRITE_SUPPRESSION: Duration = Duration::from_millis(1500);

/// How often the change watcher stats the watched files.
const WATCH_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Tuning knobs for one cache instance. [`Default`] gives the
/// production values; tests shrink them.
#[derive(Debug, Clone)]
pub struct CacheOptions {
    /// Maximum snapshot age before a forced rebuild.
    pub staleness: Duration,
    /// Self-write echo suppression window.
    pub suppression: Duration,
    /// Change watcher poll interval.
    pub watch_poll_interval: Duration,
}

impl Default for CacheOptions {
    fn default() -> Self {
        Self {
            staleness: STALENESS_THRESHOLD,
            suppression: SELF_WRITE_SUPPRESSION,
            watch_poll_interval: WATCH_POLL_INTERVAL,
        }
    }
}

/// A dhcp-host entry together with the file that defines it.
#[derive(Debug, Clone, Serialize)]
pub struct SourcedHostEntry {
    /// The parsed entry, stable id assigned.
    pub entry: DhcpHostEntry,
    /// Which file and line produced it.
    pub source: ValueProvenance,
}

/// The unit the cache owns: one complete resolution pass over one
/// config set.
///
/// Immutable once built and replaced wholesale on refresh, never patched
/// field-by-field — a partially refreshed snapshot cannot exist.
#[derive(Debug, Serialize)]
pub struct ConfigSnapshot {
    /// The discovered ordered file set.
    pub set: ConfigSet,
    /// Every catalog option, resolved.
    pub effective: EffectiveConfig,
    /// Provenance for every resolved value.
    pub sources: EffectiveSources,
    /// Every dhcp-host entry across the whole set, commented entries
    /// included, ids assigned per file.
    pub dhcp_hosts: Vec<SourcedHostEntry>,
    /// The managed file's raw lines, as read during this pass.
    pub managed_lines: Vec<String>,
    /// Wall-clock build time, for display.
    pub built_at: SystemTime,
}

impl ConfigSnapshot {
    /// The dhcp-host entries that live in the managed file.
    pub fn managed_hosts(&self) -> impl Iterator<Item = &DhcpHostEntry> {
        self.dhcp_hosts
            .iter()
            .filter(|h| h.source.is_managed)
            .map(|h| &h.entry)
    }
}

#[derive(Debug, Default)]
struct CacheState {
    snapshot: Option<Arc<ConfigSnapshot>>,
    /// Monotonic build instant, for staleness arithmetic.
    built_at: Option<Instant>,
    dirty: bool,
    /// Completion instant of our last managed-file write.
    last_self_write: Option<Instant>,
}

/// Staleness-aware cache over one config set.
///
/// Callers own one instance per config set, with an explicit lifecycle:
/// construct, optionally [`spawn_watcher`](Self::spawn_watcher), drop.
/// There is no process-wide singleton.
pub struct SnapshotCache {
    main_path: PathBuf,
    managed_path: Option<PathBuf>,
    managed_hosts_path: Option<PathBuf>,
    options: CacheOptions,
    clock: Arc<dyn Clock>,
    state: Mutex<CacheState>,
}

impl SnapshotCache {
    /// Creates a cache with production options.
    #[must_use]
    pub fn new(
        main: impl Into<PathBuf>,
        managed: Option<PathBuf>,
        managed_hosts: Option<PathBuf>,
    ) -> Self {
        Self::with_options(main, managed, managed_hosts, CacheOptions::default())
    }

    /// Creates a cache with explicit options (tests shrink the windows).
    ///
    /// Paths are canonicalized up front so watcher notifications and the
    /// discovered set agree on file identity regardless of spelling.
    #[must_use]
    pub fn with_options(
        main: impl Into<PathBuf>,
        managed: Option<PathBuf>,
        managed_hosts: Option<PathBuf>,
        options: CacheOptions,
    ) -> Self {
        Self {
            main_path: canonical_path(&main.into()),
            managed_path: managed.map(|p| canonical_path(&p)),
            managed_hosts_path: managed_hosts.map(|p| canonical_path(&p)),
            options,
            clock: Arc::new(SystemClock),
            state: Mutex::new(CacheState::default()),
        }
    }

    /// Replaces the wall clock used for snapshot `built_at` stamps.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Returns the current snapshot, rebuilding first if the cached one
    /// is missing, dirty, or stale.
    ///
    /// Rebuilds are serialized by the cache lock; a read that finds a
    /// Fresh snapshot returns without blocking on I/O. Cancellation is
    /// dropping the returned future — the lock guard releases on every
    /// exit path.
    pub async fn snapshot(&self) -> Arc<ConfigSnapshot> {
        let mut state = self.state.lock().await;

        if let Some(snapshot) = &state.snapshot {
            let age_ok = state
                .built_at
                .is_some_and(|t| t.elapsed() < self.options.staleness);
            if !state.dirty && age_ok {
                return Arc::clone(snapshot);
            }
        }

        let main = self.main_path.clone();
        let managed = self.managed_path.clone();
        let managed_hosts = self.managed_hosts_path.clone();
        let built_at = self.clock.now();
        let snapshot = tokio::task::spawn_blocking(move || {
            rebuild_blocking(&main, managed.as_deref(), managed_hosts.as_deref(), built_at)
        })
        .await
        .expect("spawn_blocking task panicked");

        let snapshot = Arc::new(snapshot);
        state.snapshot = Some(Arc::clone(&snapshot));
        state.built_at = Some(Instant::now());
        state.dirty = false;

        tracing::debug!(
            files = snapshot.set.files.len(),
            hosts = snapshot.dhcp_hosts.len(),
            "config snapshot rebuilt"
        );
        snapshot
    }

    /// Marks the cache dirty unconditionally; the next read rebuilds.
    pub async fn invalidate(&self) {
        self.state.lock().await.dirty = true;
        tracing::debug!("config snapshot invalidated");
    }

    /// Reports a filesystem change for `path`.
    ///
    /// Flips the dirty flag under the lock — no I/O happens on this
    /// path. A managed-file notification inside the suppression window
    /// after our own write is the write's echo and is ignored.
    pub async fn note_external_change(&self, path: &Path) {
        let mut state = self.state.lock().await;

        if self.managed_path.as_deref() == Some(path) {
            let suppressed = state
                .last_self_write
                .is_some_and(|at| at.elapsed() < self.options.suppression);
            if suppressed {
                tracing::debug!(path = %path.display(), "change suppressed (own write echo)");
                return;
            }
        }

        tracing::debug!(path = %path.display(), "external change noted");
        state.dirty = true;
    }

    /// Merges `entries` into the managed file and writes it atomically.
    ///
    /// Refuses to write an entry whose MAC address is already reserved
    /// by a file this cache does not manage — the daemon itself would
    /// reject or misapply the duplicate reservation.
    ///
    /// No cache lock is held across the file I/O; the self-write
    /// suppression timestamp is recorded at completion.
    ///
    /// # Errors
    ///
    /// [`WriteError::NoManagedPath`] without a managed path,
    /// [`WriteError::MacConflict`] on a duplicate reservation, or the
    /// underlying I/O error.
    pub async fn write_managed(&self, entries: Vec<DhcpHostEntry>) -> Result<(), WriteError> {
        let managed = self
            .managed_path
            .clone()
            .ok_or(WriteError::NoManagedPath)?;

        let snapshot = self.snapshot().await;
        check_mac_conflicts(&entries, &snapshot)?;

        ManagedFile::new(&managed).write(entries).await?;

        let mut state = self.state.lock().await;
        state.last_self_write = Some(Instant::now());
        state.dirty = true;
        tracing::info!(path = %managed.display(), "managed config written");
        Ok(())
    }

    /// Spawns the background change watcher over the main and managed
    /// files. The returned handle stops the watcher when dropped.
    #[must_use]
    pub fn spawn_watcher(self: Arc<Self>) -> WatcherHandle {
        let mut paths = vec![self.main_path.clone()];
        if let Some(managed) = &self.managed_path {
            paths.push(managed.clone());
        }
        let mut stream =
            ChangeWatcher::new(paths, self.options.watch_poll_interval).into_stream();

        let cache = self;
        let handle = tokio::spawn(async move {
            while let Some(changed) = stream.next().await {
                for path in changed {
                    cache.note_external_change(&path).await;
                }
            }
        });
        WatcherHandle { handle }
    }
}

impl std::fmt::Debug for SnapshotCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SnapshotCache")
            .field("main_path", &self.main_path)
            .field("managed_path", &self.managed_path)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

/// Owns the spawned watcher task; dropping it stops the watcher.
#[derive(Debug)]
pub struct WatcherHandle {
    handle: JoinHandle<()>,
}

impl Drop for WatcherHandle {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// One full resolution pass. Runs on a blocking thread: every file in
/// the set is read exactly once, then the engine runs twice (values,
/// provenance) plus the structured-entry extraction pass.
fn rebuild_blocking(
    main: &Path,
    managed: Option<&Path>,
    managed_hosts: Option<&Path>,
    built_at: SystemTime,
) -> ConfigSnapshot {
    let set = ConfigSet::discover(main, managed, managed_hosts);
    let contents = FileContents::read(&set);

    let effective = EffectiveConfig::resolve(&set, &contents);
    let sources = EffectiveSources::resolve(&set, &contents);

    let mut dhcp_hosts = Vec::new();
    for file in &set.files {
        let mut entries = dhcphost::parse_lines(contents.lines(&file.path));
        writer::assign_ids(&mut entries);
        for entry in entries {
            let source = ValueProvenance::at(&set, &file.path, entry.line_number);
            dhcp_hosts.push(SourcedHostEntry { entry, source });
        }
    }

    let managed_lines = set
        .managed_path
        .as_deref()
        .map(|p| contents.lines(p).to_vec())
        .unwrap_or_default();

    ConfigSnapshot {
        set,
        effective,
        sources,
        dhcp_hosts,
        managed_lines,
        built_at,
    }
}

/// Rejects incoming entries whose MAC is already reserved by a
/// non-managed file.
fn check_mac_conflicts(
    entries: &[DhcpHostEntry],
    snapshot: &ConfigSnapshot,
) -> Result<(), WriteError> {
    for entry in entries {
        if entry.is_comment || entry.is_deleted {
            continue;
        }
        for mac in &entry.macs {
            let conflict = snapshot.dhcp_hosts.iter().find(|h| {
                !h.source.is_managed
                    && !h.entry.is_comment
                    && h.entry.macs.iter().any(|m| m.eq_ignore_ascii_case(mac))
            });
            if let Some(conflict) = conflict {
                return Err(WriteError::MacConflict {
                    mac: mac.clone(),
                    file: conflict.source.file_path.clone(),
                });
            }
        }
    }
    Ok(())
}
