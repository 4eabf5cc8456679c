//! Stable identity assignment and the managed-file writer.
//!
//! This module provides:
//! - Content-derived stable ids for dhcp-host entries ([`assign_ids`])
//! - Atomic rewriting of the managed file ([`ManagedFile`])
//!
//! # Stable ids
//!
//! An entry's id is derived from its content — `sorted MACs|address|name`
//! — so an edited entry can be matched back to its original file line
//! across a read-modify-write cycle. Ids are unique within one read, not
//! globally persistent: the write path recomputes ids from the
//! freshly-read file before matching, which is what makes them stable
//! across the round trip.
//!
//! # Atomic writes
//!
//! The writer never writes the target in place. It produces `{path}.tmp`
//! in the same directory and renames it over the target, so a crash
//! mid-write cannot leave a truncated config.

mod error;

pub use error::WriteError;

use std::collections::HashSet;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::dhcphost::{self, DhcpHostEntry};
use crate::line;

#[cfg(test)]
#[path = "writer_tests.rs"]
mod tests;

/// Computes the composite identity key for one entry.
///
/// Empty when the entry has no MACs, address, or name.
fn composite_key(entry: &DhcpHostEntry) -> String {
    let mut macs = entry.macs.clone();
    macs.sort();
    let address = entry.address.as_deref().unwrap_or_default();
    let name = entry.name.as_deref().unwrap_or_default();
    if macs.is_empty() && address.is_empty() && name.is_empty() {
        String::new()
    } else {
        format!("{}|{address}|{name}", macs.join(","))
    }
}

/// Assigns stable ids to a batch of entries read from one file.
///
/// Entries with an empty composite key fall back to `line:<n>`.
/// Collisions are disambiguated by suffixing `:<n>` on the second and
/// later occurrences, keeping ids unique within the batch.
pub fn assign_ids(entries: &mut [DhcpHostEntry]) {
    let mut seen: HashSet<String> = HashSet::new();
    for entry in entries {
        let key = composite_key(entry);
        let id = if key.is_empty() {
            format!("line:{}", entry.line_number)
        } else if seen.contains(&key) {
            format!("{key}:{}", entry.line_number)
        } else {
            key.clone()
        };
        seen.insert(key);
        entry.id = id;
    }
}

/// The one config file this engine is allowed to rewrite.
#[derive(Debug, Clone)]
pub struct ManagedFile {
    path: PathBuf,
}

impl ManagedFile {
    /// Creates a writer for the managed file at `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the managed file's path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Merges `entries` into the managed file and writes it atomically.
    ///
    /// The file is re-read fresh — never from a cached copy — so a
    /// concurrent external edit between our read and this write cannot
    /// be silently dropped wholesale. Each incoming entry whose id
    /// matches an existing line replaces that line in place; unmatched
    /// entries are appended (unless marked deleted, in which case they
    /// are dropped). All non-`dhcp-host` lines pass through verbatim.
    ///
    /// # Errors
    ///
    /// Returns [`WriteError::Read`] or [`WriteError::Write`] on I/O
    /// failure. A missing managed file is not an error; it is created.
    pub async fn write(&self, entries: Vec<DhcpHostEntry>) -> Result<(), WriteError> {
        let path = self.path.clone();
        tokio::task::spawn_blocking(move || write_blocking(&path, &entries))
            .await
            .expect("spawn_blocking task panicked")
    }
}

/// Performs the blocking read-merge-write. Separated out so it can be
/// wrapped in `spawn_blocking` and exercised directly in tests.
fn write_blocking(path: &Path, entries: &[DhcpHostEntry]) -> Result<(), WriteError> {
    let mut lines = read_lines_fresh(path)?;

    // Drop the phantom empty line a trailing newline produces; the
    // rendered output re-adds the final newline.
    if lines.last().is_some_and(String::is_empty) {
        lines.pop();
    }

    let merged = merge_entries(lines, entries);

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(|source| WriteError::Write {
                path: path.to_path_buf(),
                source,
            })?;
        }
    }

    // Append .tmp instead of replacing the extension, so managed.conf
    // becomes managed.conf.tmp and never collides with a sibling file.
    let temp_path = PathBuf::from(format!("{}.tmp", path.display()));
    let mut content = merged.join("\n");
    content.push('\n');

    std::fs::write(&temp_path, content).map_err(|source| WriteError::Write {
        path: path.to_path_buf(),
        source,
    })?;

    std::fs::rename(&temp_path, path).map_err(|source| WriteError::Write {
        path: path.to_path_buf(),
        source,
    })?;

    Ok(())
}

fn read_lines_fresh(path: &Path) -> Result<Vec<String>, WriteError> {
    match std::fs::read_to_string(path) {
        Ok(content) => Ok(line::split_lines(&content)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(Vec::new()),
        Err(source) => Err(WriteError::Read {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Pure merge of incoming entries against the file's current lines.
///
/// Ids are recomputed from the fresh lines so the match is made against
/// what is actually on disk, not against a stale snapshot.
fn merge_entries(lines: Vec<String>, entries: &[DhcpHostEntry]) -> Vec<String> {
    let mut existing = dhcphost::parse_lines(&lines);
    assign_ids(&mut existing);

    // id -> 0-based line index of the entry's current line
    let index_of: std::collections::HashMap<&str, usize> = existing
        .iter()
        .map(|e| (e.id.as_str(), e.line_number as usize - 1))
        .collect();

    let mut out = lines;
    for entry in entries {
        if let Some(&idx) = index_of.get(entry.id.as_str()) {
            out[idx] = entry.to_line();
        } else if !entry.is_deleted {
            out.push(entry.to_line());
        }
    }
    out
}
