//! Config-set discovery: which files dnsmasq would load, in which order.
//!
//! This module provides:
//! - File identity and roles ([`ConfigFile`], [`FileRole`])
//! - The ordered file set and include resolver ([`ConfigSet`])
//! - Bulk best-effort reading of the whole set ([`FileContents`])
//!
//! # Inclusion semantics
//!
//! The resolver walks `conf-file=` and `conf-dir=` directives in the main
//! file only. It is deliberately **not recursive**: an included file's own
//! `conf-file=`/`conf-dir=` lines are not followed, and no cycle detection
//! is performed. This matches the narrower need of a display/merge engine
//! rather than dnsmasq's full loader, and is a documented limitation.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::line;
use crate::options::names;

#[cfg(test)]
#[path = "resolver_tests.rs"]
mod tests;

/// How a file entered the config set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FileRole {
    /// The main config file passed to dnsmasq.
    Main,
    /// Reached via a `conf-file=` directive.
    ConfFile,
    /// Reached via a `conf-dir=` directive.
    ConfDir,
}

/// One file in the ordered config set.
///
/// Identity is the canonicalized absolute path, so two spellings of the
/// same physical file (dot components, symlinks) can never produce two
/// entries. Immutable for the lifetime of one resolution pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfigFile {
    /// Absolute path of the file.
    pub path: PathBuf,
    /// How the file was reached.
    pub role: FileRole,
    /// Whether this is the one file the engine may rewrite.
    pub is_managed: bool,
}

/// The ordered sequence of config files dnsmasq would load.
///
/// Invariants:
/// - The main file is always first.
/// - `conf-file=` targets appear in the order encountered.
/// - Each `conf-dir=` target's files appear sorted by file name (ordinal),
///   immediately after the directive that named the directory.
/// - The managed file, when not otherwise reachable, is appended
///   synthetically with `is_managed = true`.
#[derive(Debug, Clone, Serialize)]
pub struct ConfigSet {
    /// The files, in dnsmasq load order.
    pub files: Vec<ConfigFile>,
    /// Path of the main config file.
    pub main_path: PathBuf,
    /// Path of the managed file, if one is designated.
    pub managed_path: Option<PathBuf>,
    /// Path of the managed hosts file, if one is designated. Not part of
    /// the conf-file set; carried for consumers that edit host records.
    pub managed_hosts_path: Option<PathBuf>,
}

impl ConfigSet {
    /// Discovers the ordered file set starting from `main`.
    ///
    /// All paths are canonicalized before entering the set, so the
    /// managed path matches the discovered entry no matter how either
    /// one is spelled. A missing main file yields the singleton set — a
    /// not-yet-created config is valid, not an error. Non-existent
    /// `conf-file=` targets and `conf-dir=` directories are silently
    /// skipped (dnsmasq itself errors here; the engine favors
    /// best-effort display).
    #[must_use]
    pub fn discover(
        main: &Path,
        managed: Option<&Path>,
        managed_hosts: Option<&Path>,
    ) -> Self {
        let main = canonical_path(main);
        let managed = managed.map(canonical_path);

        let mut files = vec![ConfigFile {
            path: main.clone(),
            role: FileRole::Main,
            is_managed: managed.as_deref() == Some(&main),
        }];

        if let Ok(content) = std::fs::read_to_string(&main) {
            let base = main.parent().unwrap_or_else(|| Path::new("."));
            for raw in line::split_lines(&content) {
                let Some(directive) = line::parse(&raw) else {
                    continue;
                };
                match directive.key {
                    names::CONF_FILE => {
                        push_conf_file(&mut files, base, directive.value, managed.as_deref());
                    }
                    names::CONF_DIR => {
                        push_conf_dir(&mut files, base, directive.value, managed.as_deref());
                    }
                    _ => {}
                }
            }
        } else {
            tracing::debug!(path = %main.display(), "main config not readable, singleton set");
        }

        // A managed file the include graph never reaches still belongs to
        // the set so consumers can read and edit it; the real daemon will
        // not load it until the caller wires it in (caller contract).
        if let Some(managed) = &managed {
            if !files.iter().any(|f| &f.path == managed) {
                files.push(ConfigFile {
                    path: managed.clone(),
                    role: FileRole::ConfFile,
                    is_managed: true,
                });
            }
        }

        Self {
            files,
            main_path: main,
            managed_path: managed,
            managed_hosts_path: managed_hosts.map(canonical_path),
        }
    }

    /// The file paths, in load order.
    pub fn paths(&self) -> impl Iterator<Item = &Path> {
        self.files.iter().map(|f| f.path.as_path())
    }

    /// The managed file entry, if a managed path is designated.
    #[must_use]
    pub fn managed_file(&self) -> Option<&ConfigFile> {
        self.files.iter().find(|f| f.is_managed)
    }

    /// Whether `path` is the managed file.
    #[must_use]
    pub fn is_managed(&self, path: &Path) -> bool {
        self.managed_path.as_deref() == Some(path)
    }
}

/// Canonicalizes a path for identity comparisons.
///
/// A file that does not exist yet (a not-yet-created managed file)
/// canonicalizes through its parent directory; when even the parent is
/// missing the path is kept as given.
pub(crate) fn canonical_path(path: &Path) -> PathBuf {
    if let Ok(resolved) = std::fs::canonicalize(path) {
        return resolved;
    }
    if let (Some(parent), Some(name)) = (path.parent(), path.file_name()) {
        if let Ok(parent) = std::fs::canonicalize(parent) {
            return parent.join(name);
        }
    }
    path.to_path_buf()
}

fn resolve_target(base: &Path, value: &str) -> PathBuf {
    let target = Path::new(value);
    if target.is_absolute() {
        target.to_path_buf()
    } else {
        base.join(target)
    }
}

fn push_conf_file(files: &mut Vec<ConfigFile>, base: &Path, value: &str, managed: Option<&Path>) {
    let path = canonical_path(&resolve_target(base, value));
    if path.is_file() {
        let is_managed = managed == Some(path.as_path());
        files.push(ConfigFile {
            path,
            role: FileRole::ConfFile,
            is_managed,
        });
    } else {
        tracing::debug!(path = %path.display(), "conf-file target missing, skipped");
    }
}

fn push_conf_dir(files: &mut Vec<ConfigFile>, base: &Path, value: &str, managed: Option<&Path>) {
    let (dir_part, filter) = match value.split_once(',') {
        Some((dir, filter)) => (dir, Some(filter.trim())),
        None => (value, None),
    };
    let dir = resolve_target(base, dir_part.trim());

    let Ok(entries) = std::fs::read_dir(&dir) else {
        tracing::debug!(path = %dir.display(), "conf-dir target missing, skipped");
        return;
    };

    let mut paths: Vec<PathBuf> = entries
        .filter_map(Result::ok)
        .map(|e| e.path())
        .filter(|p| p.is_file())
        .filter(|p| suffix_filter_allows(filter, p))
        .collect();

    // Ordinal (byte-wise) sort by file name, matching dnsmasq's ordering.
    // Filtering and sorting use the directory-entry name; identity is the
    // canonical path.
    paths.sort_by(|a, b| a.file_name().cmp(&b.file_name()));

    for path in paths {
        let path = canonical_path(&path);
        let is_managed = managed == Some(path.as_path());
        files.push(ConfigFile {
            path,
            role: FileRole::ConfDir,
            is_managed,
        });
    }
}

/// Applies the optional `conf-dir` suffix filter.
///
/// `*.ext` includes only files with that suffix; `.ext` excludes files
/// with that suffix; no filter includes everything.
fn suffix_filter_allows(filter: Option<&str>, path: &Path) -> bool {
    let Some(filter) = filter else {
        return true;
    };
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    if let Some(suffix) = filter.strip_prefix('*') {
        name.ends_with(suffix)
    } else {
        !name.ends_with(filter)
    }
}

/// Pre-read line content for every file in a config set.
///
/// Built once per resolution pass so the engine's two passes (values,
/// provenance) never re-read the filesystem. Missing or unreadable files
/// degrade to empty content, never an error.
#[derive(Debug, Clone, Default)]
pub struct FileContents {
    lines: HashMap<PathBuf, Vec<String>>,
}

impl FileContents {
    /// Bulk-reads every file in the set.
    #[must_use]
    pub fn read(set: &ConfigSet) -> Self {
        let mut contents = Self::default();
        for path in set.paths() {
            let lines = match std::fs::read_to_string(path) {
                Ok(content) => line::split_lines(&content),
                Err(e) => {
                    tracing::debug!(path = %path.display(), error = %e, "file read degraded to empty");
                    Vec::new()
                }
            };
            contents.lines.insert(path.to_path_buf(), lines);
        }
        contents
    }

    /// Creates contents from in-memory lines (tests, previews).
    #[must_use]
    pub fn from_lines<I, P, L>(entries: I) -> Self
    where
        I: IntoIterator<Item = (P, L)>,
        P: Into<PathBuf>,
        L: IntoIterator<Item = String>,
    {
        Self {
            lines: entries
                .into_iter()
                .map(|(p, l)| (p.into(), l.into_iter().collect()))
                .collect(),
        }
    }

    /// The lines of one file; empty for files outside the set.
    #[must_use]
    pub fn lines(&self, path: &Path) -> &[String] {
        self.lines.get(path).map_or(&[], Vec::as_slice)
    }
}
