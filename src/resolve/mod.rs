//! Option resolution: effective values and their provenance.
//!
//! Given the ordered config set and pre-read line content, this module
//! computes, for every known option, the effective value(s) under the
//! correct merge behavior ([`OptionBehavior`]), and — in a parallel pass —
//! the provenance of each effective value.
//!
//! Provenance is a parallel computation rather than an inline annotation:
//! resolution runs twice (value-only, and value+source) instead of
//! threading source tracking through every merge step. That trades some
//! recomputation for a much simpler merge algorithm; the file set is
//! small and pre-read, so the second pass is cheap.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::files::{ConfigSet, FileContents};
use crate::line;
use crate::options::{self, CATALOG, OptionBehavior};

#[cfg(test)]
#[path = "engine_tests.rs"]
mod tests;

/// Which file and line produced a resolved value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValueProvenance {
    /// Absolute path of the producing file.
    pub file_path: PathBuf,
    /// File name only, for display.
    pub file_name: String,
    /// Whether the producing file is the managed file. Values from
    /// non-managed files are read-only to consumers.
    pub is_managed: bool,
    /// 1-based line number within the producing file.
    pub line_number: Option<u32>,
}

impl ValueProvenance {
    pub(crate) fn at(set: &ConfigSet, path: &Path, line_number: u32) -> Self {
        Self {
            file_path: path.to_path_buf(),
            file_name: path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
            is_managed: set.is_managed(path),
            line_number: Some(line_number),
        }
    }
}

/// Iterates every parsed directive across the whole ordered stream,
/// yielding `(path, line_number, key, value)` in file order then line
/// order. Malformed and comment lines are skipped, never fatal.
fn directives<'a>(
    set: &'a ConfigSet,
    contents: &'a FileContents,
) -> impl Iterator<Item = (&'a Path, u32, &'a str, &'a str)> {
    set.paths().flat_map(move |path| {
        contents
            .lines(path)
            .iter()
            .enumerate()
            .filter_map(move |(idx, raw)| {
                let d = line::parse(raw)?;
                let number = u32::try_from(idx + 1).ok()?;
                Some((path, number, d.key, d.value))
            })
    })
}

/// Resolves a flag option: `true` iff some line's key case-sensitively
/// equals `name` **and** its value is empty.
///
/// A flag written with a value (e.g. `expand-hosts=1`) is treated as
/// absent, mirroring dnsmasq's rule that flag options take no argument —
/// a malformed line must not silently enable the flag.
#[must_use]
pub fn resolve_flag(set: &ConfigSet, contents: &FileContents, name: &str) -> bool {
    directives(set, contents).any(|(_, _, key, value)| key == name && value.is_empty())
}

/// Flag resolution plus the provenance of the enabling line.
///
/// When multiple bare lines exist, the last one is reported, consistent
/// with the last-wins provenance story.
#[must_use]
pub fn resolve_flag_with_source(
    set: &ConfigSet,
    contents: &FileContents,
    name: &str,
) -> (bool, Option<ValueProvenance>) {
    let mut source = None;
    for (path, number, key, value) in directives(set, contents) {
        if key == name && value.is_empty() {
            source = Some(ValueProvenance::at(set, path, number));
        }
    }
    (source.is_some(), source)
}

/// Resolves a last-wins option: the last matching line anywhere in the
/// full path-ordered stream wins, regardless of which file it is in.
///
/// Returns the winning value together with the directory of the file
/// that produced it, so relative path-valued options (e.g.
/// `dhcp-leasefile=`) can be resolved against the correct base.
#[must_use]
pub fn resolve_last(
    set: &ConfigSet,
    contents: &FileContents,
    name: &str,
) -> Option<(String, PathBuf)> {
    let mut winner = None;
    for (path, _, key, value) in directives(set, contents) {
        if key == name {
            let dir = path.parent().unwrap_or_else(|| Path::new("")).to_path_buf();
            winner = Some((value.to_owned(), dir));
        }
    }
    winner
}

/// Last-wins resolution plus the provenance of the winning line.
#[must_use]
pub fn resolve_last_with_source(
    set: &ConfigSet,
    contents: &FileContents,
    name: &str,
) -> Option<(String, ValueProvenance)> {
    let mut winner = None;
    for (path, number, key, value) in directives(set, contents) {
        if key == name {
            winner = Some((value.to_owned(), ValueProvenance::at(set, path, number)));
        }
    }
    winner
}

/// Resolves a multi-value option: every matching line across every file
/// is retained, cumulative, in file order then line order.
///
/// `keys` is the key set the option resolves with — a single name for
/// most options, a group (e.g. `server`/`local`) for options backed by
/// more than one key name.
#[must_use]
pub fn resolve_multi(set: &ConfigSet, contents: &FileContents, keys: &[&str]) -> Vec<String> {
    directives(set, contents)
        .filter(|(_, _, key, _)| keys.contains(key))
        .map(|(_, _, _, value)| value.to_owned())
        .collect()
}

/// Multi resolution plus one provenance record per returned element, in
/// the same order.
#[must_use]
pub fn resolve_multi_with_source(
    set: &ConfigSet,
    contents: &FileContents,
    keys: &[&str],
) -> Vec<(String, ValueProvenance)> {
    directives(set, contents)
        .filter(|(_, _, key, _)| keys.contains(key))
        .map(|(path, number, _, value)| {
            (value.to_owned(), ValueProvenance::at(set, path, number))
        })
        .collect()
}

/// The effective value of one option after merging.
///
/// Derived, never owned: recomputed every resolution pass and replaced
/// wholesale, never partially updated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ResolvedValue {
    /// A flag option's presence.
    Flag {
        /// Whether the flag is set.
        enabled: bool,
    },
    /// A last-wins option's winning value and the directory it came from.
    Scalar {
        /// The winning value, `None` when the option never appears.
        value: Option<String>,
        /// Directory of the winning file, for resolving relative paths.
        source_dir: Option<PathBuf>,
    },
    /// A multi-value option's cumulative values.
    List {
        /// All values, in file order then line order.
        values: Vec<String>,
    },
}

/// The effective configuration: every catalog option, resolved.
#[derive(Debug, Clone, Serialize)]
pub struct EffectiveConfig {
    values: BTreeMap<&'static str, ResolvedValue>,
}

impl EffectiveConfig {
    /// Resolves every option in the catalog against the given set.
    #[must_use]
    pub fn resolve(set: &ConfigSet, contents: &FileContents) -> Self {
        let mut values = BTreeMap::new();
        for spec in CATALOG {
            let resolved = match spec.behavior {
                OptionBehavior::Flag => ResolvedValue::Flag {
                    enabled: resolve_flag(set, contents, spec.name),
                },
                OptionBehavior::LastWins => {
                    let winner = resolve_last(set, contents, spec.name);
                    ResolvedValue::Scalar {
                        value: winner.as_ref().map(|(v, _)| v.clone()),
                        source_dir: winner.map(|(_, d)| d),
                    }
                }
                OptionBehavior::Multi => ResolvedValue::List {
                    values: resolve_multi(set, contents, &options::key_group(spec.name)),
                },
            };
            values.insert(spec.name, resolved);
        }
        Self { values }
    }

    /// The resolved value of one option, if the option is in the catalog.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ResolvedValue> {
        self.values.get(name)
    }

    /// Whether a flag option is set. `false` for non-flag and unknown names.
    #[must_use]
    pub fn flag(&self, name: &str) -> bool {
        matches!(self.get(name), Some(ResolvedValue::Flag { enabled: true }))
    }

    /// The winning value of a last-wins option.
    #[must_use]
    pub fn scalar(&self, name: &str) -> Option<&str> {
        match self.get(name) {
            Some(ResolvedValue::Scalar { value, .. }) => value.as_deref(),
            _ => None,
        }
    }

    /// The directory of the file that produced a last-wins value.
    #[must_use]
    pub fn scalar_source_dir(&self, name: &str) -> Option<&Path> {
        match self.get(name) {
            Some(ResolvedValue::Scalar { source_dir, .. }) => source_dir.as_deref(),
            _ => None,
        }
    }

    /// The cumulative values of a multi option. Empty for other kinds.
    #[must_use]
    pub fn list(&self, name: &str) -> &[String] {
        match self.get(name) {
            Some(ResolvedValue::List { values }) => values,
            _ => &[],
        }
    }

    /// Iterates all resolved options in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &ResolvedValue)> {
        self.values.iter().map(|(name, value)| (*name, value))
    }
}

/// Provenance for every catalog option: the parallel pass to
/// [`EffectiveConfig::resolve`].
///
/// Flag and last-wins options carry at most one record; multi options
/// carry one record per emitted value, in the same order.
#[derive(Debug, Clone, Serialize)]
pub struct EffectiveSources {
    sources: BTreeMap<&'static str, Vec<ValueProvenance>>,
}

impl EffectiveSources {
    /// Resolves provenance for every option in the catalog.
    #[must_use]
    pub fn resolve(set: &ConfigSet, contents: &FileContents) -> Self {
        let mut sources = BTreeMap::new();
        for spec in CATALOG {
            let records = match spec.behavior {
                OptionBehavior::Flag => resolve_flag_with_source(set, contents, spec.name)
                    .1
                    .into_iter()
                    .collect(),
                OptionBehavior::LastWins => resolve_last_with_source(set, contents, spec.name)
                    .map(|(_, p)| p)
                    .into_iter()
                    .collect(),
                OptionBehavior::Multi => {
                    resolve_multi_with_source(set, contents, &options::key_group(spec.name))
                        .into_iter()
                        .map(|(_, p)| p)
                        .collect()
                }
            };
            sources.insert(spec.name, records);
        }
        Self { sources }
    }

    /// The provenance records for one option. Empty when absent.
    #[must_use]
    pub fn get(&self, name: &str) -> &[ValueProvenance] {
        self.sources.get(name).map_or(&[], Vec::as_slice)
    }

    /// Whether the value of `name` is editable, i.e. produced by the
    /// managed file (or absent — an absent option can be introduced
    /// there).
    #[must_use]
    pub fn is_editable(&self, name: &str) -> bool {
        self.get(name).iter().all(|p| p.is_managed)
    }
}
