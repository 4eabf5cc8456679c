//! The structured `dhcp-host=` directive grammar.
//!
//! dnsmasq's `dhcp-host` format is positionally loose: fields may appear
//! in flexible order. Instead of a positional grammar, each
//! comma-separated field is classified by a fixed-priority list of type
//! predicates, mutually exclusive in well-formed input, with a defined
//! fallback — anything unclassified is opaque extra data, never a parse
//! failure.
//!
//! Classification priority:
//! 1. Six colon-separated hex byte pairs → MAC address (multiple MACs are
//!    valid and mean "these hosts share one IP").
//! 2. Four dot-separated octets 0–255 → IPv4 address.
//! 3. `infinite` (case-insensitive) or a leading digit → lease duration.
//! 4. `ignore` (case-insensitive) → the ignore flag.
//! 5. `id:`/`set:` prefix (case-insensitive) → opaque `extra`, order kept.
//! 6. DNS-label-like token (letter, then letters/digits/`_`/`-`) → name.
//! 7. Anything else → opaque `extra`.
//!
//! Round-tripping normalizes field order and spacing; it is guaranteed to
//! be *semantically* identical (re-parsing yields the same classified
//! fields), not byte-identical to arbitrary hand-written input.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

#[cfg(test)]
#[path = "grammar_tests.rs"]
mod tests;

/// The directive prefix every (possibly commented) entry line carries.
pub const DIRECTIVE: &str = "dhcp-host=";

static MAC_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[0-9A-Fa-f]{2}(:[0-9A-Fa-f]{2}){5}$").expect("mac regex")
});

static HOSTNAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z][A-Za-z0-9_-]*$").expect("hostname regex"));

fn is_ipv4(field: &str) -> bool {
    field.parse::<std::net::Ipv4Addr>().is_ok()
}

/// One parsed `dhcp-host=` entry.
///
/// Constructed by [`DhcpHostEntry::parse`] from one line; consumed by the
/// managed-file writer to find-or-append; replaced wholesale, never
/// mutated field-by-field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DhcpHostEntry {
    /// MAC addresses, in the order written.
    pub macs: Vec<String>,
    /// The IPv4 address (last occurrence wins on malformed input).
    pub address: Option<String>,
    /// The host name (last occurrence wins on malformed input).
    pub name: Option<String>,
    /// The lease duration (`infinite` or a time spec like `12h`).
    pub lease: Option<String>,
    /// Whether dnsmasq should ignore this host.
    pub ignore: bool,
    /// Opaque tags (`id:...`, `set:...`, unclassifiable fields), in order.
    pub extra: Vec<String>,
    /// Commented out with a single `#`.
    pub is_comment: bool,
    /// Commented out with `##`: comment **and** logically deleted.
    pub is_deleted: bool,
    /// Trailing `# comment` text, without the marker.
    pub comment: Option<String>,
    /// 1-based line number in the file the entry was read from.
    pub line_number: u32,
    /// Content-derived stable identity; assigned at read/write time by
    /// [`crate::writer::assign_ids`], never persisted.
    pub id: String,
}

impl DhcpHostEntry {
    /// Parses one raw line into an entry.
    ///
    /// Returns `None` when the line is not a `dhcp-host=` directive
    /// (commented or not). A `##` prefix marks the entry deleted, a
    /// single `#` marks it commented out.
    #[must_use]
    pub fn parse(raw: &str, line_number: u32) -> Option<Self> {
        let mut line = raw.trim();

        let mut is_comment = false;
        let mut is_deleted = false;
        if let Some(rest) = line.strip_prefix("##") {
            is_comment = true;
            is_deleted = true;
            line = rest.trim_start();
        } else if let Some(rest) = line.strip_prefix('#') {
            is_comment = true;
            line = rest.trim_start();
        }

        let body = line.strip_prefix(DIRECTIVE)?;

        let (fields_part, comment) = match body.split_once('#') {
            Some((fields, trailing)) => (fields, Some(trailing.trim().to_owned())),
            None => (body, None),
        };

        let mut entry = Self {
            is_comment,
            is_deleted,
            comment: comment.filter(|c| !c.is_empty()),
            line_number,
            ..Self::default()
        };

        for field in fields_part.split(',') {
            let field = field.trim();
            if field.is_empty() {
                continue;
            }
            entry.classify(field);
        }

        Some(entry)
    }

    /// Applies the fixed-priority field classifier to one field.
    fn classify(&mut self, field: &str) {
        if MAC_RE.is_match(field) {
            self.macs.push(field.to_owned());
        } else if is_ipv4(field) {
            self.address = Some(field.to_owned());
        } else if field.eq_ignore_ascii_case("infinite")
            || field.starts_with(|c: char| c.is_ascii_digit())
        {
            self.lease = Some(field.to_owned());
        } else if field.eq_ignore_ascii_case("ignore") {
            self.ignore = true;
        } else if has_tag_prefix(field) {
            self.extra.push(field.to_owned());
        } else if HOSTNAME_RE.is_match(field) {
            self.name = Some(field.to_owned());
        } else {
            self.extra.push(field.to_owned());
        }
    }

    /// Whether no field classified at all.
    ///
    /// Such an entry must not be serialized as an active directive: a
    /// bare `dhcp-host=` line is ambiguous to dnsmasq.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.macs.is_empty()
            && self.address.is_none()
            && self.name.is_none()
            && self.lease.is_none()
            && !self.ignore
            && self.extra.is_empty()
    }

    /// Serializes the entry back to a config line.
    ///
    /// Field order is normalized: `id:` tags, MACs, name, address,
    /// remaining extras, lease, `ignore`. The `##`/`#` prefix reflects
    /// the deleted/comment flags; an entry with no classifiable fields is
    /// forced into a leading-`#` state.
    #[must_use]
    pub fn to_line(&self) -> String {
        let mut fields: Vec<&str> = Vec::new();

        let (id_tags, other_extras): (Vec<&String>, Vec<&String>) = self
            .extra
            .iter()
            .partition(|e| starts_with_ci(e, "id:"));

        fields.extend(id_tags.iter().map(|s| s.as_str()));
        fields.extend(self.macs.iter().map(String::as_str));
        if let Some(name) = &self.name {
            fields.push(name);
        }
        if let Some(address) = &self.address {
            fields.push(address);
        }
        fields.extend(other_extras.iter().map(|s| s.as_str()));
        if let Some(lease) = &self.lease {
            fields.push(lease);
        }
        if self.ignore {
            fields.push("ignore");
        }

        let prefix = if self.is_deleted {
            "##"
        } else if self.is_comment || self.is_empty() {
            "#"
        } else {
            ""
        };

        let mut out = format!("{prefix}{DIRECTIVE}{}", fields.join(","));
        if let Some(comment) = &self.comment {
            out.push_str(" # ");
            out.push_str(comment);
        }
        out
    }
}

/// ASCII-case-insensitive prefix test, safe on any UTF-8 input.
fn starts_with_ci(field: &str, prefix: &str) -> bool {
    field
        .get(..prefix.len())
        .is_some_and(|p| p.eq_ignore_ascii_case(prefix))
}

fn has_tag_prefix(field: &str) -> bool {
    starts_with_ci(field, "id:") || starts_with_ci(field, "set:")
}

/// Parses every `dhcp-host` entry out of a file's lines, commented
/// entries included. Line numbers are 1-based.
#[must_use]
pub fn parse_lines(lines: &[String]) -> Vec<DhcpHostEntry> {
    lines
        .iter()
        .enumerate()
        .filter_map(|(idx, raw)| {
            let number = u32::try_from(idx + 1).ok()?;
            DhcpHostEntry::parse(raw, number)
        })
        .collect()
}
