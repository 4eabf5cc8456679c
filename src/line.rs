//! Raw directive line parsing.
//!
//! This module splits one raw dnsmasq config line into a `(key, value)`
//! pair, independent of any option semantics. Blank lines and comments
//! yield `None`. Option knowledge (behaviors, catalogs) lives in
//! [`crate::options`].

/// A parsed directive: the option key and its (possibly empty) value.
///
/// Case is preserved exactly as written — dnsmasq compares option names
/// case-sensitively, so `Port` and `port` are different keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directive<'a> {
    /// The option name, left of the first `=`.
    pub key: &'a str,
    /// The value, right of the first `=`. Empty for bare keys like
    /// `expand-hosts`.
    pub value: &'a str,
}

/// Parses one raw config line into a [`Directive`].
///
/// Returns `None` for blank lines and `#` comments. A line without `=`
/// is a bare key with an empty value (the form flag options take).
/// A UTF-8 byte-order mark is stripped before parsing, because dnsmasq
/// itself treats a BOM-prefixed first directive as an unrecognized
/// option.
#[must_use]
pub fn parse(raw: &str) -> Option<Directive<'_>> {
    let line = strip_bom(raw).trim();
    if line.is_empty() || line.starts_with('#') {
        return None;
    }

    match line.split_once('=') {
        Some((key, value)) => Some(Directive {
            key: key.trim(),
            value: value.trim(),
        }),
        None => Some(Directive {
            key: line,
            value: "",
        }),
    }
}

/// Removes a leading UTF-8 byte-order mark, if present.
fn strip_bom(raw: &str) -> &str {
    raw.strip_prefix('\u{feff}').unwrap_or(raw)
}

/// Splits file content into lines, tolerating `\r\n` endings.
///
/// The BOM on the first line is left in place here; [`parse`] strips it
/// per line so callers can index lines without offset bookkeeping.
#[must_use]
pub fn split_lines(content: &str) -> Vec<String> {
    content
        .split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line).to_string())
        .collect()
}
