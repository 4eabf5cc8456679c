//! Option registry: the static map from option name to parsing kind and
//! merge behavior.
//!
//! This catalog is the contract the resolution engine is built against.
//! Adding support for a new dnsmasq option means adding a constant in
//! [`names`] and a row in [`CATALOG`] — nothing else changes.
//!
//! Lookups are case-sensitive by design: dnsmasq's own option comparison
//! is strict, so `Port=53` must never be recognized as `port=53`.

pub mod names;

use serde::Serialize;

/// How occurrences of an option across the ordered file set combine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum OptionBehavior {
    /// Presence with an empty value enables the option; any value makes
    /// the line malformed and the flag absent.
    Flag,
    /// Only the final occurrence across the whole ordered stream counts.
    LastWins,
    /// Every occurrence is cumulative, in file order then line order.
    Multi,
}

/// How an option's value is interpreted once resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum OptionKind {
    /// An opaque value string.
    Value,
    /// A filesystem path, resolved relative to the directory of the file
    /// whose line won.
    Path,
    /// No value at all.
    Flag,
    /// A value with its own grammar (currently only `dhcp-host`, see
    /// [`crate::dhcphost`]).
    Structured,
}

/// One row of the option catalog.
#[derive(Debug, Clone, Copy)]
pub struct OptionSpec {
    /// The option name as written in config files.
    pub name: &'static str,
    /// Value interpretation.
    pub kind: OptionKind,
    /// Merge behavior.
    pub behavior: OptionBehavior,
}

const fn flag(name: &'static str) -> OptionSpec {
    OptionSpec {
        name,
        kind: OptionKind::Flag,
        behavior: OptionBehavior::Flag,
    }
}

const fn last(name: &'static str) -> OptionSpec {
    OptionSpec {
        name,
        kind: OptionKind::Value,
        behavior: OptionBehavior::LastWins,
    }
}

const fn last_path(name: &'static str) -> OptionSpec {
    OptionSpec {
        name,
        kind: OptionKind::Path,
        behavior: OptionBehavior::LastWins,
    }
}

const fn multi(name: &'static str) -> OptionSpec {
    OptionSpec {
        name,
        kind: OptionKind::Value,
        behavior: OptionBehavior::Multi,
    }
}

const fn multi_path(name: &'static str) -> OptionSpec {
    OptionSpec {
        name,
        kind: OptionKind::Path,
        behavior: OptionBehavior::Multi,
    }
}

/// The full option catalog: every option the engine knows about.
pub const CATALOG: &[OptionSpec] = &[
    // Include directives (consumed by the include resolver, listed so
    // consumers can still see where they came from)
    multi_path(names::CONF_FILE),
    multi_path(names::CONF_DIR),
    // Hosts
    flag(names::NO_HOSTS),
    multi_path(names::ADDN_HOSTS),
    flag(names::EXPAND_HOSTS),
    last(names::DOMAIN),
    last(names::LOCAL_TTL),
    // DHCP
    multi(names::DHCP_RANGE),
    OptionSpec {
        name: names::DHCP_HOST,
        kind: OptionKind::Structured,
        behavior: OptionBehavior::Multi,
    },
    multi(names::DHCP_OPTION),
    last(names::DHCP_BOOT),
    last_path(names::DHCP_LEASEFILE),
    last_path(names::DHCP_SCRIPT),
    flag(names::DHCP_AUTHORITATIVE),
    multi(names::DHCP_IGNORE),
    multi(names::DHCP_MATCH),
    flag(names::READ_ETHERS),
    // DNS records
    multi(names::ADDRESS),
    multi(names::CNAME),
    multi(names::MX_HOST),
    multi(names::TXT_RECORD),
    multi(names::SRV_HOST),
    multi(names::HOST_RECORD),
    multi(names::PTR_RECORD),
    // Upstream / resolv
    multi(names::SERVER),
    multi(names::LOCAL),
    flag(names::NO_RESOLV),
    last_path(names::RESOLV_FILE),
    flag(names::STRICT_ORDER),
    flag(names::DOMAIN_NEEDED),
    flag(names::BOGUS_PRIV),
    flag(names::NO_POLL),
    // TFTP / PXE
    flag(names::ENABLE_TFTP),
    last_path(names::TFTP_ROOT),
    multi(names::PXE_SERVICE),
    last(names::PXE_PROMPT),
    // DNSSEC
    flag(names::DNSSEC),
    multi(names::TRUST_ANCHOR),
    flag(names::DNSSEC_CHECK_UNSIGNED),
    // Cache
    last(names::CACHE_SIZE),
    flag(names::NO_NEGCACHE),
    last(names::MIN_CACHE_TTL),
    last(names::MAX_CACHE_TTL),
    last(names::DNS_FORWARD_MAX),
    // Process / networking
    last(names::PORT),
    multi(names::INTERFACE),
    multi(names::EXCEPT_INTERFACE),
    multi(names::LISTEN_ADDRESS),
    flag(names::BIND_INTERFACES),
    last(names::USER),
    last(names::GROUP),
    last_path(names::PID_FILE),
    flag(names::LOG_QUERIES),
    flag(names::LOG_DHCP),
    last_path(names::LOG_FACILITY),
    last(names::LOG_ASYNC),
];

/// Multi-value options backed by more than one key name resolve the
/// whole group as a single key set. `server` and `local` share one
/// logical upstream-servers field.
pub const SERVER_GROUP: &[&str] = &[names::SERVER, names::LOCAL];

/// Looks up the catalog row for an option name (case-sensitive).
#[must_use]
pub fn spec(name: &str) -> Option<&'static OptionSpec> {
    CATALOG.iter().find(|s| s.name == name)
}

/// Returns the merge behavior for an option name.
///
/// Unknown options default to [`OptionBehavior::LastWins`] — the engine
/// never fails on an unrecognized key.
#[must_use]
pub fn behavior(name: &str) -> OptionBehavior {
    spec(name).map_or(OptionBehavior::LastWins, |s| s.behavior)
}

/// Returns the key group an option resolves with.
///
/// Most options resolve alone; grouped options (currently only
/// `server`/`local`) resolve as one cumulative set.
#[must_use]
pub fn key_group<'a>(name: &'a str) -> Vec<&'a str> {
    if SERVER_GROUP.contains(&name) {
        SERVER_GROUP.to_vec()
    } else {
        vec![name]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_catalog_name_is_unique() {
        for (i, a) in CATALOG.iter().enumerate() {
            for b in &CATALOG[i + 1..] {
                assert_ne!(a.name, b.name, "duplicate catalog entry: {}", a.name);
            }
        }
    }

    #[test]
    fn flag_rows_have_flag_kind() {
        for row in CATALOG {
            if row.behavior == OptionBehavior::Flag {
                assert_eq!(row.kind, OptionKind::Flag, "{}", row.name);
            }
        }
    }

    #[test]
    fn known_option_behaviors() {
        assert_eq!(behavior(names::EXPAND_HOSTS), OptionBehavior::Flag);
        assert_eq!(behavior(names::CACHE_SIZE), OptionBehavior::LastWins);
        assert_eq!(behavior(names::DHCP_RANGE), OptionBehavior::Multi);
        assert_eq!(behavior(names::DHCP_HOST), OptionBehavior::Multi);
    }

    #[test]
    fn unknown_option_defaults_to_last_wins() {
        assert_eq!(behavior("no-such-option"), OptionBehavior::LastWins);
    }

    #[test]
    fn lookup_is_case_sensitive() {
        assert!(spec("port").is_some());
        assert!(spec("Port").is_none());
        assert_eq!(behavior("Port"), OptionBehavior::LastWins);
    }

    #[test]
    fn server_and_local_share_a_group() {
        assert_eq!(key_group(names::SERVER), SERVER_GROUP.to_vec());
        assert_eq!(key_group(names::LOCAL), SERVER_GROUP.to_vec());
    }

    #[test]
    fn ungrouped_option_resolves_alone() {
        assert_eq!(key_group(names::CACHE_SIZE), vec![names::CACHE_SIZE]);
    }

    #[test]
    fn dhcp_host_is_structured() {
        assert_eq!(spec(names::DHCP_HOST).unwrap().kind, OptionKind::Structured);
    }
}
