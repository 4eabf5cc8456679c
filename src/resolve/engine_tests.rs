//! Tests for the option resolution engine.

use super::*;
use crate::options::names;
use std::path::PathBuf;

/// Builds an in-memory set of `(path, lines)` files plus the matching
/// `ConfigSet`, without touching the filesystem. Discovery has its own
/// tests; the engine only needs ordered paths and pre-read lines.
fn fixture(files: &[(&str, &[&str])]) -> (ConfigSet, FileContents) {
    fixture_with_managed(files, None)
}

fn fixture_with_managed(
    files: &[(&str, &[&str])],
    managed: Option<&str>,
) -> (ConfigSet, FileContents) {
    use crate::files::{ConfigFile, FileRole};

    let entries: Vec<ConfigFile> = files
        .iter()
        .enumerate()
        .map(|(i, (path, _))| ConfigFile {
            path: PathBuf::from(path),
            role: if i == 0 {
                FileRole::Main
            } else {
                FileRole::ConfFile
            },
            is_managed: managed == Some(*path),
        })
        .collect();

    let set = ConfigSet {
        main_path: entries[0].path.clone(),
        managed_path: managed.map(PathBuf::from),
        managed_hosts_path: None,
        files: entries,
    };

    let contents = FileContents::from_lines(
        files
            .iter()
            .map(|(path, lines)| (*path, lines.iter().map(|l| (*l).to_owned()))),
    );

    (set, contents)
}

mod flags {
    use super::*;

    #[test]
    fn bare_line_sets_flag() {
        let (set, contents) = fixture(&[("/etc/dnsmasq.conf", &["expand-hosts"])]);
        assert!(resolve_flag(&set, &contents, names::EXPAND_HOSTS));
    }

    #[test]
    fn flag_with_value_is_absent() {
        // `expand-hosts=1` is malformed: flag options take no argument.
        let (set, contents) = fixture(&[("/etc/dnsmasq.conf", &["expand-hosts=1"])]);
        assert!(!resolve_flag(&set, &contents, names::EXPAND_HOSTS));
    }

    #[test]
    fn flag_with_any_value_is_absent() {
        for value in ["true", "yes", "0", "x"] {
            let line = format!("no-resolv={value}");
            let lines = [line.as_str()];
            let (set, contents) = fixture(&[("/etc/dnsmasq.conf", &lines)]);
            assert!(
                !resolve_flag(&set, &contents, names::NO_RESOLV),
                "value {value:?} must not enable the flag"
            );
        }
    }

    #[test]
    fn missing_flag_is_false() {
        let (set, contents) = fixture(&[("/etc/dnsmasq.conf", &["port=53"])]);
        assert!(!resolve_flag(&set, &contents, names::EXPAND_HOSTS));
    }

    #[test]
    fn flag_found_in_any_file() {
        let (set, contents) = fixture(&[
            ("/etc/dnsmasq.conf", &["port=53"]),
            ("/etc/d/extra.conf", &["bogus-priv"]),
        ]);
        assert!(resolve_flag(&set, &contents, names::BOGUS_PRIV));
    }

    #[test]
    fn flag_name_is_case_sensitive() {
        let (set, contents) = fixture(&[("/etc/dnsmasq.conf", &["Expand-Hosts"])]);
        assert!(!resolve_flag(&set, &contents, names::EXPAND_HOSTS));
    }

    #[test]
    fn flag_source_points_at_enabling_line() {
        let (set, contents) = fixture(&[
            ("/etc/dnsmasq.conf", &["# header", "log-queries"]),
            ("/etc/d/extra.conf", &[]),
        ]);

        let (enabled, source) = resolve_flag_with_source(&set, &contents, names::LOG_QUERIES);

        assert!(enabled);
        let source = source.unwrap();
        assert_eq!(source.file_path, PathBuf::from("/etc/dnsmasq.conf"));
        assert_eq!(source.file_name, "dnsmasq.conf");
        assert_eq!(source.line_number, Some(2));
    }

    #[test]
    fn absent_flag_has_no_source() {
        let (set, contents) = fixture(&[("/etc/dnsmasq.conf", &[])]);
        let (enabled, source) = resolve_flag_with_source(&set, &contents, names::DNSSEC);
        assert!(!enabled);
        assert!(source.is_none());
    }
}

mod last_wins {
    use super::*;

    #[test]
    fn later_file_wins() {
        let (set, contents) = fixture(&[
            ("/etc/dnsmasq.conf", &["cache-size=100"]),
            ("/etc/d/extra.conf", &["cache-size=200"]),
        ]);

        let (value, dir) = resolve_last(&set, &contents, names::CACHE_SIZE).unwrap();

        assert_eq!(value, "200");
        assert_eq!(dir, PathBuf::from("/etc/d"));
    }

    #[test]
    fn later_line_in_same_file_wins() {
        let (set, contents) = fixture(&[(
            "/etc/dnsmasq.conf",
            &["cache-size=100", "port=53", "cache-size=300"],
        )]);

        let (value, _) = resolve_last(&set, &contents, names::CACHE_SIZE).unwrap();
        assert_eq!(value, "300");
    }

    #[test]
    fn order_depends_only_on_include_graph() {
        // Same content, opposite file order: the winner flips.
        let (set_ab, contents_ab) = fixture(&[
            ("/a.conf", &["domain=first"]),
            ("/b.conf", &["domain=second"]),
        ]);
        let (set_ba, contents_ba) = fixture(&[
            ("/b.conf", &["domain=second"]),
            ("/a.conf", &["domain=first"]),
        ]);

        assert_eq!(
            resolve_last(&set_ab, &contents_ab, names::DOMAIN).unwrap().0,
            "second"
        );
        assert_eq!(
            resolve_last(&set_ba, &contents_ba, names::DOMAIN).unwrap().0,
            "first"
        );
    }

    #[test]
    fn absent_option_is_none() {
        let (set, contents) = fixture(&[("/etc/dnsmasq.conf", &[])]);
        assert!(resolve_last(&set, &contents, names::CACHE_SIZE).is_none());
    }

    #[test]
    fn case_mismatch_never_matches() {
        let (set, contents) = fixture(&[("/etc/dnsmasq.conf", &["Port=53"])]);
        assert!(resolve_last(&set, &contents, names::PORT).is_none());
    }

    #[test]
    fn source_dir_supports_relative_path_options() {
        let (set, contents) = fixture(&[
            ("/etc/dnsmasq.conf", &["dhcp-leasefile=leases"]),
            ("/var/lib/misc/extra.conf", &["dhcp-leasefile=dnsmasq.leases"]),
        ]);

        let (value, dir) = resolve_last(&set, &contents, names::DHCP_LEASEFILE).unwrap();

        assert_eq!(value, "dnsmasq.leases");
        assert_eq!(dir.join(value), PathBuf::from("/var/lib/misc/dnsmasq.leases"));
    }

    #[test]
    fn source_records_winning_line() {
        let (set, contents) = fixture(&[
            ("/etc/dnsmasq.conf", &["cache-size=100"]),
            ("/etc/d/z.conf", &["# comment", "", "cache-size=200"]),
        ]);

        let (value, source) =
            resolve_last_with_source(&set, &contents, names::CACHE_SIZE).unwrap();

        assert_eq!(value, "200");
        assert_eq!(source.file_name, "z.conf");
        assert_eq!(source.line_number, Some(3));
    }
}

mod multi {
    use super::*;

    #[test]
    fn values_accumulate_across_files_in_order() {
        let (set, contents) = fixture(&[
            ("/a.conf", &["dhcp-range=192.168.1.50,192.168.1.150"]),
            ("/b.conf", &["dhcp-range=10.0.0.50,10.0.0.150"]),
        ]);

        let values = resolve_multi(&set, &contents, &[names::DHCP_RANGE]);

        assert_eq!(
            values,
            vec!["192.168.1.50,192.168.1.150", "10.0.0.50,10.0.0.150"]
        );
    }

    #[test]
    fn within_a_file_earlier_lines_come_first() {
        let (set, contents) = fixture(&[(
            "/a.conf",
            &["address=/a.example/1.1.1.1", "address=/b.example/2.2.2.2"],
        )]);

        let values = resolve_multi(&set, &contents, &[names::ADDRESS]);

        assert_eq!(values[0], "/a.example/1.1.1.1");
        assert_eq!(values[1], "/b.example/2.2.2.2");
    }

    #[test]
    fn duplicates_are_retained_not_merged() {
        let (set, contents) = fixture(&[
            ("/a.conf", &["interface=eth0"]),
            ("/b.conf", &["interface=eth0"]),
        ]);

        let values = resolve_multi(&set, &contents, &[names::INTERFACE]);
        assert_eq!(values, vec!["eth0", "eth0"]);
    }

    #[test]
    fn server_and_local_resolve_as_one_key_set() {
        let (set, contents) = fixture(&[(
            "/a.conf",
            &[
                "server=8.8.8.8",
                "local=/lan/",
                "server=/corp.example/10.0.0.1",
            ],
        )]);

        let values = resolve_multi(&set, &contents, crate::options::SERVER_GROUP);

        assert_eq!(values, vec!["8.8.8.8", "/lan/", "/corp.example/10.0.0.1"]);
    }

    #[test]
    fn one_provenance_per_element_in_order() {
        let (set, contents) = fixture(&[
            ("/a.conf", &["interface=eth0"]),
            ("/b.conf", &["# x", "interface=wlan0"]),
        ]);

        let with_source = resolve_multi_with_source(&set, &contents, &[names::INTERFACE]);

        assert_eq!(with_source.len(), 2);
        assert_eq!(with_source[0].0, "eth0");
        assert_eq!(with_source[0].1.file_name, "a.conf");
        assert_eq!(with_source[0].1.line_number, Some(1));
        assert_eq!(with_source[1].0, "wlan0");
        assert_eq!(with_source[1].1.file_name, "b.conf");
        assert_eq!(with_source[1].1.line_number, Some(2));
    }
}

mod effective {
    use super::*;

    #[test]
    fn resolves_every_catalog_option() {
        let (set, contents) = fixture(&[("/etc/dnsmasq.conf", &[])]);
        let effective = EffectiveConfig::resolve(&set, &contents);

        for spec in crate::options::CATALOG {
            assert!(effective.get(spec.name).is_some(), "{} missing", spec.name);
        }
    }

    #[test]
    fn conf_dir_scenario_from_spec() {
        // main: conf-dir=d; d/a.conf: cache-size=100; d/z.conf: cache-size=200
        // effective cache-size = 200, source = d/z.conf.
        let (set, contents) = fixture(&[
            ("/etc/dnsmasq.conf", &["conf-dir=d"]),
            ("/etc/d/a.conf", &["cache-size=100"]),
            ("/etc/d/z.conf", &["cache-size=200"]),
        ]);

        let effective = EffectiveConfig::resolve(&set, &contents);
        let sources = EffectiveSources::resolve(&set, &contents);

        assert_eq!(effective.scalar(names::CACHE_SIZE), Some("200"));
        assert_eq!(sources.get(names::CACHE_SIZE)[0].file_name, "z.conf");
    }

    #[test]
    fn typed_accessors() {
        let (set, contents) = fixture(&[(
            "/etc/dnsmasq.conf",
            &["expand-hosts", "port=5353", "interface=eth0", "interface=br0"],
        )]);

        let effective = EffectiveConfig::resolve(&set, &contents);

        assert!(effective.flag(names::EXPAND_HOSTS));
        assert_eq!(effective.scalar(names::PORT), Some("5353"));
        assert_eq!(effective.list(names::INTERFACE), ["eth0", "br0"]);
    }

    #[test]
    fn accessors_tolerate_kind_mismatch() {
        let (set, contents) = fixture(&[("/etc/dnsmasq.conf", &["port=53"])]);
        let effective = EffectiveConfig::resolve(&set, &contents);

        assert!(!effective.flag(names::PORT));
        assert!(effective.scalar(names::EXPAND_HOSTS).is_none());
        assert!(effective.list(names::PORT).is_empty());
    }

    #[test]
    fn managed_values_marked_editable() {
        let (set, contents) = fixture_with_managed(
            &[
                ("/etc/dnsmasq.conf", &["port=53"]),
                ("/etc/d/managed.conf", &["cache-size=500"]),
            ],
            Some("/etc/d/managed.conf"),
        );

        let sources = EffectiveSources::resolve(&set, &contents);

        assert!(sources.get(names::CACHE_SIZE)[0].is_managed);
        assert!(sources.is_editable(names::CACHE_SIZE));
        assert!(!sources.is_editable(names::PORT));
        // Absent options can be introduced in the managed file.
        assert!(sources.is_editable(names::DOMAIN));
    }
}
