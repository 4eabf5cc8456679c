//! CLI argument parsing using clap.
//!
//! Defines the command-line interface with all options and subcommands.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// masqconf: dnsmasq effective-configuration engine
///
/// Discovers the full config set behind a dnsmasq main file, resolves
/// the effective value of each option with provenance, and edits
/// dhcp-host reservations in one managed file.
#[derive(Debug, Parser)]
#[command(name = "masqconf")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,

    /// Path to the dnsmasq main configuration file
    #[arg(long, short, global = true, default_value = "/etc/dnsmasq.conf")]
    pub conf: PathBuf,

    /// Path to the managed configuration file (the only file written)
    #[arg(long, global = true)]
    pub managed: Option<PathBuf>,

    /// Path to the managed addn-hosts file
    #[arg(long = "managed-hosts", global = true)]
    pub managed_hosts: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(long, short, global = true)]
    pub verbose: bool,
}

/// Subcommands for masqconf
#[derive(Debug, Subcommand)]
pub enum Command {
    /// List the discovered config set in evaluation order
    Files,
    /// Show the effective configuration with per-value provenance
    Show {
        /// Emit JSON instead of the human-readable table
        #[arg(long)]
        json: bool,
    },
    /// List dhcp-host reservations across the whole config set
    Hosts {
        /// Emit JSON instead of the human-readable table
        #[arg(long)]
        json: bool,
    },
    /// Watch the config set and log changes until interrupted
    Watch,
}

impl Cli {
    /// Parses CLI arguments from the command line.
    #[must_use]
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Parses CLI arguments from an iterator (useful for testing).
    pub fn parse_from_iter<I, T>(iter: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        Self::parse_from(iter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_system_conf_path() {
        let cli = Cli::parse_from_iter(["masqconf", "files"]);
        assert_eq!(cli.conf, PathBuf::from("/etc/dnsmasq.conf"));
        assert!(cli.managed.is_none());
        assert!(!cli.verbose);
        assert!(matches!(cli.command, Command::Files));
    }

    #[test]
    fn global_flags_parse_after_the_subcommand() {
        let cli = Cli::parse_from_iter([
            "masqconf",
            "show",
            "--json",
            "--conf",
            "/tmp/dnsmasq.conf",
            "--managed",
            "/tmp/managed.conf",
            "-v",
        ]);
        assert_eq!(cli.conf, PathBuf::from("/tmp/dnsmasq.conf"));
        assert_eq!(cli.managed, Some(PathBuf::from("/tmp/managed.conf")));
        assert!(cli.verbose);
        assert!(matches!(cli.command, Command::Show { json: true }));
    }

    #[test]
    fn hosts_defaults_to_table_output() {
        let cli = Cli::parse_from_iter(["masqconf", "hosts"]);
        assert!(matches!(cli.command, Command::Hosts { json: false }));
    }

    #[test]
    fn managed_hosts_path_is_separate_from_managed() {
        let cli = Cli::parse_from_iter([
            "masqconf",
            "watch",
            "--managed-hosts",
            "/tmp/hosts.managed",
        ]);
        assert_eq!(
            cli.managed_hosts,
            Some(PathBuf::from("/tmp/hosts.managed"))
        );
        assert!(cli.managed.is_none());
    }
}
