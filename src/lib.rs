//! masqconf: dnsmasq effective-configuration engine
//!
//! A library for discovering a dnsmasq config set, resolving the
//! effective value of each option with provenance, editing dhcp-host
//! reservations structurally, and rewriting the managed file atomically.

pub mod cache;
pub mod cli;
pub mod dhcphost;
pub mod files;
pub mod line;
pub mod options;
pub mod resolve;
pub mod time;
pub mod writer;
