//! dnsmasq option name constants.
//!
//! Use these constants instead of string literals when querying the
//! resolution engine, so a typo is a compile error rather than a silent
//! "unknown option" lookup. Matching is case-sensitive everywhere, same
//! as dnsmasq itself.

// Include directives
/// Include a single additional config file.
pub const CONF_FILE: &str = "conf-file";
/// Include every file in a directory, with an optional suffix filter.
pub const CONF_DIR: &str = "conf-dir";

// Hosts
/// Don't read /etc/hosts.
pub const NO_HOSTS: &str = "no-hosts";
/// Additional hosts file(s).
pub const ADDN_HOSTS: &str = "addn-hosts";
/// Expand simple names from hosts files with the configured domain.
pub const EXPAND_HOSTS: &str = "expand-hosts";
/// The local domain.
pub const DOMAIN: &str = "domain";
/// TTL for locally-known names.
pub const LOCAL_TTL: &str = "local-ttl";

// DHCP
/// A DHCP address range.
pub const DHCP_RANGE: &str = "dhcp-range";
/// A static DHCP reservation (the structured directive).
pub const DHCP_HOST: &str = "dhcp-host";
/// A DHCP option sent to clients.
pub const DHCP_OPTION: &str = "dhcp-option";
/// BOOTP/netboot options.
pub const DHCP_BOOT: &str = "dhcp-boot";
/// Path of the lease database file.
pub const DHCP_LEASEFILE: &str = "dhcp-leasefile";
/// Lease-change script.
pub const DHCP_SCRIPT: &str = "dhcp-script";
/// Claim DHCP authority on the subnet.
pub const DHCP_AUTHORITATIVE: &str = "dhcp-authoritative";
/// Ignore hosts matching a tag.
pub const DHCP_IGNORE: &str = "dhcp-ignore";
/// Match clients by vendor/user class or option content.
pub const DHCP_MATCH: &str = "dhcp-match";
/// Read static reservations from /etc/ethers.
pub const READ_ETHERS: &str = "read-ethers";

// DNS records
/// Force a domain to an address.
pub const ADDRESS: &str = "address";
/// A CNAME record.
pub const CNAME: &str = "cname";
/// An MX record.
pub const MX_HOST: &str = "mx-host";
/// A TXT record.
pub const TXT_RECORD: &str = "txt-record";
/// An SRV record.
pub const SRV_HOST: &str = "srv-host";
/// An A/AAAA/PTR record bundle.
pub const HOST_RECORD: &str = "host-record";
/// A PTR record.
pub const PTR_RECORD: &str = "ptr-record";

// Upstream / resolv
/// An upstream server (shares one logical field with `local`).
pub const SERVER: &str = "server";
/// A domain answered only from local config (alias form of `server`).
pub const LOCAL: &str = "local";
/// Don't read /etc/resolv.conf.
pub const NO_RESOLV: &str = "no-resolv";
/// Alternative resolv file path.
pub const RESOLV_FILE: &str = "resolv-file";
/// Query upstream servers strictly in order.
pub const STRICT_ORDER: &str = "strict-order";
/// Never forward plain names.
pub const DOMAIN_NEEDED: &str = "domain-needed";
/// Never forward reverse lookups of private ranges.
pub const BOGUS_PRIV: &str = "bogus-priv";
/// Don't poll resolv files for changes.
pub const NO_POLL: &str = "no-poll";

// TFTP / PXE
/// Enable the builtin TFTP server.
pub const ENABLE_TFTP: &str = "enable-tftp";
/// TFTP root directory.
pub const TFTP_ROOT: &str = "tftp-root";
/// A PXE boot service.
pub const PXE_SERVICE: &str = "pxe-service";
/// The PXE boot prompt.
pub const PXE_PROMPT: &str = "pxe-prompt";

// DNSSEC
/// Enable DNSSEC validation.
pub const DNSSEC: &str = "dnssec";
/// A DNSSEC trust anchor.
pub const TRUST_ANCHOR: &str = "trust-anchor";
/// Treat unsigned replies below a secure zone as bogus.
pub const DNSSEC_CHECK_UNSIGNED: &str = "dnssec-check-unsigned";

// Cache
/// DNS cache size in entries.
pub const CACHE_SIZE: &str = "cache-size";
/// Disable negative caching.
pub const NO_NEGCACHE: &str = "no-negcache";
/// Floor for cached TTLs.
pub const MIN_CACHE_TTL: &str = "min-cache-ttl";
/// Ceiling for cached TTLs.
pub const MAX_CACHE_TTL: &str = "max-cache-ttl";
/// Maximum concurrent forwarded queries.
pub const DNS_FORWARD_MAX: &str = "dns-forward-max";

// Process / networking
/// DNS listening port.
pub const PORT: &str = "port";
/// Listen on a specific interface.
pub const INTERFACE: &str = "interface";
/// Never listen on an interface.
pub const EXCEPT_INTERFACE: &str = "except-interface";
/// Listen on a specific address.
pub const LISTEN_ADDRESS: &str = "listen-address";
/// Bind only the interfaces in use.
pub const BIND_INTERFACES: &str = "bind-interfaces";
/// Run as this user.
pub const USER: &str = "user";
/// Run as this group.
pub const GROUP: &str = "group";
/// PID file path.
pub const PID_FILE: &str = "pid-file";
/// Log DNS queries.
pub const LOG_QUERIES: &str = "log-queries";
/// Log DHCP transactions.
pub const LOG_DHCP: &str = "log-dhcp";
/// Log target (file path or syslog facility).
pub const LOG_FACILITY: &str = "log-facility";
/// Asynchronous logging depth.
pub const LOG_ASYNC: &str = "log-async";
