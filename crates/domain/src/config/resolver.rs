use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr};
use std::time::Duration;

/// A root nameserver and its well-known address.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct RootHint {
    pub name: String,
    pub address: IpAddr,
}

impl RootHint {
    pub fn new(name: impl Into<String>, address: IpAddr) -> Self {
        Self {
            name: name.into(),
            address,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ResolverConfig {
    #[serde(default = "default_root_servers")]
    pub root_servers: Vec<RootHint>,

    #[serde(default = "default_dns_port")]
    pub dns_port: u16,

    /// Per-attempt receive timeout.
    #[serde(default = "default_query_timeout_ms")]
    pub query_timeout_ms: u64,

    #[serde(default = "default_max_query_attempts")]
    pub max_query_attempts: u32,

    /// CNAME chain budget.
    #[serde(default = "default_max_indirection")]
    pub max_indirection: i32,

    /// Budget for resolving nameserver names that arrived without glue.
    #[serde(default = "default_max_nameserver_indirection")]
    pub max_nameserver_indirection: u32,

    #[serde(default = "default_udp_buffer_size")]
    pub udp_buffer_size: usize,

    #[serde(default = "default_true")]
    pub tcp_fallback: bool,

    #[serde(default)]
    pub use_ipv6_nameservers: bool,
}

impl ResolverConfig {
    pub fn query_timeout(&self) -> Duration {
        Duration::from_millis(self.query_timeout_ms)
    }
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            root_servers: default_root_servers(),
            dns_port: default_dns_port(),
            query_timeout_ms: default_query_timeout_ms(),
            max_query_attempts: default_max_query_attempts(),
            max_indirection: default_max_indirection(),
            max_nameserver_indirection: default_max_nameserver_indirection(),
            udp_buffer_size: default_udp_buffer_size(),
            tcp_fallback: true,
            use_ipv6_nameservers: false,
        }
    }
}

pub const MAX_DNS_MESSAGE_LENGTH: usize = 512;
pub const MAX_EDNS_MESSAGE_LENGTH: usize = 1280;

fn default_dns_port() -> u16 {
    53
}

fn default_query_timeout_ms() -> u64 {
    5000
}

fn default_max_query_attempts() -> u32 {
    3
}

fn default_max_indirection() -> i32 {
    10
}

fn default_max_nameserver_indirection() -> u32 {
    10
}

fn default_udp_buffer_size() -> usize {
    MAX_EDNS_MESSAGE_LENGTH
}

fn default_true() -> bool {
    true
}

fn default_root_servers() -> Vec<RootHint> {
    const ROOTS: [(&str, [u8; 4]); 13] = [
        ("a.root-servers.net", [198, 41, 0, 4]),
        ("b.root-servers.net", [170, 247, 170, 2]),
        ("c.root-servers.net", [192, 33, 4, 12]),
        ("d.root-servers.net", [199, 7, 91, 13]),
        ("e.root-servers.net", [192, 203, 230, 10]),
        ("f.root-servers.net", [192, 5, 5, 241]),
        ("g.root-servers.net", [192, 112, 36, 4]),
        ("h.root-servers.net", [198, 97, 190, 53]),
        ("i.root-servers.net", [192, 36, 148, 17]),
        ("j.root-servers.net", [192, 58, 128, 30]),
        ("k.root-servers.net", [193, 0, 14, 129]),
        ("l.root-servers.net", [199, 7, 83, 42]),
        ("m.root-servers.net", [202, 12, 27, 33]),
    ];

    ROOTS
        .iter()
        .map(|(name, octets)| RootHint::new(*name, IpAddr::V4(Ipv4Addr::from(*octets))))
        .collect()
}
