//! Target specification and expansion.
//!
//! Turns user input into the ordered list of host addresses to scan:
//! - Single IP addresses (IPv4 and IPv6), returned as-is
//! - CIDR notation (192.168.1.0/24), expanded to its usable hosts
//! - Hostnames (example.com), resolved to their first address

use ipnetwork::{IpNetwork, Ipv4Network, Ipv6Network};
use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;
use tracing::debug;
use trust_dns_resolver::config::{ResolverConfig, ResolverOpts};
use trust_dns_resolver::TokioAsyncResolver;

/// Error type for target parsing and resolution.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TargetError {
    #[error("invalid target format: {0}")]
    InvalidFormat(String),
    #[error("failed to resolve hostname '{0}': {1}")]
    DnsResolutionFailed(String, String),
    #[error("no IP addresses found for hostname '{0}'")]
    NoAddressesFound(String),
    #[error("invalid CIDR notation: {0}")]
    InvalidCidr(String),
    #[error("CIDR range too large: {0} addresses (max: {1})")]
    CidrTooLarge(u128, u128),
}

/// A parsed target specification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetSpec {
    /// A single IP address.
    Single(IpAddr),
    /// A CIDR network range.
    Cidr(IpNetwork),
    /// A hostname to be resolved.
    Hostname(String),
}

impl TargetSpec {
    /// Maximum number of addresses allowed in a CIDR range.
    pub const MAX_CIDR_HOSTS: u128 = 65536;

    /// Parse a target specification from a string.
    ///
    /// Anything containing `/` is treated as CIDR. Host bits may be set
    /// (`192.168.1.7/30` is the same network as `192.168.1.4/30`).
    pub fn parse(s: &str) -> Result<Self, TargetError> {
        let s = s.trim();

        if s.contains('/') {
            let network: IpNetwork = s
                .parse()
                .map_err(|_| TargetError::InvalidCidr(s.to_string()))?;

            let size = network_size(&network);
            if size > Self::MAX_CIDR_HOSTS {
                return Err(TargetError::CidrTooLarge(size, Self::MAX_CIDR_HOSTS));
            }

            return Ok(Self::Cidr(network));
        }

        if let Ok(ip) = s.parse::<IpAddr>() {
            return Ok(Self::Single(ip));
        }

        if is_valid_hostname(s) {
            return Ok(Self::Hostname(s.to_string()));
        }

        Err(TargetError::InvalidFormat(s.to_string()))
    }

    /// Expand this specification to the ordered list of hosts to scan.
    ///
    /// Only the `Hostname` variant touches the network.
    pub async fn resolve(&self) -> Result<Vec<IpAddr>, TargetError> {
        match self {
            Self::Single(ip) => Ok(vec![*ip]),
            Self::Cidr(network) => Ok(usable_hosts(*network)),
            Self::Hostname(hostname) => resolve_hostname(hostname).await.map(|ip| vec![ip]),
        }
    }

    /// How many hosts this specification expands to, if known without DNS.
    pub fn host_count(&self) -> Option<u128> {
        match self {
            Self::Single(_) | Self::Hostname(_) => Some(1),
            Self::Cidr(network) => Some(usable_hosts_count(network)),
        }
    }
}

/// Expand a target string into the hosts to scan.
pub async fn expand(target: &str) -> Result<Vec<IpAddr>, TargetError> {
    let spec = TargetSpec::parse(target)?;
    let hosts = spec.resolve().await?;
    debug!(input = target, hosts = hosts.len(), "expanded target");
    Ok(hosts)
}

impl FromStr for TargetSpec {
    type Err = TargetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for TargetSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Single(ip) => write!(f, "{}", ip),
            Self::Cidr(network) => write!(f, "{}", network),
            Self::Hostname(hostname) => write!(f, "{}", hostname),
        }
    }
}

fn network_size(network: &IpNetwork) -> u128 {
    let (bits, prefix) = match network {
        IpNetwork::V4(net) => (32u32, net.prefix() as u32),
        IpNetwork::V6(net) => (128u32, net.prefix() as u32),
    };
    let host_bits = bits - prefix;
    if host_bits >= 128 {
        u128::MAX
    } else {
        1u128 << host_bits
    }
}

fn usable_hosts_count(network: &IpNetwork) -> u128 {
    let size = network_size(network);
    match network {
        IpNetwork::V4(net) if net.prefix() < 31 => size - 2,
        IpNetwork::V6(net) if net.prefix() < 127 => size - 1,
        _ => size,
    }
}

/// Every usable host of a network, ascending.
///
/// IPv4 drops the network and broadcast addresses below /31. IPv6 has no
/// broadcast, so only the subnet-router address is dropped below /127.
fn usable_hosts(network: IpNetwork) -> Vec<IpAddr> {
    match network {
        IpNetwork::V4(net) => v4_hosts(net),
        IpNetwork::V6(net) => v6_hosts(net),
    }
}

fn v4_hosts(net: Ipv4Network) -> Vec<IpAddr> {
    let reserved = net.prefix() < 31;
    let (network, broadcast) = (net.network(), net.broadcast());
    net.iter()
        .filter(|addr| !reserved || (*addr != network && *addr != broadcast))
        .map(IpAddr::V4)
        .collect()
}

fn v6_hosts(net: Ipv6Network) -> Vec<IpAddr> {
    let reserved = net.prefix() < 127;
    let network = net.network();
    net.iter()
        .filter(|addr| !reserved || *addr != network)
        .map(IpAddr::V6)
        .collect()
}

async fn resolve_hostname(hostname: &str) -> Result<IpAddr, TargetError> {
    let resolver = TokioAsyncResolver::tokio_from_system_conf().unwrap_or_else(|_| {
        TokioAsyncResolver::tokio(ResolverConfig::default(), ResolverOpts::default())
    });

    let response = resolver
        .lookup_ip(hostname)
        .await
        .map_err(|e| TargetError::DnsResolutionFailed(hostname.to_string(), e.to_string()))?;

    response
        .iter()
        .next()
        .ok_or_else(|| TargetError::NoAddressesFound(hostname.to_string()))
}

/// Check if a string is a syntactically valid hostname.
fn is_valid_hostname(s: &str) -> bool {
    if s.is_empty() || s.len() > 253 {
        return false;
    }

    // Each label is 1-63 characters and never starts or ends with '-'.
    // Underscores are allowed: hosts files and mDNS names use them.
    let edge = |c: char| c.is_ascii_alphanumeric() || c == '_';
    s.trim_end_matches('.').split('.').all(|label| {
        !label.is_empty()
            && label.len() <= 63
            && label.starts_with(edge)
            && label.ends_with(edge)
            && label.chars().all(|c| edge(c) || c == '-')
    })
}
