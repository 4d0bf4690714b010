use std::net::IpAddr;

use ipnet::{AddrParseError, IpNet};

/// Parse a CIDR block, masking off host bits.
pub fn parse_network(raw: &str) -> Result<IpNet, AddrParseError> {
    raw.parse::<IpNet>().map(|net| net.trunc())
}

/// Whether `addr` lies inside `network`. IPv4-mapped IPv6 addresses are
/// treated as IPv4, and IPv4 addresses match an IPv6 block through their
/// mapped form.
#[must_use]
pub fn network_contains(network: &IpNet, addr: IpAddr) -> bool {
    match (network, addr.to_canonical()) {
        (IpNet::V4(net), IpAddr::V4(addr)) => net.contains(&addr),
        (IpNet::V6(net), IpAddr::V6(addr)) => net.contains(&addr),
        (IpNet::V6(net), IpAddr::V4(addr)) => net.contains(&addr.to_ipv6_mapped()),
        (IpNet::V4(_), IpAddr::V6(_)) => false,
    }
}

/// True when the block has no IPv4 representation.
#[must_use]
pub fn is_ipv6_network(network: &IpNet) -> bool {
    match network {
        IpNet::V4(_) => false,
        IpNet::V6(net) => net.addr().to_ipv4_mapped().is_none(),
    }
}
