//! Hostname resolution for published ports and outbound addresses
//!
//! Every call performs a fresh lookup; nothing is cached between calls.

use std::collections::HashMap;
use std::io;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, ToSocketAddrs};

use crate::model::AddressFamily;

/// Source of raw addresses for a hostname
pub trait HostLookup {
    fn lookup(&self, host: &str) -> io::Result<Vec<IpAddr>>;
}

/// Resolves through the system resolver (`getaddrinfo`)
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemLookup;

impl HostLookup for SystemLookup {
    fn lookup(&self, host: &str) -> io::Result<Vec<IpAddr>> {
        Ok((host, 0).to_socket_addrs()?.map(|addr| addr.ip()).collect())
    }
}

/// Fixed host table, for offline generation and tests
#[derive(Debug, Clone, Default)]
pub struct StaticHosts {
    hosts: HashMap<String, Vec<IpAddr>>,
}

impl StaticHosts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, host: &str, addresses: impl IntoIterator<Item = IpAddr>) -> Self {
        self.hosts.entry(host.to_string()).or_default().extend(addresses);
        self
    }
}

impl HostLookup for StaticHosts {
    fn lookup(&self, host: &str) -> io::Result<Vec<IpAddr>> {
        // Literal addresses resolve to themselves, like getaddrinfo
        if let Ok(addr) = host.parse::<IpAddr>() {
            return Ok(vec![addr]);
        }
        self.hosts.get(host).cloned().ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotFound, format!("{} is not in the host table", host))
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DnsError {
    #[error("Unknown host {host}: {source}")]
    UnknownHost {
        host: String,
        #[source]
        source: io::Error,
    },

    #[error("No addresses could be resolved for host {host}")]
    NoAddresses { host: String },

    #[error("No {family} address could be resolved for host {host}")]
    NoAddressOfFamily { host: String, family: AddressFamily },
}

impl DnsError {
    pub fn host(&self) -> &str {
        match self {
            DnsError::UnknownHost { host, .. }
            | DnsError::NoAddresses { host }
            | DnsError::NoAddressOfFamily { host, .. } => host,
        }
    }

    pub fn family(&self) -> Option<AddressFamily> {
        match self {
            DnsError::NoAddressOfFamily { family, .. } => Some(*family),
            DnsError::UnknownHost { .. } | DnsError::NoAddresses { .. } => None,
        }
    }
}

/// Picks the first address of the requested family for a host
#[derive(Debug, Clone, Default)]
pub struct AddressResolver<L = SystemLookup> {
    lookup: L,
}

impl AddressResolver<SystemLookup> {
    pub fn system() -> Self {
        Self { lookup: SystemLookup }
    }
}

impl<L: HostLookup> AddressResolver<L> {
    pub fn new(lookup: L) -> Self {
        Self { lookup }
    }

    fn lookup_all(&self, host: &str) -> Result<Vec<IpAddr>, DnsError> {
        let addresses = self.lookup.lookup(host).map_err(|source| DnsError::UnknownHost {
            host: host.to_string(),
            source,
        })?;
        if addresses.is_empty() {
            return Err(DnsError::NoAddresses { host: host.to_string() });
        }
        log::debug!("Resolved {} to {:?}", host, addresses);
        Ok(addresses)
    }

    pub fn resolve(&self, host: &str, family: AddressFamily) -> Result<IpAddr, DnsError> {
        self.lookup_all(host)?
            .into_iter()
            .find(|addr| match family {
                AddressFamily::Ipv4 => addr.is_ipv4(),
                AddressFamily::Ipv6 => addr.is_ipv6(),
            })
            .ok_or_else(|| DnsError::NoAddressOfFamily {
                host: host.to_string(),
                family,
            })
    }

    pub fn resolve_ipv4(&self, host: &str) -> Result<Ipv4Addr, DnsError> {
        match self.resolve(host, AddressFamily::Ipv4)? {
            IpAddr::V4(addr) => Ok(addr),
            IpAddr::V6(_) => Err(DnsError::NoAddressOfFamily {
                host: host.to_string(),
                family: AddressFamily::Ipv4,
            }),
        }
    }

    pub fn resolve_ipv6(&self, host: &str) -> Result<Ipv6Addr, DnsError> {
        match self.resolve(host, AddressFamily::Ipv6)? {
            IpAddr::V6(addr) => Ok(addr),
            IpAddr::V4(_) => Err(DnsError::NoAddressOfFamily {
                host: host.to_string(),
                family: AddressFamily::Ipv6,
            }),
        }
    }

    /// Address text for a `host:port` pair; IPv6 is wrapped in brackets
    pub fn resolve_for_port(&self, host: &str, family: AddressFamily) -> Result<String, DnsError> {
        Ok(match self.resolve(host, family)? {
            IpAddr::V4(addr) => addr.to_string(),
            IpAddr::V6(addr) => format!("[{}]", addr),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolver() -> AddressResolver<StaticHosts> {
        AddressResolver::new(
            StaticHosts::new()
                .with("dual.example", ["192.0.2.1".parse().unwrap(), "2001:db8::1".parse().unwrap()])
                .with("v4only.example", ["192.0.2.2".parse().unwrap()])
                .with("empty.example", []),
        )
    }

    #[test]
    fn test_resolve_by_family() {
        let r = resolver();
        assert_eq!(r.resolve_ipv4("dual.example").unwrap(), Ipv4Addr::new(192, 0, 2, 1));
        assert_eq!(r.resolve_ipv6("dual.example").unwrap(), "2001:db8::1".parse::<Ipv6Addr>().unwrap());
    }

    #[test]
    fn test_port_address_brackets_ipv6() {
        let r = resolver();
        assert_eq!(r.resolve_for_port("dual.example", AddressFamily::Ipv4).unwrap(), "192.0.2.1");
        assert_eq!(r.resolve_for_port("dual.example", AddressFamily::Ipv6).unwrap(), "[2001:db8::1]");
    }

    #[test]
    fn test_missing_family() {
        let err = resolver().resolve("v4only.example", AddressFamily::Ipv6).unwrap_err();
        assert!(matches!(err, DnsError::NoAddressOfFamily { .. }));
        assert_eq!(err.host(), "v4only.example");
        assert_eq!(err.family(), Some(AddressFamily::Ipv6));
    }

    #[test]
    fn test_unknown_host() {
        let err = resolver().resolve("nowhere.example", AddressFamily::Ipv4).unwrap_err();
        assert!(matches!(err, DnsError::UnknownHost { .. }));
        assert_eq!(err.host(), "nowhere.example");
    }

    #[test]
    fn test_no_addresses() {
        let err = resolver().resolve("empty.example", AddressFamily::Ipv4).unwrap_err();
        assert!(matches!(err, DnsError::NoAddresses { .. }));
    }

    #[test]
    fn test_literals_resolve_offline() {
        let r = resolver();
        assert_eq!(r.resolve_for_port("::1", AddressFamily::Ipv6).unwrap(), "[::1]");
        assert_eq!(r.resolve_for_port("127.0.0.1", AddressFamily::Ipv4).unwrap(), "127.0.0.1");
    }

    #[test]
    fn test_system_lookup_literal() {
        let r = AddressResolver::system();
        assert_eq!(r.resolve_ipv4("127.0.0.1").unwrap(), Ipv4Addr::LOCALHOST);
    }
}
