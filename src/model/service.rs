//! Container service definitions

use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::path::PathBuf;

use super::{ElementId, ModelError, ServiceName, Volume};

/// A fully qualified OCI image reference
///
/// The hash pins the exact image; the tag is informational.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OciImage {
    pub registry: String,
    pub name: String,
    pub tag: String,
    pub hash: String,
}

impl fmt::Display for OciImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}:{}@{}", self.registry, self.name, self.tag, self.hash)
    }
}

/// Resource limits; an absent bound means unlimited
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Limits {
    pub cpu_percent: Option<u32>,
    pub memory_limit_soft: Option<u64>,  // bytes
    pub memory_limit_hard: Option<u64>,  // bytes
}

impl Limits {
    /// True if either memory bound is set
    pub fn memory_limited(&self) -> bool {
        self.memory_limit_soft.is_some() || self.memory_limit_hard.is_some()
    }

    pub fn is_unlimited(&self) -> bool {
        self.cpu_percent.is_none() && !self.memory_limited()
    }
}

/// User and group the unit runs as
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunAs {
    pub user: String,
    pub group: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AddressFamily {
    Ipv4,
    Ipv6,
}

impl fmt::Display for AddressFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AddressFamily::Ipv4 => f.write_str("IPv4"),
            AddressFamily::Ipv6 => f.write_str("IPv6"),
        }
    }
}

/// Transport protocol of a published port
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PortType {
    Tcp,
    Udp,
}

impl PortType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PortType::Tcp => "tcp",
            PortType::Udp => "udp",
        }
    }
}

/// A container port exposed on the host
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishPort {
    host: String,
    external: u32,
    internal: u32,
    family: AddressFamily,
    port_type: PortType,
}

impl PublishPort {
    pub const MIN_PORT: u32 = 1;
    pub const MAX_PORT: u32 = 65536;

    pub fn new(
        host: impl Into<String>,
        external: u32,
        internal: u32,
        family: AddressFamily,
        port_type: PortType,
    ) -> Result<Self, ModelError> {
        for port in [external, internal] {
            if !(Self::MIN_PORT..=Self::MAX_PORT).contains(&port) {
                return Err(ModelError::InvalidPort(port));
            }
        }
        Ok(Self {
            host: host.into(),
            external,
            internal,
            family,
            port_type,
        })
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn external(&self) -> u32 {
        self.external
    }

    pub fn internal(&self) -> u32 {
        self.internal
    }

    pub fn family(&self) -> AddressFamily {
        self.family
    }

    pub fn port_type(&self) -> PortType {
        self.port_type
    }
}

/// Flags applied to the container itself
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ContainerFlag {
    ReadOnlyRoot,
    RemapUserToContainerRoot,
}

/// Address of the isolated outbound network namespace
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundAddress {
    pub ipv6: String,
    pub ipv4: Option<String>,
    pub mtu: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DevicePermission {
    Read,
    Write,
    Mknod,
}

impl DevicePermission {
    pub fn letter(&self) -> char {
        match self {
            DevicePermission::Read => 'r',
            DevicePermission::Write => 'w',
            DevicePermission::Mknod => 'm',
        }
    }
}

/// A host device exposed inside the container
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DevicePassthrough {
    pub host_path: PathBuf,
    pub mounted_at: PathBuf,
    pub permissions: BTreeSet<DevicePermission>,
}

/// A containerized service
#[derive(Debug, Clone, PartialEq)]
pub struct Service {
    pub name: ServiceName,
    pub description: String,
    pub id: ElementId,
    pub image: OciImage,
    pub one_shot: bool,
    pub limits: Limits,
    pub run_as: RunAs,
    pub ports: Vec<PublishPort>,
    pub volumes: Vec<Volume>,
    pub container_flags: BTreeSet<ContainerFlag>,
    pub environment: HashMap<String, String>,
    pub arguments: Vec<String>,
    pub outbound_address: Option<OutboundAddress>,
    pub devices: Vec<DevicePassthrough>,
}

impl Service {
    /// A long-running service with no limits, ports, volumes or extras
    pub fn new(name: ServiceName, id: ElementId, image: OciImage, run_as: RunAs) -> Self {
        Self {
            description: name.to_string(),
            name,
            id,
            image,
            one_shot: false,
            limits: Limits::default(),
            run_as,
            ports: Vec::new(),
            volumes: Vec::new(),
            container_flags: BTreeSet::new(),
            environment: HashMap::new(),
            arguments: Vec::new(),
            outbound_address: None,
            devices: Vec::new(),
        }
    }

    pub fn has_flag(&self, flag: ContainerFlag) -> bool {
        self.container_flags.contains(&flag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_port_range() {
        assert!(PublishPort::new("h", 1, 65536, AddressFamily::Ipv4, PortType::Tcp).is_ok());
        assert_eq!(
            PublishPort::new("h", 0, 80, AddressFamily::Ipv4, PortType::Tcp).unwrap_err(),
            ModelError::InvalidPort(0)
        );
        assert_eq!(
            PublishPort::new("h", 80, 65537, AddressFamily::Ipv6, PortType::Udp).unwrap_err(),
            ModelError::InvalidPort(65537)
        );
    }

    #[test]
    fn test_memory_limited() {
        let mut limits = Limits::default();
        assert!(!limits.memory_limited());
        assert!(limits.is_unlimited());

        limits.memory_limit_hard = Some(1024);
        assert!(limits.memory_limited());

        let limits = Limits {
            memory_limit_soft: Some(1),
            ..Limits::default()
        };
        assert!(limits.memory_limited());

        let limits = Limits {
            cpu_percent: Some(50),
            ..Limits::default()
        };
        assert!(!limits.memory_limited());
        assert!(!limits.is_unlimited());
    }

    #[test]
    fn test_image_reference() {
        let image = OciImage {
            registry: "example.org".into(),
            name: "web".into(),
            tag: "v1".into(),
            hash: "sha256:deadbeef".into(),
        };
        assert_eq!(image.to_string(), "example.org/web:v1@sha256:deadbeef");
    }
}
