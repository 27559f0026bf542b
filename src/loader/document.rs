//! Serde mirror of the configuration document
//!
//! These types only describe the TOML shape. Conversion into the model
//! applies the model's own validation (names, port ranges).

use std::collections::{BTreeSet, HashMap};
use std::path::PathBuf;

use serde::Deserialize;
use uuid::Uuid;

use crate::model::{
    AddressFamily, ContainerFlag, DevicePassthrough, DevicePermission, ElementId, Limits,
    ModelError, OciImage, OutboundAddress, PortType, PublishPort, RunAs, Service, ServiceGroup,
    ServiceName, Volume, VolumeFlag,
};

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Document {
    #[serde(default)]
    pub element: Vec<ElementDocument>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum ElementDocument {
    Group(GroupDocument),
    Service(ServiceDocument),
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct GroupDocument {
    pub name: String,
    pub id: Uuid,
    pub description: Option<String>,
    #[serde(default)]
    pub members: Vec<ElementDocument>,
}

impl GroupDocument {
    /// The group itself, without its members
    pub fn to_group(&self) -> Result<ServiceGroup, ModelError> {
        let name = ServiceName::new(self.name.as_str())?;
        Ok(ServiceGroup {
            description: self.description.clone().unwrap_or_else(|| name.to_string()),
            name,
            id: ElementId::new(self.id),
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct ImageDocument {
    pub registry: String,
    pub name: String,
    pub tag: String,
    pub hash: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct LimitsDocument {
    pub cpu_percent: Option<u32>,
    pub memory_limit_soft: Option<u64>,
    pub memory_limit_hard: Option<u64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct RunAsDocument {
    pub user: String,
    pub group: String,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FamilyDocument {
    Ipv4,
    Ipv6,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PortTypeDocument {
    Tcp,
    Udp,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct PortDocument {
    pub host: String,
    pub external: u32,
    pub internal: u32,
    pub family: FamilyDocument,
    #[serde(rename = "type")]
    pub port_type: PortTypeDocument,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum VolumeKind {
    File,
    Zfs,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub enum VolumeFlagDocument {
    #[serde(rename = "ro")]
    ReadOnly,
    #[serde(rename = "rw")]
    ReadWrite,
    #[serde(rename = "U")]
    UseCorrectUidGid,
    #[serde(rename = "z")]
    RelabelShared,
    #[serde(rename = "Z")]
    RelabelPrivate,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct VolumeDocument {
    pub kind: VolumeKind,
    pub host_path: PathBuf,
    pub mounted_at: PathBuf,
    #[serde(default)]
    pub flags: Vec<VolumeFlagDocument>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PermissionDocument {
    Read,
    Write,
    Mknod,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct DeviceDocument {
    pub host_path: PathBuf,
    pub mounted_at: PathBuf,
    #[serde(default)]
    pub permissions: Vec<PermissionDocument>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ContainerFlagDocument {
    ReadOnlyRoot,
    RemapUserToContainerRoot,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct OutboundDocument {
    pub ipv6: String,
    pub ipv4: Option<String>,
    pub mtu: Option<u32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct ServiceDocument {
    pub name: String,
    pub id: Uuid,
    pub description: Option<String>,
    #[serde(default)]
    pub one_shot: bool,
    pub image: ImageDocument,
    #[serde(default)]
    pub limits: LimitsDocument,
    pub run_as: RunAsDocument,
    #[serde(default)]
    pub publish_ports: Vec<PortDocument>,
    #[serde(default)]
    pub volumes: Vec<VolumeDocument>,
    #[serde(default)]
    pub container_flags: Vec<ContainerFlagDocument>,
    #[serde(default)]
    pub environment: HashMap<String, String>,
    #[serde(default)]
    pub arguments: Vec<String>,
    pub outbound_address: Option<OutboundDocument>,
    #[serde(default)]
    pub devices: Vec<DeviceDocument>,
}

impl From<FamilyDocument> for AddressFamily {
    fn from(family: FamilyDocument) -> Self {
        match family {
            FamilyDocument::Ipv4 => AddressFamily::Ipv4,
            FamilyDocument::Ipv6 => AddressFamily::Ipv6,
        }
    }
}

impl From<PortTypeDocument> for PortType {
    fn from(port_type: PortTypeDocument) -> Self {
        match port_type {
            PortTypeDocument::Tcp => PortType::Tcp,
            PortTypeDocument::Udp => PortType::Udp,
        }
    }
}

impl From<VolumeFlagDocument> for VolumeFlag {
    fn from(flag: VolumeFlagDocument) -> Self {
        match flag {
            VolumeFlagDocument::ReadOnly => VolumeFlag::ReadOnly,
            VolumeFlagDocument::ReadWrite => VolumeFlag::ReadWrite,
            VolumeFlagDocument::UseCorrectUidGid => VolumeFlag::UseCorrectUidGid,
            VolumeFlagDocument::RelabelShared => VolumeFlag::RelabelShared,
            VolumeFlagDocument::RelabelPrivate => VolumeFlag::RelabelPrivate,
        }
    }
}

impl From<PermissionDocument> for DevicePermission {
    fn from(permission: PermissionDocument) -> Self {
        match permission {
            PermissionDocument::Read => DevicePermission::Read,
            PermissionDocument::Write => DevicePermission::Write,
            PermissionDocument::Mknod => DevicePermission::Mknod,
        }
    }
}

impl From<ContainerFlagDocument> for ContainerFlag {
    fn from(flag: ContainerFlagDocument) -> Self {
        match flag {
            ContainerFlagDocument::ReadOnlyRoot => ContainerFlag::ReadOnlyRoot,
            ContainerFlagDocument::RemapUserToContainerRoot => ContainerFlag::RemapUserToContainerRoot,
        }
    }
}

impl From<VolumeDocument> for Volume {
    fn from(volume: VolumeDocument) -> Self {
        let flags: BTreeSet<VolumeFlag> = volume.flags.into_iter().map(Into::into).collect();
        match volume.kind {
            VolumeKind::File => Volume::File {
                host_path: volume.host_path,
                mounted_at: volume.mounted_at,
                flags,
            },
            VolumeKind::Zfs => Volume::Zfs {
                host_path: volume.host_path,
                mounted_at: volume.mounted_at,
                flags,
            },
        }
    }
}

impl TryFrom<ServiceDocument> for Service {
    type Error = ModelError;

    fn try_from(doc: ServiceDocument) -> Result<Self, Self::Error> {
        let name = ServiceName::new(doc.name)?;
        let image = OciImage {
            registry: doc.image.registry,
            name: doc.image.name,
            tag: doc.image.tag,
            hash: doc.image.hash,
        };
        let run_as = RunAs {
            user: doc.run_as.user,
            group: doc.run_as.group,
        };
        let mut service = Service::new(name, ElementId::new(doc.id), image, run_as);

        if let Some(description) = doc.description {
            service.description = description;
        }
        service.one_shot = doc.one_shot;
        service.limits = Limits {
            cpu_percent: doc.limits.cpu_percent,
            memory_limit_soft: doc.limits.memory_limit_soft,
            memory_limit_hard: doc.limits.memory_limit_hard,
        };
        service.ports = doc
            .publish_ports
            .into_iter()
            .map(|p| {
                PublishPort::new(p.host, p.external, p.internal, p.family.into(), p.port_type.into())
            })
            .collect::<Result<Vec<_>, ModelError>>()?;
        service.volumes = doc.volumes.into_iter().map(Into::into).collect();
        service.container_flags = doc.container_flags.into_iter().map(Into::into).collect();
        service.environment = doc.environment;
        service.arguments = doc.arguments;
        service.outbound_address = doc.outbound_address.map(|o| OutboundAddress {
            ipv6: o.ipv6,
            ipv4: o.ipv4,
            mtu: o.mtu,
        });
        service.devices = doc
            .devices
            .into_iter()
            .map(|d| DevicePassthrough {
                host_path: d.host_path,
                mounted_at: d.mounted_at,
                permissions: d.permissions.into_iter().map(Into::into).collect(),
            })
            .collect();

        Ok(service)
    }
}
