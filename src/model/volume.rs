//! Volume mounts

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// Mount option for a volume
///
/// Declaration order is the order flags are rendered in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum VolumeFlag {
    ReadOnly,
    ReadWrite,
    /// Chown the volume to the container's user
    UseCorrectUidGid,
    /// SELinux label shared with other containers
    RelabelShared,
    /// SELinux label private to this container
    RelabelPrivate,
}

impl VolumeFlag {
    pub fn as_str(&self) -> &'static str {
        match self {
            VolumeFlag::ReadOnly => "ro",
            VolumeFlag::ReadWrite => "rw",
            VolumeFlag::UseCorrectUidGid => "U",
            VolumeFlag::RelabelShared => "z",
            VolumeFlag::RelabelPrivate => "Z",
        }
    }
}

/// A plain host path or a ZFS dataset mounted into the container
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Volume {
    File {
        host_path: PathBuf,
        mounted_at: PathBuf,
        flags: BTreeSet<VolumeFlag>,
    },
    Zfs {
        host_path: PathBuf,
        mounted_at: PathBuf,
        flags: BTreeSet<VolumeFlag>,
    },
}

impl Volume {
    pub fn host_path(&self) -> &Path {
        match self {
            Volume::File { host_path, .. } | Volume::Zfs { host_path, .. } => host_path,
        }
    }

    pub fn mounted_at(&self) -> &Path {
        match self {
            Volume::File { mounted_at, .. } | Volume::Zfs { mounted_at, .. } => mounted_at,
        }
    }

    pub fn flags(&self) -> &BTreeSet<VolumeFlag> {
        match self {
            Volume::File { flags, .. } | Volume::Zfs { flags, .. } => flags,
        }
    }

    /// Flags to mount with: the declared set, or read-only if none were declared
    pub fn effective_flags(&self) -> BTreeSet<VolumeFlag> {
        let flags = self.flags();
        if flags.is_empty() {
            BTreeSet::from([VolumeFlag::ReadOnly])
        } else {
            flags.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_flags_default_to_read_only() {
        let volume = Volume::File {
            host_path: "/srv/data".into(),
            mounted_at: "/data".into(),
            flags: BTreeSet::new(),
        };
        assert_eq!(volume.effective_flags(), BTreeSet::from([VolumeFlag::ReadOnly]));
        // The stored flags are untouched
        assert!(volume.flags().is_empty());
    }

    #[test]
    fn test_explicit_flags_kept() {
        let volume = Volume::Zfs {
            host_path: "/tank/db".into(),
            mounted_at: "/var/lib/db".into(),
            flags: BTreeSet::from([VolumeFlag::RelabelPrivate, VolumeFlag::ReadWrite]),
        };
        let flags: Vec<_> = volume.effective_flags().iter().map(VolumeFlag::as_str).collect();
        assert_eq!(flags, vec!["rw", "Z"]);
    }
}
