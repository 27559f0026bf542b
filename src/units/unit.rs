//! Common unit type that wraps ServiceUnit and SliceUnit

use super::{ServiceUnit, SliceUnit};

/// A unit is either a service or a slice
#[derive(Debug, Clone)]
pub enum Unit {
    Service(ServiceUnit),
    Slice(SliceUnit),
}

impl Unit {
    /// Get the unit name, without suffix
    pub fn name(&self) -> &str {
        match self {
            Unit::Service(s) => &s.name,
            Unit::Slice(s) => &s.name,
        }
    }

    /// Get the unit type as a string (service, slice)
    pub fn unit_type(&self) -> &'static str {
        match self {
            Unit::Service(_) => "service",
            Unit::Slice(_) => "slice",
        }
    }

    /// File name the unit is installed under, e.g. "a.b.service"
    pub fn file_name(&self) -> String {
        format!("{}.{}", self.name(), self.unit_type())
    }

    /// Sections a valid rendering of this unit must contain
    pub fn required_sections(&self) -> &'static [&'static str] {
        match self {
            Unit::Service(_) => &["[Install]", "[Unit]", "[Service]"],
            Unit::Slice(_) => &["[Unit]"],
        }
    }

    pub(super) fn sections(&self) -> Vec<(&'static str, Vec<(&'static str, String)>)> {
        match self {
            Unit::Service(s) => s.sections(),
            Unit::Slice(s) => s.sections(),
        }
    }

    pub fn render(&self) -> String {
        match self {
            Unit::Service(s) => s.render(),
            Unit::Slice(s) => s.render(),
        }
    }
}

impl From<ServiceUnit> for Unit {
    fn from(unit: ServiceUnit) -> Self {
        Unit::Service(unit)
    }
}

impl From<SliceUnit> for Unit {
    fn from(unit: SliceUnit) -> Self {
        Unit::Slice(unit)
    }
}
