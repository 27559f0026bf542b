//! Slice unit definitions
//!
//! Slices organize the cgroup hierarchy and provide resource management
//! for groups of services. They only carry a [Unit] section here.

use super::service::UnitSection;

/// A .slice unit
#[derive(Debug, Clone)]
pub struct SliceUnit {
    pub name: String,
    /// Comment lines written above the first section
    pub comments: Vec<String>,
    pub unit: UnitSection,
}

impl SliceUnit {
    pub fn new(name: String) -> Self {
        Self {
            name,
            comments: Vec::new(),
            unit: UnitSection::default(),
        }
    }

    pub(super) fn sections(&self) -> Vec<(&'static str, Vec<(&'static str, String)>)> {
        vec![("Unit", self.unit.entries())]
    }

    pub fn render(&self) -> String {
        super::render(&self.comments, &self.sections())
    }
}
