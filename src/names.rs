//! Unit and slice naming
//!
//! Both names are derived from an element's position in the membership
//! graph by walking its ancestor chain, and are recomputed on every call.
//!
//! ```text
//! services            unit: services            slice: services-services
//! └── web             unit: services.web        slice: services-services-web
//! ```

use crate::model::{Configuration, ElementId};

/// Every slice name starts with this prefix
pub const SLICE_PREFIX: &str = "services";

/// Dotted unit name: `root.child.element`
///
/// Returns `None` if `id` is not part of the configuration.
pub fn unit_name(configuration: &Configuration, id: &ElementId) -> Option<String> {
    let lineage = configuration.lineage(id);
    if lineage.is_empty() {
        return None;
    }
    let names: Vec<&str> = lineage.iter().map(|e| e.name().as_str()).collect();
    Some(names.join("."))
}

/// Hyphenated cgroup slice name: `services-root-child-element`
///
/// Returns `None` if `id` is not part of the configuration.
pub fn slice_name(configuration: &Configuration, id: &ElementId) -> Option<String> {
    let lineage = configuration.lineage(id);
    if lineage.is_empty() {
        return None;
    }
    let mut name = String::from(SLICE_PREFIX);
    for element in lineage {
        name.push('-');
        name.push_str(element.name().as_str());
    }
    debug_assert!(name.starts_with("services-"));
    Some(name)
}
