//! Configuration model
//!
//! Typed, immutable descriptions of container services and the groups
//! that nest them. Values are checked when constructed; a `Configuration`
//! pairs the elements with the membership graph over them.

mod service;
mod volume;

pub use service::*;
pub use volume::{Volume, VolumeFlag};

use std::collections::HashMap;
use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use uuid::Uuid;

use crate::graph::{GraphError, MembershipGraph};

static VALID_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z][a-z0-9_-]{0,63}$").expect("name pattern is valid"));

/// Errors raised while constructing model values
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ModelError {
    #[error("Service name '{0}' must match '[a-z][a-z0-9_-]{{0,63}}'")]
    InvalidName(String),

    #[error("Port {0} must be in the range [1, 65536]")]
    InvalidPort(u32),

    #[error("Element {id} is not present in the configuration")]
    MissingElement { id: ElementId },

    #[error("Element {id} is in the graph but not in the element map")]
    MissingVertex { id: ElementId },

    #[error("Element {id} is a {element} but the graph registers it as a {vertex}")]
    KindMismatch {
        id: ElementId,
        element: &'static str,
        vertex: &'static str,
    },
}

/// Globally unique identity of a service or group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(Uuid);

impl ElementId {
    pub fn new(id: Uuid) -> Self {
        Self(id)
    }
}

impl From<Uuid> for ElementId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Short identifier of an element, unique only among siblings
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ServiceName(String);

impl ServiceName {
    pub fn new(value: impl Into<String>) -> Result<Self, ModelError> {
        let value = value.into();
        if !VALID_NAME.is_match(&value) {
            return Err(ModelError::InvalidName(value));
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ServiceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A group of services and/or nested groups
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceGroup {
    pub name: ServiceName,
    pub description: String,
    pub id: ElementId,
}

/// Either a service or a group
#[derive(Debug, Clone, PartialEq)]
pub enum ServiceElement {
    Service(Service),
    Group(ServiceGroup),
}

impl ServiceElement {
    pub fn id(&self) -> ElementId {
        match self {
            ServiceElement::Service(s) => s.id,
            ServiceElement::Group(g) => g.id,
        }
    }

    pub fn name(&self) -> &ServiceName {
        match self {
            ServiceElement::Service(s) => &s.name,
            ServiceElement::Group(g) => &g.name,
        }
    }

    pub fn description(&self) -> &str {
        match self {
            ServiceElement::Service(s) => &s.description,
            ServiceElement::Group(g) => &g.description,
        }
    }

    pub fn is_group(&self) -> bool {
        matches!(self, ServiceElement::Group(_))
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ServiceElement::Service(_) => "service",
            ServiceElement::Group(_) => "group",
        }
    }

    pub fn as_service(&self) -> Option<&Service> {
        match self {
            ServiceElement::Service(s) => Some(s),
            ServiceElement::Group(_) => None,
        }
    }

    pub fn as_group(&self) -> Option<&ServiceGroup> {
        match self {
            ServiceElement::Group(g) => Some(g),
            ServiceElement::Service(_) => None,
        }
    }
}

impl From<Service> for ServiceElement {
    fn from(service: Service) -> Self {
        ServiceElement::Service(service)
    }
}

impl From<ServiceGroup> for ServiceElement {
    fn from(group: ServiceGroup) -> Self {
        ServiceElement::Group(group)
    }
}

/// All elements plus the group membership graph over them
#[derive(Debug, Clone)]
pub struct Configuration {
    elements: HashMap<ElementId, ServiceElement>,
    graph: MembershipGraph,
}

impl Configuration {
    /// Pair an element map with its graph. Every element must be a
    /// vertex, every vertex must be an element, and only groups may be
    /// registered as group vertices.
    pub fn new(
        elements: HashMap<ElementId, ServiceElement>,
        graph: MembershipGraph,
    ) -> Result<Self, ModelError> {
        for (id, element) in &elements {
            if !graph.contains(id) {
                return Err(ModelError::MissingElement { id: *id });
            }
            if element.is_group() != graph.is_group(id) {
                return Err(ModelError::KindMismatch {
                    id: *id,
                    element: element.kind(),
                    vertex: if graph.is_group(id) { "group" } else { "service" },
                });
            }
        }
        for id in graph.vertices() {
            if !elements.contains_key(id) {
                return Err(ModelError::MissingVertex { id: *id });
            }
        }
        Ok(Self { elements, graph })
    }

    pub fn builder() -> ConfigurationBuilder {
        ConfigurationBuilder::default()
    }

    pub fn graph(&self) -> &MembershipGraph {
        &self.graph
    }

    pub fn get(&self, id: &ElementId) -> Option<&ServiceElement> {
        self.elements.get(id)
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Elements in graph insertion order
    pub fn elements(&self) -> impl Iterator<Item = &ServiceElement> {
        self.graph.vertices().filter_map(|id| self.elements.get(id))
    }

    /// Services only, in graph insertion order
    pub fn services(&self) -> impl Iterator<Item = &Service> {
        self.elements().filter_map(ServiceElement::as_service)
    }

    /// The group that directly contains `id`, if any
    pub fn parent_of(&self, id: &ElementId) -> Option<&ServiceGroup> {
        self.graph
            .parent_of(id)
            .and_then(|parent| self.elements.get(&parent))
            .and_then(ServiceElement::as_group)
    }

    pub fn children_of(&self, id: &ElementId) -> impl Iterator<Item = &ServiceElement> {
        self.graph
            .children_of(id)
            .iter()
            .filter_map(|child| self.elements.get(child))
    }

    pub fn roots(&self) -> impl Iterator<Item = &ServiceElement> {
        self.graph.roots().filter_map(|id| self.elements.get(id))
    }

    /// Ancestor chain from the root down to and including `id`
    pub fn lineage(&self, id: &ElementId) -> Vec<&ServiceElement> {
        let mut chain: Vec<&ServiceElement> = self
            .graph
            .ancestors(id)
            .filter_map(|a| self.elements.get(&a))
            .collect();
        chain.reverse();
        if let Some(element) = self.elements.get(id) {
            chain.push(element);
        }
        chain
    }
}

/// Builds a configuration from nested declarations
///
/// Groups are opened with [`begin_group`](Self::begin_group) and closed
/// with [`end_group`](Self::end_group); anything added in between becomes
/// a member of the innermost open group.
#[derive(Debug, Default)]
pub struct ConfigurationBuilder {
    elements: HashMap<ElementId, ServiceElement>,
    graph: MembershipGraph,
    open_groups: Vec<ElementId>,
}

impl ConfigurationBuilder {
    pub fn begin_group(&mut self, group: ServiceGroup) -> Result<&mut Self, GraphError> {
        let id = group.id;
        self.insert(ServiceElement::Group(group))?;
        self.open_groups.push(id);
        Ok(self)
    }

    pub fn end_group(&mut self) -> &mut Self {
        self.open_groups.pop();
        self
    }

    pub fn add_service(&mut self, service: Service) -> Result<&mut Self, GraphError> {
        self.insert(ServiceElement::Service(service))?;
        Ok(self)
    }

    fn insert(&mut self, element: ServiceElement) -> Result<(), GraphError> {
        let id = element.id();
        self.graph.add_vertex(id, element.is_group())?;
        self.elements.insert(id, element);
        if let Some(parent) = self.open_groups.last() {
            self.graph.add_membership(*parent, id)?;
        }
        Ok(())
    }

    pub fn build(self) -> Result<Configuration, ModelError> {
        Configuration::new(self.elements, self.graph)
    }
}
