//! Unit generation
//!
//! Walks the membership graph parents-first and renders each element:
//! a service becomes one `.service` unit running its container, a group
//! becomes a control `.service` plus a `.slice`. Any failure aborts the
//! whole run; no partial list is returned.

mod group;
mod podman;
mod service;

pub use podman::{escape, quote};

use std::path::PathBuf;
use std::time::Duration;

use crate::error::{Error, Result};
use crate::model::{Configuration, ElementId, ModelError, ServiceElement};
use crate::names;
use crate::resolver::{AddressResolver, HostLookup, SystemLookup};
use crate::units::{self, InstallSection};

pub const MULTI_USER_TARGET: &str = "multi-user.target";
pub const NETWORK_ONLINE_TARGET: &str = "network-online.target";

/// Tunables for generated units
#[derive(Debug, Clone)]
pub struct GeneratorOptions {
    /// Container runtime binary used in Exec*= lines
    pub podman: PathBuf,
    /// Grace period given to `podman stop` and `podman rm`
    pub stop_timeout: Duration,
}

impl Default for GeneratorOptions {
    fn default() -> Self {
        Self {
            podman: PathBuf::from("/usr/bin/podman"),
            stop_timeout: Duration::from_secs(60),
        }
    }
}

/// One rendered unit file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedUnit {
    /// The service or group this unit was generated for
    pub element: ElementId,
    pub file_name: String,
    pub text: String,
}

pub struct UnitGenerator<'a, L = SystemLookup> {
    configuration: &'a Configuration,
    resolver: AddressResolver<L>,
    options: GeneratorOptions,
}

impl<'a> UnitGenerator<'a, SystemLookup> {
    /// Generator resolving hosts through the system resolver
    pub fn system(configuration: &'a Configuration) -> Self {
        Self::new(configuration, AddressResolver::system())
    }
}

impl<'a, L: HostLookup> UnitGenerator<'a, L> {
    pub fn new(configuration: &'a Configuration, resolver: AddressResolver<L>) -> Self {
        Self {
            configuration,
            resolver,
            options: GeneratorOptions::default(),
        }
    }

    pub fn with_options(mut self, options: GeneratorOptions) -> Self {
        self.options = options;
        self
    }

    /// Render every element of the configuration
    pub fn generate(&self) -> Result<Vec<GeneratedUnit>> {
        let mut results = Vec::new();

        for id in self.configuration.graph().depth_first() {
            let element = self
                .configuration
                .get(&id)
                .ok_or(ModelError::MissingElement { id })?;

            let generated = match element {
                ServiceElement::Service(service) => vec![self.service_unit(service)?],
                ServiceElement::Group(group) => self.group_units(group)?,
            };

            for unit in generated {
                let file_name = unit.file_name();
                let text = unit.render();
                units::verify(&unit, &text).map_err(|source| Error::UnitSyntax {
                    name: file_name.clone(),
                    source,
                })?;
                log::debug!("Generated {} for {}", file_name, id);
                results.push(GeneratedUnit {
                    element: id,
                    file_name,
                    text,
                });
            }
        }

        log::info!(
            "Generated {} units for {} elements",
            results.len(),
            self.configuration.len()
        );
        Ok(results)
    }

    fn unit_name(&self, id: &ElementId) -> Result<String> {
        names::unit_name(self.configuration, id).ok_or_else(|| ModelError::MissingElement { id: *id }.into())
    }

    fn slice_name(&self, id: &ElementId) -> Result<String> {
        names::slice_name(self.configuration, id).ok_or_else(|| ModelError::MissingElement { id: *id }.into())
    }

    /// Unit name of the enclosing group, if any
    fn parent_unit_name(&self, id: &ElementId) -> Result<Option<String>> {
        match self.configuration.parent_of(id) {
            Some(parent) => Ok(Some(self.unit_name(&parent.id)?)),
            None => Ok(None),
        }
    }

    fn install_section(&self, id: &ElementId) -> Result<InstallSection> {
        let wanted_by = match self.parent_unit_name(id)? {
            Some(parent) => format!("{}.service", parent),
            None => MULTI_USER_TARGET.to_string(),
        };
        Ok(InstallSection {
            wanted_by: vec![wanted_by],
        })
    }
}

fn header(id: &ElementId) -> Vec<String> {
    vec![
        "Automatically generated; do not edit.".to_string(),
        format!("$ServiceID: {}", id),
    ]
}

/// Generate with the system resolver and default options
pub fn generate(configuration: &Configuration) -> Result<Vec<GeneratedUnit>> {
    UnitGenerator::system(configuration).generate()
}
