use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::StructuredError;
use crate::model::{Configuration, PortType, Service, ServiceElement};
use crate::names;
use crate::units::is_single_line_value;

use super::Check;

static ENVIRONMENT_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("environment name pattern is valid")
});

/// No two elements may map to the same unit name
pub struct UniqueUnitNames;

impl Check for UniqueUnitNames {
    fn name(&self) -> &'static str {
        "unique-unit-names"
    }

    fn check(&self, configuration: &Configuration) -> Vec<StructuredError> {
        let mut seen: HashMap<String, String> = HashMap::new();
        let mut errors = Vec::new();

        for element in configuration.elements() {
            let id = element.id();
            let Some(unit) = names::unit_name(configuration, &id) else {
                continue;
            };
            if let Some(first) = seen.get(&unit) {
                errors.push(
                    StructuredError::new(
                        "error-unit-name-conflict",
                        "Multiple elements resolve to the same unit name.",
                    )
                    .with("Unit", &unit)
                    .with("Element", id)
                    .with("Existing", first),
                );
            } else {
                seen.insert(unit, id.to_string());
            }
        }
        errors
    }
}

/// A host address, external port and transport may be published only once
pub struct UniquePublishedPorts;

impl Check for UniquePublishedPorts {
    fn name(&self) -> &'static str {
        "unique-published-ports"
    }

    fn check(&self, configuration: &Configuration) -> Vec<StructuredError> {
        let mut seen: HashMap<(String, u32, PortType), String> = HashMap::new();
        let mut errors = Vec::new();

        for service in configuration.services() {
            for port in &service.ports {
                let key = (port.host().to_string(), port.external(), port.port_type());
                if let Some(first) = seen.get(&key) {
                    errors.push(
                        StructuredError::new(
                            "error-port-conflict",
                            "A published port is used more than once.",
                        )
                        .with("Service", &service.name)
                        .with("Existing", first)
                        .with("Host", port.host())
                        .with("Port", port.external())
                        .with("Type", port.port_type().as_str()),
                    );
                } else {
                    seen.insert(key, service.name.to_string());
                }
            }
        }
        errors
    }
}

/// Volumes and devices must be mounted at absolute container paths
pub struct AbsoluteMountPaths;

impl Check for AbsoluteMountPaths {
    fn name(&self) -> &'static str {
        "absolute-mount-paths"
    }

    fn check(&self, configuration: &Configuration) -> Vec<StructuredError> {
        let mut errors = Vec::new();
        for service in configuration.services() {
            let mounts = service
                .volumes
                .iter()
                .map(|v| v.mounted_at())
                .chain(service.devices.iter().map(|d| d.mounted_at.as_path()));

            for path in mounts.filter(|p| !p.is_absolute()) {
                errors.push(
                    StructuredError::new(
                        "error-mount-path-relative",
                        "Container mount paths must be absolute.",
                    )
                    .with("Service", &service.name)
                    .with("Path", path.display()),
                );
            }
        }
        errors
    }
}

pub struct EnvironmentVariableNames;

impl Check for EnvironmentVariableNames {
    fn name(&self) -> &'static str {
        "environment-variable-names"
    }

    fn check(&self, configuration: &Configuration) -> Vec<StructuredError> {
        let mut errors = Vec::new();
        for service in configuration.services() {
            let mut invalid: Vec<&String> = service
                .environment
                .keys()
                .filter(|k| !ENVIRONMENT_NAME.is_match(k))
                .collect();
            invalid.sort();
            for name in invalid {
                errors.push(
                    StructuredError::new(
                        "error-environment-name",
                        "Environment variable names must match [A-Za-z_][A-Za-z0-9_]*.",
                    )
                    .with("Service", &service.name)
                    .with("Variable", name),
                );
            }
        }
        errors
    }
}

/// Free text written into unit directives must stay on one line
pub struct SingleLineUnitValues;

impl SingleLineUnitValues {
    fn fields(element: &ServiceElement) -> Vec<(&'static str, &str)> {
        let mut fields = vec![("Description", element.description())];
        if let ServiceElement::Service(service) = element {
            fields.push(("Tag", service.image.tag.as_str()));
            fields.push(("User", service.run_as.user.as_str()));
            fields.push(("Group", service.run_as.group.as_str()));
        }
        fields
    }
}

impl Check for SingleLineUnitValues {
    fn name(&self) -> &'static str {
        "single-line-unit-values"
    }

    fn check(&self, configuration: &Configuration) -> Vec<StructuredError> {
        let mut errors = Vec::new();
        for element in configuration.elements() {
            for (field, value) in Self::fields(element) {
                if !is_single_line_value(value) {
                    errors.push(
                        StructuredError::new(
                            "error-unit-value",
                            "Values written into unit files must not contain control characters or end with a backslash.",
                        )
                        .with("Element", element.name())
                        .with("Field", field)
                        .with("Value", format!("{:?}", value)),
                    );
                }
            }
        }
        errors
    }
}

pub struct NonEmptyRunAs;

impl NonEmptyRunAs {
    fn empty_fields(service: &Service) -> impl Iterator<Item = &'static str> + '_ {
        [("User", &service.run_as.user), ("Group", &service.run_as.group)]
            .into_iter()
            .filter(|(_, value)| value.trim().is_empty())
            .map(|(field, _)| field)
    }
}

impl Check for NonEmptyRunAs {
    fn name(&self) -> &'static str {
        "non-empty-run-as"
    }

    fn check(&self, configuration: &Configuration) -> Vec<StructuredError> {
        configuration
            .services()
            .flat_map(|service| {
                Self::empty_fields(service).map(move |field| {
                    StructuredError::new("error-run-as-empty", "Services must run as a named user and group.")
                        .with("Service", &service.name)
                        .with("Field", field)
                })
            })
            .collect()
    }
}
