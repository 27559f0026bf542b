//! Crate error type
//!
//! Every error carries a stable code and key/value context so it can be
//! reported as a [`StructuredError`].

use std::collections::BTreeMap;
use std::fmt;
use std::io;
use std::path::PathBuf;

use crate::graph::GraphError;
use crate::model::ModelError;
use crate::resolver::DnsError;
use crate::units::ParseError;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// An error code, a human readable message, and context attributes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructuredError {
    pub code: String,
    pub message: String,
    pub attributes: BTreeMap<String, String>,
}

impl StructuredError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            attributes: BTreeMap::new(),
        }
    }

    pub fn with(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.attributes.insert(key.into(), value.to_string());
        self
    }
}

impl fmt::Display for StructuredError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)?;
        for (key, value) in &self.attributes {
            write!(f, "\n  {}: {}", key, value)?;
        }
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to parse {origin}: {message}")]
    Parse { origin: String, message: String },

    #[error("Invalid configuration: {0}")]
    Model(#[from] ModelError),

    #[error("Invalid group structure: {0}")]
    Graph(#[from] GraphError),

    #[error("Configuration failed validation with {} error(s)", .0.len())]
    Validation(Vec<StructuredError>),

    #[error("DNS error: {0}")]
    Dns(#[from] DnsError),

    #[error("Generated unit {name} is malformed: {source}")]
    UnitSyntax {
        name: String,
        #[source]
        source: ParseError,
    },
}

impl Error {
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Error::Io { .. } => "error-io",
            Error::Parse { .. } => "error-parse",
            Error::Model(_) => "error-model",
            Error::Graph(_) => "error-graph",
            Error::Validation(_) => "error-validation",
            Error::Dns(_) => "error-dns",
            Error::UnitSyntax { .. } => "error-unit-syntax",
        }
    }

    pub fn attributes(&self) -> BTreeMap<String, String> {
        let mut attributes = BTreeMap::new();
        match self {
            Error::Io { path, .. } => {
                attributes.insert("File".into(), path.display().to_string());
            }
            Error::Parse { origin, .. } => {
                attributes.insert("Source".into(), origin.clone());
            }
            Error::Model(e) => match e {
                ModelError::InvalidName(name) => {
                    attributes.insert("Name".into(), name.clone());
                }
                ModelError::InvalidPort(port) => {
                    attributes.insert("Port".into(), port.to_string());
                }
                ModelError::MissingElement { id }
                | ModelError::MissingVertex { id }
                | ModelError::KindMismatch { id, .. } => {
                    attributes.insert("Element".into(), id.to_string());
                }
            },
            Error::Graph(e) => match e {
                GraphError::DuplicateVertex(id) | GraphError::UnknownVertex(id) => {
                    attributes.insert("Element".into(), id.to_string());
                }
                GraphError::NotAGroup(id) => {
                    attributes.insert("Group".into(), id.to_string());
                }
                GraphError::AlreadyMember {
                    member,
                    existing,
                    group,
                } => {
                    attributes.insert("Member".into(), member.to_string());
                    attributes.insert("Group".into(), group.to_string());
                    attributes.insert("Existing".into(), existing.to_string());
                }
                GraphError::Cycle(path) => {
                    let path: Vec<String> = path.iter().map(ToString::to_string).collect();
                    attributes.insert("Cycle".into(), path.join(" -> "));
                }
            },
            Error::Validation(errors) => {
                attributes.insert("Count".into(), errors.len().to_string());
            }
            Error::Dns(e) => {
                attributes.insert("Host".into(), e.host().to_string());
                if let Some(family) = e.family() {
                    attributes.insert("Family".into(), family.to_string());
                }
            }
            Error::UnitSyntax { name, .. } => {
                attributes.insert("Unit".into(), name.clone());
            }
        }
        attributes
    }

    /// Flatten into structured records; validation errors expand to one per failure
    pub fn to_structured(&self) -> Vec<StructuredError> {
        if let Error::Validation(errors) = self {
            return errors.clone();
        }
        vec![StructuredError {
            code: self.code().to_string(),
            message: self.to_string(),
            attributes: self.attributes(),
        }]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AddressFamily, ElementId};

    #[test]
    fn test_dns_error_names_host_and_family() {
        let err = Error::from(DnsError::NoAddressOfFamily {
            host: "db.example".into(),
            family: AddressFamily::Ipv6,
        });
        assert_eq!(err.code(), "error-dns");
        let attrs = err.attributes();
        assert_eq!(attrs["Host"], "db.example");
        assert_eq!(attrs["Family"], "IPv6");
    }

    #[test]
    fn test_validation_expands() {
        let err = Error::Validation(vec![
            StructuredError::new("error-a", "first"),
            StructuredError::new("error-b", "second").with("Service", "web"),
        ]);
        let structured = err.to_structured();
        assert_eq!(structured.len(), 2);
        assert_eq!(structured[1].attributes["Service"], "web");
        assert_eq!(err.to_string(), "Configuration failed validation with 2 error(s)");
    }

    #[test]
    fn test_io_error_names_file() {
        let err = Error::io("/etc/podsd.toml", io::Error::from(io::ErrorKind::NotFound));
        let structured = err.to_structured();
        assert_eq!(structured[0].code, "error-io");
        assert_eq!(structured[0].attributes["File"], "/etc/podsd.toml");
    }

    #[test]
    fn test_model_and_graph_errors_carry_context() {
        let port = Error::from(ModelError::InvalidPort(0)).attributes();
        assert_eq!(port["Port"], "0");

        let name = Error::from(ModelError::InvalidName("Bad".into())).attributes();
        assert_eq!(name["Name"], "Bad");

        let member = ElementId::new(uuid::Uuid::from_u128(2));
        let existing = ElementId::new(uuid::Uuid::from_u128(1));
        let group = ElementId::new(uuid::Uuid::from_u128(3));
        let attrs = Error::from(GraphError::AlreadyMember {
            member,
            existing,
            group,
        })
        .attributes();
        assert_eq!(attrs["Member"], member.to_string());
        assert_eq!(attrs["Group"], group.to_string());
        assert_eq!(attrs["Existing"], existing.to_string());

        let missing = Error::from(ModelError::MissingElement { id: member }).attributes();
        assert_eq!(missing["Element"], member.to_string());
    }

    #[test]
    fn test_structured_display() {
        let e = StructuredError::new("error-x", "Broken.").with("Host", "h");
        assert_eq!(e.to_string(), "error-x: Broken.\n  Host: h");
    }
}
