//! podsd - systemd units for grouped podman containers
//!
//! Turns a declarative description of container services, nested into
//! groups, into systemd unit files:
//! - each service becomes a `.service` unit running its container
//! - each group becomes a control `.service` and a `.slice` that its
//!   members are part of
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────┐
//! │                     podsd                        │
//! ├─────────────────────────────────────────────────┤
//! │    Loader     │    Validator     │   Writer     │
//! ├─────────────────────────────────────────────────┤
//! │  Model + Graph │ Names │ Resolver │ Generator   │
//! ├─────────────────────────────────────────────────┤
//! │           Unit model + INI renderer              │
//! └─────────────────────────────────────────────────┘
//! ```

pub mod error;
pub mod generate;
pub mod graph;
pub mod loader;
pub mod model;
pub mod names;
pub mod resolver;
pub mod units;
pub mod validate;
pub mod writer;

pub use error::{Error, Result, StructuredError};
pub use generate::{generate, GeneratedUnit, GeneratorOptions, UnitGenerator};
pub use graph::{GraphError, GroupMembership, MembershipGraph};
pub use model::{Configuration, ElementId, Service, ServiceElement, ServiceGroup, ServiceName};
pub use resolver::{AddressResolver, HostLookup, StaticHosts, SystemLookup};
pub use validate::{Check, Validator};
