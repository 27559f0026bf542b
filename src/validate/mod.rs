//! Configuration validation
//!
//! A validator runs every registered check over the whole configuration
//! and collects all of their errors. Generation must not run unless the
//! combined list is empty.

mod checks;

pub use checks::{
    AbsoluteMountPaths, EnvironmentVariableNames, NonEmptyRunAs, SingleLineUnitValues,
    UniquePublishedPorts, UniqueUnitNames,
};

use crate::error::{Error, Result, StructuredError};
use crate::model::Configuration;

/// A single independent validation check
pub trait Check: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &'static str;

    fn check(&self, configuration: &Configuration) -> Vec<StructuredError>;
}

/// Runs a fixed list of checks
pub struct Validator {
    checks: Vec<Box<dyn Check>>,
}

impl Validator {
    pub fn builder() -> ValidatorBuilder {
        ValidatorBuilder::default()
    }

    /// Validator with every built-in check
    pub fn with_default_checks() -> Self {
        Self::builder()
            .check(UniqueUnitNames)
            .check(UniquePublishedPorts)
            .check(AbsoluteMountPaths)
            .check(EnvironmentVariableNames)
            .check(NonEmptyRunAs)
            .check(SingleLineUnitValues)
            .build()
    }

    pub fn check_names(&self) -> Vec<&'static str> {
        self.checks.iter().map(|c| c.name()).collect()
    }

    /// Run every check and return all errors found
    pub fn validate(&self, configuration: &Configuration) -> Vec<StructuredError> {
        let mut errors = Vec::new();
        for check in &self.checks {
            let found = check.check(configuration);
            if !found.is_empty() {
                log::warn!("Check {} reported {} error(s)", check.name(), found.len());
            } else {
                log::debug!("Check {} passed", check.name());
            }
            errors.extend(found);
        }
        errors
    }

    /// Fail with every collected error if any check failed
    pub fn gate(&self, configuration: &Configuration) -> Result<()> {
        let errors = self.validate(configuration);
        if errors.is_empty() {
            Ok(())
        } else {
            Err(Error::Validation(errors))
        }
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self::with_default_checks()
    }
}

#[derive(Default)]
pub struct ValidatorBuilder {
    checks: Vec<Box<dyn Check>>,
}

impl ValidatorBuilder {
    pub fn check(mut self, check: impl Check + 'static) -> Self {
        self.checks.push(Box::new(check));
        self
    }

    pub fn build(self) -> Validator {
        Validator { checks: self.checks }
    }
}
