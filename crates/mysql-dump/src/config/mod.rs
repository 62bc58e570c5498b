//! Configuration loading and validation.

mod types;
mod validation;

pub use types::*;

use std::path::Path;

use sha2::{Digest, Sha256};

use crate::error::Result;
use crate::orchestrator::ExportOptions;

impl Config {
    /// Load configuration from a YAML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let config = Self::load_unvalidated(path)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a YAML file without validating it.
    ///
    /// For callers that apply overrides first; call [`Config::validate`]
    /// afterwards.
    pub fn load_unvalidated<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_unvalidated(&content)
    }

    /// Parse configuration from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config = Self::from_yaml_unvalidated(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from a YAML string without validating it.
    pub fn from_yaml_unvalidated(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        validation::validate(self)
    }

    /// SHA256 of the serialized configuration, reported with each export so
    /// two runs can be compared.
    pub fn hash(&self) -> String {
        let yaml = serde_yaml::to_string(self).unwrap_or_default();
        let mut hasher = Sha256::new();
        hasher.update(yaml.as_bytes());
        format!("{:x}", hasher.finalize())
    }

    /// The settings the export engine reads.
    pub fn export_options(&self) -> ExportOptions {
        ExportOptions {
            add_if_not_exists: self.export.add_if_not_exists,
            exclude_views: self.export.exclude_views,
            exclude_routines: self.export.exclude_routines,
            max_rows_per_insert: self.export.max_rows_per_insert,
            cycle_policy: self.export.cycle_policy,
        }
    }
}

impl SourceConfig {
    /// Name of the database to export.
    ///
    /// An explicit `database` wins; otherwise the last path segment of `url`
    /// is used, without its query string.
    pub fn database_name(&self) -> Option<&str> {
        if !self.database.is_empty() {
            return Some(&self.database);
        }
        self.url.as_deref().and_then(database_from_url)
    }
}

/// Extract the database from `scheme://authority/path?query`.
fn database_from_url(url: &str) -> Option<&str> {
    let without_query = url.split('?').next().unwrap_or(url);
    let rest = without_query
        .split_once("://")
        .map(|(_, rest)| rest)
        .unwrap_or(without_query);
    let (_, path) = rest.split_once('/')?;
    path.rsplit('/').next().filter(|name| !name.is_empty())
}
