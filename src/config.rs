//! Job configuration
//!
//! A job file describes one update run: the dependency groups and ignore
//! conditions in force, the experiment flags, and the dependencies with the
//! versions a registry would offer for them.
//!
//! ```yaml
//! security-updates-only: false
//! experiments:
//!   grouped_updates_experimental_rules: true
//! dependency-groups:
//!   - name: dev-tooling
//!     rules:
//!       patterns: ["rspec*", "rubocop*"]
//!       highest-semver-allowed: minor
//! ignore-conditions:
//!   - dependency-name: "rails"
//!     update-types: ["version-update:semver-major"]
//! dependencies:
//!   - name: rails
//!     version: "7.0.8"
//!     package-manager: bundler
//!     groups: [default]
//!     available-versions:
//!       - "7.0.8.1"
//!       - version: "7.1.0"
//!         released-at: "2023-10-05T00:00:00Z"
//! ```
//!
//! Version strings should be quoted; YAML reads `1.0` as a number.

use crate::domain::{Dependency, PackageManager};
use crate::error::{ConfigError, PolicyError};
use crate::group::RawGroupRules;
use crate::ignore::IgnoreCondition;
use crate::update::VersionCandidate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::debug;

/// Named feature flags for one job
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Experiments {
    flags: BTreeMap<String, bool>,
}

impl Experiments {
    /// Enables the `highest-semver-allowed` group rule
    pub const GROUPED_UPDATES_EXPERIMENTAL_RULES: &'static str =
        "grouped_updates_experimental_rules";

    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a flag, replacing any previous value
    pub fn register(&mut self, name: impl Into<String>, value: bool) {
        self.flags.insert(name.into(), value);
    }

    /// Returns true if the flag is registered and set. Unknown flags are off.
    pub fn is_enabled(&self, name: &str) -> bool {
        self.flags.get(name).copied().unwrap_or(false)
    }

    /// Clears every flag
    pub fn reset(&mut self) {
        self.flags.clear();
    }
}

/// A list that may also be written as a single string
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl OneOrMany {
    /// Returns the values as a list
    pub fn into_vec(self) -> Vec<String> {
        match self {
            OneOrMany::One(value) => vec![value],
            OneOrMany::Many(values) => values,
        }
    }
}

/// A `dependency-groups` entry
#[derive(Debug, Clone, Deserialize)]
pub struct GroupDefinition {
    pub name: String,
    #[serde(default)]
    pub rules: RawGroupRules,
}

/// An `ignore-conditions` entry
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct IgnoreConditionConfig {
    pub dependency_name: String,
    #[serde(default)]
    pub versions: Option<OneOrMany>,
    #[serde(default)]
    pub update_types: Option<OneOrMany>,
    #[serde(default)]
    pub security_only: bool,
}

impl IgnoreConditionConfig {
    /// Builds the condition. Empty `versions` or `update-types` lists count
    /// as absent. Fails when `dependency-name` is not a valid glob.
    pub fn to_condition(&self) -> Result<IgnoreCondition, PolicyError> {
        let mut condition =
            IgnoreCondition::new(&self.dependency_name)?.security_only(self.security_only);

        if let Some(versions) = &self.versions {
            let versions = versions.clone().into_vec();
            if !versions.is_empty() {
                condition = condition.with_versions(versions);
            }
        }
        if let Some(update_types) = &self.update_types {
            let update_types = update_types.clone().into_vec();
            if !update_types.is_empty() {
                condition = condition.with_raw_update_types(&update_types);
            }
        }
        Ok(condition)
    }
}

/// An `available-versions` item: a bare version or a version with its date
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum AvailableVersion {
    Bare(String),
    Detailed(VersionCandidate),
}

impl From<AvailableVersion> for VersionCandidate {
    fn from(value: AvailableVersion) -> Self {
        match value {
            AvailableVersion::Bare(version) => VersionCandidate::new(version),
            AvailableVersion::Detailed(candidate) => candidate,
        }
    }
}

/// A `dependencies` entry
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct DependencyEntry {
    pub name: String,
    #[serde(default)]
    pub version: Option<String>,
    pub package_manager: PackageManager,
    #[serde(default)]
    pub groups: Vec<String>,
    #[serde(default)]
    pub available_versions: Vec<AvailableVersion>,
}

impl DependencyEntry {
    pub fn to_dependency(&self) -> Dependency {
        Dependency::new(&self.name, self.version.as_deref(), self.package_manager)
            .with_groups(self.groups.iter().cloned())
    }

    /// Versions offered for this dependency
    pub fn candidates(&self) -> Vec<VersionCandidate> {
        self.available_versions
            .iter()
            .cloned()
            .map(VersionCandidate::from)
            .collect()
    }
}

/// A complete job file
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct JobConfig {
    #[serde(default)]
    pub security_updates_only: bool,
    #[serde(default)]
    pub experiments: Experiments,
    #[serde(default)]
    pub dependency_groups: Vec<GroupDefinition>,
    #[serde(default)]
    pub ignore_conditions: Vec<IgnoreConditionConfig>,
    #[serde(default)]
    pub dependencies: Vec<DependencyEntry>,
}

impl JobConfig {
    /// Reads and parses a job file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::read_error(path, e))?;
        let job = Self::from_yaml_str(&content)
            .map_err(|e| ConfigError::yaml_parse_error(path, e.to_string()))?;
        debug!(
            path = %path.display(),
            dependencies = job.dependencies.len(),
            groups = job.dependency_groups.len(),
            "loaded job file"
        );
        Ok(job)
    }

    /// Parses a job from YAML text. An empty document is an empty job.
    pub fn from_yaml_str(content: &str) -> Result<Self, serde_yaml::Error> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content)
    }

    /// Builds every ignore condition, in declaration order
    pub fn ignore_conditions(&self) -> Result<Vec<IgnoreCondition>, PolicyError> {
        self.ignore_conditions
            .iter()
            .map(IgnoreConditionConfig::to_condition)
            .collect()
    }

    /// Builds every dependency, in declaration order
    pub fn dependencies(&self) -> Vec<Dependency> {
        self.dependencies
            .iter()
            .map(DependencyEntry::to_dependency)
            .collect()
    }
}
