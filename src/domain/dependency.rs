//! Dependency information structures

use super::PackageManager;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Represents a package dependency
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Dependency {
    /// Package name, including any scope or namespace prefix
    pub name: String,
    /// Currently declared version, if the manifest pins one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// The package manager this dependency belongs to
    pub package_manager: PackageManager,
    /// Requirement groups the manifest declares the dependency in
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub groups: Vec<String>,
}

impl Dependency {
    /// Creates a new dependency without requirement groups
    pub fn new(
        name: impl Into<String>,
        version: Option<&str>,
        package_manager: PackageManager,
    ) -> Self {
        Self {
            name: name.into(),
            version: version.map(str::to_string),
            package_manager,
            groups: Vec::new(),
        }
    }

    /// Sets the requirement groups (builder pattern)
    pub fn with_groups<I, S>(mut self, groups: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.groups = groups.into_iter().map(Into::into).collect();
        self
    }

    /// Returns the current version string
    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    /// Returns true if this is a production (runtime) dependency
    pub fn is_production(&self) -> bool {
        self.package_manager
            .production_classifier()
            .is_production(&self.groups)
    }
}

impl fmt::Display for Dependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let dev_marker = if self.is_production() { "" } else { " (dev)" };
        match self.version() {
            Some(version) => write!(
                f,
                "{}@{}{} [{}]",
                self.name, version, dev_marker, self.package_manager
            ),
            None => write!(f, "{}{} [{}]", self.name, dev_marker, self.package_manager),
        }
    }
}
