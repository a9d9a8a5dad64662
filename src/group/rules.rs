//! Group rule types
//!
//! `RawGroupRules` is the shape found in configuration files (plain strings,
//! unknown keys ignored). `GroupRules` is the validated form the engine works
//! with.

use crate::domain::Dependency;
use crate::error::PolicyError;
use crate::ignore::UpdateType;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Configuration key holding the semver ceiling
pub const HIGHEST_SEMVER_ALLOWED: &str = "highest-semver-allowed";

/// Group rules as written in the configuration file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct RawGroupRules {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patterns: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclude_patterns: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dependency_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub highest_semver_allowed: Option<String>,
}

/// Largest update a group may contain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SemverCeiling {
    Major,
    Minor,
    Patch,
}

impl SemverCeiling {
    /// Parses `major`, `minor` or `patch`
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "major" => Some(SemverCeiling::Major),
            "minor" => Some(SemverCeiling::Minor),
            "patch" => Some(SemverCeiling::Patch),
            _ => None,
        }
    }

    /// Returns the configuration spelling
    pub fn as_str(&self) -> &'static str {
        match self {
            SemverCeiling::Major => "major",
            SemverCeiling::Minor => "minor",
            SemverCeiling::Patch => "patch",
        }
    }

    /// Update types above the ceiling, larger first
    pub fn ignored_update_types(&self) -> Vec<UpdateType> {
        match self {
            SemverCeiling::Major => Vec::new(),
            SemverCeiling::Minor => vec![UpdateType::Major],
            SemverCeiling::Patch => vec![UpdateType::Major, UpdateType::Minor],
        }
    }
}

impl fmt::Display for SemverCeiling {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Dependency-type filter of a group
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DependencyType {
    Production,
    Development,
    /// Any other value; kept for rendering, matches no dependency
    Other(String),
}

impl DependencyType {
    /// Parses a configuration value. Never fails.
    pub fn parse(value: &str) -> Self {
        match value {
            "production" => DependencyType::Production,
            "development" => DependencyType::Development,
            other => DependencyType::Other(other.to_string()),
        }
    }

    /// Returns the configuration spelling
    pub fn as_str(&self) -> &str {
        match self {
            DependencyType::Production => "production",
            DependencyType::Development => "development",
            DependencyType::Other(other) => other,
        }
    }

    /// Returns true if `dependency` is of this type
    pub fn matches(&self, dependency: &Dependency) -> bool {
        match self {
            DependencyType::Production => dependency.is_production(),
            DependencyType::Development => !dependency.is_production(),
            DependencyType::Other(_) => false,
        }
    }
}

/// Validated group rules
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupRules {
    pub patterns: Option<Vec<String>>,
    pub exclude_patterns: Option<Vec<String>>,
    pub dependency_type: Option<DependencyType>,
    pub highest_semver_allowed: Option<SemverCeiling>,
}

impl GroupRules {
    /// Validates raw rules for the group `group`.
    ///
    /// Only `highest-semver-allowed` is checked; it must be `major`, `minor`
    /// or `patch`.
    pub fn from_raw(group: &str, raw: RawGroupRules) -> Result<Self, PolicyError> {
        let highest_semver_allowed = match raw.highest_semver_allowed {
            Some(value) => Some(SemverCeiling::parse(&value).ok_or_else(|| {
                PolicyError::invalid_group_configuration(group, HIGHEST_SEMVER_ALLOWED, value)
            })?),
            None => None,
        };

        Ok(Self {
            patterns: raw.patterns,
            exclude_patterns: raw.exclude_patterns,
            dependency_type: raw.dependency_type.as_deref().map(DependencyType::parse),
            highest_semver_allowed,
        })
    }

    /// Returns the configuration-file form of these rules
    pub fn to_raw(&self) -> RawGroupRules {
        RawGroupRules {
            patterns: self.patterns.clone(),
            exclude_patterns: self.exclude_patterns.clone(),
            dependency_type: self.dependency_type.as_ref().map(|t| t.as_str().to_string()),
            highest_semver_allowed: self.highest_semver_allowed.map(|c| c.as_str().to_string()),
        }
    }
}
