//! Update decision result types

use super::Dependency;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Reason why a dependency update was skipped
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// The job lists no available versions
    NoVersionsAvailable,
    /// Every candidate falls inside an ignore range
    AllIgnored,
    /// Remaining candidates are pre-releases or too recent
    NoSuitableVersion,
    /// Already at the latest allowed version
    AlreadyLatest,
    /// An ignore range could not be parsed
    InvalidIgnoreRange(String),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::NoVersionsAvailable => write!(f, "no versions available"),
            SkipReason::AllIgnored => write!(f, "all versions ignored"),
            SkipReason::NoSuitableVersion => write!(f, "no suitable version"),
            SkipReason::AlreadyLatest => write!(f, "already at latest"),
            SkipReason::InvalidIgnoreRange(msg) => write!(f, "invalid ignore range: {}", msg),
        }
    }
}

/// Result of an update decision for a single dependency
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum UpdateResult {
    /// Dependency will be updated
    Update {
        /// The dependency being updated
        dependency: Dependency,
        /// The new version to update to
        new_version: String,
        /// When the new version was released, if known
        #[serde(default, skip_serializing_if = "Option::is_none")]
        released_at: Option<DateTime<Utc>>,
    },
    /// Dependency update was skipped
    Skip {
        /// The dependency that was skipped
        dependency: Dependency,
        /// The reason for skipping
        reason: SkipReason,
    },
}

impl UpdateResult {
    /// Creates an Update result
    pub fn update(dependency: Dependency, new_version: impl Into<String>) -> Self {
        UpdateResult::Update {
            dependency,
            new_version: new_version.into(),
            released_at: None,
        }
    }

    /// Creates an Update result carrying the release date
    pub fn update_with_date(
        dependency: Dependency,
        new_version: impl Into<String>,
        released_at: Option<DateTime<Utc>>,
    ) -> Self {
        UpdateResult::Update {
            dependency,
            new_version: new_version.into(),
            released_at,
        }
    }

    /// Creates a Skip result
    pub fn skip(dependency: Dependency, reason: SkipReason) -> Self {
        UpdateResult::Skip { dependency, reason }
    }

    /// Creates a Skip result for already at latest
    pub fn skip_already_latest(dependency: Dependency) -> Self {
        Self::skip(dependency, SkipReason::AlreadyLatest)
    }

    /// Returns true if this is an update result
    pub fn is_update(&self) -> bool {
        matches!(self, UpdateResult::Update { .. })
    }

    /// Returns true if this is a skip result
    pub fn is_skip(&self) -> bool {
        matches!(self, UpdateResult::Skip { .. })
    }

    /// Returns the dependency reference
    pub fn dependency(&self) -> &Dependency {
        match self {
            UpdateResult::Update { dependency, .. } => dependency,
            UpdateResult::Skip { dependency, .. } => dependency,
        }
    }

    /// Returns the proposed version, if any
    pub fn new_version(&self) -> Option<&str> {
        match self {
            UpdateResult::Update { new_version, .. } => Some(new_version),
            UpdateResult::Skip { .. } => None,
        }
    }

    /// Returns the skip reason, if any
    pub fn skip_reason(&self) -> Option<&SkipReason> {
        match self {
            UpdateResult::Skip { reason, .. } => Some(reason),
            UpdateResult::Update { .. } => None,
        }
    }

    /// Returns the package name
    pub fn package_name(&self) -> &str {
        &self.dependency().name
    }
}

impl fmt::Display for UpdateResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UpdateResult::Update {
                dependency,
                new_version,
                ..
            } => {
                write!(
                    f,
                    "{}: {} → {}",
                    dependency.name,
                    dependency.version().unwrap_or("(none)"),
                    new_version
                )
            }
            UpdateResult::Skip { dependency, reason } => {
                write!(f, "{}: skipped ({})", dependency.name, reason)
            }
        }
    }
}
