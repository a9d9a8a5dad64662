//! Ignore conditions
//!
//! An ignore condition tells the updater which versions of a dependency must
//! never be proposed. It either lists explicit ranges, or names semver update
//! types (patch/minor/major) that are turned into ranges relative to the
//! dependency's current version:
//!
//! | update type | current `1.2.3`        |
//! |-------------|------------------------|
//! | patch       | `>= 1.2.3.1.a, < 1.3`  |
//! | minor       | `>= 1.3.a, < 2`        |
//! | major       | `>= 2.a, < 3`          |

use crate::domain::Dependency;
use crate::error::PolicyError;
use crate::version::{next_segment_boundary, release_parts, Bound};
use crate::wildcard::WildcardPattern;
use std::fmt;
use std::str::FromStr;
use tracing::{debug, warn};

/// The range that ignores every version
pub const ALL_VERSIONS: &str = ">= 0";

/// Class of a version bump
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UpdateType {
    Patch,
    Minor,
    Major,
}

impl UpdateType {
    /// Returns the identifier used in configuration files
    pub fn as_str(&self) -> &'static str {
        match self {
            UpdateType::Patch => "version-update:semver-patch",
            UpdateType::Minor => "version-update:semver-minor",
            UpdateType::Major => "version-update:semver-major",
        }
    }
}

impl FromStr for UpdateType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "version-update:semver-patch" | "patch" => Ok(UpdateType::Patch),
            "version-update:semver-minor" | "minor" => Ok(UpdateType::Minor),
            "version-update:semver-major" | "major" => Ok(UpdateType::Major),
            other => Err(format!("unknown update type '{}'", other)),
        }
    }
}

impl fmt::Display for UpdateType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// How far a major-update range reaches
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum MajorReach {
    /// Only the next major line (`>= 2.a, < 3`)
    NextLine,
    /// Every later version (`>= 2.a`)
    Unbounded,
}

/// A per-dependency ignore rule. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IgnoreCondition {
    dependency_name: WildcardPattern,
    versions: Option<Vec<String>>,
    update_types: Option<Vec<UpdateType>>,
    security_only: bool,
    major_reach: MajorReach,
}

impl IgnoreCondition {
    /// Creates a condition with no criteria, which ignores every version.
    ///
    /// Fails with `InvalidPattern` when `dependency_name` is not a valid glob.
    pub fn new(dependency_name: &str) -> Result<Self, PolicyError> {
        Ok(Self {
            dependency_name: WildcardPattern::new(dependency_name)?,
            versions: None,
            update_types: None,
            security_only: false,
            major_reach: MajorReach::NextLine,
        })
    }

    /// Condition that ignores the given update types with unbounded major
    /// ranges, used for group semver ceilings
    pub(crate) fn for_update_types(
        dependency_name: &str,
        update_types: Vec<UpdateType>,
    ) -> Result<Self, PolicyError> {
        Ok(Self {
            update_types: Some(update_types),
            major_reach: MajorReach::Unbounded,
            ..Self::new(dependency_name)?
        })
    }

    /// Sets explicit version ranges to ignore
    pub fn with_versions<I, S>(mut self, versions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.versions = Some(versions.into_iter().map(Into::into).collect());
        self
    }

    /// Sets the update types to ignore. An empty list means no update types.
    pub fn with_update_types(mut self, update_types: Vec<UpdateType>) -> Self {
        self.update_types = if update_types.is_empty() {
            None
        } else {
            Some(update_types)
        };
        self
    }

    /// Sets the update types from configuration strings.
    ///
    /// Unrecognised strings are dropped with a warning. If none of them is
    /// recognised the condition ignores nothing by update type, rather than
    /// falling back to ignoring every version.
    pub fn with_raw_update_types<S: AsRef<str>>(self, raw: &[S]) -> Self {
        let parsed: Vec<UpdateType> = raw
            .iter()
            .filter_map(|s| match s.as_ref().parse::<UpdateType>() {
                Ok(update_type) => Some(update_type),
                Err(message) => {
                    warn!(dependency = %self.dependency_name, "{}", message);
                    None
                }
            })
            .collect();

        if parsed.is_empty() && !raw.is_empty() {
            Self {
                update_types: Some(Vec::new()),
                ..self
            }
        } else {
            self.with_update_types(parsed)
        }
    }

    /// Marks the condition as applying to security updates too
    pub fn security_only(mut self, security_only: bool) -> Self {
        self.security_only = security_only;
        self
    }

    /// Returns the dependency name pattern
    pub fn dependency_name(&self) -> &str {
        self.dependency_name.as_str()
    }

    /// Returns the explicit version ranges, if any
    pub fn versions(&self) -> Option<&[String]> {
        self.versions.as_deref()
    }

    /// Returns the ignored update types, if any
    pub fn update_types(&self) -> Option<&[UpdateType]> {
        self.update_types.as_deref()
    }

    /// Returns true if this condition is meant for security updates
    pub fn is_security_only(&self) -> bool {
        self.security_only
    }

    /// Returns true if the condition's name pattern matches `name`
    pub fn applies_to(&self, name: &str) -> bool {
        self.dependency_name.matches(name)
    }

    /// Computes the version ranges to ignore for `dependency`.
    ///
    /// Explicit ranges always win and are returned verbatim, even for
    /// security-only runs. Otherwise security-only runs ignore nothing unless
    /// this is a security condition. A condition without criteria ignores
    /// everything. Update types produce one range each, in declaration
    /// order; types that make no sense for the current version (patch on a
    /// bare major version) contribute nothing.
    pub fn ignored_versions(
        &self,
        dependency: &Dependency,
        security_updates_only: bool,
    ) -> Vec<String> {
        if let Some(versions) = &self.versions {
            return versions.clone();
        }

        if security_updates_only && !self.security_only {
            return Vec::new();
        }

        let Some(update_types) = &self.update_types else {
            return vec![ALL_VERSIONS.to_string()];
        };

        let Some(version) = dependency.version() else {
            debug!(dependency = %dependency.name, "no current version, update types ignore nothing");
            return Vec::new();
        };

        let mut ranges: Vec<String> = Vec::new();
        for update_type in update_types {
            match self.range_for(*update_type, version) {
                Some(range) if !ranges.contains(&range) => ranges.push(range),
                Some(_) => {}
                None => debug!(
                    dependency = %dependency.name,
                    version,
                    update_type = %update_type,
                    "update type not applicable to version"
                ),
            }
        }
        ranges
    }

    fn range_for(&self, update_type: UpdateType, version: &str) -> Option<String> {
        match update_type {
            UpdateType::Patch => patch_range(version),
            UpdateType::Minor => minor_range(version),
            UpdateType::Major => major_range(version, self.major_reach),
        }
    }
}

/// Versions above `version` within its minor line.
///
/// The lower bound is the smallest successor of the current version, so
/// the current version itself stays allowed.
fn patch_range(version: &str) -> Option<String> {
    // A bare major version has no patch level
    let depth = release_parts(version).len().max(2);
    let lower = next_segment_boundary(version, depth, Bound::Lower)?;
    let upper = next_segment_boundary(version, 1, Bound::Upper)?;
    Some(format!(">= {}, < {}", lower, upper))
}

fn minor_range(version: &str) -> Option<String> {
    let lower = next_segment_boundary(version, 1, Bound::Lower)?;
    let upper = next_segment_boundary(version, 0, Bound::Upper)?;
    Some(format!(">= {}, < {}", lower, upper))
}

fn major_range(version: &str, reach: MajorReach) -> Option<String> {
    let lower = next_segment_boundary(version, 0, Bound::Lower)?;
    match reach {
        MajorReach::Unbounded => Some(format!(">= {}", lower)),
        MajorReach::NextLine => {
            let next_major = next_segment_boundary(version, 0, Bound::Upper)?;
            let upper = next_segment_boundary(&next_major, 0, Bound::Upper)?;
            Some(format!(">= {}, < {}", lower, upper))
        }
    }
}
