//! Update candidate selection
//!
//! This module provides:
//! - Available versions with optional release dates
//! - A selector that filters candidates through ignore ranges, pre-release
//!   and release-age rules, and picks the highest remaining one

mod candidate;

pub use candidate::VersionCandidate;

use crate::domain::{Dependency, SkipReason, UpdateResult};
use crate::error::PolicyError;
use crate::version::{Requirement, Version};
use chrono::{DateTime, TimeDelta, Utc};
use std::time::Duration;
use tracing::debug;

/// Chooses the version a dependency should move to
#[derive(Debug, Clone)]
pub struct CandidateSelector {
    /// Parsed ignore ranges; a candidate inside any of them is dropped
    ignored: Vec<Requirement>,
    /// Minimum time since release
    min_age: Option<Duration>,
    /// Current time for age calculations
    now: DateTime<Utc>,
}

impl CandidateSelector {
    /// Creates a selector for the given ignore ranges.
    ///
    /// Fails with `InvalidRequirement` on the first malformed range.
    pub fn new<S: AsRef<str>>(ignored_ranges: &[S]) -> Result<Self, PolicyError> {
        let ignored = ignored_ranges
            .iter()
            .map(|r| Requirement::parse(r.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            ignored,
            min_age: None,
            now: Utc::now(),
        })
    }

    /// Sets the minimum release age (builder pattern)
    pub fn with_min_age(mut self, min_age: Duration) -> Self {
        self.min_age = Some(min_age);
        self
    }

    /// Sets a custom current time (for testing)
    pub fn with_time(mut self, now: DateTime<Utc>) -> Self {
        self.now = now;
        self
    }

    /// Returns true if `version` falls inside any ignore range
    pub fn is_ignored(&self, version: &Version) -> bool {
        self.ignored.iter().any(|r| r.is_satisfied_by(version))
    }

    fn release_cutoff(&self) -> Option<DateTime<Utc>> {
        let min_age = self.min_age?;
        let age = TimeDelta::from_std(min_age).unwrap_or(TimeDelta::MAX);
        Some(
            self.now
                .checked_sub_signed(age)
                .unwrap_or(DateTime::<Utc>::MIN_UTC),
        )
    }

    /// Picks the highest acceptable candidate above the current version
    pub fn select(&self, dependency: &Dependency, available: &[VersionCandidate]) -> UpdateResult {
        if available.is_empty() {
            return UpdateResult::skip(dependency.clone(), SkipReason::NoVersionsAvailable);
        }

        let current = dependency.version().map(Version::parse);

        let allowed: Vec<&VersionCandidate> = available
            .iter()
            .filter(|c| {
                let ignored = self.is_ignored(&c.parsed());
                if ignored {
                    debug!(dependency = %dependency.name, version = %c.version, "candidate ignored");
                }
                !ignored
            })
            .collect();

        if allowed.is_empty() {
            return UpdateResult::skip(dependency.clone(), SkipReason::AllIgnored);
        }

        // Pre-releases are only offered to dependencies already on one
        let allow_prerelease = current.as_ref().is_some_and(Version::is_prerelease);
        let cutoff = self.release_cutoff();

        let eligible: Vec<&VersionCandidate> = allowed
            .into_iter()
            .filter(|c| allow_prerelease || !c.is_prerelease())
            .filter(|c| cutoff.map_or(true, |cutoff| c.released_before(cutoff)))
            .collect();

        let Some(latest) = eligible.into_iter().max() else {
            return UpdateResult::skip(dependency.clone(), SkipReason::NoSuitableVersion);
        };

        if let Some(current) = &current {
            if latest.parsed() <= *current {
                return UpdateResult::skip_already_latest(dependency.clone());
            }
        }

        UpdateResult::update_with_date(dependency.clone(), &latest.version, latest.released_at)
    }
}
