//! Job planner for coordinating the whole evaluation
//!
//! This module provides:
//! - Workflow coordination: build conditions → build groups → assign →
//!   compute ignore ranges → select candidates
//! - Security-only and release-age overrides
//! - Error handling with partial continuation: a malformed ignore range
//!   fails only its own dependency

use crate::config::JobConfig;
use crate::domain::{Dependency, PackageManager, SkipReason, UpdateResult};
use crate::error::PolicyError;
use crate::group::{DependencyGroup, DependencyGroupEngine};
use crate::ignore::IgnoreCondition;
use crate::update::{CandidateSelector, VersionCandidate};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::fmt;
use std::time::Duration;
use tracing::{debug, warn};

/// Planner for one job
pub struct Planner {
    /// The parsed job file
    job: JobConfig,
    /// Whether only security updates are being made
    security_updates_only: bool,
    /// Minimum time since release for a candidate
    min_age: Option<Duration>,
    /// Current time for age calculations
    now: DateTime<Utc>,
}

/// Per-dependency outcome
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyPlan {
    /// Names of the groups the dependency was assigned to
    pub groups: Vec<String>,
    /// Every range excluded for this dependency, deduplicated, in order
    pub ignored_versions: Vec<String>,
    /// The update decision
    pub result: UpdateResult,
}

impl DependencyPlan {
    /// Returns the dependency
    pub fn dependency(&self) -> &Dependency {
        self.result.dependency()
    }

    /// Returns the package name
    pub fn name(&self) -> &str {
        self.result.package_name()
    }
}

/// A group and its members after assignment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupPlan {
    /// Group name
    pub name: String,
    /// False when a semver ceiling keeps the group below major updates
    pub targets_highest_versions: bool,
    /// Member names, in assignment order
    pub members: Vec<String>,
}

/// Result of running the planner
#[derive(Debug, Clone, Default)]
pub struct PlanResult {
    /// Whether security-only mode was in force
    pub security_updates_only: bool,
    /// Groups in declaration order
    pub groups: Vec<GroupPlan>,
    /// Names of dependencies in no group
    pub ungrouped: Vec<String>,
    /// One plan per dependency, in job order
    pub dependencies: Vec<DependencyPlan>,
    /// Errors encountered
    pub errors: Vec<PlanError>,
}

impl PlanResult {
    /// Plans that propose an update
    pub fn updates(&self) -> impl Iterator<Item = &DependencyPlan> {
        self.dependencies.iter().filter(|p| p.result.is_update())
    }

    /// Plans that were skipped
    pub fn skips(&self) -> impl Iterator<Item = &DependencyPlan> {
        self.dependencies.iter().filter(|p| p.result.is_skip())
    }

    pub fn total_updates(&self) -> usize {
        self.updates().count()
    }

    pub fn total_skips(&self) -> usize {
        self.skips().count()
    }

    /// Returns the plan for the named dependency
    pub fn plan_for(&self, name: &str) -> Option<&DependencyPlan> {
        self.dependencies.iter().find(|p| p.name() == name)
    }

    /// Plans belonging to one package manager
    pub fn by_package_manager(
        &self,
        package_manager: PackageManager,
    ) -> impl Iterator<Item = &DependencyPlan> {
        self.dependencies
            .iter()
            .filter(move |p| p.dependency().package_manager == package_manager)
    }
}

/// A per-dependency failure; the rest of the job still runs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanError {
    /// The dependency that failed
    pub dependency: String,
    /// The underlying error
    pub error: PolicyError,
}

impl fmt::Display for PlanError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.dependency, self.error)
    }
}

impl std::error::Error for PlanError {}

impl Planner {
    /// Create a planner for the given job
    pub fn new(job: JobConfig) -> Self {
        Self {
            security_updates_only: job.security_updates_only,
            job,
            min_age: None,
            now: Utc::now(),
        }
    }

    /// Forces security-only mode on, whatever the job says
    pub fn with_security_updates_only(mut self, security_updates_only: bool) -> Self {
        self.security_updates_only |= security_updates_only;
        self
    }

    /// Sets the minimum release age
    pub fn with_min_age(mut self, min_age: Duration) -> Self {
        self.min_age = Some(min_age);
        self
    }

    /// Sets a custom current time (for testing)
    pub fn with_time(mut self, now: DateTime<Utc>) -> Self {
        self.now = now;
        self
    }

    /// Returns the job being planned
    pub fn job(&self) -> &JobConfig {
        &self.job
    }

    /// Builds the group engine without assigning anything
    pub fn group_engine(&self) -> Result<DependencyGroupEngine, PolicyError> {
        DependencyGroupEngine::from_job_config(&self.job)
    }

    /// Run the planning workflow.
    ///
    /// Invalid group rules are fatal. Malformed ignore ranges are recorded
    /// in `PlanResult::errors` and the dependency is skipped.
    pub fn run(&self) -> Result<PlanResult, PolicyError> {
        let conditions = self.job.ignore_conditions()?;
        let dependencies = self.job.dependencies();

        let mut engine = self.group_engine()?;
        engine.assign_to_groups(&dependencies)?;

        // First entry wins when a name is listed twice
        let mut available: HashMap<&str, Vec<VersionCandidate>> = HashMap::new();
        for entry in &self.job.dependencies {
            available
                .entry(entry.name.as_str())
                .or_insert_with(|| entry.candidates());
        }

        let mut result = PlanResult {
            security_updates_only: self.security_updates_only,
            groups: engine
                .groups()
                .iter()
                .map(|group| GroupPlan {
                    name: group.name().to_string(),
                    targets_highest_versions: group.targets_highest_versions_possible(),
                    members: group.dependencies().iter().map(|d| d.name.clone()).collect(),
                })
                .collect(),
            ungrouped: engine
                .ungrouped_dependencies()
                .iter()
                .map(|d| d.name.clone())
                .collect(),
            ..Default::default()
        };

        for dependency in &dependencies {
            let groups = engine.groups_for(dependency);
            let ignored_versions = self.ignored_versions(dependency, &conditions, &groups);
            let candidates = available
                .get(dependency.name.as_str())
                .map(Vec::as_slice)
                .unwrap_or_default();

            let update = match self.selector(&ignored_versions) {
                Ok(selector) => selector.select(dependency, candidates),
                Err(error) => {
                    warn!(dependency = %dependency.name, %error, "skipping dependency");
                    result.errors.push(PlanError {
                        dependency: dependency.name.clone(),
                        error: error.clone(),
                    });
                    UpdateResult::skip(
                        dependency.clone(),
                        SkipReason::InvalidIgnoreRange(error.to_string()),
                    )
                }
            };

            result.dependencies.push(DependencyPlan {
                groups: groups.iter().map(|g| g.name().to_string()).collect(),
                ignored_versions,
                result: update,
            });
        }

        Ok(result)
    }

    /// Union of every applicable condition's ranges and every containing
    /// group's ceiling, in that order, without duplicates
    fn ignored_versions(
        &self,
        dependency: &Dependency,
        conditions: &[IgnoreCondition],
        groups: &[&DependencyGroup],
    ) -> Vec<String> {
        let mut ignored: Vec<String> = Vec::new();
        let mut extend = |ranges: Vec<String>| {
            for range in ranges {
                if !ignored.contains(&range) {
                    ignored.push(range);
                }
            }
        };

        for condition in conditions.iter().filter(|c| c.applies_to(&dependency.name)) {
            extend(condition.ignored_versions(dependency, self.security_updates_only));
        }
        for group in groups {
            extend(group.ignored_versions_for(dependency));
        }

        debug!(dependency = %dependency.name, ignored = ?ignored, "computed ignored versions");
        ignored
    }

    fn selector(&self, ignored_versions: &[String]) -> Result<CandidateSelector, PolicyError> {
        let selector = CandidateSelector::new(ignored_versions)?.with_time(self.now);
        Ok(match self.min_age {
            Some(min_age) => selector.with_min_age(min_age),
            None => selector,
        })
    }
}
