//! JSON output formatter for machine processing
//!
//! This module provides:
//! - JSON serialization of a plan
//! - Group membership, ignored ranges and per-dependency decisions

use crate::domain::{PackageManager, SkipReason, UpdateResult};
use crate::orchestrator::{DependencyPlan, PlanResult};
use crate::output::text::VersionChangeType;
use crate::output::{OutputFormatter, Verbosity};
use serde::Serialize;
use std::io::Write;

/// JSON formatter for machine-readable output
pub struct JsonFormatter {
    /// Verbosity level affects detail in output
    verbosity: Verbosity,
}

impl JsonFormatter {
    /// Create a new JSON formatter
    pub fn new(verbosity: Verbosity) -> Self {
        Self { verbosity }
    }
}

/// JSON representation of the full result
#[derive(Serialize)]
struct JsonOutput {
    /// Whether security-only mode was in force
    security_updates_only: bool,
    /// Summary statistics
    summary: JsonSummary,
    /// Groups with their members
    groups: Vec<JsonGroup>,
    /// Dependencies in no group
    ungrouped: Vec<String>,
    /// Proposed updates
    updates: Vec<JsonUpdate>,
    /// List of skips (only in verbose mode)
    #[serde(skip_serializing_if = "Vec::is_empty")]
    skips: Vec<JsonSkip>,
    /// Errors encountered
    #[serde(skip_serializing_if = "Vec::is_empty")]
    errors: Vec<String>,
}

/// JSON representation of summary statistics
#[derive(Serialize)]
struct JsonSummary {
    /// Total number of updates
    updates: usize,
    /// Total number of skips
    skips: usize,
    /// Breakdown by package manager
    #[serde(skip_serializing_if = "Vec::is_empty")]
    by_package_manager: Vec<JsonPackageManagerSummary>,
}

#[derive(Serialize)]
struct JsonPackageManagerSummary {
    /// Package manager id as used in job files
    package_manager: String,
    updates: usize,
    skips: usize,
}

/// JSON representation of a group
#[derive(Serialize)]
struct JsonGroup {
    name: String,
    /// False when a semver ceiling applies
    targets_highest_versions: bool,
    /// Member names
    dependencies: Vec<String>,
}

/// JSON representation of an update
#[derive(Serialize)]
struct JsonUpdate {
    /// Package name
    name: String,
    /// Old version
    #[serde(skip_serializing_if = "Option::is_none")]
    from: Option<String>,
    /// New version
    to: String,
    /// Semantic change type
    change: &'static str,
    /// Whether it's a dev dependency
    dev: bool,
    /// Groups the dependency belongs to
    #[serde(skip_serializing_if = "Vec::is_empty")]
    groups: Vec<String>,
    /// Ranges that were excluded
    #[serde(skip_serializing_if = "Vec::is_empty")]
    ignored_versions: Vec<String>,
}

/// JSON representation of a skip
#[derive(Serialize)]
struct JsonSkip {
    /// Package name
    name: String,
    /// Current version
    #[serde(skip_serializing_if = "Option::is_none")]
    version: Option<String>,
    /// Skip reason
    reason: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    ignored_versions: Vec<String>,
}

impl JsonFormatter {
    /// Convert skip reason to string
    fn skip_reason_to_string(reason: &SkipReason) -> String {
        match reason {
            SkipReason::NoVersionsAvailable => "no_versions_available".to_string(),
            SkipReason::AllIgnored => "all_ignored".to_string(),
            SkipReason::NoSuitableVersion => "no_suitable_version".to_string(),
            SkipReason::AlreadyLatest => "already_latest".to_string(),
            SkipReason::InvalidIgnoreRange(msg) => format!("invalid_ignore_range: {}", msg),
        }
    }

    fn update_to_json(plan: &DependencyPlan) -> Option<JsonUpdate> {
        let UpdateResult::Update {
            dependency,
            new_version,
            ..
        } = &plan.result
        else {
            return None;
        };

        let change = dependency
            .version()
            .map_or(VersionChangeType::Unknown, |old| {
                VersionChangeType::from_versions(old, new_version)
            });

        Some(JsonUpdate {
            name: dependency.name.clone(),
            from: dependency.version.clone(),
            to: new_version.clone(),
            change: change.label(),
            dev: !dependency.is_production(),
            groups: plan.groups.clone(),
            ignored_versions: plan.ignored_versions.clone(),
        })
    }

    fn skip_to_json(plan: &DependencyPlan) -> Option<JsonSkip> {
        let UpdateResult::Skip { dependency, reason } = &plan.result else {
            return None;
        };

        Some(JsonSkip {
            name: dependency.name.clone(),
            version: dependency.version.clone(),
            reason: Self::skip_reason_to_string(reason),
            ignored_versions: plan.ignored_versions.clone(),
        })
    }

    fn summary(&self, result: &PlanResult) -> JsonSummary {
        let by_package_manager = if self.verbosity == Verbosity::Verbose {
            PackageManager::all()
                .iter()
                .filter_map(|package_manager| {
                    let plans: Vec<_> = result.by_package_manager(*package_manager).collect();
                    if plans.is_empty() {
                        None
                    } else {
                        let updates = plans.iter().filter(|p| p.result.is_update()).count();
                        Some(JsonPackageManagerSummary {
                            package_manager: package_manager.id().to_string(),
                            updates,
                            skips: plans.len() - updates,
                        })
                    }
                })
                .collect()
        } else {
            Vec::new()
        };

        JsonSummary {
            updates: result.total_updates(),
            skips: result.total_skips(),
            by_package_manager,
        }
    }
}

impl OutputFormatter for JsonFormatter {
    fn format(&self, result: &PlanResult, writer: &mut dyn Write) -> std::io::Result<()> {
        let skips = if self.verbosity == Verbosity::Verbose {
            result.skips().filter_map(Self::skip_to_json).collect()
        } else {
            Vec::new()
        };

        let output = JsonOutput {
            security_updates_only: result.security_updates_only,
            summary: self.summary(result),
            groups: result
                .groups
                .iter()
                .map(|g| JsonGroup {
                    name: g.name.clone(),
                    targets_highest_versions: g.targets_highest_versions,
                    dependencies: g.members.clone(),
                })
                .collect(),
            ungrouped: result.ungrouped.clone(),
            updates: result.updates().filter_map(Self::update_to_json).collect(),
            skips,
            errors: result.errors.iter().map(|e| e.to_string()).collect(),
        };

        let json = serde_json::to_string_pretty(&output).map_err(std::io::Error::other)?;

        writeln!(writer, "{}", json)?;

        Ok(())
    }

    fn format_summary(&self, result: &PlanResult, writer: &mut dyn Write) -> std::io::Result<()> {
        let json =
            serde_json::to_string_pretty(&self.summary(result)).map_err(std::io::Error::other)?;

        writeln!(writer, "{}", json)?;

        Ok(())
    }
}
