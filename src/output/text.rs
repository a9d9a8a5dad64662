//! Text output formatter for human-readable display
//!
//! This module provides:
//! - Per-group and ungrouped update listings with colors
//! - Semantic version change type indication (major/minor/patch)
//! - Ignored ranges and skipped packages in verbose mode
//! - Summary with detailed breakdown

use crate::domain::{PackageManager, SkipReason, UpdateResult};
use crate::orchestrator::{DependencyPlan, PlanResult};
use crate::output::{OutputFormatter, Verbosity};
use crate::version::{Segment, Version};
use chrono::{DateTime, Utc};
use colored::Colorize;
use std::io::Write;

/// Semantic version change type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionChangeType {
    /// Major version change (breaking)
    Major,
    /// Minor version change (features)
    Minor,
    /// Patch version change (fixes)
    Patch,
    /// Unknown or unparseable
    Unknown,
}

impl VersionChangeType {
    /// Determine the change type between two versions
    pub fn from_versions(old: &str, new: &str) -> Self {
        let old = Version::parse(old);
        let new = Version::parse(new);

        // Missing segments count as zero; letter segments are not comparable
        let numeric_at = |v: &Version, index: usize| -> Option<u64> {
            match v.segments().get(index) {
                Some(Segment::Numeric(n)) => Some(*n),
                Some(Segment::Alpha(_)) => None,
                None => Some(0),
            }
        };

        match (numeric_at(&old, 0), numeric_at(&new, 0)) {
            (Some(old_major), Some(new_major)) if old_major != new_major => {
                VersionChangeType::Major
            }
            (Some(_), Some(_)) => {
                if numeric_at(&old, 1) != numeric_at(&new, 1) {
                    VersionChangeType::Minor
                } else {
                    VersionChangeType::Patch
                }
            }
            _ => VersionChangeType::Unknown,
        }
    }

    /// Get the display label with color
    pub fn colored_label(&self) -> String {
        match self {
            VersionChangeType::Major => "major".red().bold().to_string(),
            VersionChangeType::Minor => "minor".yellow().to_string(),
            VersionChangeType::Patch => "patch".green().to_string(),
            VersionChangeType::Unknown => "?".dimmed().to_string(),
        }
    }

    /// Get the plain label
    pub fn label(&self) -> &'static str {
        match self {
            VersionChangeType::Major => "major",
            VersionChangeType::Minor => "minor",
            VersionChangeType::Patch => "patch",
            VersionChangeType::Unknown => "?",
        }
    }
}

/// Text formatter for human-readable output
pub struct TextFormatter {
    /// Verbosity level
    verbosity: Verbosity,
    /// Whether to use colors
    color: bool,
}

impl TextFormatter {
    /// Create a new text formatter
    pub fn new(verbosity: Verbosity) -> Self {
        Self {
            verbosity,
            color: true,
        }
    }

    /// Create a new text formatter with color option
    pub fn with_color(verbosity: Verbosity, color: bool) -> Self {
        Self { verbosity, color }
    }

    /// Get the security-only prefix if applicable
    fn security_prefix(&self, result: &PlanResult) -> String {
        if result.security_updates_only {
            if self.color {
                format!("{} ", "(security-only)".cyan())
            } else {
                "(security-only) ".to_string()
            }
        } else {
            String::new()
        }
    }

    /// Format a skip reason for display
    fn format_skip_reason(&self, reason: &SkipReason) -> String {
        match reason {
            SkipReason::NoVersionsAvailable => "no versions".to_string(),
            SkipReason::AllIgnored => "ignored".to_string(),
            SkipReason::NoSuitableVersion => "no suitable version".to_string(),
            SkipReason::AlreadyLatest => "latest".to_string(),
            SkipReason::InvalidIgnoreRange(msg) => format!("invalid ignore range: {}", msg),
        }
    }

    /// Calculate the maximum package name length for alignment
    fn max_name_length(&self, plans: &[&DependencyPlan]) -> usize {
        plans.iter().map(|p| p.name().len()).max().unwrap_or(0)
    }

    /// Format a single update line
    #[allow(clippy::too_many_arguments)]
    fn format_update_line(
        &self,
        name: &str,
        old_version: Option<&str>,
        new_version: &str,
        is_dev: bool,
        released_at: Option<DateTime<Utc>>,
        max_name_len: usize,
        writer: &mut dyn Write,
    ) -> std::io::Result<()> {
        let old_version = old_version.unwrap_or("(none)");
        let change_type = VersionChangeType::from_versions(old_version, new_version);
        let dev_marker = if is_dev { " (dev)" } else { "" };

        let date_display = released_at
            .map(|d| format!(" ({})", d.format("%Y/%m/%d %H:%M")))
            .unwrap_or_default();

        if self.color {
            let name_display = format!("{:width$}", name, width = max_name_len);
            writeln!(
                writer,
                "  {} {} {} {} [{}]{}{}",
                name_display,
                old_version.dimmed(),
                "→".dimmed(),
                new_version.bright_white().bold(),
                change_type.colored_label(),
                date_display.dimmed(),
                dev_marker.dimmed()
            )
        } else {
            writeln!(
                writer,
                "  {:width$} {} -> {} [{}]{}{}",
                name,
                old_version,
                new_version,
                change_type.label(),
                date_display,
                dev_marker,
                width = max_name_len
            )
        }
    }

    /// Format a single skip line
    fn format_skip_line(
        &self,
        name: &str,
        reason: &SkipReason,
        max_name_len: usize,
        writer: &mut dyn Write,
    ) -> std::io::Result<()> {
        let reason_str = self.format_skip_reason(reason);

        if self.color {
            let name_display = format!("{:width$}", name, width = max_name_len);
            writeln!(
                writer,
                "  {} {}",
                name_display.dimmed(),
                format!("({})", reason_str).dimmed()
            )
        } else {
            writeln!(
                writer,
                "  {:width$} ({})",
                name,
                reason_str,
                width = max_name_len
            )
        }
    }

    /// Format the ignored ranges under a dependency line
    fn format_ignored_line(
        &self,
        ranges: &[String],
        writer: &mut dyn Write,
    ) -> std::io::Result<()> {
        if ranges.is_empty() {
            return Ok(());
        }
        let line = format!("    ignored: {}", ranges.join(" | "));
        if self.color {
            writeln!(writer, "{}", line.dimmed())
        } else {
            writeln!(writer, "{}", line)
        }
    }

    /// Format one group (or the ungrouped set) with its updates
    fn format_section(
        &self,
        prefix: &str,
        title: &str,
        plans: &[&DependencyPlan],
        writer: &mut dyn Write,
    ) -> std::io::Result<()> {
        let verbose = self.verbosity == Verbosity::Verbose;
        let updates: Vec<&DependencyPlan> =
            plans.iter().copied().filter(|p| p.result.is_update()).collect();
        let skips: Vec<&DependencyPlan> =
            plans.iter().copied().filter(|p| p.result.is_skip()).collect();

        // Skip empty sections
        if updates.is_empty() && (!verbose || skips.is_empty()) {
            return Ok(());
        }

        let update_count = updates.len();
        let skip_count = skips.len();

        if self.color {
            write!(writer, "{}", prefix)?;
            write!(writer, "{}", title.bold())?;
            writeln!(
                writer,
                " — {} {}, {} {}",
                update_count.to_string().green(),
                if update_count == 1 {
                    "update"
                } else {
                    "updates"
                },
                skip_count.to_string().dimmed(),
                if skip_count == 1 { "skip" } else { "skips" }
            )?;
        } else {
            writeln!(
                writer,
                "{}{} — {} updates, {} skips",
                prefix, title, update_count, skip_count
            )?;
        }

        let max_name_len = self.max_name_length(plans).max(20);

        for plan in &updates {
            if let UpdateResult::Update {
                dependency,
                new_version,
                released_at,
            } = &plan.result
            {
                self.format_update_line(
                    &dependency.name,
                    dependency.version(),
                    new_version,
                    !dependency.is_production(),
                    *released_at,
                    max_name_len,
                    writer,
                )?;
                if verbose {
                    self.format_ignored_line(&plan.ignored_versions, writer)?;
                }
            }
        }

        // Write skips in verbose mode
        if verbose && !skips.is_empty() {
            writeln!(writer)?;
            if self.color {
                writeln!(writer, "  {}", "Skipped:".dimmed())?;
            } else {
                writeln!(writer, "  Skipped:")?;
            }
            for plan in &skips {
                if let UpdateResult::Skip { dependency, reason } = &plan.result {
                    self.format_skip_line(&dependency.name, reason, max_name_len, writer)?;
                    self.format_ignored_line(&plan.ignored_versions, writer)?;
                }
            }
        }

        writeln!(writer)?;
        Ok(())
    }

    /// Count updates by change type
    fn count_by_change_type(&self, result: &PlanResult) -> (usize, usize, usize, usize) {
        let mut major = 0;
        let mut minor = 0;
        let mut patch = 0;
        let mut unknown = 0;

        for plan in result.updates() {
            if let Some(new_version) = plan.result.new_version() {
                let change_type = plan
                    .dependency()
                    .version()
                    .map_or(VersionChangeType::Unknown, |old| {
                        VersionChangeType::from_versions(old, new_version)
                    });
                match change_type {
                    VersionChangeType::Major => major += 1,
                    VersionChangeType::Minor => minor += 1,
                    VersionChangeType::Patch => patch += 1,
                    VersionChangeType::Unknown => unknown += 1,
                }
            }
        }

        (major, minor, patch, unknown)
    }

    /// Count skips by reason
    fn count_by_skip_reason(&self, result: &PlanResult) -> Vec<(String, usize)> {
        use std::collections::HashMap;
        let mut counts: HashMap<String, usize> = HashMap::new();

        for plan in result.skips() {
            if let Some(reason) = plan.result.skip_reason() {
                *counts.entry(self.format_skip_reason(reason)).or_insert(0) += 1;
            }
        }

        let mut counts: Vec<_> = counts.into_iter().collect();
        counts.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        counts
    }
}

impl OutputFormatter for TextFormatter {
    fn format(&self, result: &PlanResult, writer: &mut dyn Write) -> std::io::Result<()> {
        // In quiet mode, only show summary
        if self.verbosity == Verbosity::Quiet {
            return self.format_summary(result, writer);
        }

        let prefix = self.security_prefix(result);

        for group in &result.groups {
            let plans: Vec<&DependencyPlan> = group
                .members
                .iter()
                .filter_map(|name| result.plan_for(name))
                .collect();
            let title = if group.targets_highest_versions {
                format!("Group {}", group.name)
            } else {
                format!("Group {} (capped)", group.name)
            };
            self.format_section(&prefix, &title, &plans, writer)?;
        }

        let ungrouped: Vec<&DependencyPlan> = result
            .ungrouped
            .iter()
            .filter_map(|name| result.plan_for(name))
            .collect();
        self.format_section(&prefix, "Ungrouped", &ungrouped, writer)?;

        // Format errors if any
        if !result.errors.is_empty() {
            if self.color {
                writeln!(writer, "{}:", "Errors".red().bold())?;
            } else {
                writeln!(writer, "Errors:")?;
            }
            for error in &result.errors {
                if self.color {
                    writeln!(writer, "  {} {}", "✗".red(), error)?;
                } else {
                    writeln!(writer, "  - {}", error)?;
                }
            }
            writeln!(writer)?;
        }

        self.format_summary(result, writer)
    }

    fn format_summary(&self, result: &PlanResult, writer: &mut dyn Write) -> std::io::Result<()> {
        let prefix = self.security_prefix(result);
        let updates = result.total_updates();
        let skips = result.total_skips();

        if self.verbosity == Verbosity::Quiet {
            if updates > 0 {
                if self.color {
                    writeln!(writer, "{}{} to update", prefix, updates.to_string().green())?;
                } else {
                    writeln!(writer, "{}{} to update", prefix, updates)?;
                }
            } else if self.color {
                writeln!(writer, "{}{}", prefix, "No updates".dimmed())?;
            } else {
                writeln!(writer, "{}No updates", prefix)?;
            }
            return Ok(());
        }

        let (major, minor, patch, unknown) = self.count_by_change_type(result);
        let mut parts = Vec::new();
        if major > 0 {
            parts.push((major, "major"));
        }
        if minor > 0 {
            parts.push((minor, "minor"));
        }
        if patch > 0 {
            parts.push((patch, "patch"));
        }
        if unknown > 0 {
            parts.push((unknown, "other"));
        }

        if self.color {
            writeln!(writer, "{}{}:", prefix, "Summary".bold())?;
            if updates > 0 {
                let breakdown: Vec<String> = parts
                    .iter()
                    .map(|(count, label)| {
                        let count = match *label {
                            "major" => count.to_string().red(),
                            "minor" => count.to_string().yellow(),
                            "patch" => count.to_string().green(),
                            _ => count.to_string().dimmed(),
                        };
                        format!("{} {}", count, label)
                    })
                    .collect();
                writeln!(
                    writer,
                    "  {} package(s) to update ({})",
                    updates.to_string().green(),
                    breakdown.join(", ")
                )?;
            } else {
                writeln!(writer, "  {}", "No packages to update".dimmed())?;
            }
            write!(writer, "  {} package(s) skipped", skips.to_string().dimmed())?;
        } else {
            writeln!(writer, "{}Summary:", prefix)?;
            if updates > 0 {
                let breakdown: Vec<String> = parts
                    .iter()
                    .map(|(count, label)| format!("{} {}", count, label))
                    .collect();
                writeln!(
                    writer,
                    "  {} package(s) to update ({})",
                    updates,
                    breakdown.join(", ")
                )?;
            } else {
                writeln!(writer, "  No packages to update")?;
            }
            write!(writer, "  {} package(s) skipped", skips)?;
        }

        if self.verbosity == Verbosity::Verbose {
            let skip_counts = self.count_by_skip_reason(result);
            if !skip_counts.is_empty() {
                let breakdown: Vec<String> = skip_counts
                    .iter()
                    .map(|(reason, count)| format!("{} {}", count, reason))
                    .collect();
                write!(writer, " ({})", breakdown.join(", "))?;
            }
        }
        writeln!(writer)?;

        // Verbose: show breakdown by package manager
        if self.verbosity == Verbosity::Verbose {
            writeln!(writer)?;
            if self.color {
                writeln!(writer, "{}:", "By package manager".dimmed())?;
            } else {
                writeln!(writer, "By package manager:")?;
            }
            for package_manager in PackageManager::all() {
                let plans: Vec<_> = result.by_package_manager(*package_manager).collect();
                if plans.is_empty() {
                    continue;
                }
                let pm_updates = plans.iter().filter(|p| p.result.is_update()).count();
                let pm_skips = plans.len() - pm_updates;
                if self.color {
                    writeln!(
                        writer,
                        "  {}: {} to update, {} skipped",
                        package_manager.display_name().cyan(),
                        pm_updates.to_string().green(),
                        pm_skips.to_string().dimmed()
                    )?;
                } else {
                    writeln!(
                        writer,
                        "  {}: {} to update, {} skipped",
                        package_manager.display_name(),
                        pm_updates,
                        pm_skips
                    )?;
                }
            }
        }

        Ok(())
    }
}
