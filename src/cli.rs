//! CLI argument parsing module for update-policy

use crate::error::ConfigError;
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

/// Parse duration string in format: Nd (days), Nw (weeks), Nm (months)
pub fn parse_duration(s: &str) -> Result<Duration, ConfigError> {
    let invalid = || ConfigError::InvalidDuration {
        value: s.to_string(),
    };

    let trimmed = s.trim();
    let (num_str, unit) = if let Some(n) = trimmed.strip_suffix('d') {
        (n, 'd')
    } else if let Some(n) = trimmed.strip_suffix('w') {
        (n, 'w')
    } else if let Some(n) = trimmed.strip_suffix('m') {
        (n, 'm')
    } else {
        return Err(invalid());
    };

    let num: u64 = num_str.parse().map_err(|_| invalid())?;

    let days = match unit {
        'd' => num,
        'w' => num.saturating_mul(7),
        _ => num.saturating_mul(30), // months (30 days)
    };

    Ok(Duration::from_secs(days.saturating_mul(24 * 60 * 60)))
}

/// Dependency update policy evaluator
#[derive(Parser, Debug, Clone)]
#[command(
    name = "update-policy",
    version,
    about = "Evaluates ignore conditions and dependency groups for a dependency update job"
)]
pub struct CliArgs {
    /// Job file (YAML)
    #[arg(default_value = "job.yml")]
    pub job: PathBuf,

    // Policy overrides
    /// Only security updates are being made (forces ignore-everything for
    /// conditions without explicit versions)
    #[arg(long)]
    pub security_only: bool,

    /// Enable the experimental group rules (dependency-type, highest-semver-allowed)
    #[arg(long)]
    pub experimental_rules: bool,

    /// Only propose versions released at least this long ago (e.g., 2w, 10d, 1m)
    #[arg(long, value_parser = parse_duration)]
    pub min_age: Option<Duration>,

    /// Print each dependency group as a configuration snippet and exit
    #[arg(long)]
    pub render_groups: bool,

    // Output options
    /// Output results in JSON format
    #[arg(long)]
    pub json: bool,

    /// Enable verbose output
    #[arg(long)]
    pub verbose: bool,

    /// Enable quiet mode - minimal output
    #[arg(short, long)]
    pub quiet: bool,
}
