//! update-policy - dependency update policy evaluator
//!
//! Reads a job file describing dependencies, ignore conditions and
//! dependency groups, and reports:
//! - which group each dependency lands in
//! - which version ranges are excluded for it
//! - the update each dependency would receive

use clap::Parser;
use std::io::{self, IsTerminal, Write};
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::EnvFilter;
use update_policy::cli::CliArgs;
use update_policy::config::{Experiments, JobConfig};
use update_policy::orchestrator::Planner;
use update_policy::output::{create_formatter, OutputConfig};

fn main() -> ExitCode {
    let args = CliArgs::parse();

    let default_level = if args.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(io::stderr)
        .with_target(false)
        .init();

    // Run the main logic and handle errors
    match run(args) {
        Ok(exit_code) => exit_code,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

/// Main application logic
fn run(args: CliArgs) -> anyhow::Result<ExitCode> {
    debug!(job = %args.job.display(), "loading job");
    let mut job = JobConfig::load(&args.job)?;

    if args.experimental_rules {
        job.experiments
            .register(Experiments::GROUPED_UPDATES_EXPERIMENTAL_RULES, true);
    }

    let mut planner = Planner::new(job).with_security_updates_only(args.security_only);
    if let Some(min_age) = args.min_age {
        planner = planner.with_min_age(min_age);
    }

    let mut stdout = io::stdout().lock();

    if args.render_groups {
        let engine = planner.group_engine()?;
        write!(stdout, "{}", engine.to_config_yaml()?)?;
        stdout.flush()?;
        return Ok(ExitCode::SUCCESS);
    }

    let result = planner.run()?;

    let mut output_config = OutputConfig::from_cli(args.json, args.verbose, args.quiet);
    output_config.color = io::stdout().is_terminal();
    let formatter = create_formatter(output_config);

    formatter.format(&result, &mut stdout)?;
    stdout.flush()?;

    if result.errors.is_empty() {
        Ok(ExitCode::SUCCESS)
    } else {
        // Partial success - some dependencies could not be evaluated
        Ok(ExitCode::from(2))
    }
}
