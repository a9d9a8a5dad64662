//! update-policy - dependency update policy library
//!
//! This library decides which versions of a dependency an updater may
//! propose, and how dependencies are batched together:
//! - Ignore conditions (explicit ranges and semver update types)
//! - Dependency groups with pattern, dependency-type and ceiling rules
//! - A lenient version scheme that orders arbitrary version strings
//! - A planner that combines all of the above over a YAML job file

pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod group;
pub mod ignore;
pub mod orchestrator;
pub mod output;
pub mod update;
pub mod version;
pub mod wildcard;
