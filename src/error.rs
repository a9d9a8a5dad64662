//! Application error types using thiserror
//!
//! Error hierarchy:
//! - PolicyError: Invalid group rules, double assignment, malformed ranges
//! - ConfigError: Issues with reading or parsing the job file

use std::path::PathBuf;
use thiserror::Error;

/// Application-level error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Policy engine errors
    #[error(transparent)]
    Policy(#[from] PolicyError),

    /// Job configuration errors
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Errors raised by the ignore-condition and grouping engines
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PolicyError {
    /// A group rule holds a value outside its allowed set
    #[error("invalid configuration for dependency group '{group}': {key} must be one of major, minor, patch (got '{value}')")]
    InvalidGroupConfiguration {
        group: String,
        key: String,
        value: String,
    },

    /// `assign_to_groups` was called on an engine that is already configured
    #[error("dependency groups have already been configured")]
    GroupsAlreadyConfigured,

    /// A version range string could not be parsed
    #[error("invalid version requirement '{requirement}': {message}")]
    InvalidRequirement {
        requirement: String,
        message: String,
    },

    /// A dependency-name glob could not be compiled
    #[error("invalid dependency name pattern '{pattern}': {message}")]
    InvalidPattern { pattern: String, message: String },

    /// A group could not be rendered back to configuration form
    #[error("failed to render dependency group '{group}': {message}")]
    RenderError { group: String, message: String },
}

/// Errors related to loading the job configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the job file
    #[error("failed to read job file {path}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// YAML parsing error
    #[error("failed to parse YAML in {path}: {message}")]
    YamlParseError { path: PathBuf, message: String },

    /// Package manager id not known to any production classifier
    #[error("unknown package manager '{value}'")]
    UnknownPackageManager { value: String },

    /// Invalid duration format
    #[error("invalid duration format '{value}': expected format like '2w', '10d', '1m'")]
    InvalidDuration { value: String },
}

impl PolicyError {
    /// Creates a new InvalidGroupConfiguration error
    pub fn invalid_group_configuration(
        group: impl Into<String>,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        PolicyError::InvalidGroupConfiguration {
            group: group.into(),
            key: key.into(),
            value: value.into(),
        }
    }

    /// Creates a new InvalidPattern error
    pub fn invalid_pattern(pattern: impl Into<String>, message: impl Into<String>) -> Self {
        PolicyError::InvalidPattern {
            pattern: pattern.into(),
            message: message.into(),
        }
    }

    /// Creates a new InvalidRequirement error
    pub fn invalid_requirement(requirement: impl Into<String>, message: impl Into<String>) -> Self {
        PolicyError::InvalidRequirement {
            requirement: requirement.into(),
            message: message.into(),
        }
    }
}

impl ConfigError {
    /// Creates a new ReadError
    pub fn read_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ConfigError::ReadError {
            path: path.into(),
            source,
        }
    }

    /// Creates a new YamlParseError
    pub fn yaml_parse_error(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        ConfigError::YamlParseError {
            path: path.into(),
            message: message.into(),
        }
    }
}
