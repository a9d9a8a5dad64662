//! Package manager identifiers and their production-dependency checks
//!
//! Every ecosystem labels its dependencies differently (Gemfile groups,
//! package.json sections, Maven scopes). A [`ProductionClassifier`] turns those
//! labels into a single "is this needed at runtime" answer.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Decides whether a dependency is a production (runtime) dependency from
/// the requirement groups its manifest declares it in
pub trait ProductionClassifier: Send + Sync {
    /// Returns true when a dependency declared in `groups` is needed at runtime
    fn is_production(&self, groups: &[String]) -> bool;
}

fn has_any(groups: &[String], wanted: &[&str]) -> bool {
    groups.iter().any(|g| wanted.contains(&g.as_str()))
}

/// Gemfile groups
pub struct BundlerClassifier;

impl ProductionClassifier for BundlerClassifier {
    fn is_production(&self, groups: &[String]) -> bool {
        groups.is_empty()
            || has_any(groups, &["runtime", "default"])
            || groups.iter().any(|g| g.contains(":default"))
    }
}

/// package.json dependency sections
pub struct NpmClassifier;

impl ProductionClassifier for NpmClassifier {
    fn is_production(&self, groups: &[String]) -> bool {
        groups.is_empty() || has_any(groups, &["dependencies", "optionalDependencies"])
    }
}

/// composer.json `require` vs `require-dev`
pub struct ComposerClassifier;

impl ProductionClassifier for ComposerClassifier {
    fn is_production(&self, groups: &[String]) -> bool {
        groups.is_empty() || has_any(groups, &["runtime"])
    }
}

/// Cargo.toml dependency tables
pub struct CargoClassifier;

impl ProductionClassifier for CargoClassifier {
    fn is_production(&self, groups: &[String]) -> bool {
        groups.is_empty() || has_any(groups, &["dependencies"])
    }
}

/// Pipfile, setup.py and pyproject sections
pub struct PipClassifier;

impl ProductionClassifier for PipClassifier {
    fn is_production(&self, groups: &[String]) -> bool {
        groups.is_empty() || has_any(groups, &["default", "install_requires", "dependencies"])
    }
}

/// Maven and Gradle scopes: only test-scoped dependencies are development
pub struct JvmClassifier;

impl ProductionClassifier for JvmClassifier {
    fn is_production(&self, groups: &[String]) -> bool {
        !(groups.len() == 1 && groups[0] == "test")
    }
}

/// Mix environments
pub struct HexClassifier;

impl ProductionClassifier for HexClassifier {
    fn is_production(&self, groups: &[String]) -> bool {
        groups.is_empty() || has_any(groups, &["prod"])
    }
}

/// Ecosystems without a development/production split
pub struct AlwaysProduction;

impl ProductionClassifier for AlwaysProduction {
    fn is_production(&self, _groups: &[String]) -> bool {
        true
    }
}

/// Supported package managers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PackageManager {
    /// Ruby (Gemfile)
    Bundler,
    /// JavaScript (package.json)
    NpmAndYarn,
    /// PHP (composer.json)
    Composer,
    /// Rust (Cargo.toml)
    Cargo,
    /// Python (requirements.txt, Pipfile, pyproject.toml)
    Pip,
    /// Java (pom.xml)
    Maven,
    /// Java/Kotlin (build.gradle)
    Gradle,
    /// Go (go.mod)
    GoModules,
    /// Elixir (mix.exs)
    Hex,
    /// .NET (*.csproj)
    Nuget,
}

impl PackageManager {
    /// Returns the identifier used in job files
    pub fn id(&self) -> &'static str {
        match self {
            PackageManager::Bundler => "bundler",
            PackageManager::NpmAndYarn => "npm_and_yarn",
            PackageManager::Composer => "composer",
            PackageManager::Cargo => "cargo",
            PackageManager::Pip => "pip",
            PackageManager::Maven => "maven",
            PackageManager::Gradle => "gradle",
            PackageManager::GoModules => "go_modules",
            PackageManager::Hex => "hex",
            PackageManager::Nuget => "nuget",
        }
    }

    /// Returns the display name for this package manager
    pub fn display_name(&self) -> &'static str {
        match self {
            PackageManager::Bundler => "Bundler",
            PackageManager::NpmAndYarn => "npm/Yarn",
            PackageManager::Composer => "Composer",
            PackageManager::Cargo => "Cargo",
            PackageManager::Pip => "pip",
            PackageManager::Maven => "Maven",
            PackageManager::Gradle => "Gradle",
            PackageManager::GoModules => "Go modules",
            PackageManager::Hex => "Hex",
            PackageManager::Nuget => "NuGet",
        }
    }

    /// Returns the production check registered for this package manager
    pub fn production_classifier(&self) -> &'static dyn ProductionClassifier {
        match self {
            PackageManager::Bundler => &BundlerClassifier,
            PackageManager::NpmAndYarn => &NpmClassifier,
            PackageManager::Composer => &ComposerClassifier,
            PackageManager::Cargo => &CargoClassifier,
            PackageManager::Pip => &PipClassifier,
            PackageManager::Maven | PackageManager::Gradle => &JvmClassifier,
            PackageManager::Hex => &HexClassifier,
            PackageManager::GoModules | PackageManager::Nuget => &AlwaysProduction,
        }
    }

    /// Returns all supported package managers
    pub fn all() -> &'static [PackageManager] {
        &[
            PackageManager::Bundler,
            PackageManager::NpmAndYarn,
            PackageManager::Composer,
            PackageManager::Cargo,
            PackageManager::Pip,
            PackageManager::Maven,
            PackageManager::Gradle,
            PackageManager::GoModules,
            PackageManager::Hex,
            PackageManager::Nuget,
        ]
    }
}

/// Looks up the production check for a package manager id
pub fn production_check_for_package_manager(
    id: &str,
) -> Result<&'static dyn ProductionClassifier, ConfigError> {
    Ok(id.parse::<PackageManager>()?.production_classifier())
}

impl FromStr for PackageManager {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PackageManager::all()
            .iter()
            .copied()
            .find(|pm| pm.id() == s)
            .ok_or_else(|| ConfigError::UnknownPackageManager {
                value: s.to_string(),
            })
    }
}

impl fmt::Display for PackageManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}
