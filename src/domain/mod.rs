//! Core domain models
//!
//! This module contains the fundamental types used throughout the crate:
//! - Package manager identifiers and production-dependency checks
//! - Dependency information structures
//! - Update decision results

mod dependency;
mod package_manager;
mod update_result;

pub use dependency::Dependency;
pub use package_manager::{
    production_check_for_package_manager, AlwaysProduction, BundlerClassifier, CargoClassifier,
    ComposerClassifier, HexClassifier, JvmClassifier, NpmClassifier, PackageManager,
    PipClassifier, ProductionClassifier,
};
pub use update_result::{SkipReason, UpdateResult};
