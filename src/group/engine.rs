//! Group assignment
//!
//! The engine owns every configured group and sorts a job's dependencies
//! into them exactly once. Dependencies that match no group are kept aside
//! as ungrouped so they can be updated individually.

use super::{DependencyGroup, GroupsDocument};
use crate::config::{Experiments, JobConfig};
use crate::domain::Dependency;
use crate::error::PolicyError;
use tracing::{debug, info};

/// Holds the configured groups and the result of assigning dependencies
#[derive(Debug, Clone, Default)]
pub struct DependencyGroupEngine {
    groups: Vec<DependencyGroup>,
    ungrouped_dependencies: Vec<Dependency>,
    groups_calculated: bool,
}

impl DependencyGroupEngine {
    /// Creates an engine over the given groups
    pub fn new(groups: Vec<DependencyGroup>) -> Self {
        Self {
            groups,
            ungrouped_dependencies: Vec::new(),
            groups_calculated: false,
        }
    }

    /// Builds every group declared in the job.
    ///
    /// Fails on the first group with an invalid rule.
    pub fn from_job_config(job: &JobConfig) -> Result<Self, PolicyError> {
        let experimental_rules = job
            .experiments
            .is_enabled(Experiments::GROUPED_UPDATES_EXPERIMENTAL_RULES);

        let groups = job
            .dependency_groups
            .iter()
            .map(|def| DependencyGroup::new(&def.name, def.rules.clone(), experimental_rules))
            .collect::<Result<Vec<_>, _>>()?;

        debug!(
            groups = groups.len(),
            experimental_rules, "dependency groups registered"
        );
        Ok(Self::new(groups))
    }

    /// Returns the group with exactly this name
    pub fn find_group(&self, name: &str) -> Option<&DependencyGroup> {
        self.groups.iter().find(|g| g.name() == name)
    }

    /// All configured groups, in declaration order
    pub fn groups(&self) -> &[DependencyGroup] {
        &self.groups
    }

    /// Renders every group as one configuration document, in declaration
    /// order. The output loads back as a [`GroupsDocument`].
    pub fn to_config_yaml(&self) -> Result<String, PolicyError> {
        GroupsDocument::from_groups(&self.groups)
            .to_yaml()
            .map_err(|e| PolicyError::RenderError {
                group: self
                    .groups
                    .iter()
                    .map(DependencyGroup::name)
                    .collect::<Vec<_>>()
                    .join(", "),
                message: e.to_string(),
            })
    }

    /// Dependencies that matched no group
    pub fn ungrouped_dependencies(&self) -> &[Dependency] {
        &self.ungrouped_dependencies
    }

    /// Returns true once `assign_to_groups` has run
    pub fn is_configured(&self) -> bool {
        self.groups_calculated
    }

    /// Groups that `dependency` has been assigned to
    pub fn groups_for(&self, dependency: &Dependency) -> Vec<&DependencyGroup> {
        self.groups
            .iter()
            .filter(|g| g.has_member(&dependency.name))
            .collect()
    }

    /// Places each dependency into every group that contains it, or into
    /// the ungrouped list when none does.
    ///
    /// May only be called once per engine.
    pub fn assign_to_groups(&mut self, dependencies: &[Dependency]) -> Result<(), PolicyError> {
        if self.groups_calculated {
            return Err(PolicyError::GroupsAlreadyConfigured);
        }

        for dependency in dependencies {
            let mut matched = false;
            for group in self.groups.iter_mut() {
                if !group.contains(dependency) {
                    continue;
                }
                matched = true;
                if !group.has_member(&dependency.name) {
                    group.add_dependency(dependency.clone());
                }
            }

            if !matched {
                self.ungrouped_dependencies.push(dependency.clone());
            }
        }

        self.groups_calculated = true;
        info!(
            groups = self.groups.len(),
            ungrouped = self.ungrouped_dependencies.len(),
            "assigned dependencies to groups"
        );
        Ok(())
    }
}
