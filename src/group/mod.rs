//! Dependency groups
//!
//! A group collects dependencies that should be updated together in one pull
//! request. Membership is decided by name patterns and the dependency type;
//! an optional semver ceiling caps how large the group's updates may be.

mod engine;
mod rules;

pub use engine::DependencyGroupEngine;
pub use rules::{DependencyType, GroupRules, RawGroupRules, SemverCeiling, HIGHEST_SEMVER_ALLOWED};

use crate::domain::Dependency;
use crate::error::PolicyError;
use crate::ignore::IgnoreCondition;
use crate::wildcard::WildcardSet;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Top-level shape of the rendered group configuration. Groups keep their
/// declaration order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GroupsDocument {
    pub groups: IndexMap<String, RawGroupRules>,
}

impl GroupsDocument {
    /// Collects the rules of `groups` in iteration order
    pub fn from_groups<'a, I>(groups: I) -> Self
    where
        I: IntoIterator<Item = &'a DependencyGroup>,
    {
        Self {
            groups: groups
                .into_iter()
                .map(|group| (group.name.clone(), group.rules.to_raw()))
                .collect(),
        }
    }

    /// Renders the document without the leading `---` marker
    pub fn to_yaml(&self) -> Result<String, serde_yaml::Error> {
        let rendered = serde_yaml::to_string(self)?;
        Ok(rendered.trim_start_matches("---\n").to_string())
    }

    /// Builds a group for every entry, in document order
    pub fn into_groups(self, experimental_rules: bool) -> Result<Vec<DependencyGroup>, PolicyError> {
        self.groups
            .into_iter()
            .map(|(name, rules)| DependencyGroup::new(name, rules, experimental_rules))
            .collect()
    }
}

/// A named, rule-matched set of dependencies
#[derive(Debug, Clone)]
pub struct DependencyGroup {
    name: String,
    rules: GroupRules,
    patterns: WildcardSet,
    exclude_patterns: WildcardSet,
    /// Ignore rule derived from `highest-semver-allowed`
    ceiling: Option<IgnoreCondition>,
    dependencies: Vec<Dependency>,
    experimental_rules: bool,
}

impl DependencyGroup {
    /// Creates a group from configuration rules.
    ///
    /// Fails with `InvalidGroupConfiguration` when `highest-semver-allowed`
    /// is not one of `major`, `minor`, `patch`, and with `InvalidPattern`
    /// when a pattern is not a valid glob. `experimental_rules` decides
    /// whether the ceiling is honoured at all.
    pub fn new(
        name: impl Into<String>,
        rules: RawGroupRules,
        experimental_rules: bool,
    ) -> Result<Self, PolicyError> {
        let name = name.into();
        let rules = GroupRules::from_raw(&name, rules)?;
        Self::from_rules(name, rules, experimental_rules)
    }

    /// Creates a group from already validated rules
    pub fn from_rules(
        name: impl Into<String>,
        rules: GroupRules,
        experimental_rules: bool,
    ) -> Result<Self, PolicyError> {
        let compile = |patterns: &Option<Vec<String>>| match patterns {
            Some(patterns) => WildcardSet::new(patterns),
            None => Ok(WildcardSet::empty()),
        };

        let ceiling = rules
            .highest_semver_allowed
            .map(|ceiling| ceiling.ignored_update_types())
            .filter(|update_types| !update_types.is_empty())
            .map(|update_types| IgnoreCondition::for_update_types("*", update_types))
            .transpose()?;

        Ok(Self {
            name: name.into(),
            patterns: compile(&rules.patterns)?,
            exclude_patterns: compile(&rules.exclude_patterns)?,
            ceiling,
            rules,
            dependencies: Vec::new(),
            experimental_rules,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn rules(&self) -> &GroupRules {
        &self.rules
    }

    /// Dependencies assigned to this group so far
    pub fn dependencies(&self) -> &[Dependency] {
        &self.dependencies
    }

    /// Adds a dependency to the group
    pub fn add_dependency(&mut self, dependency: Dependency) {
        self.dependencies.push(dependency);
    }

    /// Returns true if a dependency with this name is already a member
    pub fn has_member(&self, name: &str) -> bool {
        self.dependencies.iter().any(|d| d.name == name)
    }

    fn is_excluded(&self, name: &str) -> bool {
        self.exclude_patterns.is_match(name)
    }

    /// Returns true if `dependency` belongs in this group.
    ///
    /// Exclusions always win. Existing members match. Otherwise `patterns`
    /// and `dependency-type` must both hold when both are set; a group with
    /// neither captures nothing.
    pub fn contains(&self, dependency: &Dependency) -> bool {
        if self.is_excluded(&dependency.name) {
            return false;
        }
        if self.has_member(&dependency.name) {
            return true;
        }

        let by_pattern = self
            .rules
            .patterns
            .as_ref()
            .map(|_| self.patterns.is_match(&dependency.name));
        let by_type = self
            .rules
            .dependency_type
            .as_ref()
            .map(|t| t.matches(dependency));

        match (by_pattern, by_type) {
            (None, None) => false,
            (by_pattern, by_type) => by_pattern.unwrap_or(true) && by_type.unwrap_or(true),
        }
    }

    /// Version ranges the group's semver ceiling rules out for `dependency`.
    ///
    /// Empty unless experimental rules are enabled and a ceiling is set.
    /// A `patch` ceiling yields the major range first, then the minor range.
    pub fn ignored_versions_for(&self, dependency: &Dependency) -> Vec<String> {
        match &self.ceiling {
            Some(ceiling) if self.experimental_rules => ceiling.ignored_versions(dependency, false),
            _ => Vec::new(),
        }
    }

    /// Returns false only when experimental rules cap the group below major
    pub fn targets_highest_versions_possible(&self) -> bool {
        if !self.experimental_rules {
            return true;
        }
        matches!(
            self.rules.highest_semver_allowed,
            None | Some(SemverCeiling::Major)
        )
    }

    /// Renders the group in configuration-file form:
    ///
    /// ```yaml
    /// groups:
    ///   test_group:
    ///     patterns:
    ///     - test-*
    ///     exclude-patterns:
    ///     - test-docs
    /// ```
    pub fn to_config_yaml(&self) -> Result<String, PolicyError> {
        GroupsDocument::from_groups([self])
            .to_yaml()
            .map_err(|e| PolicyError::RenderError {
                group: self.name.clone(),
                message: e.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::PackageManager;

    fn rules(patterns: &[&str], exclude: &[&str]) -> RawGroupRules {
        let list = |items: &[&str]| -> Option<Vec<String>> {
            if items.is_empty() {
                None
            } else {
                Some(items.iter().map(|s| s.to_string()).collect())
            }
        };
        RawGroupRules {
            patterns: list(patterns),
            exclude_patterns: list(exclude),
            ..Default::default()
        }
    }

    fn gem(name: &str, groups: &[&str]) -> Dependency {
        Dependency::new(name, Some("1.8.0"), PackageManager::Bundler)
            .with_groups(groups.iter().copied())
    }

    fn ceiling_group(ceiling: &str, experimental: bool) -> DependencyGroup {
        let raw = RawGroupRules {
            patterns: Some(vec!["*".to_string()]),
            highest_semver_allowed: Some(ceiling.to_string()),
            ..Default::default()
        };
        DependencyGroup::new("test_group", raw, experimental).unwrap()
    }

    #[test]
    fn test_new_group_is_empty() {
        let group = DependencyGroup::new("test_group", rules(&["test-*"], &[]), false).unwrap();
        assert_eq!(group.name(), "test_group");
        assert!(group.dependencies().is_empty());
        assert_eq!(group.rules().patterns, Some(vec!["test-*".to_string()]));
    }

    #[test]
    fn test_invalid_ceiling_names_group() {
        let raw = RawGroupRules {
            highest_semver_allowed: Some("revision".to_string()),
            ..Default::default()
        };
        let err = DependencyGroup::new("test_group", raw, true).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("test_group"));
        assert!(msg.contains("revision"));
    }

    #[test]
    fn test_invalid_pattern_fails_construction() {
        let err = DependencyGroup::new("test_group", rules(&["test-*"], &["test-[b"]), false)
            .unwrap_err();
        assert!(matches!(err, PolicyError::InvalidPattern { ref pattern, .. } if pattern == "test-[b"));
    }

    #[test]
    fn test_contains_by_pattern() {
        let group = DependencyGroup::new("test_group", rules(&["test-*"], &[]), false).unwrap();
        assert!(group.contains(&gem("test-a", &[])));
        assert!(!group.contains(&gem("another-test", &[])));
    }

    #[test]
    fn test_exclusion_wins() {
        let group =
            DependencyGroup::new("test_group", rules(&["test-*"], &["test-b"]), false).unwrap();
        assert!(group.contains(&gem("test-a", &[])));
        assert!(!group.contains(&gem("test-b", &[])));
    }

    #[test]
    fn test_exclusion_wins_over_existing_membership() {
        let mut group =
            DependencyGroup::new("test_group", rules(&["test-*"], &["test-b"]), false).unwrap();
        group.add_dependency(gem("test-b", &[]));
        assert!(!group.contains(&gem("test-b", &[])));
    }

    #[test]
    fn test_existing_member_matches_without_pattern() {
        let mut group = DependencyGroup::new("test_group", rules(&["other-*"], &[]), false).unwrap();
        group.add_dependency(gem("business", &[]));
        assert!(group.contains(&gem("business", &[])));
        assert!(!group.contains(&gem("finance", &[])));
    }

    #[test]
    fn test_empty_criteria_captures_nothing() {
        let group = DependencyGroup::new("test_group", RawGroupRules::default(), false).unwrap();
        assert!(!group.contains(&gem("anything", &[])));

        let only_exclusions =
            DependencyGroup::new("test_group", rules(&[], &["foo"]), false).unwrap();
        assert!(!only_exclusions.contains(&gem("bar", &[])));
    }

    #[test]
    fn test_contains_by_dependency_type() {
        let raw = RawGroupRules {
            dependency_type: Some("development".to_string()),
            exclude_patterns: Some(vec!["rubocop".to_string()]),
            ..Default::default()
        };
        let group = DependencyGroup::new("dev", raw, false).unwrap();
        assert!(group.contains(&gem("rspec", &["test"])));
        assert!(!group.contains(&gem("rails", &["default"])));
        assert!(!group.contains(&gem("rubocop", &["development"])));
    }

    #[test]
    fn test_patterns_and_dependency_type_both_required() {
        let raw = RawGroupRules {
            patterns: Some(vec!["rspec*".to_string()]),
            dependency_type: Some("production".to_string()),
            ..Default::default()
        };
        let group = DependencyGroup::new("prod-rspec", raw, false).unwrap();
        assert!(group.contains(&gem("rspec-support", &["default"])));
        assert!(!group.contains(&gem("rspec-core", &["test"])));
        assert!(!group.contains(&gem("rails", &["default"])));
    }

    #[test]
    fn test_ceiling_patch_ignores_major_then_minor() {
        let group = ceiling_group("patch", true);
        assert_eq!(
            group.ignored_versions_for(&gem("business", &[])),
            vec![">= 2.a", ">= 1.9.a, < 2"]
        );
    }

    #[test]
    fn test_ceiling_minor_ignores_major() {
        let group = ceiling_group("minor", true);
        assert_eq!(
            group.ignored_versions_for(&gem("business", &[])),
            vec![">= 2.a"]
        );
    }

    #[test]
    fn test_ceiling_major_ignores_nothing() {
        let group = ceiling_group("major", true);
        assert!(group.ignored_versions_for(&gem("business", &[])).is_empty());
    }

    #[test]
    fn test_ceiling_ignored_without_experimental_rules() {
        let group = ceiling_group("patch", false);
        assert!(group.ignored_versions_for(&gem("business", &[])).is_empty());
    }

    #[test]
    fn test_no_ceiling_ignores_nothing() {
        let group = DependencyGroup::new("test_group", rules(&["*"], &[]), true).unwrap();
        assert!(group.ignored_versions_for(&gem("business", &[])).is_empty());
    }

    #[test]
    fn test_ceiling_on_dependency_without_version() {
        let group = ceiling_group("patch", true);
        let dep = Dependency::new("business", None, PackageManager::Bundler);
        assert!(group.ignored_versions_for(&dep).is_empty());
    }

    #[test]
    fn test_targets_highest_versions_possible() {
        assert!(ceiling_group("patch", false).targets_highest_versions_possible());
        assert!(ceiling_group("major", true).targets_highest_versions_possible());
        assert!(!ceiling_group("minor", true).targets_highest_versions_possible());
        assert!(!ceiling_group("patch", true).targets_highest_versions_possible());

        let uncapped = DependencyGroup::new("test_group", rules(&["*"], &[]), true).unwrap();
        assert!(uncapped.targets_highest_versions_possible());
    }

    #[test]
    fn test_to_config_yaml() {
        let group =
            DependencyGroup::new("test_group", rules(&["test-*"], &["test-docs"]), false).unwrap();
        assert_eq!(
            group.to_config_yaml().unwrap(),
            "groups:\n  test_group:\n    patterns:\n    - test-*\n    exclude-patterns:\n    - test-docs\n"
        );
    }

    #[test]
    fn test_to_config_yaml_round_trip() {
        let raw = RawGroupRules {
            patterns: Some(vec!["@babel/*".to_string(), "eslint*".to_string()]),
            exclude_patterns: Some(vec!["eslint-config-*".to_string()]),
            dependency_type: Some("development".to_string()),
            highest_semver_allowed: Some("minor".to_string()),
        };
        let group = DependencyGroup::new("js tooling", raw, true).unwrap();
        let first = group.to_config_yaml().unwrap();

        let document: GroupsDocument = serde_yaml::from_str(&first).unwrap();
        let (name, parsed) = document.groups.into_iter().next().unwrap();
        let reparsed = DependencyGroup::new(name, parsed, true).unwrap();

        assert_eq!(reparsed.to_config_yaml().unwrap(), first);
        assert_eq!(reparsed.rules(), group.rules());
    }
}
