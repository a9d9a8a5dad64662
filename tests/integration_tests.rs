//! Integration tests for update-policy
//!
//! These tests verify:
//! - Ignore ranges derived from update types and explicit versions
//! - Group assignment, ceilings and configuration rendering
//! - Full job planning from YAML

use std::fs;
use tempfile::TempDir;
use update_policy::config::JobConfig;
use update_policy::domain::{Dependency, PackageManager, SkipReason};
use update_policy::error::{ConfigError, PolicyError};
use update_policy::group::{DependencyGroup, DependencyGroupEngine, GroupsDocument, RawGroupRules};
use update_policy::ignore::{IgnoreCondition, UpdateType};
use update_policy::orchestrator::Planner;
use update_policy::version::{Requirement, Version};

fn dep(name: &str, version: &str) -> Dependency {
    Dependency::new(name, Some(version), PackageManager::Bundler)
}

fn business() -> IgnoreCondition {
    IgnoreCondition::new("business").unwrap()
}

fn ranges_for(version: &str, update_types: Vec<UpdateType>) -> Vec<String> {
    business()
        .with_update_types(update_types)
        .ignored_versions(&dep("business", version), false)
}

fn in_range(range: &str, version: &str) -> bool {
    Requirement::parse(range)
        .unwrap()
        .is_satisfied_by(&Version::parse(version))
}

mod ignore_ranges {
    use super::*;

    #[test]
    fn test_update_type_ranges_for_three_part_version() {
        assert_eq!(
            ranges_for("1.2.3", vec![UpdateType::Patch]),
            vec![">= 1.2.3.1.a, < 1.3"]
        );
        assert_eq!(
            ranges_for("1.2.3", vec![UpdateType::Minor]),
            vec![">= 1.3.a, < 2"]
        );
        assert_eq!(
            ranges_for("1.2.3", vec![UpdateType::Major]),
            vec![">= 2.a, < 3"]
        );
    }

    #[test]
    fn test_patch_on_bare_major_is_not_applicable() {
        assert!(ranges_for("1", vec![UpdateType::Patch]).is_empty());
    }

    #[test]
    fn test_patch_on_opaque_version() {
        assert_eq!(
            ranges_for("Finchley.SR3", vec![UpdateType::Patch]),
            vec![">= Finchley.SR3.1.a, < Finchley.SR3.999999"]
        );
    }

    #[test]
    fn test_current_version_is_never_inside_its_own_ranges() {
        let cases = [
            ("1.2.3", UpdateType::Patch, "1.2.4"),
            ("1.2.3", UpdateType::Minor, "1.3.0"),
            ("1.2.3", UpdateType::Major, "2.0.0"),
            ("0.9", UpdateType::Minor, "0.10"),
            ("4.17.21", UpdateType::Major, "5.0.0"),
        ];

        for (current, update_type, next) in cases {
            let ranges = ranges_for(current, vec![update_type]);
            assert_eq!(ranges.len(), 1, "{} {:?}", current, update_type);
            assert!(
                !in_range(&ranges[0], current),
                "{} should not be inside {}",
                current,
                ranges[0]
            );
            assert!(
                in_range(&ranges[0], next),
                "{} should be inside {}",
                next,
                ranges[0]
            );
        }
    }

    #[test]
    fn test_pre_releases_below_the_upper_bound_are_inside_range() {
        let ranges = ranges_for("1.2.3", vec![UpdateType::Minor]);
        assert!(in_range(&ranges[0], "1.3.0.beta1"));
        assert!(in_range(&ranges[0], "2.0.0.rc1"));
        assert!(!in_range(&ranges[0], "2.0.0"));
    }

    #[test]
    fn test_no_criteria_ignores_everything() {
        let condition = business();
        assert_eq!(
            condition.ignored_versions(&dep("business", "1.2.3"), false),
            vec![">= 0"]
        );
    }

    #[test]
    fn test_explicit_versions_are_verbatim_in_both_modes() {
        let condition = business().with_versions([">= 2.0.0"]);
        let dependency = dep("business", "1.2.3");

        assert_eq!(condition.ignored_versions(&dependency, false), vec![">= 2.0.0"]);
        assert_eq!(condition.ignored_versions(&dependency, true), vec![">= 2.0.0"]);
    }

    #[test]
    fn test_security_mode_skips_non_security_conditions() {
        let dependency = dep("business", "1.2.3");

        let plain = business().with_update_types(vec![UpdateType::Major]);
        assert!(plain.ignored_versions(&dependency, true).is_empty());

        let security = plain.clone().security_only(true);
        assert_eq!(
            security.ignored_versions(&dependency, true),
            vec![">= 2.a, < 3"]
        );
    }

    #[test]
    fn test_unknown_update_types_are_dropped() {
        let condition = business()
            .with_raw_update_types(&["version-update:semver-minor", "version-update:semver-huge"]);
        assert_eq!(
            condition.ignored_versions(&dep("business", "1.2.3"), false),
            vec![">= 1.3.a, < 2"]
        );
    }
}

mod groups {
    use super::*;

    fn rules(patterns: &[&str], exclude: &[&str]) -> RawGroupRules {
        RawGroupRules {
            patterns: Some(patterns.iter().map(|s| s.to_string()).collect()),
            exclude_patterns: if exclude.is_empty() {
                None
            } else {
                Some(exclude.iter().map(|s| s.to_string()).collect())
            },
            ..Default::default()
        }
    }

    #[test]
    fn test_partition_with_exclusion() {
        let group = DependencyGroup::new("test-group", rules(&["test-*"], &["test-b"]), false)
            .unwrap();
        let mut engine = DependencyGroupEngine::new(vec![group]);

        let dependencies = vec![
            dep("test-a", "1.0.0"),
            dep("test-b", "1.0.0"),
            dep("another-dep", "1.0.0"),
        ];
        engine.assign_to_groups(&dependencies).unwrap();

        let members: Vec<&str> = engine
            .find_group("test-group")
            .unwrap()
            .dependencies()
            .iter()
            .map(|d| d.name.as_str())
            .collect();
        assert_eq!(members, vec!["test-a"]);

        let ungrouped: Vec<&str> = engine
            .ungrouped_dependencies()
            .iter()
            .map(|d| d.name.as_str())
            .collect();
        assert_eq!(ungrouped, vec!["test-b", "another-dep"]);
    }

    #[test]
    fn test_second_assignment_fails() {
        let mut engine = DependencyGroupEngine::new(Vec::new());
        engine.assign_to_groups(&[dep("a", "1")]).unwrap();

        let err = engine.assign_to_groups(&[dep("a", "1")]).unwrap_err();
        assert_eq!(err, PolicyError::GroupsAlreadyConfigured);
        assert_eq!(err.to_string(), "dependency groups have already been configured");
    }

    #[test]
    fn test_patch_ceiling_ranges() {
        let raw = RawGroupRules {
            highest_semver_allowed: Some("patch".to_string()),
            ..rules(&["business"], &[])
        };
        let group = DependencyGroup::new("capped", raw, true).unwrap();

        assert_eq!(
            group.ignored_versions_for(&dep("business", "1.8.0")),
            vec![">= 2.a", ">= 1.9.a, < 2"]
        );
        assert!(!group.targets_highest_versions_possible());
    }

    #[test]
    fn test_ceiling_without_experiment_is_inert() {
        let raw = RawGroupRules {
            highest_semver_allowed: Some("patch".to_string()),
            ..rules(&["business"], &[])
        };
        let group = DependencyGroup::new("capped", raw, false).unwrap();

        assert!(group.ignored_versions_for(&dep("business", "1.8.0")).is_empty());
        assert!(group.targets_highest_versions_possible());
    }

    #[test]
    fn test_invalid_ceiling_names_group() {
        let raw = RawGroupRules {
            highest_semver_allowed: Some("revision".to_string()),
            ..rules(&["*"], &[])
        };
        let err = DependencyGroup::new("my-group", raw, true).unwrap_err();

        assert!(matches!(err, PolicyError::InvalidGroupConfiguration { .. }));
        let message = err.to_string();
        assert!(message.contains("my-group"));
        assert!(message.contains("revision"));
    }

    #[test]
    fn test_rendering_is_a_fixed_point() {
        let raw = RawGroupRules {
            dependency_type: Some("development".to_string()),
            highest_semver_allowed: Some("minor".to_string()),
            ..rules(&["@types/*", "eslint*"], &["eslint-plugin-legacy"])
        };
        let group = DependencyGroup::new("lint", raw, true).unwrap();
        let rendered = group.to_config_yaml().unwrap();

        let document: GroupsDocument = serde_yaml::from_str(&rendered).unwrap();
        let (name, rules) = document.groups.into_iter().next().unwrap();
        let reparsed = DependencyGroup::new(name, rules, true).unwrap();

        assert_eq!(reparsed.to_config_yaml().unwrap(), rendered);
        assert_eq!(reparsed.rules(), group.rules());
    }
}

mod planning {
    use super::*;

    const JOB: &str = r#"
experiments:
  grouped_updates_experimental_rules: true
dependency-groups:
  - name: dev-tooling
    rules:
      patterns: ["rspec*", "rubocop*"]
      exclude-patterns: ["rubocop-rails"]
      dependency-type: development
      highest-semver-allowed: minor
ignore-conditions:
  - dependency-name: "rails"
    update-types: ["version-update:semver-major"]
dependencies:
  - name: rails
    version: "7.0.8"
    package-manager: bundler
    groups: [default]
    available-versions: ["7.0.8.1", "7.1.0", "8.0.0"]
  - name: rspec
    version: "3.12.0"
    package-manager: bundler
    groups: [test]
    available-versions: ["3.12.1", "3.13.0", "4.0.0"]
  - name: rubocop-rails
    version: "2.20.0"
    package-manager: bundler
    groups: [development]
    available-versions: ["2.21.0"]
"#;

    fn job() -> JobConfig {
        JobConfig::from_yaml_str(JOB).unwrap()
    }

    #[test]
    fn test_full_job() {
        let result = Planner::new(job()).run().unwrap();

        assert!(result.errors.is_empty());
        assert_eq!(result.groups.len(), 1);
        assert_eq!(result.groups[0].name, "dev-tooling");
        assert!(!result.groups[0].targets_highest_versions);
        assert_eq!(result.groups[0].members, vec!["rspec"]);
        assert_eq!(result.ungrouped, vec!["rails", "rubocop-rails"]);

        let rails = result.plan_for("rails").unwrap();
        assert_eq!(rails.ignored_versions, vec![">= 8.a, < 9"]);
        assert_eq!(rails.result.new_version(), Some("7.1.0"));

        let rspec = result.plan_for("rspec").unwrap();
        assert_eq!(rspec.groups, vec!["dev-tooling"]);
        assert_eq!(rspec.ignored_versions, vec![">= 4.a"]);
        assert_eq!(rspec.result.new_version(), Some("3.13.0"));

        let rubocop = result.plan_for("rubocop-rails").unwrap();
        assert!(rubocop.groups.is_empty());
        assert_eq!(rubocop.result.new_version(), Some("2.21.0"));

        assert_eq!(result.total_updates(), 3);
    }

    #[test]
    fn test_security_only_run_keeps_group_ceilings() {
        let result = Planner::new(job())
            .with_security_updates_only(true)
            .run()
            .unwrap();

        assert!(result.security_updates_only);
        let rails = result.plan_for("rails").unwrap();
        assert!(rails.ignored_versions.is_empty());
        assert_eq!(rails.result.new_version(), Some("8.0.0"));

        let rspec = result.plan_for("rspec").unwrap();
        assert_eq!(rspec.ignored_versions, vec![">= 4.a"]);
    }

    #[test]
    fn test_conditions_and_ceilings_are_merged() {
        let mut job = job();
        job.ignore_conditions.push(
            serde_yaml::from_str(
                "dependency-name: \"rspec*\"\nupdate-types: [\"version-update:semver-minor\"]\n",
            )
            .unwrap(),
        );

        let result = Planner::new(job).run().unwrap();
        let rspec = result.plan_for("rspec").unwrap();
        assert_eq!(rspec.ignored_versions, vec![">= 3.13.a, < 4", ">= 4.a"]);
        assert_eq!(rspec.result.new_version(), Some("3.12.1"));
    }

    #[test]
    fn test_malformed_range_fails_only_its_dependency() {
        let yaml = r#"
ignore-conditions:
  - dependency-name: rails
    versions: ["=> 7"]
dependencies:
  - name: rails
    version: "7.0.8"
    package-manager: bundler
    available-versions: ["7.1.0"]
  - name: puma
    version: "6.0.0"
    package-manager: bundler
    available-versions: ["6.4.0"]
"#;
        let result = Planner::new(JobConfig::from_yaml_str(yaml).unwrap())
            .run()
            .unwrap();

        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].dependency, "rails");
        assert!(matches!(
            result.plan_for("rails").unwrap().result.skip_reason(),
            Some(SkipReason::InvalidIgnoreRange(_))
        ));
        assert_eq!(
            result.plan_for("puma").unwrap().result.new_version(),
            Some("6.4.0")
        );
    }

    #[test]
    fn test_unusual_current_version_is_planned_without_errors() {
        let yaml = r#"
ignore-conditions:
  - dependency-name: lib
    update-types: ["version-update:semver-patch"]
  - dependency-name: other
    update-types: [patch]
dependencies:
  - name: lib
    version: "1.2 beta"
    package-manager: bundler
    available-versions: ["1.2.beta.2", "1.3.0"]
  - name: other
    version: "2,0"
    package-manager: bundler
    available-versions: ["2.0.1"]
"#;
        let result = Planner::new(JobConfig::from_yaml_str(yaml).unwrap())
            .run()
            .unwrap();

        assert!(result.errors.is_empty(), "{:?}", result.errors);
        let lib = result.plan_for("lib").unwrap();
        assert_eq!(lib.ignored_versions, vec![">= 1.2.beta.1.a, < 1.3"]);
        assert_eq!(lib.result.new_version(), Some("1.3.0"));

        let other = result.plan_for("other").unwrap();
        assert_eq!(other.ignored_versions, vec![">= 2.0.1.a, < 2.1"]);
        assert!(other.result.new_version().is_none());
    }

    #[test]
    fn test_invalid_name_pattern_is_fatal() {
        let yaml = r#"
ignore-conditions:
  - dependency-name: "rails["
dependencies:
  - name: rails
    version: "7.0.8"
    package-manager: bundler
"#;
        let err = Planner::new(JobConfig::from_yaml_str(yaml).unwrap())
            .run()
            .unwrap_err();
        assert!(matches!(err, PolicyError::InvalidPattern { .. }));
        assert!(err.to_string().contains("rails["));
    }

    #[test]
    fn test_invalid_ceiling_is_fatal() {
        let yaml = r#"
dependency-groups:
  - name: broken
    rules:
      patterns: ["*"]
      highest-semver-allowed: revision
"#;
        let err = Planner::new(JobConfig::from_yaml_str(yaml).unwrap())
            .run()
            .unwrap_err();
        assert!(err.to_string().contains("broken"));
    }
}

mod job_files {
    use super::*;

    fn create_test_dir() -> TempDir {
        tempfile::tempdir().expect("Failed to create temp directory")
    }

    #[test]
    fn test_load_job_file() {
        let temp_dir = create_test_dir();
        let path = temp_dir.path().join("job.yml");
        fs::write(
            &path,
            "dependencies:\n  - name: lodash\n    version: \"4.17.21\"\n    package-manager: npm_and_yarn\n",
        )
        .unwrap();

        let job = JobConfig::load(&path).unwrap();
        assert_eq!(job.dependencies.len(), 1);
        assert_eq!(job.dependencies()[0].version(), Some("4.17.21"));
    }

    #[test]
    fn test_missing_job_file() {
        let temp_dir = create_test_dir();
        let err = JobConfig::load(&temp_dir.path().join("missing.yml")).unwrap_err();
        assert!(matches!(err, ConfigError::ReadError { .. }));
    }

    #[test]
    fn test_unknown_package_manager_is_a_parse_error() {
        let temp_dir = create_test_dir();
        let path = temp_dir.path().join("job.yml");
        fs::write(
            &path,
            "dependencies:\n  - name: left-pad\n    package-manager: bower\n",
        )
        .unwrap();

        let err = JobConfig::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::YamlParseError { .. }));
    }
}
