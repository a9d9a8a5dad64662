//! Version requirements (ranges)
//!
//! Grammar: comma-separated comparators, each an optional operator followed
//! by a version, e.g. `>= 1.2.3.1.a, < 1.3`. Operators: `=`, `!=`, `>`, `<`,
//! `>=`, `<=`, `~>`. A bare version means `=`.

use super::Version;
use crate::error::PolicyError;
use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

static COMPARATOR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(~>|>=|<=|!=|=|>|<)?\s*(\S+)\s*$").unwrap());

/// Comparison operator of a single constraint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Eq,
    NotEq,
    Gt,
    Lt,
    Gte,
    Lte,
    /// `~>`: at least the version, below its [`Version::bump`]
    Pessimistic,
}

impl Operator {
    fn parse(op: &str) -> Option<Self> {
        match op {
            "=" => Some(Operator::Eq),
            "!=" => Some(Operator::NotEq),
            ">" => Some(Operator::Gt),
            "<" => Some(Operator::Lt),
            ">=" => Some(Operator::Gte),
            "<=" => Some(Operator::Lte),
            "~>" => Some(Operator::Pessimistic),
            _ => None,
        }
    }

    /// Returns the operator as written in a requirement string
    pub fn as_str(&self) -> &'static str {
        match self {
            Operator::Eq => "=",
            Operator::NotEq => "!=",
            Operator::Gt => ">",
            Operator::Lt => "<",
            Operator::Gte => ">=",
            Operator::Lte => "<=",
            Operator::Pessimistic => "~>",
        }
    }

    fn bounds_from_below(&self) -> bool {
        matches!(
            self,
            Operator::Eq | Operator::Gt | Operator::Gte | Operator::Pessimistic
        )
    }
}

/// A single `operator version` constraint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comparator {
    pub op: Operator,
    pub version: Version,
}

impl Comparator {
    /// Creates a new comparator
    pub fn new(op: Operator, version: Version) -> Self {
        Self { op, version }
    }

    /// Returns true if `version` satisfies this constraint
    pub fn matches(&self, version: &Version) -> bool {
        match self.op {
            Operator::Eq => version == &self.version,
            Operator::NotEq => version != &self.version,
            Operator::Gt => version > &self.version,
            Operator::Lt => version < &self.version,
            Operator::Gte => version >= &self.version,
            Operator::Lte => version <= &self.version,
            Operator::Pessimistic => version >= &self.version && version < &self.version.bump(),
        }
    }
}

impl fmt::Display for Comparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.op.as_str(), self.version)
    }
}

/// A conjunction of comparators
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Requirement {
    comparators: Vec<Comparator>,
}

impl Requirement {
    /// The requirement every version satisfies (`>= 0`)
    pub fn any() -> Self {
        Self {
            comparators: vec![Comparator::new(Operator::Gte, Version::parse("0"))],
        }
    }

    /// Parses a requirement string. An empty string means `>= 0`.
    pub fn parse(requirement: &str) -> Result<Self, PolicyError> {
        if requirement.trim().is_empty() {
            return Ok(Self::any());
        }

        let comparators = requirement
            .split(',')
            .map(|part| parse_comparator(requirement, part))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { comparators })
    }

    /// Returns the comparators of this requirement
    pub fn comparators(&self) -> &[Comparator] {
        &self.comparators
    }

    /// Returns true if `version` satisfies every comparator.
    ///
    /// Without a lower-bounding comparator the range starts at `>= 0`.
    pub fn is_satisfied_by(&self, version: &Version) -> bool {
        let has_lower_bound = self.comparators.iter().any(|c| c.op.bounds_from_below());
        if !has_lower_bound && version < &Version::parse("0") {
            return false;
        }
        self.comparators.iter().all(|c| c.matches(version))
    }
}

fn parse_comparator(requirement: &str, part: &str) -> Result<Comparator, PolicyError> {
    if part.trim().is_empty() {
        return Err(PolicyError::invalid_requirement(
            requirement,
            "empty constraint",
        ));
    }

    let caps = COMPARATOR_RE.captures(part).ok_or_else(|| {
        PolicyError::invalid_requirement(
            requirement,
            format!("cannot parse constraint '{}'", part.trim()),
        )
    })?;

    let op = match caps.get(1) {
        Some(op) => Operator::parse(op.as_str()).ok_or_else(|| {
            PolicyError::invalid_requirement(requirement, "unknown operator")
        })?,
        None => Operator::Eq,
    };

    let version = &caps[2];
    // An operator glued to garbage (`>>1.0`) leaves operator characters behind
    if version.starts_with(['<', '>', '=', '!', '~']) {
        return Err(PolicyError::invalid_requirement(
            requirement,
            format!("unknown operator in '{}'", part.trim()),
        ));
    }

    Ok(Comparator::new(op, Version::parse(version)))
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered: Vec<String> = self.comparators.iter().map(|c| c.to_string()).collect();
        write!(f, "{}", rendered.join(", "))
    }
}

impl std::str::FromStr for Requirement {
    type Err = PolicyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Requirement::parse(s)
    }
}
