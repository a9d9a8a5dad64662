//! Dependency-name glob patterns
//!
//! `*` matches any run of characters (including `/`, `@` and `:` so scoped
//! names such as `@babel/core` or `org.slf4j:slf4j-api` match as a whole).
//! Matching is case-sensitive and always covers the full name. The rest of
//! the glob syntax (`?`, `[abc]`, `{a,b}`) is available as well.

use crate::error::PolicyError;
use globset::{Glob, GlobBuilder, GlobMatcher, GlobSet, GlobSetBuilder};
use std::fmt;

fn build_glob(pattern: &str) -> Result<Glob, PolicyError> {
    GlobBuilder::new(pattern)
        .literal_separator(false)
        .case_insensitive(false)
        .backslash_escape(true)
        .build()
        .map_err(|e| PolicyError::invalid_pattern(pattern, e.kind().to_string()))
}

/// A compiled name pattern
#[derive(Debug, Clone)]
pub struct WildcardPattern {
    pattern: String,
    matcher: GlobMatcher,
}

impl WildcardPattern {
    /// Compiles a pattern, failing with `InvalidPattern` on malformed globs
    /// such as an unclosed `[`
    pub fn new(pattern: &str) -> Result<Self, PolicyError> {
        Ok(Self {
            pattern: pattern.to_string(),
            matcher: build_glob(pattern)?.compile_matcher(),
        })
    }

    /// Returns true if `name` matches the whole pattern
    pub fn matches(&self, name: &str) -> bool {
        self.matcher.is_match(name)
    }

    /// Returns the pattern as written
    pub fn as_str(&self) -> &str {
        &self.pattern
    }
}

impl PartialEq for WildcardPattern {
    fn eq(&self, other: &Self) -> bool {
        self.pattern == other.pattern
    }
}

impl Eq for WildcardPattern {}

impl fmt::Display for WildcardPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.pattern)
    }
}

/// A list of name patterns matched in one pass
#[derive(Debug, Clone)]
pub struct WildcardSet {
    set: GlobSet,
}

impl WildcardSet {
    /// Compiles every pattern into one set
    pub fn new<S: AsRef<str>>(patterns: &[S]) -> Result<Self, PolicyError> {
        let mut builder = GlobSetBuilder::new();
        for pattern in patterns {
            builder.add(build_glob(pattern.as_ref())?);
        }
        let set = builder.build().map_err(|e| {
            PolicyError::invalid_pattern(e.glob().unwrap_or_default(), e.kind().to_string())
        })?;
        Ok(Self { set })
    }

    /// A set that matches nothing
    pub fn empty() -> Self {
        Self {
            set: GlobSet::empty(),
        }
    }

    /// Returns true if any pattern matches `name`
    pub fn is_match(&self, name: &str) -> bool {
        self.set.is_match(name)
    }

    pub fn is_empty(&self) -> bool {
        self.set.is_empty()
    }
}
