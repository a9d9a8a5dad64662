//! Available versions
//!
//! A `VersionCandidate` is one published version of a package, optionally
//! with its release date, as a registry would report it.

use crate::version::Version;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// A published version a dependency could move to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct VersionCandidate {
    /// The version string (e.g., "1.2.3")
    pub version: String,
    /// When this version was released, if the registry says
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub released_at: Option<DateTime<Utc>>,
}

impl VersionCandidate {
    /// Create a candidate with an unknown release date
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            released_at: None,
        }
    }

    /// Sets the release date (builder pattern)
    pub fn released_at(mut self, released_at: DateTime<Utc>) -> Self {
        self.released_at = Some(released_at);
        self
    }

    /// Parsed form of the version string
    pub fn parsed(&self) -> Version {
        Version::parse(&self.version)
    }

    /// Returns true if this is a pre-release (alpha, beta, rc, canary, ...)
    pub fn is_prerelease(&self) -> bool {
        self.parsed().is_prerelease()
    }

    /// Returns true if the candidate was released at or before `cutoff`.
    /// Candidates with no release date are treated as old enough.
    pub fn released_before(&self, cutoff: DateTime<Utc>) -> bool {
        match self.released_at {
            Some(at) => at <= cutoff,
            None => true,
        }
    }
}

impl Ord for VersionCandidate {
    fn cmp(&self, other: &Self) -> Ordering {
        self.parsed()
            .cmp(&other.parsed())
            .then_with(|| self.version.cmp(&other.version))
    }
}

impl PartialOrd for VersionCandidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_candidate_new() {
        let date = Utc.with_ymd_and_hms(2024, 1, 15, 10, 0, 0).unwrap();
        let candidate = VersionCandidate::new("1.2.3").released_at(date);
        assert_eq!(candidate.version, "1.2.3");
        assert_eq!(candidate.released_at, Some(date));
    }

    #[test]
    fn test_candidate_ordering() {
        assert!(VersionCandidate::new("1.9.0") < VersionCandidate::new("1.10.0"));
        assert!(VersionCandidate::new("v1.0.0") < VersionCandidate::new("v2.0.0"));
        assert!(VersionCandidate::new("1.0.0.rc1") < VersionCandidate::new("1.0.0"));
        assert!(VersionCandidate::new("1.8.0_202") > VersionCandidate::new("1.8.0_191"));
    }

    #[test]
    fn test_candidate_prerelease() {
        assert!(VersionCandidate::new("19.3.0-canary-52684925-20251110").is_prerelease());
        assert!(VersionCandidate::new("6.0.0-beta.1").is_prerelease());
        assert!(!VersionCandidate::new("5.9.0").is_prerelease());
    }

    #[test]
    fn test_released_before() {
        let cutoff = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        let old = VersionCandidate::new("1.0.0")
            .released_at(Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap());
        let new = VersionCandidate::new("1.1.0")
            .released_at(Utc.with_ymd_and_hms(2024, 6, 2, 0, 0, 0).unwrap());

        assert!(old.released_before(cutoff));
        assert!(!new.released_before(cutoff));
        assert!(VersionCandidate::new("1.2.0").released_before(cutoff));
    }

    #[test]
    fn test_serde_candidate() {
        let date = Utc.with_ymd_and_hms(2024, 1, 15, 10, 0, 0).unwrap();
        let candidate = VersionCandidate::new("1.2.3").released_at(date);

        let json = serde_json::to_string(&candidate).unwrap();
        assert!(json.contains("released-at"));
        let parsed: VersionCandidate = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, candidate);

        let bare: VersionCandidate = serde_json::from_str(r#"{"version":"2.0.0"}"#).unwrap();
        assert_eq!(bare.released_at, None);
    }
}
