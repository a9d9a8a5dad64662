//! Version scheme shared by every ecosystem
//!
//! Versions are compared the way RubyGems compares them, which is loose enough
//! to order the version strings of every supported package manager:
//! - The release part is tokenised into digit runs and letter runs
//! - Numeric segments compare as integers, letter segments lexically
//! - A letter segment sorts before a number at the same position, so
//!   `1.3.a` is the smallest version of the `1.3` line including pre-releases
//! - Missing trailing segments count as zero (`1.2 == 1.2.0`)
//! - A Java-style `_NNN` update suffix breaks ties between equal releases

mod boundary;
mod requirement;

pub use boundary::{
    next_segment_boundary, release_parts, Bound, OPAQUE_UPPER_SENTINEL, PRERELEASE_MARKER,
};
pub use requirement::{Comparator, Operator, Requirement};

use regex::Regex;
use std::cmp::Ordering;
use std::fmt;
use std::sync::LazyLock;

/// Digit runs and letter runs; everything else separates segments
static SEGMENT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[0-9]+|[A-Za-z]+").unwrap());

/// A single segment of a version's release part
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Segment {
    /// Run of digits, compared as an integer
    Numeric(u64),
    /// Run of letters, compared lexically
    Alpha(String),
}

impl Segment {
    fn from_token(token: &str) -> Self {
        if token.bytes().all(|b| b.is_ascii_digit()) {
            // Absurdly long digit runs still order above every realistic number
            Segment::Numeric(token.parse().unwrap_or(u64::MAX))
        } else {
            Segment::Alpha(token.to_string())
        }
    }

    /// Returns true for numeric segments
    pub fn is_numeric(&self) -> bool {
        matches!(self, Segment::Numeric(_))
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Segment::Numeric(n) => write!(f, "{}", n),
            Segment::Alpha(s) => write!(f, "{}", s),
        }
    }
}

/// One position of a comparison, where the shorter version may have run out.
///
/// Ordering: `Alpha < Absent == Numeric(0) <= Numeric(n)`.
#[derive(Debug, Clone, Copy)]
enum Slot<'a> {
    Alpha(&'a str),
    Absent,
    Numeric(u64),
}

impl<'a> Slot<'a> {
    fn at(segments: &'a [Segment], idx: usize) -> Self {
        match segments.get(idx) {
            Some(Segment::Numeric(n)) => Slot::Numeric(*n),
            Some(Segment::Alpha(s)) => Slot::Alpha(s.as_str()),
            None => Slot::Absent,
        }
    }

    fn compare(self, other: Slot<'_>) -> Ordering {
        match (self, other) {
            (Slot::Alpha(a), Slot::Alpha(b)) => a.cmp(b),
            (Slot::Alpha(_), _) => Ordering::Less,
            (_, Slot::Alpha(_)) => Ordering::Greater,
            (Slot::Absent, Slot::Absent) => Ordering::Equal,
            (Slot::Absent, Slot::Numeric(n)) => 0.cmp(&n),
            (Slot::Numeric(n), Slot::Absent) => n.cmp(&0),
            (Slot::Numeric(a), Slot::Numeric(b)) => a.cmp(&b),
        }
    }
}

/// A parsed, comparable version
#[derive(Debug, Clone)]
pub struct Version {
    /// The version string as given (trimmed)
    raw: String,
    /// Release part segments, never empty
    segments: Vec<Segment>,
    /// Java-style update number after an underscore (e.g. `202` in `1.8.0_202`)
    update_part: Option<u64>,
}

impl Version {
    /// Parses a version string. Never fails: odd input degrades to a
    /// best-effort single segment.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        let (release, update_part) = split_update_part(strip_v_prefix(trimmed));

        let mut segments: Vec<Segment> = SEGMENT_RE
            .find_iter(release)
            .map(|m| Segment::from_token(m.as_str()))
            .collect();

        if segments.is_empty() {
            segments.push(if release.is_empty() {
                Segment::Numeric(0)
            } else {
                Segment::Alpha(release.to_string())
            });
        }

        Self {
            raw: trimmed.to_string(),
            segments,
            update_part,
        }
    }

    /// Builds a version from segments, rendering them dot-separated
    pub fn from_segments(segments: Vec<Segment>) -> Self {
        let segments = if segments.is_empty() {
            vec![Segment::Numeric(0)]
        } else {
            segments
        };
        let raw = segments
            .iter()
            .map(|s| s.to_string())
            .collect::<Vec<_>>()
            .join(".");
        Self {
            raw,
            segments,
            update_part: None,
        }
    }

    /// Returns the version string as given
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Returns the release part segments
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Alias of [`Version::segments`] for ecosystems with an update suffix
    pub fn release_part(&self) -> &[Segment] {
        &self.segments
    }

    /// Returns the Java-style update number, if any
    pub fn update_part(&self) -> Option<u64> {
        self.update_part
    }

    /// Returns true when every segment is numeric
    pub fn is_numeric(&self) -> bool {
        self.segments.iter().all(Segment::is_numeric)
    }

    /// Returns true when any segment is a letter run (`1.0.0-beta`, `2.a`)
    pub fn is_prerelease(&self) -> bool {
        !self.is_numeric()
    }

    /// Upper bound of a pessimistic (`~>`) constraint.
    ///
    /// Trailing letter segments are dropped, then the last numeric segment
    /// is removed (unless it is the only one) and the new last one is
    /// incremented: `1.2.3` → `1.3`, `1.2` → `2`, `1` → `2`.
    pub fn bump(&self) -> Version {
        let mut segments: Vec<Segment> = self
            .segments
            .iter()
            .take_while(|s| s.is_numeric())
            .cloned()
            .collect();

        if segments.len() > 1 {
            segments.pop();
        }

        match segments.last_mut() {
            Some(Segment::Numeric(n)) => *n = n.saturating_add(1),
            _ => segments = vec![Segment::Numeric(1)],
        }

        Version::from_segments(segments)
    }
}

/// Drops a leading `v`/`V` when a digit follows it (`v1.2.3`)
fn strip_v_prefix(s: &str) -> &str {
    let mut chars = s.chars();
    match (chars.next(), chars.next()) {
        (Some('v' | 'V'), Some(c)) if c.is_ascii_digit() => &s[1..],
        _ => s,
    }
}

/// Splits `1.8.0_202` into `("1.8.0", Some(202))`
fn split_update_part(s: &str) -> (&str, Option<u64>) {
    match s.rsplit_once('_') {
        Some((release, update))
            if !release.is_empty()
                && !update.is_empty()
                && update.bytes().all(|b| b.is_ascii_digit()) =>
        {
            (release, update.parse().ok())
        }
        _ => (s, None),
    }
}

fn compare_segments(a: &[Segment], b: &[Segment]) -> Ordering {
    let len = a.len().max(b.len());
    for idx in 0..len {
        match Slot::at(a, idx).compare(Slot::at(b, idx)) {
            Ordering::Equal => continue,
            other => return other,
        }
    }
    Ordering::Equal
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        compare_segments(&self.segments, &other.segments).then_with(|| {
            self.update_part
                .unwrap_or(0)
                .cmp(&other.update_part.unwrap_or(0))
        })
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Version {}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.raw)
    }
}

impl From<&str> for Version {
    fn from(raw: &str) -> Self {
        Version::parse(raw)
    }
}

/// Compare two version strings
pub fn compare_versions(a: &str, b: &str) -> Ordering {
    Version::parse(a).cmp(&Version::parse(b))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(s: &str) -> Version {
        Version::parse(s)
    }

    #[test]
    fn test_parse_numeric_segments() {
        assert_eq!(
            v("1.2.3").segments(),
            &[
                Segment::Numeric(1),
                Segment::Numeric(2),
                Segment::Numeric(3)
            ]
        );
        assert!(v("1.2.3").is_numeric());
    }

    #[test]
    fn test_parse_splits_digit_and_letter_runs() {
        assert_eq!(
            v("Finchley.SR3").segments(),
            &[
                Segment::Alpha("Finchley".to_string()),
                Segment::Alpha("SR".to_string()),
                Segment::Numeric(3)
            ]
        );
        assert_eq!(
            v("1.0.0-beta2").segments(),
            &[
                Segment::Numeric(1),
                Segment::Numeric(0),
                Segment::Numeric(0),
                Segment::Alpha("beta".to_string()),
                Segment::Numeric(2)
            ]
        );
    }

    #[test]
    fn test_parse_never_empty() {
        assert_eq!(v("").segments(), &[Segment::Numeric(0)]);
        assert_eq!(v("***").segments(), &[Segment::Alpha("***".to_string())]);
    }

    #[test]
    fn test_parse_strips_v_prefix() {
        assert_eq!(v("v1.2.3"), v("1.2.3"));
        // Not a prefix when no digit follows
        assert!(v("vendor").is_prerelease());
    }

    #[test]
    fn test_parse_update_part() {
        let java = v("1.8.0_202");
        assert_eq!(java.update_part(), Some(202));
        assert_eq!(
            java.release_part(),
            &[
                Segment::Numeric(1),
                Segment::Numeric(8),
                Segment::Numeric(0)
            ]
        );
        assert_eq!(v("snake_case").update_part(), None);
    }

    #[test]
    fn test_numeric_ordering() {
        assert!(v("10.0.0") > v("9.0.0"));
        assert!(v("1.9.0") < v("1.10.0"));
    }

    #[test]
    fn test_shorter_versions_pad_with_zero() {
        assert!(v("1.2") < v("1.2.1"));
        assert!(v("1.2.1") < v("1.2.1.1"));
        assert_eq!(v("1.2"), v("1.2.0"));
    }

    #[test]
    fn test_prerelease_marker_sorts_before_release() {
        assert!(v("1.2.3.a") < v("1.2.3"));
        assert!(v("1.3.a") < v("1.3.0"));
        assert!(v("1.3.a") < v("1.3.0.rc1"));
        assert!(v("1.2.3.1.a") > v("1.2.3"));
        assert!(v("1.2.3.1.a") < v("1.2.3.1"));
        assert!(v("1.0.0-alpha") < v("1.0.0-beta"));
        assert!(v("1.0.0-beta") < v("1.0.0"));
    }

    #[test]
    fn test_alpha_versions() {
        assert!(v("Finchley.SR3") < v("Finchley.SR4"));
        assert!(v("Finchley.SR3") < v("Greenwich.RELEASE"));
        assert!(v("Finchley.SR3") < v("Finchley.SR3.999999"));
        assert!(v("Finchley.SR3.1") < v("Finchley.SR3.999999"));
    }

    #[test]
    fn test_update_part_breaks_ties() {
        assert!(v("1.8.0_202") > v("1.8.0_191"));
        assert!(v("1.8.0_202") > v("1.8.0"));
        assert!(v("1.8.0_202") < v("1.8.1"));
    }

    #[test]
    fn test_prerelease_classification() {
        assert!(!v("1.2.3").is_prerelease());
        assert!(v("1.2.3-rc.1").is_prerelease());
        assert!(v("2.a").is_prerelease());
    }

    #[test]
    fn test_bump() {
        assert_eq!(v("1.2.3").bump().as_str(), "1.3");
        assert_eq!(v("1.2").bump().as_str(), "2");
        assert_eq!(v("1").bump().as_str(), "2");
        assert_eq!(v("1.2.3.beta").bump().as_str(), "1.3");
    }

    #[test]
    fn test_display_keeps_raw() {
        assert_eq!(format!("{}", v(" v1.2.3 ")), "v1.2.3");
    }

    #[test]
    fn test_compare_versions() {
        assert_eq!(compare_versions("1.0.0", "1.0.0"), Ordering::Equal);
        assert_eq!(compare_versions("1.0.0", "2.0.0"), Ordering::Less);
        assert_eq!(compare_versions("v2.0.0", "1.0.0"), Ordering::Greater);
    }

    #[test]
    fn test_sorting() {
        let mut versions = vec![v("2.0.0"), v("1.0.0.rc1"), v("1.5.0"), v("1.0.0")];
        versions.sort();
        let sorted: Vec<&str> = versions.iter().map(|v| v.as_str()).collect();
        assert_eq!(sorted, vec!["1.0.0.rc1", "1.0.0", "1.5.0", "2.0.0"]);
    }
}
