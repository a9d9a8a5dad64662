//! Segment boundary arithmetic
//!
//! Ignore ranges are bounded by "the next version line" at a given depth
//! (0 = major, 1 = minor, 2 = patch). Boundaries are computed on the
//! dot-separated release parts so the rendered range keeps the shape of the
//! original version string (`Finchley.SR3` stays `Finchley.SR3...`).
//! Whitespace and commas also separate parts; they delimit comparators in a
//! requirement and must never leak into a rendered bound.

/// Appended after an opaque (non-numeric) segment to form an upper bound
/// above every numeric continuation of it
pub const OPAQUE_UPPER_SENTINEL: &str = "999999";

/// Synthetic pre-release marker; `X.a` is the smallest version of line `X`
pub const PRERELEASE_MARKER: &str = "a";

/// Which side of a range the boundary is used for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bound {
    /// Inclusive lower bound, ends with the pre-release marker
    Lower,
    /// Exclusive upper bound
    Upper,
}

/// Splits a version into its release parts on `.`, `,` and whitespace.
///
/// Leading operator characters (`~> 1.2`, `=1.0`), a leading `v` before a
/// digit and a Java-style `_NNN` update suffix are dropped; empty parts are
/// skipped.
pub fn release_parts(version: &str) -> Vec<&str> {
    let trimmed = version.trim().trim_start_matches(|c: char| {
        matches!(c, '<' | '>' | '=' | '!' | '~') || c.is_whitespace()
    });
    let unprefixed = match trimmed.as_bytes() {
        [b'v' | b'V', d, ..] if d.is_ascii_digit() => &trimmed[1..],
        _ => trimmed,
    };
    let release = match unprefixed.rsplit_once('_') {
        Some((release, update))
            if !release.is_empty()
                && !update.is_empty()
                && update.bytes().all(|b| b.is_ascii_digit()) =>
        {
            release
        }
        _ => unprefixed,
    };

    release
        .split(|c: char| c == '.' || c == ',' || c.is_whitespace())
        .filter(|p| !p.is_empty())
        .collect()
}

fn increment(part: &str) -> Option<u64> {
    if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    part.parse::<u64>().ok()?.checked_add(1)
}

/// Returns the boundary of the next version line at `depth`.
///
/// The parts before `depth` are kept and the part at `depth` is incremented
/// (an absent part counts as zero). Returns `None` when the version has
/// fewer than `depth` parts: there is nothing to bump at that depth.
///
/// A non-numeric part at `depth` cannot be incremented and is kept as an
/// opaque token: upper bounds append [`OPAQUE_UPPER_SENTINEL`], lower bounds
/// append `1` (except at depth 0).
///
/// ```
/// use update_policy::version::{next_segment_boundary, Bound};
///
/// assert_eq!(next_segment_boundary("1.2.3", 1, Bound::Lower).as_deref(), Some("1.3.a"));
/// assert_eq!(next_segment_boundary("1.2.3", 0, Bound::Upper).as_deref(), Some("2"));
/// assert_eq!(next_segment_boundary("1", 2, Bound::Lower), None);
/// ```
pub fn next_segment_boundary(version: &str, depth: usize, bound: Bound) -> Option<String> {
    let parts = release_parts(version);
    if parts.is_empty() || depth > parts.len() {
        return None;
    }

    let mut boundary: Vec<String> = parts[..depth].iter().map(|p| p.to_string()).collect();

    match parts.get(depth) {
        None => boundary.push("1".to_string()),
        Some(part) => match increment(part) {
            Some(next) => boundary.push(next.to_string()),
            None => {
                boundary.push(part.to_string());
                match bound {
                    Bound::Upper => boundary.push(OPAQUE_UPPER_SENTINEL.to_string()),
                    Bound::Lower if depth > 0 => boundary.push("1".to_string()),
                    Bound::Lower => {}
                }
            }
        },
    }

    if bound == Bound::Lower {
        boundary.push(PRERELEASE_MARKER.to_string());
    }

    Some(boundary.join("."))
}
