//! Version comparison for versions gathered from property searches.
//!
//! Comparison is component-wise on `.`-separated parts: a part with leading
//! digits compares numerically, anything else compares as a string. Missing
//! trailing parts count as `0`.
//!
//! This is not semver aware. Pre-release tags and build metadata get no
//! special ordering: `1.0.0-rc1` and `1.0.0` compare equal because `0-rc1`
//! parses to `0`.

use std::cmp::Ordering;

#[derive(Debug, Clone, PartialEq)]
enum Part<'a> {
    Number(i128),
    Text(&'a str),
}

/// Parse a component the way JavaScript's `parseInt(s, 10)` does:
/// optional leading whitespace and sign, then as many digits as present.
fn parse_leading_int(s: &str) -> Option<i128> {
    let s = s.trim_start();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return None;
    }
    let value: i128 = digits[..end].parse().ok()?;
    Some(if negative { -value } else { value })
}

fn parse_part(s: &str) -> Part<'_> {
    match parse_leading_int(s) {
        Some(n) => Part::Number(n),
        // An empty component behaves like a missing one
        None if s.is_empty() => Part::Number(0),
        None => Part::Text(s),
    }
}

fn compare_parts(a: &Part<'_>, b: &Part<'_>) -> Ordering {
    match (a, b) {
        (Part::Number(x), Part::Number(y)) => x.cmp(y),
        (Part::Text(x), Part::Text(y)) => x.cmp(y),
        // Mixed kinds are unordered; treat as equal and move on
        _ => Ordering::Equal,
    }
}

/// Compare two dotted version strings
pub fn compare_versions(a: &str, b: &str) -> Ordering {
    let parts_a: Vec<Part<'_>> = a.split('.').map(parse_part).collect();
    let parts_b: Vec<Part<'_>> = b.split('.').map(parse_part).collect();

    let max_len = parts_a.len().max(parts_b.len());
    for i in 0..max_len {
        let pa = parts_a.get(i).unwrap_or(&Part::Number(0));
        let pb = parts_b.get(i).unwrap_or(&Part::Number(0));
        match compare_parts(pa, pb) {
            Ordering::Equal => continue,
            other => return other,
        }
    }

    Ordering::Equal
}

/// Pick the highest version, keeping the first one seen on ties.
///
/// Returns `None` for an empty input.
pub fn find_latest_version<S: AsRef<str>>(versions: &[S]) -> Option<String> {
    let mut iter = versions.iter();
    let mut latest = iter.next()?.as_ref();
    for candidate in iter {
        if compare_versions(candidate.as_ref(), latest) == Ordering::Greater {
            latest = candidate.as_ref();
        }
    }
    Some(latest.to_string())
}
