//! Structured version ordering
//!
//! Versions are decomposed as `prefix MAJOR[.MINOR][-.PATCH][-.BUILD][-.EXTRA]suffix`.
//! Missing numbers count as 0 and the remaining text is compared as a plain
//! string, so `1.0.0-1 < 2.0.0-0` and `2.a < 2.b`.

use crate::error::PackagerError;
use anyhow::Result;
use regex::Regex;
use std::sync::LazyLock;

static DECOMPOSE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^0-9]*([0-9]+)(?:\.([0-9]+))?(?:[-.]([0-9]+))?(?:[-.]([0-9]+))?(?:[-.]([0-9]+))?(.*)")
        .expect("version decomposition pattern is valid")
});

/// Version decomposed for ordering purposes only
///
/// Field order is the comparison order.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct StructuredVersion {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
    pub build: u64,
    pub extra: u64,
    pub suffix: String,
}

/// Decompose a version string, `None` when it contains no digit
#[must_use]
pub fn decompose(version: &str) -> Option<StructuredVersion> {
    let caps = DECOMPOSE.captures(version)?;
    let number = |index: usize| {
        caps.get(index)
            .map_or(0, |m| m.as_str().parse::<u64>().unwrap_or(u64::MAX))
    };

    Some(StructuredVersion {
        major: number(1),
        minor: number(2),
        patch: number(3),
        build: number(4),
        extra: number(5),
        suffix: caps.get(6).map_or_else(String::new, |m| m.as_str().to_owned()),
    })
}

/// Strict "older than" relation between two version strings
///
/// Strings without digits sort before every decomposable version.
#[must_use]
pub fn less_than(lhs: &str, rhs: &str) -> bool {
    decompose(lhs) < decompose(rhs)
}

/// `major.minor.(patch + 1)` of `current`
#[must_use]
pub fn next_patch_version(current: &str) -> Option<String> {
    let version = decompose(current)?;
    Some(format!(
        "{}.{}.{}",
        version.major,
        version.minor,
        version.patch.saturating_add(1)
    ))
}

/// Check that two versions belong to the same release line
///
/// `pattern` must match at the start of both versions and the matched
/// prefixes must be identical, e.g. `^\d+\.\d+` keeps `9.1.x` releases on 9.1.
///
/// # Errors
///
/// Returns a pattern error if `pattern` is not a valid regex
pub fn same_release_line(pattern: &str, current: &str, proposed: &str) -> Result<bool> {
    let regex = Regex::new(pattern).map_err(|e| PackagerError::pattern(pattern, e.to_string()))?;
    let prefix = |version: &str| {
        regex
            .find(version)
            .filter(|m| m.start() == 0)
            .map(|m| m.as_str().to_owned())
    };

    Ok(match (prefix(current), prefix(proposed)) {
        (Some(lhs), Some(rhs)) => lhs == rhs,
        _ => false,
    })
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "This is a test module")]
mod tests {
    use super::*;

    #[test]
    fn less_than_examples() {
        assert!(!less_than("1.0.0.0", "1.0.0.0"));
        assert!(less_than("0.0.9.0", "1.0.0.0"));
        assert!(less_than("1.0.0.0", "1.0.0.1"));
        assert!(!less_than("1.0.0.1", "1.0.0.1"));
        assert!(less_than("1.0.0.1", "2.0.0.0"));
        assert!(less_than("1.0.0-1", "2.0.0-0"));
        assert!(!less_than("2.0.0-1", "2.0.0-0"));
        assert!(less_than("2.a", "2.b"));
        assert!(!less_than("2.b", "2.a"));
    }

    #[test]
    fn numeric_components_compare_numerically() {
        assert!(less_than("9.1.9", "9.1.10"));
        assert!(less_than("v1.2", "v1.10"));
        assert!(!less_than("10.0", "9.99"));
    }

    #[test]
    fn decompose_fills_missing_components() {
        assert_eq!(
            decompose("release-3.4rc1").unwrap(),
            StructuredVersion {
                major: 3,
                minor: 4,
                patch: 0,
                build: 0,
                extra: 0,
                suffix: "rc1".to_owned(),
            }
        );
        assert_eq!(decompose("1.2.3-4.5").unwrap().extra, 5);
        assert_eq!(decompose("no digits"), None);
        assert_eq!(
            decompose("99999999999999999999999").unwrap().major,
            u64::MAX
        );
    }

    #[test]
    fn only_ascii_digits_are_numbers() {
        assert_eq!(decompose("\u{0661}\u{0662}"), None);

        let version = decompose("1.\u{0662}").unwrap();
        assert_eq!(version.major, 1);
        assert_eq!(version.minor, 0);
        assert_eq!(version.suffix, ".\u{0662}");
        assert!(less_than("1.\u{0662}", "1.1"));
    }

    #[test]
    fn less_than_is_a_strict_total_order() {
        let versions = [
            "0.0.9.0", "1.0.0.0", "1.0.0.1", "1.0.0-1", "2.0.0-0", "2.0.0-1", "2.a", "2.b",
            "9.1.33", "9.1.4", "10", "abc", "", "1.0.0.0a", "v1.0.0",
        ];

        for a in versions {
            assert!(!less_than(a, a), "irreflexive: {a}");
            for b in versions {
                if less_than(a, b) {
                    assert!(!less_than(b, a), "antisymmetric: {a} {b}");
                }
                for c in versions {
                    if less_than(a, b) && less_than(b, c) {
                        assert!(less_than(a, c), "transitive: {a} {b} {c}");
                    }
                }
            }
        }
    }

    #[test]
    fn next_patch_bumps_third_component() {
        assert_eq!(next_patch_version("9.1.33").unwrap(), "9.1.34");
        assert_eq!(next_patch_version("2.0").unwrap(), "2.0.1");
        assert_eq!(next_patch_version("none"), None);
    }

    #[test]
    fn release_line_guard() {
        assert!(same_release_line(r"\d+\.\d+", "9.1.33", "9.1.34").unwrap());
        assert!(!same_release_line(r"\d+\.\d+", "9.1.33", "9.2.0").unwrap());
        assert!(!same_release_line(r"\d+\.\d+", "9.1.33", "v9.1.34").unwrap());
        assert!(same_release_line("(", "1", "1").is_err());
    }
}
