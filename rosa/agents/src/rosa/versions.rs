//! Picks a concrete version for a version constraint.

use std::cmp::Ordering;

/// Select the version in `available` that satisfies `constraint`:
///
/// - `latest` is the newest version.
/// - A major and minor version (`4.15`) is the newest patch release of that minor version.
/// - A full version (`4.15.3`) must be available as is.
///
/// Pre-releases (`4.16.0-rc.1`) sort before their release. `None` when nothing matches.
pub fn select_version<S: AsRef<str>>(constraint: &str, available: &[S]) -> Option<String> {
    let constraint = constraint.trim();
    let mut candidates = available.iter().map(|version| version.as_ref());
    if constraint.eq_ignore_ascii_case("latest") {
        return newest(candidates);
    }
    if constraint.matches('.').count() == 1 {
        let prefix = format!("{}.", constraint);
        return newest(candidates.filter(|v| v.starts_with(&prefix)));
    }
    candidates.find(|v| *v == constraint).map(str::to_string)
}

fn newest<'a>(versions: impl Iterator<Item = &'a str>) -> Option<String> {
    versions.max_by(|a, b| compare(a, b)).map(str::to_string)
}

fn compare(a: &str, b: &str) -> Ordering {
    let (a_release, a_pre) = split(a);
    let (b_release, b_pre) = split(b);
    numbers(a_release)
        .cmp(&numbers(b_release))
        .then_with(|| match (a_pre, b_pre) {
            (None, None) => Ordering::Equal,
            (None, Some(_)) => Ordering::Greater,
            (Some(_), None) => Ordering::Less,
            (Some(a), Some(b)) => a.cmp(b),
        })
}

fn split(version: &str) -> (&str, Option<&str>) {
    match version.split_once('-') {
        Some((release, pre)) => (release, Some(pre)),
        None => (version, None),
    }
}

fn numbers(release: &str) -> Vec<u64> {
    release
        .split('.')
        .map(|part| part.parse().unwrap_or(0))
        .collect()
}

#[cfg(test)]
mod test {
    use super::*;

    const AVAILABLE: [&str; 6] = [
        "4.14.9",
        "4.15.2",
        "4.15.10",
        "4.15.3",
        "4.16.0-rc.1",
        "4.16.0-rc.0",
    ];

    #[test]
    fn latest() {
        assert_eq!(select_version("latest", &AVAILABLE).unwrap(), "4.16.0-rc.1");
        assert_eq!(
            select_version("latest", &["4.15.0", "4.15.0-rc.3"]).unwrap(),
            "4.15.0"
        );
    }

    #[test]
    fn minor() {
        assert_eq!(select_version("4.15", &AVAILABLE).unwrap(), "4.15.10");
        assert_eq!(select_version("4.14", &AVAILABLE).unwrap(), "4.14.9");
        assert!(select_version("4.13", &AVAILABLE).is_none());
    }

    #[test]
    fn exact() {
        assert_eq!(select_version("4.15.3", &AVAILABLE).unwrap(), "4.15.3");
        assert!(select_version("4.15.4", &AVAILABLE).is_none());
    }

    #[test]
    fn nothing_available() {
        let none: [&str; 0] = [];
        assert!(select_version("latest", &none).is_none());
    }
}
