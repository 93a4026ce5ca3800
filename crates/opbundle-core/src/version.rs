//! Tolerant semantic version parsing
//!
//! Annotation values written by bundle authors are rarely full SemVer:
//! `1.21`, `v1.21` and `1.021.0` all show up in the wild. [`parse_tolerant`]
//! normalizes these into a `major.minor.patch` form before handing the string
//! to [`semver::Version::parse`].

use semver::Version;
use thiserror::Error;

/// Errors produced by [`parse_tolerant`]
#[derive(Error, Debug)]
pub enum VersionError {
    #[error("version string is empty")]
    Empty,

    #[error("short version cannot contain pre-release or build metadata: {0:?}")]
    ShortWithMetadata(String),

    #[error("{source}")]
    Invalid {
        value: String,
        #[source]
        source: semver::Error,
    },
}

/// Parse a version string, accepting missing components and a leading `v`
///
/// - surrounding whitespace is ignored
/// - `v1.22` parses as `1.22.0`
/// - `1` parses as `1.0.0`
/// - leading zeros in numeric components are dropped (`01.022.0` is `1.22.0`)
///
/// Pre-release and build metadata are only accepted on a full
/// `major.minor.patch` version.
pub fn parse_tolerant(input: &str) -> Result<Version, VersionError> {
    let trimmed = input.trim();
    let trimmed = trimmed.strip_prefix('v').unwrap_or(trimmed);

    if trimmed.is_empty() {
        return Err(VersionError::Empty);
    }

    let mut parts: Vec<String> = trimmed.splitn(3, '.').map(str::to_string).collect();
    if parts.len() < 3 {
        if parts.last().is_some_and(|p| p.contains(['-', '+'])) {
            return Err(VersionError::ShortWithMetadata(input.to_string()));
        }
        parts.resize(3, "0".to_string());
    }

    let normalized = parts
        .iter()
        .map(|part| strip_leading_zeros(part))
        .collect::<Vec<_>>()
        .join(".");

    Version::parse(&normalized).map_err(|source| VersionError::Invalid {
        value: input.to_string(),
        source,
    })
}

/// Drop leading zeros from the numeric prefix of a component, keeping one digit
fn strip_leading_zeros(part: &str) -> String {
    let digits = part.len() - part.trim_start_matches(|c: char| c.is_ascii_digit()).len();
    let (number, rest) = part.split_at(digits);
    let number = number.trim_start_matches('0');

    if number.is_empty() && digits > 0 {
        format!("0{}", rest)
    } else {
        format!("{}{}", number, rest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_version() {
        assert_eq!(parse_tolerant("1.21.0").unwrap(), Version::new(1, 21, 0));
        assert_eq!(parse_tolerant("1.22.3").unwrap(), Version::new(1, 22, 3));
    }

    #[test]
    fn test_parse_missing_patch() {
        assert_eq!(parse_tolerant("1.22").unwrap(), Version::new(1, 22, 0));
    }

    #[test]
    fn test_parse_major_only() {
        assert_eq!(parse_tolerant("1").unwrap(), Version::new(1, 0, 0));
    }

    #[test]
    fn test_parse_v_prefix_and_whitespace() {
        assert_eq!(parse_tolerant("v1.21").unwrap(), Version::new(1, 21, 0));
        assert_eq!(parse_tolerant("  1.21.0\n").unwrap(), Version::new(1, 21, 0));
    }

    #[test]
    fn test_parse_leading_zeros() {
        assert_eq!(parse_tolerant("01.022.0").unwrap(), Version::new(1, 22, 0));
        assert_eq!(parse_tolerant("1.00.00").unwrap(), Version::new(1, 0, 0));
    }

    #[test]
    fn test_parse_prerelease() {
        let version = parse_tolerant("1.22.0-rc.1").unwrap();
        assert_eq!(version.pre.as_str(), "rc.1");
        assert!(version < Version::new(1, 22, 0));
    }

    #[test]
    fn test_short_version_with_metadata_rejected() {
        assert!(matches!(
            parse_tolerant("1.22-alpha"),
            Err(VersionError::ShortWithMetadata(ref v)) if v == "1.22-alpha"
        ));
        assert!(matches!(
            parse_tolerant("1+build"),
            Err(VersionError::ShortWithMetadata(_))
        ));
    }

    #[test]
    fn test_empty_rejected() {
        assert!(matches!(parse_tolerant(""), Err(VersionError::Empty)));
        assert!(matches!(parse_tolerant("   "), Err(VersionError::Empty)));
        assert!(matches!(parse_tolerant("v"), Err(VersionError::Empty)));
    }

    #[test]
    fn test_garbage_rejected() {
        let err = parse_tolerant("invalid").unwrap_err();
        match &err {
            VersionError::Invalid { value, .. } => assert_eq!(value, "invalid"),
            other => panic!("unexpected error: {:?}", other),
        }
        assert!(err.to_string().contains("major version number"));
    }

    #[test]
    fn test_non_numeric_minor_rejected() {
        assert!(matches!(
            parse_tolerant("1.x.0"),
            Err(VersionError::Invalid { .. })
        ));
    }

    #[test]
    fn test_strip_leading_zeros() {
        assert_eq!(strip_leading_zeros("007"), "7");
        assert_eq!(strip_leading_zeros("0"), "0");
        assert_eq!(strip_leading_zeros("000"), "0");
        assert_eq!(strip_leading_zeros("01-rc.1"), "1-rc.1");
        assert_eq!(strip_leading_zeros("abc"), "abc");
    }
}
