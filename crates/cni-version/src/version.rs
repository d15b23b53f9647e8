//! Protocol version tokens and their ordering.

use std::fmt;

use semver::Version;
use serde::{Deserialize, Serialize};

use crate::error::VersionError;

/// A protocol version token as it appears on the wire (`"1.0.0"`).
///
/// The token is kept verbatim; reconciliation compares tokens exactly while
/// ordering parses them numerically.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProtocolVersion(String);

impl ProtocolVersion {
    /// Wrap a version token.
    #[must_use]
    pub fn new(version: impl Into<String>) -> Self {
        Self(version.into())
    }

    /// Returns the token.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Parse the token into numeric major/minor/micro parts.
    ///
    /// An empty token is the implicit `0.1.0`; missing parts are zero.
    pub fn parse(&self) -> Result<Version, VersionError> {
        parse(&self.0)
    }
}

impl fmt::Display for ProtocolVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ProtocolVersion {
    fn from(version: &str) -> Self {
        Self::new(version)
    }
}

impl From<String> for ProtocolVersion {
    fn from(version: String) -> Self {
        Self(version)
    }
}

impl AsRef<str> for ProtocolVersion {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for ProtocolVersion {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for ProtocolVersion {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

fn parse(version: &str) -> Result<Version, VersionError> {
    if version.is_empty() {
        return Ok(Version::new(0, 1, 0));
    }

    let parts: Vec<&str> = version.split('.').collect();
    if parts.len() > 3 {
        return Err(VersionError::TooManyParts(version.to_string()));
    }

    let mut numbers = [0u64; 3];
    for ((slot, part), value) in numbers
        .iter_mut()
        .zip(["major", "minor", "micro"])
        .zip(parts)
    {
        *slot = value.parse().map_err(|_| VersionError::InvalidPart {
            part,
            value: value.to_string(),
        })?;
    }

    Ok(Version::new(numbers[0], numbers[1], numbers[2]))
}

/// Returns whether `version` orders at or above `other`.
///
/// # Errors
///
/// Returns [`VersionError`] if either token fails to parse.
pub fn greater_than_or_equal_to(
    version: impl AsRef<str>,
    other: impl AsRef<str>,
) -> Result<bool, VersionError> {
    let version = parse(version.as_ref())?;
    let other = parse(other.as_ref())?;
    Ok(version >= other)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use test_case::test_case;

    #[test_case("1.1.0", (1, 1, 0) ; "full")]
    #[test_case("0.4", (0, 4, 0) ; "two parts")]
    #[test_case("2", (2, 0, 0) ; "one part")]
    #[test_case("", (0, 1, 0) ; "empty is implicit")]
    fn test_parse(token: &str, expected: (u64, u64, u64)) {
        let parsed = ProtocolVersion::from(token).parse().unwrap();
        assert_eq!((parsed.major, parsed.minor, parsed.patch), expected);
    }

    #[test]
    fn test_parse_too_many_parts() {
        let err = ProtocolVersion::from("1.0.0.1").parse().unwrap_err();
        assert_eq!(err, VersionError::TooManyParts("1.0.0.1".to_string()));
    }

    #[test_case("x.1.0", "major" ; "major")]
    #[test_case("1.y.0", "minor" ; "minor")]
    #[test_case("1.0.z", "micro" ; "micro")]
    #[test_case("1..0", "minor" ; "empty part")]
    fn test_parse_invalid_part(token: &str, which: &str) {
        match ProtocolVersion::from(token).parse() {
            Err(VersionError::InvalidPart { part, .. }) => assert_eq!(part, which),
            other => panic!("unexpected result {other:?}"),
        }
    }

    #[test_case("0.4.0", "0.4.0", true ; "equal")]
    #[test_case("1.0.0", "0.4.0", true ; "greater major")]
    #[test_case("0.3.1", "0.4.0", false ; "lower minor")]
    #[test_case("0.10.0", "0.9.0", true ; "numeric not lexical")]
    #[test_case("", "0.1.0", true ; "implicit equals 0.1.0")]
    fn test_greater_than_or_equal_to(a: &str, b: &str, expected: bool) {
        assert_eq!(greater_than_or_equal_to(a, b).unwrap(), expected);
    }

    #[test]
    fn test_compare_propagates_parse_errors() {
        assert!(greater_than_or_equal_to("1.0.0", "bogus").is_err());
        assert!(greater_than_or_equal_to("a.b", "1.0.0").is_err());
    }

    #[test]
    fn test_serde_transparent() {
        let v = ProtocolVersion::from("1.0.0");
        assert_eq!(serde_json::to_string(&v).unwrap(), "\"1.0.0\"");
    }

    proptest! {
        #[test]
        fn prop_ordering_matches_tuple_ordering(
            a in (0u64..20, 0u64..20, 0u64..20),
            b in (0u64..20, 0u64..20, 0u64..20)
        ) {
            let left = format!("{}.{}.{}", a.0, a.1, a.2);
            let right = format!("{}.{}.{}", b.0, b.1, b.2);
            prop_assert_eq!(greater_than_or_equal_to(&left, &right).unwrap(), a >= b);
        }
    }
}
