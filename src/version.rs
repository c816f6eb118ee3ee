//! Schema versioning utilities

use semver::Version;
use std::fmt;

use crate::error::{Result, SchemaError};

/// A three-part schema version, serialized as `"read.write.minor"`.
///
/// Backed by [`semver::Version`] with read/write/minor mapped onto
/// major/minor/patch. Prerelease and build suffixes are rejected at parse
/// time, so only plain `uint.uint.uint` strings are accepted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SchemaVersion(Version);

impl SchemaVersion {
    /// Create a version from its components.
    pub fn new(read: u64, write: u64, minor: u64) -> Self {
        Self(Version::new(read, write, minor))
    }

    /// Parse a `"read.write.minor"` string.
    pub fn parse(text: &str) -> Result<Self> {
        let malformed = || SchemaError::MalformedVersion {
            text: text.to_string(),
        };
        let version = Version::parse(text).map_err(|_| malformed())?;
        if !version.pre.is_empty() || !version.build.is_empty() {
            return Err(malformed());
        }
        Ok(Self(version))
    }

    pub fn read(&self) -> u64 {
        self.0.major
    }

    pub fn write(&self) -> u64 {
        self.0.minor
    }

    pub fn minor(&self) -> u64 {
        self.0.patch
    }
}

impl fmt::Display for SchemaVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.0.major, self.0.minor, self.0.patch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_parsing() {
        let v = SchemaVersion::parse("1.2.3").unwrap();
        assert_eq!(v.read(), 1);
        assert_eq!(v.write(), 2);
        assert_eq!(v.minor(), 3);
        assert_eq!(v.to_string(), "1.2.3");
    }

    #[test]
    fn test_version_rejects_malformed() {
        assert!(SchemaVersion::parse("1.2").is_err());
        assert!(SchemaVersion::parse("1.2.3.4").is_err());
        assert!(SchemaVersion::parse("a.b.c").is_err());
        assert!(SchemaVersion::parse("1.2.3-alpha").is_err());
        assert!(SchemaVersion::parse("1.2.3+build").is_err());
        assert!(SchemaVersion::parse("").is_err());
    }

    #[test]
    fn test_version_ordering() {
        let older = SchemaVersion::parse("1.0.2").unwrap();
        let newer = SchemaVersion::parse("1.2.0").unwrap();
        assert!(older < newer);
        assert_eq!(older, SchemaVersion::new(1, 0, 2));
    }
}
