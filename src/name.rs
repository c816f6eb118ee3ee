//! Identifier validation and case-insensitive naming
//!
//! Schema items, enumerators, and schemas themselves are addressed by
//! names that compare case-insensitively but keep their original casing
//! for display and serialization. The case-folded form is only ever a
//! shadow key; stored data is never lowercased destructively.

use std::fmt;
use std::hash::{Hash, Hasher};

use crate::error::{Result, SchemaError};

/// A validated identifier.
///
/// Grammar: first character letter or underscore, subsequent characters
/// alphanumeric or underscore. Equality and hashing are case-insensitive;
/// the originally-supplied casing is preserved.
#[derive(Debug, Clone)]
pub struct SchemaName(String);

impl SchemaName {
    /// Validate a raw string as an identifier.
    pub fn new(raw: impl Into<String>) -> Result<Self> {
        let raw = raw.into();
        if Self::is_valid(&raw) {
            Ok(Self(raw))
        } else {
            Err(SchemaError::InvalidName { name: raw })
        }
    }

    /// Check the identifier grammar without constructing a name.
    pub fn is_valid(raw: &str) -> bool {
        let mut chars = raw.chars();
        match chars.next() {
            Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
            _ => return false,
        }
        chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
    }

    /// The original casing, as supplied.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The case-folded shadow key used for map lookups.
    pub fn key(&self) -> String {
        self.0.to_ascii_lowercase()
    }

    /// Case-insensitive comparison against a raw string.
    pub fn matches(&self, other: &str) -> bool {
        self.0.eq_ignore_ascii_case(other)
    }
}

impl PartialEq for SchemaName {
    fn eq(&self, other: &Self) -> bool {
        self.0.eq_ignore_ascii_case(&other.0)
    }
}

impl Eq for SchemaName {}

impl Hash for SchemaName {
    fn hash<H: Hasher>(&self, state: &mut H) {
        for b in self.0.bytes() {
            state.write_u8(b.to_ascii_lowercase());
        }
    }
}

impl fmt::Display for SchemaName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for SchemaName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A cross-schema reference of the form `SchemaName.ItemName`.
///
/// An absent schema segment means "this schema". The original textual
/// form round-trips through `Display`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QualifiedName {
    schema: Option<SchemaName>,
    item: SchemaName,
}

impl QualifiedName {
    pub fn new(schema: Option<SchemaName>, item: SchemaName) -> Self {
        Self { schema, item }
    }

    /// Parse `"Schema.Item"` or a bare `"Item"`.
    pub fn parse(raw: &str) -> Result<Self> {
        match raw.rsplit_once('.') {
            Some((schema, item)) => Ok(Self {
                schema: Some(SchemaName::new(schema)?),
                item: SchemaName::new(item)?,
            }),
            None => Ok(Self {
                schema: None,
                item: SchemaName::new(raw)?,
            }),
        }
    }

    pub fn schema(&self) -> Option<&SchemaName> {
        self.schema.as_ref()
    }

    pub fn item(&self) -> &SchemaName {
        &self.item
    }
}

impl fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.schema {
            Some(schema) => write!(f, "{}.{}", schema, self.item),
            None => write!(f, "{}", self.item),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_names() {
        assert!(SchemaName::new("OneValue").is_ok());
        assert!(SchemaName::new("_private").is_ok());
        assert!(SchemaName::new("A1_b2").is_ok());
    }

    #[test]
    fn test_invalid_names() {
        assert!(SchemaName::new("").is_err());
        assert!(SchemaName::new("5FiveValue").is_err());
        assert!(SchemaName::new("has space").is_err());
        assert!(SchemaName::new("dot.ted").is_err());
    }

    #[test]
    fn test_case_insensitive_equality() {
        let a = SchemaName::new("OneValue").unwrap();
        let b = SchemaName::new("ONEVALUE").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.key(), b.key());
        assert_eq!(a.as_str(), "OneValue");
        assert_eq!(b.as_str(), "ONEVALUE");
    }

    #[test]
    fn test_qualified_name_parsing() {
        let qualified = QualifiedName::parse("TestSchema.TestClass").unwrap();
        assert_eq!(qualified.schema().unwrap().as_str(), "TestSchema");
        assert_eq!(qualified.item().as_str(), "TestClass");
        assert_eq!(qualified.to_string(), "TestSchema.TestClass");

        let bare = QualifiedName::parse("TestClass").unwrap();
        assert!(bare.schema().is_none());
        assert_eq!(bare.to_string(), "TestClass");
    }

    #[test]
    fn test_qualified_name_rejects_extra_segments() {
        assert!(QualifiedName::parse("A.B.C").is_err());
        assert!(QualifiedName::parse(".Item").is_err());
    }
}
