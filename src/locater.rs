//! Schema location and caching
//!
//! The engine never performs I/O itself; referenced schemas are fetched
//! through the [`SchemaLocater`] capability. A locater may resolve
//! synchronously (in-memory caches) or require suspension (network or
//! slow-store backed implementations), in which case its synchronous path
//! reports [`SchemaError::AsyncResolutionRequired`] instead of blocking.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;

use crate::error::{Result, SchemaError};
use crate::schema::{Schema, SchemaKey};

/// Resolves schema keys to loaded schemas.
///
/// Name matching is case-insensitive; version matching is exact.
#[async_trait]
pub trait SchemaLocater: Send + Sync {
    /// Resolve without suspension.
    ///
    /// Implementations that would need an asynchronous fetch must fail
    /// with [`SchemaError::AsyncResolutionRequired`] rather than block.
    fn get_schema(&self, key: &SchemaKey) -> Result<Option<Arc<Schema>>>;

    /// Resolve, suspending while the schema is fetched if necessary.
    async fn get_schema_async(&self, key: &SchemaKey) -> Result<Option<Arc<Schema>>>;
}

/// An in-memory schema cache satisfying both locater paths.
#[derive(Debug, Default)]
pub struct SchemaContext {
    schemas: HashMap<String, Arc<Schema>>,
}

impl SchemaContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a schema, taking ownership. Fails when a schema with the
    /// same key is already registered.
    pub fn add_schema(&mut self, schema: Schema) -> Result<Arc<Schema>> {
        let key = cache_key(schema.key());
        if self.schemas.contains_key(&key) {
            return Err(SchemaError::DuplicateSchema {
                schema: schema.key().to_string(),
            });
        }
        let schema = Arc::new(schema);
        self.schemas.insert(key, Arc::clone(&schema));
        Ok(schema)
    }

    pub fn schemas(&self) -> impl Iterator<Item = &Arc<Schema>> {
        self.schemas.values()
    }
}

fn cache_key(key: &SchemaKey) -> String {
    format!("{}.{}", key.name().key(), key.version())
}

#[async_trait]
impl SchemaLocater for SchemaContext {
    fn get_schema(&self, key: &SchemaKey) -> Result<Option<Arc<Schema>>> {
        Ok(self.schemas.get(&cache_key(key)).cloned())
    }

    async fn get_schema_async(&self, key: &SchemaKey) -> Result<Option<Arc<Schema>>> {
        self.get_schema(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::name::SchemaName;
    use crate::version::SchemaVersion;

    fn key(name: &str) -> SchemaKey {
        SchemaKey::new(SchemaName::new(name).unwrap(), SchemaVersion::new(1, 0, 0))
    }

    #[test]
    fn test_add_and_get() {
        let mut context = SchemaContext::new();
        context.add_schema(Schema::new(key("TestSchema"))).unwrap();

        let found = context.get_schema(&key("testschema")).unwrap();
        assert!(found.is_some());
        // Original casing is preserved on the stored schema.
        assert_eq!(found.unwrap().name().as_str(), "TestSchema");

        assert!(context.get_schema(&key("Other")).unwrap().is_none());
    }

    #[test]
    fn test_duplicate_registration_fails() {
        let mut context = SchemaContext::new();
        context.add_schema(Schema::new(key("TestSchema"))).unwrap();
        let err = context.add_schema(Schema::new(key("TESTSCHEMA"))).unwrap_err();
        assert!(matches!(err, SchemaError::DuplicateSchema { .. }));
    }

    #[test]
    fn test_version_match_is_exact() {
        let mut context = SchemaContext::new();
        context.add_schema(Schema::new(key("TestSchema"))).unwrap();
        let other_version = SchemaKey::new(
            SchemaName::new("TestSchema").unwrap(),
            SchemaVersion::new(2, 0, 0),
        );
        assert!(context.get_schema(&other_version).unwrap().is_none());
    }
}
