//! Error types for schema deserialization and validation

use thiserror::Error;

/// Result type for schema operations
pub type Result<T> = std::result::Result<T, SchemaError>;

/// Schema metadata errors
///
/// Every deserialization entry point is fallible end-to-end; the first
/// error aborts the enclosing schema build and carries enough context to
/// identify the offending item and field.
#[derive(Error, Debug)]
pub enum SchemaError {
    #[error("'{name}' is not a valid name")]
    InvalidName { name: String },

    #[error("Schema {schema} already contains an item named '{name}'")]
    DuplicateItemName { schema: String, name: String },

    #[error("The Enumeration {enumeration} has a duplicate Enumerator with name '{name}'.")]
    DuplicateEnumeratorName { enumeration: String, name: String },

    #[error("The Enumeration {enumeration} has a duplicate Enumerator with value '{value}'.")]
    DuplicateEnumeratorValue { enumeration: String, value: String },

    #[error("The Enumeration {enumeration} has a backing type '{backing}' and an enumerator with value of type '{value}'.")]
    BackingTypeMismatch {
        enumeration: String,
        backing: String,
        value: String,
    },

    #[error("Unable to resolve '{name}' referenced by {context}")]
    UnresolvedReference { name: String, context: String },

    #[error("Malformed multiplicity: '{text}'")]
    MalformedMultiplicity { text: String },

    #[error("Malformed version: '{text}' (expected 'read.write.minor')")]
    MalformedVersion { text: String },

    #[error("Missing required field '{field}' in {context}")]
    MissingRequiredField { field: String, context: String },

    #[error("'{class_name}' is not a valid constraint class for the {constraint} constraint")]
    IncompatibleConstraintClass {
        class_name: String,
        constraint: String,
    },

    #[error("Schema {schema} cannot reference itself")]
    SelfReference { schema: String },

    #[error("Schema {schema} is referenced more than once")]
    DuplicateSchemaReference { schema: String },

    #[error("Schema {schema} is already registered")]
    DuplicateSchema { schema: String },

    #[error("Resolving schema {schema} requires asynchronous resolution")]
    AsyncResolutionRequired { schema: String },

    #[error("Invalid schema format: {0}")]
    InvalidFormat(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
