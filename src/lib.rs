//! Schema Metadata Engine
//!
//! Loads declarative descriptions of domain models (classes, enumerations,
//! relationships, custom attributes) from generic key-value trees, builds an
//! in-memory object graph with cross-references resolved, and enforces the
//! structural rules that keep the model internally consistent.
//!
//! ## Features
//!
//! - **Case-Insensitive Identifiers**: names compare case-insensitively but
//!   keep their original casing for display and serialization
//! - **Two-Phase Loading**: items are declared before they are populated, so
//!   forward and circular references within a schema always resolve
//! - **Cross-Schema References**: qualified names resolve through referenced
//!   schemas, fetched synchronously or asynchronously via a [`SchemaLocater`]
//! - **Round-Trip Serialization**: a loaded schema serializes back to the
//!   shape it was read from, preserving casing, order, and field sets
//!
//! ## Loading
//!
//! ```text
//! generic tree (serde_json::Value)
//!   └─ Schema::from_json / from_json_sync
//!        ├─ phase 1: declare every item (identity only)
//!        └─ phase 2: populate items, resolving names against the
//!           schema and its references
//! ```

pub mod classes;
pub mod custom_attribute;
pub mod enumeration;
pub mod error;
pub mod item;
pub mod locater;
pub mod name;
pub mod primitive;
pub mod relationship;
pub mod schema;
pub mod version;

pub use classes::{CustomAttributeClass, EntityClass, Mixin, StructClass};
pub use custom_attribute::CustomAttributeContainer;
pub use enumeration::{EnumValue, Enumeration, Enumerator};
pub use error::{Result, SchemaError};
pub use item::{ItemInfo, SchemaItem, SchemaItemType, SchemaItemVisitor};
pub use locater::{SchemaContext, SchemaLocater};
pub use name::{QualifiedName, SchemaName};
pub use primitive::PrimitiveType;
pub use relationship::{
    Multiplicity, RelationshipClass, RelationshipConstraint, RelationshipEnd, StrengthDirection,
    StrengthType,
};
pub use schema::{Schema, SchemaKey};
pub use version::SchemaVersion;
