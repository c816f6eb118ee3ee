//! Schema item kinds and the common item contract
//!
//! Every named member of a schema shares the same core record (name,
//! label, description, owning schema) and the same lifecycle: constructed
//! empty and schema-bound in the declaration phase, populated from its
//! sub-tree in the population phase, read-only afterwards. Item kinds are
//! a closed set dispatched by the `schemaItemType` discriminator, with a
//! visitor for double dispatch.

use serde_json::{Map, Value};

use crate::classes::{CustomAttributeClass, EntityClass, Mixin, StructClass};
use crate::enumeration::Enumeration;
use crate::error::{Result, SchemaError};
use crate::name::SchemaName;
use crate::relationship::RelationshipClass;
use crate::schema::{ItemResolver, SchemaKey};

/// Discriminator for the closed set of schema item kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SchemaItemType {
    EntityClass,
    StructClass,
    Mixin,
    CustomAttributeClass,
    RelationshipClass,
    Enumeration,
}

impl SchemaItemType {
    /// Parse the wire discriminator.
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "EntityClass" => Some(SchemaItemType::EntityClass),
            "StructClass" => Some(SchemaItemType::StructClass),
            "Mixin" => Some(SchemaItemType::Mixin),
            "CustomAttributeClass" => Some(SchemaItemType::CustomAttributeClass),
            "RelationshipClass" => Some(SchemaItemType::RelationshipClass),
            "Enumeration" => Some(SchemaItemType::Enumeration),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SchemaItemType::EntityClass => "EntityClass",
            SchemaItemType::StructClass => "StructClass",
            SchemaItemType::Mixin => "Mixin",
            SchemaItemType::CustomAttributeClass => "CustomAttributeClass",
            SchemaItemType::RelationshipClass => "RelationshipClass",
            SchemaItemType::Enumeration => "Enumeration",
        }
    }

    /// Whether items of this kind may appear at a relationship endpoint.
    pub fn is_constraint_compatible(&self) -> bool {
        matches!(
            self,
            SchemaItemType::EntityClass
                | SchemaItemType::RelationshipClass
                | SchemaItemType::Mixin
        )
    }
}

/// The record every schema item embeds: name, label, description, and a
/// non-owning back-reference to the owning schema.
#[derive(Debug, Clone)]
pub struct ItemInfo {
    name: SchemaName,
    label: Option<String>,
    description: Option<String>,
    schema: SchemaKey,
}

impl ItemInfo {
    pub(crate) fn new(schema: SchemaKey, name: SchemaName) -> Self {
        Self {
            name,
            label: None,
            description: None,
            schema,
        }
    }

    pub fn name(&self) -> &SchemaName {
        &self.name
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Key of the owning schema.
    pub fn schema(&self) -> &SchemaKey {
        &self.schema
    }

    /// Read the fields common to all item kinds.
    pub(crate) fn deserialize_common(&mut self, tree: &Map<String, Value>) -> Result<()> {
        // A redundant in-item name must agree with the item map key.
        if let Some(name) = optional_str(tree, "name")? {
            if !self.name.matches(name) {
                return Err(SchemaError::InvalidFormat(format!(
                    "item '{}' declares a mismatched name '{}'",
                    self.name, name
                )));
            }
        }
        self.label = optional_str(tree, "label")?.map(String::from);
        self.description = optional_str(tree, "description")?.map(String::from);
        Ok(())
    }

    /// Write the common fields into an item's serialized map.
    pub(crate) fn serialize_common(&self, out: &mut Map<String, Value>) {
        if let Some(label) = &self.label {
            out.insert("label".into(), Value::String(label.clone()));
        }
        if let Some(description) = &self.description {
            out.insert("description".into(), Value::String(description.clone()));
        }
    }
}

/// A schema item of any kind.
#[derive(Debug, Clone)]
pub enum SchemaItem {
    EntityClass(EntityClass),
    StructClass(StructClass),
    Mixin(Mixin),
    CustomAttributeClass(CustomAttributeClass),
    RelationshipClass(RelationshipClass),
    Enumeration(Enumeration),
}

impl SchemaItem {
    /// Construct the empty, schema-bound placeholder for a declared item.
    pub(crate) fn placeholder(
        item_type: SchemaItemType,
        schema: SchemaKey,
        name: SchemaName,
    ) -> Self {
        match item_type {
            SchemaItemType::EntityClass => SchemaItem::EntityClass(EntityClass::new(schema, name)),
            SchemaItemType::StructClass => SchemaItem::StructClass(StructClass::new(schema, name)),
            SchemaItemType::Mixin => SchemaItem::Mixin(Mixin::new(schema, name)),
            SchemaItemType::CustomAttributeClass => {
                SchemaItem::CustomAttributeClass(CustomAttributeClass::new(schema, name))
            }
            SchemaItemType::RelationshipClass => {
                SchemaItem::RelationshipClass(RelationshipClass::new(schema, name))
            }
            SchemaItemType::Enumeration => {
                SchemaItem::Enumeration(Enumeration::new(schema, name, None))
            }
        }
    }

    pub fn item_type(&self) -> SchemaItemType {
        match self {
            SchemaItem::EntityClass(_) => SchemaItemType::EntityClass,
            SchemaItem::StructClass(_) => SchemaItemType::StructClass,
            SchemaItem::Mixin(_) => SchemaItemType::Mixin,
            SchemaItem::CustomAttributeClass(_) => SchemaItemType::CustomAttributeClass,
            SchemaItem::RelationshipClass(_) => SchemaItemType::RelationshipClass,
            SchemaItem::Enumeration(_) => SchemaItemType::Enumeration,
        }
    }

    pub fn info(&self) -> &ItemInfo {
        match self {
            SchemaItem::EntityClass(item) => item.info(),
            SchemaItem::StructClass(item) => item.info(),
            SchemaItem::Mixin(item) => item.info(),
            SchemaItem::CustomAttributeClass(item) => item.info(),
            SchemaItem::RelationshipClass(item) => item.info(),
            SchemaItem::Enumeration(item) => item.info(),
        }
    }

    pub fn name(&self) -> &SchemaName {
        self.info().name()
    }

    /// Double-dispatch over the item kind.
    pub fn accept(&self, visitor: &mut dyn SchemaItemVisitor) {
        match self {
            SchemaItem::EntityClass(item) => visitor.visit_entity_class(item),
            SchemaItem::StructClass(item) => visitor.visit_struct_class(item),
            SchemaItem::Mixin(item) => visitor.visit_mixin(item),
            SchemaItem::CustomAttributeClass(item) => visitor.visit_custom_attribute_class(item),
            SchemaItem::RelationshipClass(item) => visitor.visit_relationship_class(item),
            SchemaItem::Enumeration(item) => visitor.visit_enumeration(item),
        }
    }

    /// Populate this item from its sub-tree (population phase).
    pub(crate) fn deserialize(
        &mut self,
        tree: &Map<String, Value>,
        resolver: &ItemResolver<'_>,
    ) -> Result<()> {
        match self {
            SchemaItem::EntityClass(item) => item.deserialize(tree, resolver),
            SchemaItem::StructClass(item) => item.deserialize(tree, resolver),
            SchemaItem::Mixin(item) => item.deserialize(tree, resolver),
            SchemaItem::CustomAttributeClass(item) => item.deserialize(tree, resolver),
            SchemaItem::RelationshipClass(item) => item.deserialize(tree, resolver),
            SchemaItem::Enumeration(item) => item.deserialize(tree),
        }
    }

    /// Serialize to the same shape deserialization accepts.
    pub fn to_json(&self) -> Value {
        match self {
            SchemaItem::EntityClass(item) => item.to_json(),
            SchemaItem::StructClass(item) => item.to_json(),
            SchemaItem::Mixin(item) => item.to_json(),
            SchemaItem::CustomAttributeClass(item) => item.to_json(),
            SchemaItem::RelationshipClass(item) => item.to_json(),
            SchemaItem::Enumeration(item) => item.to_json(),
        }
    }
}

/// Visitor over schema item kinds.
///
/// All methods default to no-ops so a visitor overrides only the kinds it
/// cares about.
pub trait SchemaItemVisitor {
    fn visit_entity_class(&mut self, _class: &EntityClass) {}
    fn visit_struct_class(&mut self, _class: &StructClass) {}
    fn visit_mixin(&mut self, _mixin: &Mixin) {}
    fn visit_custom_attribute_class(&mut self, _class: &CustomAttributeClass) {}
    fn visit_relationship_class(&mut self, _class: &RelationshipClass) {}
    fn visit_enumeration(&mut self, _enumeration: &Enumeration) {}
}

// --- Tree access helpers shared by the item deserializers ---

/// Read a required string field.
pub(crate) fn required_str<'a>(
    tree: &'a Map<String, Value>,
    field: &str,
    context: &str,
) -> Result<&'a str> {
    match tree.get(field) {
        Some(Value::String(s)) => Ok(s),
        Some(_) => Err(SchemaError::InvalidFormat(format!(
            "field '{}' in {} must be a string",
            field, context
        ))),
        None => Err(SchemaError::MissingRequiredField {
            field: field.to_string(),
            context: context.to_string(),
        }),
    }
}

/// Read an optional string field, rejecting non-string values.
pub(crate) fn optional_str<'a>(tree: &'a Map<String, Value>, field: &str) -> Result<Option<&'a str>> {
    match tree.get(field) {
        Some(Value::String(s)) => Ok(Some(s)),
        Some(_) => Err(SchemaError::InvalidFormat(format!(
            "field '{}' must be a string",
            field
        ))),
        None => Ok(None),
    }
}

/// Read an optional boolean field, rejecting non-boolean values.
pub(crate) fn optional_bool(tree: &Map<String, Value>, field: &str) -> Result<Option<bool>> {
    match tree.get(field) {
        Some(Value::Bool(b)) => Ok(Some(*b)),
        Some(_) => Err(SchemaError::InvalidFormat(format!(
            "field '{}' must be a boolean",
            field
        ))),
        None => Ok(None),
    }
}

/// Read an optional array field, rejecting non-array values.
pub(crate) fn optional_array<'a>(
    tree: &'a Map<String, Value>,
    field: &str,
) -> Result<Option<&'a Vec<Value>>> {
    match tree.get(field) {
        Some(Value::Array(values)) => Ok(Some(values)),
        Some(_) => Err(SchemaError::InvalidFormat(format!(
            "field '{}' must be an array",
            field
        ))),
        None => Ok(None),
    }
}
