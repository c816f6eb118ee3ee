//! Entity, struct, mixin, and custom attribute class kinds
//!
//! These are the class-like schema items without relationship semantics.
//! Properties are out of scope; the kinds carry their base class links and
//! custom attributes so relationship endpoints and attribute applications
//! have something to resolve against.

use serde_json::{Map, Value};

use crate::custom_attribute::CustomAttributeContainer;
use crate::error::{Result, SchemaError};
use crate::item::{optional_array, optional_str, ItemInfo, SchemaItemType};
use crate::name::{QualifiedName, SchemaName};
use crate::schema::{ItemResolver, SchemaKey};

/// A concrete or abstract entity class.
#[derive(Debug, Clone)]
pub struct EntityClass {
    info: ItemInfo,
    base_class: Option<QualifiedName>,
    custom_attributes: CustomAttributeContainer,
}

/// A struct class: a named bundle of properties with no identity.
#[derive(Debug, Clone)]
pub struct StructClass {
    info: ItemInfo,
    base_class: Option<QualifiedName>,
    custom_attributes: CustomAttributeContainer,
}

/// A mixin: a capability applied to entity classes.
#[derive(Debug, Clone)]
pub struct Mixin {
    info: ItemInfo,
    base_class: Option<QualifiedName>,
    applies_to: Option<QualifiedName>,
    custom_attributes: CustomAttributeContainer,
}

/// The definition side of a custom attribute: items reference these by
/// qualified name when attributes are applied.
#[derive(Debug, Clone)]
pub struct CustomAttributeClass {
    info: ItemInfo,
    applies_to: Option<String>,
    custom_attributes: CustomAttributeContainer,
}

/// Resolve an optional `baseClass` field and require the base be of the
/// same kind as the derived item.
fn resolve_base_class(
    tree: &Map<String, Value>,
    resolver: &ItemResolver<'_>,
    expected: SchemaItemType,
    context: &str,
) -> Result<Option<QualifiedName>> {
    let Some(raw) = optional_str(tree, "baseClass")? else {
        return Ok(None);
    };
    let qualified = QualifiedName::parse(raw)?;
    let resolved = resolver.resolve(&qualified, context)?;
    if resolved.item_type != expected {
        return Err(SchemaError::InvalidFormat(format!(
            "baseClass '{}' of {} must be a {}",
            raw,
            context,
            expected.as_str()
        )));
    }
    Ok(Some(qualified))
}

impl EntityClass {
    pub(crate) fn new(schema: SchemaKey, name: SchemaName) -> Self {
        Self {
            info: ItemInfo::new(schema, name),
            base_class: None,
            custom_attributes: CustomAttributeContainer::new(),
        }
    }

    pub fn info(&self) -> &ItemInfo {
        &self.info
    }

    pub fn base_class(&self) -> Option<&QualifiedName> {
        self.base_class.as_ref()
    }

    pub fn custom_attributes(&self) -> &CustomAttributeContainer {
        &self.custom_attributes
    }

    pub(crate) fn deserialize(
        &mut self,
        tree: &Map<String, Value>,
        resolver: &ItemResolver<'_>,
    ) -> Result<()> {
        let context = format!("EntityClass {}", self.info.name());
        self.info.deserialize_common(tree)?;
        self.base_class =
            resolve_base_class(tree, resolver, SchemaItemType::EntityClass, &context)?;
        if let Some(attributes) = optional_array(tree, "customAttributes")? {
            self.custom_attributes
                .deserialize(attributes, resolver, &context)?;
        }
        Ok(())
    }

    pub fn to_json(&self) -> Value {
        let mut out = Map::new();
        out.insert(
            "schemaItemType".into(),
            Value::String(SchemaItemType::EntityClass.as_str().into()),
        );
        self.info.serialize_common(&mut out);
        if let Some(base) = &self.base_class {
            out.insert("baseClass".into(), Value::String(base.to_string()));
        }
        if let Some(attributes) = self.custom_attributes.to_json() {
            out.insert("customAttributes".into(), attributes);
        }
        Value::Object(out)
    }
}

impl StructClass {
    pub(crate) fn new(schema: SchemaKey, name: SchemaName) -> Self {
        Self {
            info: ItemInfo::new(schema, name),
            base_class: None,
            custom_attributes: CustomAttributeContainer::new(),
        }
    }

    pub fn info(&self) -> &ItemInfo {
        &self.info
    }

    pub fn base_class(&self) -> Option<&QualifiedName> {
        self.base_class.as_ref()
    }

    pub fn custom_attributes(&self) -> &CustomAttributeContainer {
        &self.custom_attributes
    }

    pub(crate) fn deserialize(
        &mut self,
        tree: &Map<String, Value>,
        resolver: &ItemResolver<'_>,
    ) -> Result<()> {
        let context = format!("StructClass {}", self.info.name());
        self.info.deserialize_common(tree)?;
        self.base_class =
            resolve_base_class(tree, resolver, SchemaItemType::StructClass, &context)?;
        if let Some(attributes) = optional_array(tree, "customAttributes")? {
            self.custom_attributes
                .deserialize(attributes, resolver, &context)?;
        }
        Ok(())
    }

    pub fn to_json(&self) -> Value {
        let mut out = Map::new();
        out.insert(
            "schemaItemType".into(),
            Value::String(SchemaItemType::StructClass.as_str().into()),
        );
        self.info.serialize_common(&mut out);
        if let Some(base) = &self.base_class {
            out.insert("baseClass".into(), Value::String(base.to_string()));
        }
        if let Some(attributes) = self.custom_attributes.to_json() {
            out.insert("customAttributes".into(), attributes);
        }
        Value::Object(out)
    }
}

impl Mixin {
    pub(crate) fn new(schema: SchemaKey, name: SchemaName) -> Self {
        Self {
            info: ItemInfo::new(schema, name),
            base_class: None,
            applies_to: None,
            custom_attributes: CustomAttributeContainer::new(),
        }
    }

    pub fn info(&self) -> &ItemInfo {
        &self.info
    }

    pub fn base_class(&self) -> Option<&QualifiedName> {
        self.base_class.as_ref()
    }

    /// The entity class this mixin may be applied to.
    pub fn applies_to(&self) -> Option<&QualifiedName> {
        self.applies_to.as_ref()
    }

    pub fn custom_attributes(&self) -> &CustomAttributeContainer {
        &self.custom_attributes
    }

    pub(crate) fn deserialize(
        &mut self,
        tree: &Map<String, Value>,
        resolver: &ItemResolver<'_>,
    ) -> Result<()> {
        let context = format!("Mixin {}", self.info.name());
        self.info.deserialize_common(tree)?;
        self.base_class = resolve_base_class(tree, resolver, SchemaItemType::Mixin, &context)?;
        if let Some(raw) = optional_str(tree, "appliesTo")? {
            let qualified = QualifiedName::parse(raw)?;
            let resolved = resolver.resolve(&qualified, &context)?;
            if resolved.item_type != SchemaItemType::EntityClass {
                return Err(SchemaError::InvalidFormat(format!(
                    "appliesTo '{}' of {} must be an EntityClass",
                    raw, context
                )));
            }
            self.applies_to = Some(qualified);
        }
        if let Some(attributes) = optional_array(tree, "customAttributes")? {
            self.custom_attributes
                .deserialize(attributes, resolver, &context)?;
        }
        Ok(())
    }

    pub fn to_json(&self) -> Value {
        let mut out = Map::new();
        out.insert(
            "schemaItemType".into(),
            Value::String(SchemaItemType::Mixin.as_str().into()),
        );
        self.info.serialize_common(&mut out);
        if let Some(base) = &self.base_class {
            out.insert("baseClass".into(), Value::String(base.to_string()));
        }
        if let Some(applies_to) = &self.applies_to {
            out.insert("appliesTo".into(), Value::String(applies_to.to_string()));
        }
        if let Some(attributes) = self.custom_attributes.to_json() {
            out.insert("customAttributes".into(), attributes);
        }
        Value::Object(out)
    }
}

impl CustomAttributeClass {
    pub(crate) fn new(schema: SchemaKey, name: SchemaName) -> Self {
        Self {
            info: ItemInfo::new(schema, name),
            applies_to: None,
            custom_attributes: CustomAttributeContainer::new(),
        }
    }

    pub fn info(&self) -> &ItemInfo {
        &self.info
    }

    /// The declared application surface (e.g. `"Any"`), stored verbatim.
    pub fn applies_to(&self) -> Option<&str> {
        self.applies_to.as_deref()
    }

    pub fn custom_attributes(&self) -> &CustomAttributeContainer {
        &self.custom_attributes
    }

    pub(crate) fn deserialize(
        &mut self,
        tree: &Map<String, Value>,
        resolver: &ItemResolver<'_>,
    ) -> Result<()> {
        let context = format!("CustomAttributeClass {}", self.info.name());
        self.info.deserialize_common(tree)?;
        self.applies_to = optional_str(tree, "appliesTo")?.map(String::from);
        if let Some(attributes) = optional_array(tree, "customAttributes")? {
            self.custom_attributes
                .deserialize(attributes, resolver, &context)?;
        }
        Ok(())
    }

    pub fn to_json(&self) -> Value {
        let mut out = Map::new();
        out.insert(
            "schemaItemType".into(),
            Value::String(SchemaItemType::CustomAttributeClass.as_str().into()),
        );
        self.info.serialize_common(&mut out);
        if let Some(applies_to) = &self.applies_to {
            out.insert("appliesTo".into(), Value::String(applies_to.clone()));
        }
        if let Some(attributes) = self.custom_attributes.to_json() {
            out.insert("customAttributes".into(), attributes);
        }
        Value::Object(out)
    }
}
