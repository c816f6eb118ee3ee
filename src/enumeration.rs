//! Enumerations: fixed sets of named values over one backing type

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

use crate::error::{Result, SchemaError};
use crate::item::{optional_array, optional_bool, optional_str, required_str, ItemInfo};
use crate::name::SchemaName;
use crate::primitive::PrimitiveType;
use crate::schema::SchemaKey;

/// The value carried by one enumerator, matching the enumeration's
/// backing type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EnumValue {
    Int(i64),
    String(String),
}

impl EnumValue {
    /// The primitive type of this value.
    pub fn primitive_type(&self) -> PrimitiveType {
        match self {
            EnumValue::Int(_) => PrimitiveType::Integer,
            EnumValue::String(_) => PrimitiveType::String,
        }
    }

    /// Interpret a tree value as an enumerator value. Only integers and
    /// strings qualify; anything else (including floats and booleans) is
    /// rejected rather than coerced.
    pub(crate) fn from_tree(value: &Value) -> Option<Self> {
        serde_json::from_value(value.clone()).ok()
    }

    pub(crate) fn to_json(&self) -> Value {
        match self {
            EnumValue::Int(i) => Value::Number((*i).into()),
            EnumValue::String(s) => Value::String(s.clone()),
        }
    }
}

impl fmt::Display for EnumValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EnumValue::Int(i) => write!(f, "{}", i),
            EnumValue::String(s) => write!(f, "{}", s),
        }
    }
}

impl From<i64> for EnumValue {
    fn from(value: i64) -> Self {
        EnumValue::Int(value)
    }
}

impl From<&str> for EnumValue {
    fn from(value: &str) -> Self {
        EnumValue::String(value.to_string())
    }
}

/// One name/value entry within an enumeration.
#[derive(Debug, Clone)]
pub struct Enumerator {
    name: SchemaName,
    value: EnumValue,
    label: Option<String>,
    description: Option<String>,
}

impl Enumerator {
    pub fn name(&self) -> &SchemaName {
        &self.name
    }

    pub fn value(&self) -> &EnumValue {
        &self.value
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }
}

/// A schema item defining a fixed set of named values sharing one backing
/// primitive type (integer or string).
///
/// The backing type is declared once, either at construction or by the
/// first deserialization, and is immutable afterwards. Enumerators keep
/// their declaration order for serialization.
#[derive(Debug, Clone)]
pub struct Enumeration {
    info: ItemInfo,
    backing_type: Option<PrimitiveType>,
    is_strict: bool,
    enumerators: Vec<Enumerator>,
}

impl Enumeration {
    /// Create a schema-bound enumeration, optionally typed up front.
    pub fn new(schema: SchemaKey, name: SchemaName, backing_type: Option<PrimitiveType>) -> Self {
        Self {
            info: ItemInfo::new(schema, name),
            backing_type,
            is_strict: false,
            enumerators: Vec::new(),
        }
    }

    pub fn info(&self) -> &ItemInfo {
        &self.info
    }

    pub fn backing_type(&self) -> Option<PrimitiveType> {
        self.backing_type
    }

    pub fn is_strict(&self) -> bool {
        self.is_strict
    }

    pub fn is_int(&self) -> bool {
        self.backing_type == Some(PrimitiveType::Integer)
    }

    pub fn is_string(&self) -> bool {
        self.backing_type == Some(PrimitiveType::String)
    }

    /// Enumerators in declaration order.
    pub fn enumerators(&self) -> &[Enumerator] {
        &self.enumerators
    }

    /// Find an enumerator by value (exact comparison).
    pub fn get_enumerator(&self, value: impl Into<EnumValue>) -> Option<&Enumerator> {
        let value = value.into();
        self.enumerators.iter().find(|e| e.value == value)
    }

    /// Find an enumerator by name (case-insensitive).
    pub fn get_enumerator_by_name(&self, name: &str) -> Option<&Enumerator> {
        self.enumerators.iter().find(|e| e.name.matches(name))
    }

    /// Validate and build a new enumerator against this enumeration.
    ///
    /// Checks, in order: the value's type matches the backing type, the
    /// name is not already used (case-insensitively), the value is not
    /// already used (exact comparison). The enumerator is returned, not
    /// inserted; appending is reserved to the owning build path.
    pub fn create_enumerator(&self, name: &str, value: impl Into<EnumValue>) -> Result<Enumerator> {
        let value = value.into();
        let backing = self.backing_type.ok_or_else(|| {
            SchemaError::InvalidFormat(format!(
                "The Enumeration {} has no backing type",
                self.info.name()
            ))
        })?;
        if value.primitive_type() != backing {
            return Err(SchemaError::BackingTypeMismatch {
                enumeration: self.info.name().to_string(),
                backing: backing.type_name().to_string(),
                value: value.primitive_type().type_name().to_string(),
            });
        }
        if self.get_enumerator_by_name(name).is_some() {
            return Err(SchemaError::DuplicateEnumeratorName {
                enumeration: self.info.name().to_string(),
                name: name.to_string(),
            });
        }
        if self.enumerators.iter().any(|e| e.value == value) {
            return Err(SchemaError::DuplicateEnumeratorValue {
                enumeration: self.info.name().to_string(),
                value: value.to_string(),
            });
        }
        Ok(Enumerator {
            name: SchemaName::new(name)?,
            value,
            label: None,
            description: None,
        })
    }

    /// Privileged append, preserving declaration order.
    pub(crate) fn add_enumerator(&mut self, enumerator: Enumerator) {
        self.enumerators.push(enumerator);
    }

    /// Declare the backing type; fails when re-declaring a different one.
    pub(crate) fn set_backing_type(&mut self, backing: PrimitiveType) -> Result<()> {
        match self.backing_type {
            None => {
                self.backing_type = Some(backing);
                Ok(())
            }
            Some(existing) if existing == backing => Ok(()),
            Some(existing) => Err(SchemaError::InvalidFormat(format!(
                "The Enumeration {} already has a backing type '{}' and cannot be redeclared as '{}'",
                self.info.name(),
                existing.type_name(),
                backing.type_name()
            ))),
        }
    }

    pub(crate) fn deserialize(&mut self, tree: &Map<String, Value>) -> Result<()> {
        let context = format!("Enumeration {}", self.info.name());
        self.info.deserialize_common(tree)?;

        match optional_str(tree, "type")? {
            Some(type_name) => {
                let backing = PrimitiveType::parse(type_name)
                    .filter(PrimitiveType::is_enumeration_backing)
                    .ok_or_else(|| {
                        SchemaError::InvalidFormat(format!(
                            "The {} has an invalid 'type' attribute '{}'. It should be either 'int' or 'string'.",
                            context, type_name
                        ))
                    })?;
                self.set_backing_type(backing)?;
            }
            None if self.backing_type.is_none() => {
                return Err(SchemaError::MissingRequiredField {
                    field: "type".to_string(),
                    context,
                });
            }
            None => {}
        }

        if let Some(is_strict) = optional_bool(tree, "isStrict")? {
            self.is_strict = is_strict;
        }

        if let Some(entries) = optional_array(tree, "enumerators")? {
            for entry in entries {
                let tree = entry.as_object().ok_or_else(|| {
                    SchemaError::InvalidFormat(format!(
                        "enumerator in {} must be an object",
                        context
                    ))
                })?;
                let name = required_str(tree, "name", &context)?;
                let raw_value = tree.get("value").ok_or_else(|| {
                    SchemaError::MissingRequiredField {
                        field: "value".to_string(),
                        context: context.clone(),
                    }
                })?;
                let value = EnumValue::from_tree(raw_value).ok_or_else(|| {
                    SchemaError::InvalidFormat(format!(
                        "enumerator '{}' in {} has a value that is neither an integer nor a string",
                        name, context
                    ))
                })?;
                let mut enumerator = self.create_enumerator(name, value)?;
                enumerator.label = optional_str(tree, "label")?.map(String::from);
                enumerator.description = optional_str(tree, "description")?.map(String::from);
                self.add_enumerator(enumerator);
            }
        }
        Ok(())
    }

    pub fn to_json(&self) -> Value {
        let mut out = Map::new();
        out.insert("schemaItemType".into(), Value::String("Enumeration".into()));
        if let Some(backing) = self.backing_type {
            out.insert("type".into(), Value::String(backing.wire_name().into()));
        }
        out.insert("isStrict".into(), Value::Bool(self.is_strict));
        self.info.serialize_common(&mut out);
        let enumerators = self
            .enumerators
            .iter()
            .map(|e| {
                let mut tree = Map::new();
                tree.insert("name".into(), Value::String(e.name.as_str().into()));
                tree.insert("value".into(), e.value.to_json());
                if let Some(label) = &e.label {
                    tree.insert("label".into(), Value::String(label.clone()));
                }
                if let Some(description) = &e.description {
                    tree.insert("description".into(), Value::String(description.clone()));
                }
                Value::Object(tree)
            })
            .collect();
        out.insert("enumerators".into(), Value::Array(enumerators));
        Value::Object(out)
    }
}
