//! Custom attribute containers
//!
//! Schema items, relationship constraints, and schemas themselves can carry
//! instances of custom attribute classes defined elsewhere in a schema. An
//! instance is an open property bag; the bag's shape is deliberately not
//! validated against the class definition here. The container only enforces
//! that the referenced class resolves to a `CustomAttributeClass`.

use indexmap::IndexMap;
use serde_json::{Map, Value};

use crate::error::{Result, SchemaError};
use crate::item::SchemaItemType;
use crate::name::QualifiedName;
use crate::schema::ItemResolver;

/// An ordered collection of custom attribute instances, keyed by the
/// qualified name of their class.
///
/// Keys are case-sensitive verbatim strings; qualified names are not
/// subject to the case-folding used for item names. Applying the same
/// class twice overwrites the earlier instance (last write wins).
#[derive(Debug, Clone, Default)]
pub struct CustomAttributeContainer {
    attributes: IndexMap<String, Map<String, Value>>,
}

impl CustomAttributeContainer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up an attribute instance by the qualified name of its class.
    pub fn get(&self, class_name: &str) -> Option<&Map<String, Value>> {
        self.attributes.get(class_name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Map<String, Value>)> {
        self.attributes.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    /// Apply each attribute in the list, resolving its class first.
    pub(crate) fn deserialize(
        &mut self,
        attributes: &[Value],
        resolver: &ItemResolver<'_>,
        context: &str,
    ) -> Result<()> {
        for entry in attributes {
            let tree = entry.as_object().ok_or_else(|| {
                SchemaError::InvalidFormat(format!(
                    "custom attribute on {} must be an object",
                    context
                ))
            })?;
            let class_name = match tree.get("className") {
                Some(Value::String(s)) => s,
                Some(_) => {
                    return Err(SchemaError::InvalidFormat(format!(
                        "custom attribute 'className' on {} must be a string",
                        context
                    )))
                }
                None => {
                    return Err(SchemaError::MissingRequiredField {
                        field: "className".to_string(),
                        context: context.to_string(),
                    })
                }
            };

            let qualified = QualifiedName::parse(class_name)?;
            let resolved = resolver.resolve(&qualified, context)?;
            if resolved.item_type != SchemaItemType::CustomAttributeClass {
                return Err(SchemaError::UnresolvedReference {
                    name: class_name.clone(),
                    context: context.to_string(),
                });
            }

            let mut bag = Map::new();
            for (key, value) in tree {
                if key != "className" {
                    bag.insert(key.clone(), value.clone());
                }
            }
            // Last write wins when the same class is applied twice.
            self.attributes.insert(class_name.clone(), bag);
        }
        Ok(())
    }

    /// Serialize back to the list shape deserialization accepts, in
    /// insertion order with `className` leading each entry.
    pub(crate) fn to_json(&self) -> Option<Value> {
        if self.attributes.is_empty() {
            return None;
        }
        let entries = self
            .attributes
            .iter()
            .map(|(class_name, bag)| {
                let mut tree = Map::new();
                tree.insert("className".into(), Value::String(class_name.clone()));
                for (key, value) in bag {
                    tree.insert(key.clone(), value.clone());
                }
                Value::Object(tree)
            })
            .collect();
        Some(Value::Array(entries))
    }
}
