//! Relationship classes and endpoint constraints
//!
//! A relationship class models a typed, directional edge between two
//! endpoint constraint sets. Each constraint carries a multiplicity, a
//! polymorphism flag, a role label, and the set of classes permitted at
//! that endpoint.

use serde_json::{Map, Value};
use std::fmt;

use crate::custom_attribute::CustomAttributeContainer;
use crate::error::{Result, SchemaError};
use crate::item::{optional_array, optional_bool, optional_str, required_str, ItemInfo};
use crate::name::{QualifiedName, SchemaName};
use crate::schema::{ItemResolver, SchemaKey};

/// How strongly a relationship binds its endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrengthType {
    Referencing,
    Holding,
    Embedding,
}

impl StrengthType {
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "referencing" => Some(StrengthType::Referencing),
            "holding" => Some(StrengthType::Holding),
            "embedding" => Some(StrengthType::Embedding),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StrengthType::Referencing => "referencing",
            StrengthType::Holding => "holding",
            StrengthType::Embedding => "embedding",
        }
    }
}

/// Which endpoint the strength applies from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrengthDirection {
    Forward,
    Backward,
}

impl StrengthDirection {
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "forward" => Some(StrengthDirection::Forward),
            "backward" => Some(StrengthDirection::Backward),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StrengthDirection::Forward => "forward",
            StrengthDirection::Backward => "backward",
        }
    }
}

/// Identifies one endpoint of a relationship.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelationshipEnd {
    Source,
    Target,
}

impl RelationshipEnd {
    pub fn as_str(&self) -> &'static str {
        match self {
            RelationshipEnd::Source => "Source",
            RelationshipEnd::Target => "Target",
        }
    }
}

/// Bounds on the number of instances permitted at an endpoint, parsed
/// from the textual form `"(lower..upper)"` where upper may be `*`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Multiplicity {
    lower: u32,
    upper: Option<u32>,
}

impl Multiplicity {
    /// `(0..1)` — the default endpoint multiplicity.
    pub fn zero_one() -> Self {
        Self {
            lower: 0,
            upper: Some(1),
        }
    }

    pub fn new(lower: u32, upper: Option<u32>) -> Result<Self> {
        if let Some(upper) = upper {
            if lower > upper {
                return Err(SchemaError::MalformedMultiplicity {
                    text: format!("({}..{})", lower, upper),
                });
            }
        }
        Ok(Self { lower, upper })
    }

    /// Parse `"(lower..upper)"`, with `*` as the unbounded upper bound.
    pub fn parse(text: &str) -> Result<Self> {
        let malformed = || SchemaError::MalformedMultiplicity {
            text: text.to_string(),
        };
        let inner = text
            .strip_prefix('(')
            .and_then(|t| t.strip_suffix(')'))
            .ok_or_else(malformed)?;
        let (low, high) = inner.split_once("..").ok_or_else(malformed)?;
        let lower: u32 = low.trim().parse().map_err(|_| malformed())?;
        let upper = match high.trim() {
            "*" => None,
            bound => Some(bound.parse::<u32>().map_err(|_| malformed())?),
        };
        Multiplicity::new(lower, upper).map_err(|_| malformed())
    }

    pub fn lower(&self) -> u32 {
        self.lower
    }

    /// `None` means unbounded.
    pub fn upper(&self) -> Option<u32> {
        self.upper
    }
}

impl fmt::Display for Multiplicity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.upper {
            Some(upper) => write!(f, "({}..{})", self.lower, upper),
            None => write!(f, "({}..*)", self.lower),
        }
    }
}

/// One endpoint of a relationship: multiplicity, polymorphism, role
/// label, and the permitted endpoint classes.
#[derive(Debug, Clone)]
pub struct RelationshipConstraint {
    end: RelationshipEnd,
    polymorphic: bool,
    multiplicity: Multiplicity,
    role_label: Option<String>,
    constraint_classes: Vec<QualifiedName>,
    custom_attributes: CustomAttributeContainer,
}

impl RelationshipConstraint {
    pub(crate) fn new(end: RelationshipEnd) -> Self {
        Self {
            end,
            polymorphic: false,
            multiplicity: Multiplicity::zero_one(),
            role_label: None,
            constraint_classes: Vec::new(),
            custom_attributes: CustomAttributeContainer::new(),
        }
    }

    pub fn end(&self) -> RelationshipEnd {
        self.end
    }

    pub fn is_polymorphic(&self) -> bool {
        self.polymorphic
    }

    pub fn multiplicity(&self) -> &Multiplicity {
        &self.multiplicity
    }

    pub fn role_label(&self) -> Option<&str> {
        self.role_label.as_deref()
    }

    /// Permitted endpoint classes, as written in the document.
    pub fn constraint_classes(&self) -> &[QualifiedName] {
        &self.constraint_classes
    }

    pub fn custom_attributes(&self) -> &CustomAttributeContainer {
        &self.custom_attributes
    }

    pub(crate) fn deserialize(
        &mut self,
        tree: &Map<String, Value>,
        resolver: &ItemResolver<'_>,
        relationship: &SchemaName,
    ) -> Result<()> {
        let context = format!(
            "{} constraint of RelationshipClass {}",
            self.end.as_str(),
            relationship
        );

        if let Some(text) = optional_str(tree, "multiplicity")? {
            self.multiplicity = Multiplicity::parse(text)?;
        }
        if let Some(polymorphic) = optional_bool(tree, "polymorphic")? {
            self.polymorphic = polymorphic;
        }
        self.role_label = optional_str(tree, "roleLabel")?.map(String::from);

        let entries = optional_array(tree, "constraintClasses")?.ok_or_else(|| {
            SchemaError::MissingRequiredField {
                field: "constraintClasses".to_string(),
                context: context.clone(),
            }
        })?;
        for entry in entries {
            let raw = entry.as_str().ok_or_else(|| {
                SchemaError::InvalidFormat(format!(
                    "constraintClasses entries in {} must be strings",
                    context
                ))
            })?;
            let qualified = QualifiedName::parse(raw)?;
            let resolved = resolver.resolve(&qualified, &context)?;
            if !resolved.item_type.is_constraint_compatible() {
                return Err(SchemaError::IncompatibleConstraintClass {
                    class_name: raw.to_string(),
                    constraint: context.clone(),
                });
            }
            self.constraint_classes.push(qualified);
        }
        if self.constraint_classes.is_empty() {
            return Err(SchemaError::MissingRequiredField {
                field: "constraintClasses".to_string(),
                context,
            });
        }

        if let Some(attributes) = optional_array(tree, "customAttributes")? {
            self.custom_attributes
                .deserialize(attributes, resolver, &context)?;
        }
        Ok(())
    }

    pub(crate) fn to_json(&self) -> Value {
        let mut out = Map::new();
        out.insert("polymorphic".into(), Value::Bool(self.polymorphic));
        out.insert(
            "multiplicity".into(),
            Value::String(self.multiplicity.to_string()),
        );
        if let Some(role_label) = &self.role_label {
            out.insert("roleLabel".into(), Value::String(role_label.clone()));
        }
        out.insert(
            "constraintClasses".into(),
            Value::Array(
                self.constraint_classes
                    .iter()
                    .map(|q| Value::String(q.to_string()))
                    .collect(),
            ),
        );
        if let Some(attributes) = self.custom_attributes.to_json() {
            out.insert("customAttributes".into(), attributes);
        }
        Value::Object(out)
    }
}

/// A schema item modeling a typed edge between two endpoint constraints.
#[derive(Debug, Clone)]
pub struct RelationshipClass {
    info: ItemInfo,
    strength: StrengthType,
    strength_direction: StrengthDirection,
    source: RelationshipConstraint,
    target: RelationshipConstraint,
    custom_attributes: CustomAttributeContainer,
}

impl RelationshipClass {
    pub(crate) fn new(schema: SchemaKey, name: SchemaName) -> Self {
        Self {
            info: ItemInfo::new(schema, name),
            strength: StrengthType::Referencing,
            strength_direction: StrengthDirection::Forward,
            source: RelationshipConstraint::new(RelationshipEnd::Source),
            target: RelationshipConstraint::new(RelationshipEnd::Target),
            custom_attributes: CustomAttributeContainer::new(),
        }
    }

    pub fn info(&self) -> &ItemInfo {
        &self.info
    }

    pub fn strength(&self) -> StrengthType {
        self.strength
    }

    pub fn strength_direction(&self) -> StrengthDirection {
        self.strength_direction
    }

    pub fn source(&self) -> &RelationshipConstraint {
        &self.source
    }

    pub fn target(&self) -> &RelationshipConstraint {
        &self.target
    }

    pub fn custom_attributes(&self) -> &CustomAttributeContainer {
        &self.custom_attributes
    }

    pub(crate) fn deserialize(
        &mut self,
        tree: &Map<String, Value>,
        resolver: &ItemResolver<'_>,
    ) -> Result<()> {
        let context = format!("RelationshipClass {}", self.info.name());
        self.info.deserialize_common(tree)?;

        let strength = required_str(tree, "strength", &context)?;
        self.strength = StrengthType::parse(strength).ok_or_else(|| {
            SchemaError::InvalidFormat(format!(
                "invalid strength '{}' on {}",
                strength, context
            ))
        })?;
        if let Some(direction) = optional_str(tree, "strengthDirection")? {
            self.strength_direction = StrengthDirection::parse(direction).ok_or_else(|| {
                SchemaError::InvalidFormat(format!(
                    "invalid strengthDirection '{}' on {}",
                    direction, context
                ))
            })?;
        }

        let name = self.info.name().clone();
        for (field, constraint) in [
            ("source", &mut self.source),
            ("target", &mut self.target),
        ] {
            let sub = tree
                .get(field)
                .ok_or_else(|| SchemaError::MissingRequiredField {
                    field: field.to_string(),
                    context: context.clone(),
                })?
                .as_object()
                .ok_or_else(|| {
                    SchemaError::InvalidFormat(format!(
                        "field '{}' in {} must be an object",
                        field, context
                    ))
                })?;
            constraint.deserialize(sub, resolver, &name)?;
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
            Value::String("RelationshipClass".into()),
        );
        self.info.serialize_common(&mut out);
        out.insert(
            "strength".into(),
            Value::String(self.strength.as_str().into()),
        );
        out.insert(
            "strengthDirection".into(),
            Value::String(self.strength_direction.as_str().into()),
        );
        out.insert("source".into(), self.source.to_json());
        out.insert("target".into(), self.target.to_json());
        if let Some(attributes) = self.custom_attributes.to_json() {
            out.insert("customAttributes".into(), attributes);
        }
        Value::Object(out)
    }
}
