//! Schema aggregate and two-phase deserialization
//!
//! A schema is the root aggregate: a versioned name, a set of references
//! to other schemas, and an ordered, case-insensitively keyed collection
//! of schema items. Loading runs in two phases over the generic tree:
//! phase 1 declares an empty, schema-bound instance for every item so
//! identity exists before any reference is chased; phase 2 populates each
//! item from its sub-tree, resolving names against the same schema or
//! against referenced schemas fetched through the locater. Forward and
//! circular references within one schema therefore always resolve.

use indexmap::IndexMap;
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, trace};

use crate::custom_attribute::CustomAttributeContainer;
use crate::error::{Result, SchemaError};
use crate::item::{optional_array, optional_str, required_str, SchemaItem, SchemaItemType};
use crate::locater::SchemaLocater;
use crate::name::{QualifiedName, SchemaName};
use crate::version::SchemaVersion;

/// Identity of a schema: name plus three-part version.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SchemaKey {
    name: SchemaName,
    version: SchemaVersion,
}

impl SchemaKey {
    pub fn new(name: SchemaName, version: SchemaVersion) -> Self {
        Self { name, version }
    }

    pub fn name(&self) -> &SchemaName {
        &self.name
    }

    pub fn version(&self) -> &SchemaVersion {
        &self.version
    }
}

impl fmt::Display for SchemaKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.name, self.version)
    }
}

/// A named, versioned collection of schema items.
#[derive(Debug, Clone)]
pub struct Schema {
    key: SchemaKey,
    alias: Option<String>,
    label: Option<String>,
    description: Option<String>,
    references: Vec<Arc<Schema>>,
    items: IndexMap<String, SchemaItem>,
    custom_attributes: CustomAttributeContainer,
}

impl Schema {
    /// Create an empty schema with the given identity.
    pub fn new(key: SchemaKey) -> Self {
        Self {
            key,
            alias: None,
            label: None,
            description: None,
            references: Vec::new(),
            items: IndexMap::new(),
            custom_attributes: CustomAttributeContainer::new(),
        }
    }

    pub fn key(&self) -> &SchemaKey {
        &self.key
    }

    pub fn name(&self) -> &SchemaName {
        &self.key.name
    }

    pub fn version(&self) -> &SchemaVersion {
        &self.key.version
    }

    pub fn alias(&self) -> Option<&str> {
        self.alias.as_deref()
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Directly referenced schemas.
    pub fn references(&self) -> &[Arc<Schema>] {
        &self.references
    }

    pub fn custom_attributes(&self) -> &CustomAttributeContainer {
        &self.custom_attributes
    }

    /// Items in declaration order.
    pub fn items(&self) -> impl Iterator<Item = &SchemaItem> {
        self.items.values()
    }

    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    /// Look up an item by name, case-insensitively.
    pub fn get_item(&self, name: &str) -> Option<&SchemaItem> {
        self.items.get(&name.to_ascii_lowercase())
    }

    /// Resolve a qualified name against this schema or its references
    /// (transitively). An absent schema segment means this schema.
    pub fn resolve_item(&self, qualified: &QualifiedName) -> Option<&SchemaItem> {
        match qualified.schema() {
            None => self.get_item(qualified.item().as_str()),
            Some(schema) if schema == &self.key.name => self.get_item(qualified.item().as_str()),
            Some(schema) => {
                find_schema(&self.references, schema)?.get_item(qualified.item().as_str())
            }
        }
    }

    /// Insert an item built outside of deserialization.
    ///
    /// This is the programmatic builder path; consumers of loaded schemas
    /// only ever see the read-only contract.
    pub fn add_item(&mut self, item: SchemaItem) -> Result<()> {
        let fold = item.name().key();
        if self.items.contains_key(&fold) {
            return Err(SchemaError::DuplicateItemName {
                schema: self.key.name.to_string(),
                name: item.name().to_string(),
            });
        }
        self.items.insert(fold, item);
        Ok(())
    }

    /// Add a reference to another schema.
    pub fn add_reference(&mut self, schema: Arc<Schema>) -> Result<()> {
        check_reference(
            &self.key.name,
            schema.name(),
            self.references.iter().map(|r| r.name()),
        )?;
        self.references.push(schema);
        Ok(())
    }

    /// Deserialize a schema from a generic tree, resolving referenced
    /// schemas through the locater without suspension.
    ///
    /// Fails with [`SchemaError::AsyncResolutionRequired`] when a
    /// reference would need an asynchronous fetch.
    pub fn from_json_sync(tree: &Value, locater: &dyn SchemaLocater) -> Result<Schema> {
        let root = root_object(tree)?;
        let header = SchemaHeader::parse(root)?;
        let mut references = Vec::with_capacity(header.references.len());
        for key in &header.references {
            let resolved = locater
                .get_schema(key)?
                .ok_or_else(|| header.unresolved_reference(key))?;
            trace!(schema = %header.key, reference = %key, "resolved schema reference");
            references.push(resolved);
        }
        build(header, references, root)
    }

    /// Deserialize a schema from a generic tree, suspending while the
    /// locater fetches referenced schemas.
    ///
    /// Validation is shared with [`Schema::from_json_sync`]; the paths
    /// differ only in how the locater is invoked.
    pub async fn from_json(tree: &Value, locater: &dyn SchemaLocater) -> Result<Schema> {
        let root = root_object(tree)?;
        let header = SchemaHeader::parse(root)?;
        let mut references = Vec::with_capacity(header.references.len());
        for key in &header.references {
            let resolved = locater
                .get_schema_async(key)
                .await?
                .ok_or_else(|| header.unresolved_reference(key))?;
            trace!(schema = %header.key, reference = %key, "resolved schema reference");
            references.push(resolved);
        }
        build(header, references, root)
    }

    /// Serialize to the same shape deserialization accepts.
    pub fn to_json(&self) -> Value {
        let mut out = Map::new();
        out.insert("name".into(), Value::String(self.key.name.as_str().into()));
        out.insert(
            "version".into(),
            Value::String(self.key.version.to_string()),
        );
        if let Some(alias) = &self.alias {
            out.insert("alias".into(), Value::String(alias.clone()));
        }
        if let Some(label) = &self.label {
            out.insert("label".into(), Value::String(label.clone()));
        }
        if let Some(description) = &self.description {
            out.insert("description".into(), Value::String(description.clone()));
        }
        if !self.references.is_empty() {
            let references = self
                .references
                .iter()
                .map(|r| {
                    let mut entry = Map::new();
                    entry.insert("name".into(), Value::String(r.name().as_str().into()));
                    entry.insert("version".into(), Value::String(r.version().to_string()));
                    Value::Object(entry)
                })
                .collect();
            out.insert("references".into(), Value::Array(references));
        }
        if let Some(attributes) = self.custom_attributes.to_json() {
            out.insert("customAttributes".into(), attributes);
        }
        if !self.items.is_empty() {
            let mut items = Map::new();
            for item in self.items.values() {
                items.insert(item.name().as_str().to_string(), item.to_json());
            }
            out.insert("items".into(), Value::Object(items));
        }
        Value::Object(out)
    }
}

/// The header fields of a schema document, parsed before any reference
/// resolution or item work.
struct SchemaHeader {
    key: SchemaKey,
    alias: Option<String>,
    label: Option<String>,
    description: Option<String>,
    references: Vec<SchemaKey>,
}

impl SchemaHeader {
    fn parse(root: &Map<String, Value>) -> Result<Self> {
        let name = SchemaName::new(required_str(root, "name", "schema document")?)?;
        let context = format!("Schema {}", name);
        let version = SchemaVersion::parse(required_str(root, "version", &context)?)?;
        let key = SchemaKey::new(name, version);

        let mut references = Vec::new();
        if let Some(entries) = optional_array(root, "references")? {
            for entry in entries {
                let tree = entry.as_object().ok_or_else(|| {
                    SchemaError::InvalidFormat(format!(
                        "references entries in {} must be objects",
                        context
                    ))
                })?;
                let ref_context = format!("references of {}", context);
                let ref_name = SchemaName::new(required_str(tree, "name", &ref_context)?)?;
                let ref_version = SchemaVersion::parse(required_str(tree, "version", &ref_context)?)?;
                check_reference(key.name(), &ref_name, references.iter().map(SchemaKey::name))?;
                references.push(SchemaKey::new(ref_name, ref_version));
            }
        }

        Ok(Self {
            key,
            alias: optional_str(root, "alias")?.map(String::from),
            label: optional_str(root, "label")?.map(String::from),
            description: optional_str(root, "description")?.map(String::from),
            references,
        })
    }

    fn unresolved_reference(&self, reference: &SchemaKey) -> SchemaError {
        SchemaError::UnresolvedReference {
            name: reference.to_string(),
            context: format!("Schema {}", self.key.name),
        }
    }
}

fn root_object(tree: &Value) -> Result<&Map<String, Value>> {
    tree.as_object().ok_or_else(|| {
        SchemaError::InvalidFormat("schema document must be an object".to_string())
    })
}

fn check_reference<'a>(
    schema: &SchemaName,
    reference: &SchemaName,
    mut existing: impl Iterator<Item = &'a SchemaName>,
) -> Result<()> {
    if reference == schema {
        return Err(SchemaError::SelfReference {
            schema: schema.to_string(),
        });
    }
    if existing.any(|name| name == reference) {
        return Err(SchemaError::DuplicateSchemaReference {
            schema: reference.to_string(),
        });
    }
    Ok(())
}

/// Build the schema once its references are resolved. Shared by the sync
/// and async entry points; everything below here is pure in-memory work.
fn build(
    header: SchemaHeader,
    references: Vec<Arc<Schema>>,
    root: &Map<String, Value>,
) -> Result<Schema> {
    debug!(schema = %header.key, "deserializing schema");

    let items_tree = match root.get("items") {
        Some(Value::Object(items)) => Some(items),
        Some(_) => {
            return Err(SchemaError::InvalidFormat(format!(
                "field 'items' in Schema {} must be an object",
                header.key.name
            )))
        }
        None => None,
    };

    // Phase 1: declare every item so identity exists before any
    // reference is chased. Only structural errors can occur here.
    let mut items: IndexMap<String, SchemaItem> = IndexMap::new();
    let mut declared: IndexMap<String, SchemaItemType> = IndexMap::new();
    if let Some(items_tree) = items_tree {
        for (raw_name, item_tree) in items_tree {
            let name = SchemaName::new(raw_name.clone())?;
            let tree = item_object(raw_name, item_tree)?;
            let kind_name =
                required_str(tree, "schemaItemType", &format!("schema item '{}'", raw_name))?;
            let kind = SchemaItemType::parse(kind_name).ok_or_else(|| {
                SchemaError::InvalidFormat(format!(
                    "unknown schemaItemType '{}' on schema item '{}'",
                    kind_name, raw_name
                ))
            })?;
            let fold = name.key();
            if items.contains_key(&fold) {
                return Err(SchemaError::DuplicateItemName {
                    schema: header.key.name.to_string(),
                    name: raw_name.clone(),
                });
            }
            trace!(item = %name, kind = kind.as_str(), "declared schema item");
            declared.insert(fold.clone(), kind);
            items.insert(fold, SchemaItem::placeholder(kind, header.key.clone(), name));
        }
    }

    // Phase 2: populate in declaration order. Resolution sees every
    // declared identity plus the referenced schemas; a resolvable item is
    // not necessarily populated yet.
    let resolver = ItemResolver {
        schema_name: &header.key.name,
        declared: &declared,
        references: &references,
    };
    if let Some(items_tree) = items_tree {
        // Phase 1 inserted one item per tree entry in the same order, so
        // the two sequences line up.
        for ((_, item), (raw_name, item_tree)) in items.iter_mut().zip(items_tree) {
            let tree = item_object(raw_name, item_tree)?;
            item.deserialize(tree, &resolver)?;
        }
    }

    let mut custom_attributes = CustomAttributeContainer::new();
    if let Some(attributes) = optional_array(root, "customAttributes")? {
        custom_attributes.deserialize(
            attributes,
            &resolver,
            &format!("Schema {}", header.key.name),
        )?;
    }

    debug!(schema = %header.key, items = items.len(), "schema deserialized");
    Ok(Schema {
        key: header.key,
        alias: header.alias,
        label: header.label,
        description: header.description,
        references,
        items,
        custom_attributes,
    })
}

fn item_object<'a>(name: &str, tree: &'a Value) -> Result<&'a Map<String, Value>> {
    tree.as_object().ok_or_else(|| {
        SchemaError::InvalidFormat(format!("schema item '{}' must be an object", name))
    })
}

/// The resolution view handed to item deserializers during phase 2:
/// the declared identities of this schema plus its resolved references.
pub(crate) struct ItemResolver<'a> {
    schema_name: &'a SchemaName,
    declared: &'a IndexMap<String, SchemaItemType>,
    references: &'a [Arc<Schema>],
}

/// What resolution yields: enough identity to kind-check a reference,
/// deliberately not the populated item.
pub(crate) struct ResolvedRef {
    pub(crate) item_type: SchemaItemType,
}

impl ItemResolver<'_> {
    pub(crate) fn resolve(&self, qualified: &QualifiedName, context: &str) -> Result<ResolvedRef> {
        let unresolved = || SchemaError::UnresolvedReference {
            name: qualified.to_string(),
            context: context.to_string(),
        };
        let local = |resolver: &Self| {
            resolver
                .declared
                .get(&qualified.item().key())
                .map(|kind| ResolvedRef { item_type: *kind })
                .ok_or_else(unresolved)
        };
        match qualified.schema() {
            None => local(self),
            Some(schema) if schema == self.schema_name => local(self),
            Some(schema) => {
                let found = find_schema(self.references, schema).ok_or_else(unresolved)?;
                found
                    .get_item(qualified.item().as_str())
                    .map(|item| ResolvedRef {
                        item_type: item.item_type(),
                    })
                    .ok_or_else(unresolved)
            }
        }
    }
}

/// Depth-first search through the reference closure, cycle-safe.
fn find_schema<'a>(references: &'a [Arc<Schema>], name: &SchemaName) -> Option<&'a Schema> {
    let mut visited: HashSet<String> = HashSet::new();
    let mut pending: Vec<&'a Schema> = references.iter().map(Arc::as_ref).collect();
    while let Some(schema) = pending.pop() {
        if !visited.insert(schema.name().key()) {
            continue;
        }
        if schema.name() == name {
            return Some(schema);
        }
        pending.extend(schema.references.iter().map(Arc::as_ref));
    }
    None
}
