//! Whole-schema loading: references, round-trips, and the sync/async split

use async_trait::async_trait;
use serde_json::json;
use std::sync::Arc;

use metaschema::{
    Enumeration, RelationshipClass, Result, Schema, SchemaContext, SchemaError, SchemaItemVisitor,
    SchemaKey, SchemaLocater,
};

/// A locater that refuses synchronous resolution, standing in for a
/// network-backed implementation.
struct AsyncOnlyLocater {
    inner: SchemaContext,
}

#[async_trait]
impl SchemaLocater for AsyncOnlyLocater {
    fn get_schema(&self, key: &SchemaKey) -> Result<Option<Arc<Schema>>> {
        Err(SchemaError::AsyncResolutionRequired {
            schema: key.to_string(),
        })
    }

    async fn get_schema_async(&self, key: &SchemaKey) -> Result<Option<Arc<Schema>>> {
        self.inner.get_schema_async(key).await
    }
}

fn base_schema_json() -> serde_json::Value {
    json!({
        "name": "BaseSchema",
        "version": "1.0.0",
        "items": {
            "BaseEntity": { "schemaItemType": "EntityClass" },
            "BaseCA": { "schemaItemType": "CustomAttributeClass", "appliesTo": "Any" },
        },
    })
}

fn referencing_schema_json() -> serde_json::Value {
    json!({
        "name": "TestSchema",
        "version": "2.0.1",
        "references": [ { "name": "BaseSchema", "version": "1.0.0" } ],
        "items": {
            "LocalEntity": {
                "schemaItemType": "EntityClass",
                "customAttributes": [
                    { "className": "BaseSchema.BaseCA", "Priority": 3 },
                ],
            },
            "TestRelationship": {
                "schemaItemType": "RelationshipClass",
                "strength": "embedding",
                "strengthDirection": "backward",
                "source": {
                    "polymorphic": true,
                    "multiplicity": "(1..1)",
                    "roleLabel": "owns",
                    "constraintClasses": [ "LocalEntity" ],
                },
                "target": {
                    "polymorphic": false,
                    "multiplicity": "(0..*)",
                    "roleLabel": "is owned by",
                    "constraintClasses": [ "BaseSchema.BaseEntity" ],
                },
            },
        },
    })
}

fn loaded_context() -> SchemaContext {
    let mut context = SchemaContext::new();
    let base = Schema::from_json_sync(&base_schema_json(), &context).unwrap();
    context.add_schema(base).unwrap();
    context
}

#[test]
fn cross_schema_references_resolve_sync() {
    let context = loaded_context();
    let schema = Schema::from_json_sync(&referencing_schema_json(), &context).unwrap();
    assert_eq!(schema.references().len(), 1);
    assert_eq!(schema.references()[0].name().as_str(), "BaseSchema");

    let relationship = match schema.get_item("TestRelationship") {
        Some(metaschema::SchemaItem::RelationshipClass(r)) => r,
        other => panic!("expected RelationshipClass, got {:?}", other),
    };
    assert_eq!(
        relationship.target().constraint_classes()[0].to_string(),
        "BaseSchema.BaseEntity"
    );
}

#[tokio::test]
async fn cross_schema_references_resolve_async() {
    let locater = AsyncOnlyLocater {
        inner: loaded_context(),
    };
    let schema = Schema::from_json(&referencing_schema_json(), &locater)
        .await
        .unwrap();
    assert_eq!(schema.references().len(), 1);
}

#[test]
fn sync_path_fails_when_resolution_requires_suspension() {
    let locater = AsyncOnlyLocater {
        inner: loaded_context(),
    };
    let err = Schema::from_json_sync(&referencing_schema_json(), &locater).unwrap_err();
    assert!(matches!(err, SchemaError::AsyncResolutionRequired { .. }));
}

#[test]
fn unresolvable_schema_reference_fails() {
    let context = SchemaContext::new();
    let err = Schema::from_json_sync(&referencing_schema_json(), &context).unwrap_err();
    match err {
        SchemaError::UnresolvedReference { name, .. } => {
            assert_eq!(name, "BaseSchema.1.0.0");
        }
        other => panic!("expected UnresolvedReference, got {}", other),
    }
}

#[test]
fn qualified_names_resolve_transitively() {
    // TopSchema -> MidSchema -> BaseSchema; TopSchema names a BaseSchema
    // class without referencing BaseSchema directly.
    let mut context = SchemaContext::new();
    let base = Schema::from_json_sync(&base_schema_json(), &context).unwrap();
    context.add_schema(base).unwrap();

    let mid = json!({
        "name": "MidSchema",
        "version": "1.0.0",
        "references": [ { "name": "BaseSchema", "version": "1.0.0" } ],
    });
    let mid = Schema::from_json_sync(&mid, &context).unwrap();
    context.add_schema(mid).unwrap();

    let top = json!({
        "name": "TopSchema",
        "version": "1.0.0",
        "references": [ { "name": "MidSchema", "version": "1.0.0" } ],
        "items": {
            "Derived": {
                "schemaItemType": "EntityClass",
                "baseClass": "BaseSchema.BaseEntity",
            },
        },
    });
    let top = Schema::from_json_sync(&top, &context).unwrap();
    let derived = match top.get_item("Derived") {
        Some(metaschema::SchemaItem::EntityClass(c)) => c,
        other => panic!("expected EntityClass, got {:?}", other),
    };
    assert_eq!(
        derived.base_class().unwrap().to_string(),
        "BaseSchema.BaseEntity"
    );
    assert!(top
        .resolve_item(derived.base_class().unwrap())
        .is_some());
}

#[test]
fn round_trip_is_structurally_equal() {
    let original_json = json!({
        "name": "RoundTrip",
        "version": "3.1.4",
        "label": "Round Trip",
        "items": {
            "Color": {
                "schemaItemType": "Enumeration",
                "type": "int",
                "isStrict": true,
                "enumerators": [
                    { "name": "Red", "value": 1, "label": "red" },
                    { "name": "Green", "value": 2 },
                    { "name": "Blue", "value": 3, "description": "the third color" },
                ],
            },
            "Widget": { "schemaItemType": "EntityClass", "label": "A widget" },
            "Gadget": { "schemaItemType": "EntityClass", "baseClass": "Widget" },
            "WidgetHasGadgets": {
                "schemaItemType": "RelationshipClass",
                "strength": "holding",
                "source": {
                    "polymorphic": true,
                    "multiplicity": "(0..1)",
                    "roleLabel": "has",
                    "constraintClasses": [ "Widget" ],
                },
                "target": {
                    "polymorphic": false,
                    "multiplicity": "(0..*)",
                    "roleLabel": "belongs to",
                    "constraintClasses": [ "Gadget" ],
                },
            },
        },
    });
    let context = SchemaContext::new();
    let schema = Schema::from_json_sync(&original_json, &context).unwrap();
    let serialized = schema.to_json();
    let reloaded = Schema::from_json_sync(&serialized, &context).unwrap();

    assert_eq!(serialized, reloaded.to_json());

    // Item declaration order survives the trip.
    let names: Vec<_> = reloaded.items().map(|i| i.name().as_str().to_string()).collect();
    assert_eq!(names, ["Color", "Widget", "Gadget", "WidgetHasGadgets"]);

    // Enumerator order and multiplicities survive too.
    let color = match reloaded.get_item("Color") {
        Some(metaschema::SchemaItem::Enumeration(e)) => e,
        other => panic!("expected Enumeration, got {:?}", other),
    };
    let values: Vec<_> = color.enumerators().iter().map(|e| e.name().as_str()).collect();
    assert_eq!(values, ["Red", "Green", "Blue"]);

    let relationship = match reloaded.get_item("WidgetHasGadgets") {
        Some(metaschema::SchemaItem::RelationshipClass(r)) => r,
        other => panic!("expected RelationshipClass, got {:?}", other),
    };
    assert_eq!(relationship.source().multiplicity().to_string(), "(0..1)");
    assert_eq!(relationship.target().multiplicity().to_string(), "(0..*)");
}

#[test]
fn schema_level_custom_attributes_round_trip() {
    let tree = json!({
        "name": "Decorated",
        "version": "1.0.0",
        "customAttributes": [
            { "className": "Marker", "Note": "applies to the schema itself" },
        ],
        "items": {
            "Marker": { "schemaItemType": "CustomAttributeClass", "appliesTo": "Schema" },
        },
    });
    let context = SchemaContext::new();
    let schema = Schema::from_json_sync(&tree, &context).unwrap();
    let attribute = schema.custom_attributes().get("Marker").unwrap();
    assert_eq!(attribute["Note"], "applies to the schema itself");

    let reloaded = Schema::from_json_sync(&schema.to_json(), &context).unwrap();
    assert_eq!(schema.to_json(), reloaded.to_json());
}

#[test]
fn visitor_dispatches_by_kind() {
    #[derive(Default)]
    struct Census {
        enumerations: Vec<String>,
        relationships: Vec<String>,
    }

    impl SchemaItemVisitor for Census {
        fn visit_enumeration(&mut self, enumeration: &Enumeration) {
            self.enumerations.push(enumeration.info().name().to_string());
        }

        fn visit_relationship_class(&mut self, class: &RelationshipClass) {
            self.relationships.push(class.info().name().to_string());
        }
    }

    let context = loaded_context();
    let mut tree = referencing_schema_json();
    tree["items"]["Mood"] = json!({
        "schemaItemType": "Enumeration",
        "type": "string",
        "enumerators": [ { "name": "Happy", "value": "happy" } ],
    });
    let schema = Schema::from_json_sync(&tree, &context).unwrap();

    let mut census = Census::default();
    for item in schema.items() {
        item.accept(&mut census);
    }
    assert_eq!(census.enumerations, ["Mood"]);
    assert_eq!(census.relationships, ["TestRelationship"]);
}
