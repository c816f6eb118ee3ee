//! Enumeration behavior through full schema loading

use serde_json::json;

use metaschema::{Schema, SchemaContext, SchemaError, SchemaItem};

fn schema_with_items(items: serde_json::Value) -> serde_json::Value {
    json!({
        "name": "TestSchema",
        "version": "1.2.3",
        "items": items,
    })
}

fn get_enumeration<'a>(schema: &'a Schema, name: &str) -> &'a metaschema::Enumeration {
    match schema.get_item(name) {
        Some(SchemaItem::Enumeration(e)) => e,
        other => panic!("expected an Enumeration named '{}', got {:?}", name, other),
    }
}

#[test]
fn minimum_values() {
    let tree = schema_with_items(json!({
        "testEnum": {
            "schemaItemType": "Enumeration",
            "type": "string",
            "description": "Test description",
            "label": "Test Enumeration",
            "isStrict": true,
            "enumerators": [ { "name": "testEnumerator", "value": "test" } ],
        },
    }));
    let context = SchemaContext::new();
    let schema = Schema::from_json_sync(&tree, &context).unwrap();
    let e = get_enumeration(&schema, "testEnum");
    assert_eq!(e.info().description(), Some("Test description"));
    assert_eq!(e.info().label(), Some("Test Enumeration"));
    assert!(e.is_strict());
    assert_eq!(e.enumerators().len(), 1);
}

#[tokio::test]
async fn minimum_values_async() {
    let tree = schema_with_items(json!({
        "testEnum": {
            "schemaItemType": "Enumeration",
            "type": "int",
            "enumerators": [ { "name": "ZeroValue", "value": 0, "label": "None" } ],
        },
    }));
    let context = SchemaContext::new();
    let schema = Schema::from_json(&tree, &context).await.unwrap();
    let e = get_enumeration(&schema, "testEnum");
    assert!(e.is_int());
    assert_eq!(e.get_enumerator(0).unwrap().label(), Some("None"));
}

#[test]
fn int_enumeration_with_labeled_enumerators() {
    let tree = schema_with_items(json!({
        "TestEnumeration": {
            "schemaItemType": "Enumeration",
            "type": "int",
            "isStrict": false,
            "enumerators": [
                { "name": "SixValue", "value": 6 },
                { "name": "EightValue", "value": 8, "label": "An enumerator label" },
            ],
        },
    }));
    let context = SchemaContext::new();
    let schema = Schema::from_json_sync(&tree, &context).unwrap();
    let e = get_enumeration(&schema, "TestEnumeration");

    assert_eq!(e.get_enumerator(6).unwrap().name().as_str(), "SixValue");
    assert_eq!(
        e.get_enumerator(8).unwrap().label(),
        Some("An enumerator label")
    );

    // Serialization reproduces the backing type and both enumerators
    // with their original field sets.
    let out = e.to_json();
    assert_eq!(out["type"], "int");
    let enumerators = out["enumerators"].as_array().unwrap();
    assert_eq!(enumerators.len(), 2);
    assert_eq!(enumerators[0]["name"], "SixValue");
    assert_eq!(enumerators[0]["value"], 6);
    assert!(enumerators[0].get("label").is_none());
    assert_eq!(enumerators[1]["name"], "EightValue");
    assert_eq!(enumerators[1]["label"], "An enumerator label");
}

#[test]
fn duplicate_name_case_variants() {
    let tree = schema_with_items(json!({
        "TestEnumeration": {
            "schemaItemType": "Enumeration",
            "type": "string",
            "enumerators": [
                { "name": "ONEVALUE", "value": "one" },
                { "name": "onevalue", "value": "two" },
            ],
        },
    }));
    let context = SchemaContext::new();
    let err = Schema::from_json_sync(&tree, &context).unwrap_err();
    match err {
        SchemaError::DuplicateEnumeratorName { enumeration, name } => {
            assert_eq!(enumeration, "TestEnumeration");
            // The second occurrence's casing, as it appeared in the document.
            assert_eq!(name, "onevalue");
        }
        other => panic!("expected DuplicateEnumeratorName, got {}", other),
    }
}

#[test]
fn duplicate_value() {
    let tree = schema_with_items(json!({
        "TestEnumeration": {
            "schemaItemType": "Enumeration",
            "type": "int",
            "enumerators": [
                { "name": "SixValue", "value": 6 },
                { "name": "EightValue", "value": 6 },
            ],
        },
    }));
    let context = SchemaContext::new();
    let err = Schema::from_json_sync(&tree, &context).unwrap_err();
    assert!(matches!(err, SchemaError::DuplicateEnumeratorValue { .. }));
}

#[test]
fn string_value_for_int_backing_type_is_not_coerced() {
    let tree = schema_with_items(json!({
        "TestEnumeration": {
            "schemaItemType": "Enumeration",
            "type": "int",
            "enumerators": [ { "name": "SixValue", "value": "6" } ],
        },
    }));
    let context = SchemaContext::new();
    let err = Schema::from_json_sync(&tree, &context).unwrap_err();
    assert!(matches!(err, SchemaError::BackingTypeMismatch { .. }));
}

#[test]
fn enumerator_name_with_leading_digit() {
    let tree = schema_with_items(json!({
        "TestEnumeration": {
            "schemaItemType": "Enumeration",
            "type": "string",
            "enumerators": [ { "name": "5FiveValue", "value": "five" } ],
        },
    }));
    let context = SchemaContext::new();
    let err = Schema::from_json_sync(&tree, &context).unwrap_err();
    match err {
        SchemaError::InvalidName { name } => assert_eq!(name, "5FiveValue"),
        other => panic!("expected InvalidName, got {}", other),
    }
}

#[test]
fn enumerator_lookup_by_name_is_case_insensitive() {
    let tree = schema_with_items(json!({
        "TestEnumeration": {
            "schemaItemType": "Enumeration",
            "type": "string",
            "enumerators": [
                { "name": "OneValue", "value": "one", "description": "description for the first value" },
                { "name": "FourValue", "value": "four", "label": "Label for the fourth value" },
            ],
        },
    }));
    let context = SchemaContext::new();
    let schema = Schema::from_json_sync(&tree, &context).unwrap();
    let e = get_enumeration(&schema, "TestEnumeration");
    assert_eq!(
        e.get_enumerator_by_name("onevalue").unwrap().description(),
        Some("description for the first value")
    );
    assert_eq!(
        e.get_enumerator_by_name("fourVALUE").unwrap().label(),
        Some("Label for the fourth value")
    );
}
