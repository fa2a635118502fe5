use std::sync::Arc;

use serde_json::{json, Value};

use schemantic::{Dialect, Draft, Error, Resolution, SchemaResolver, Validator};

#[test]
fn null_type_accepts_null() {
    let mut validator = Validator::new();
    let uri = validator
        .register_schema(&json!({"type": ["null"]}))
        .expect("Invalid schema");
    let result = validator.validate(uri.as_str(), &json!(null)).expect("Unknown URI");
    assert!(result.is_valid());
    assert!(result.errors().is_empty());
}

#[test]
fn empty_type_array_is_rejected_by_the_meta_schema() {
    let mut validator = Validator::new();
    let error = validator
        .register_schema(&json!({"type": []}))
        .expect_err("Should fail");
    match error {
        Error::InvalidSchema { errors, .. } => assert!(!errors.is_empty()),
        other => panic!("Expected InvalidSchema, got {other:?}"),
    }
}

#[test]
fn custom_meta_schema_limits_schema_shape() {
    let mut validator = schemantic::options()
        .with_dialect(Dialect::custom("urn:custom", Draft::Draft202012).expect("Invalid URI"))
        .build_validator();
    validator
        .register_schema_at("urn:custom", &json!({"type": "object", "maxProperties": 2}))
        .expect("Invalid meta-schema");

    // Two properties pass the custom meta-schema
    validator
        .register_schema(&json!({"type": "string", "maxLength": 1}))
        .expect("Invalid schema");

    // Three properties violate it
    let error = validator
        .register_schema(&json!({"type": "string", "maxLength": 1, "minLength": 1}))
        .expect_err("Should fail");
    assert!(matches!(error, Error::InvalidSchema { .. }));
}

#[test]
fn unresolvable_meta_schema_is_its_own_error() {
    let mut validator = schemantic::options()
        .with_dialect(Dialect::custom("urn:custom", Draft::Draft202012).expect("Invalid URI"))
        .build_validator();
    let error = validator
        .register_schema(&json!({"type": "string"}))
        .expect_err("Should fail");
    match error {
        Error::MetaSchemaResolving { uri, .. } => assert_eq!(uri, "urn:custom"),
        other => panic!("Expected MetaSchemaResolving, got {other:?}"),
    }
}

fn self_described_resource(body: &str) -> Value {
    json!({
        "$id": "urn:outer",
        "type": "object",
        "properties": {
            "prop": {
                "$schema": "urn:recursive-schema",
                "$id": "urn:recursive-schema",
                "type": body
            }
        }
    })
}

#[test]
fn embedded_resource_with_its_own_meta_schema() {
    // The embedded resource is its own meta-schema; being an object, it
    // satisfies `{"type": "object"}`
    let mut validator = Validator::new();
    validator
        .register_schema_at("urn:outer", &self_described_resource("object"))
        .expect("Invalid schema");
    assert!(validator.is_valid("urn:outer", &json!({})).expect("Unknown URI"));
    assert!(validator
        .is_valid("urn:recursive-schema", &json!({}))
        .expect("Unknown URI"));

    // With `type: null` the embedded resource can no longer describe itself
    let mut validator = Validator::new();
    let error = validator
        .register_schema_at("urn:outer", &self_described_resource("null"))
        .expect_err("Should fail");
    assert!(matches!(error, Error::InvalidSchema { .. }));
}

#[test]
fn failed_registration_rolls_the_registry_back() {
    let mut validator = Validator::new();
    validator
        .register_schema_at("urn:schema1", &json!({"$id": "urn:passing"}))
        .expect("Invalid schema");

    // A resource whose meta-schema is itself and rejects itself
    let error = validator
        .register_schema(&json!({
            "$id": "urn:recursive-schema",
            "$schema": "urn:recursive-schema",
            "type": "null"
        }))
        .expect_err("Should fail");
    assert!(matches!(error, Error::InvalidSchema { .. }));

    // Everything registered before the failed call still works
    assert!(validator.is_valid("urn:schema1", &json!({})).expect("Unknown URI"));
    assert!(validator.is_valid("urn:passing", &json!({})).expect("Unknown URI"));
    // Nothing of the failed call survived, not even the outer `$id`
    match validator.validate("urn:recursive-schema", &json!(null)) {
        Err(Error::SchemaNotFound { reference }) => {
            assert_eq!(reference, "urn:recursive-schema");
        }
        other => panic!("Expected SchemaNotFound, got {other:?}"),
    }
}

#[test]
fn dynamic_anchors_resolve_through_the_callers_scope() {
    let mut validator = Validator::new();
    validator
        .register_schema_at(
            "urn:a",
            &json!({
                "$id": "urn:a",
                "$dynamicRef": "#meta",
                "$defs": {
                    "content": {"$dynamicAnchor": "meta", "type": "string"}
                }
            }),
        )
        .expect("Invalid schema");
    validator
        .register_schema_at(
            "urn:b",
            &json!({
                "$id": "urn:b",
                "$ref": "urn:a",
                "$defs": {
                    "content": {"$dynamicAnchor": "meta", "type": "integer"}
                }
            }),
        )
        .expect("Invalid schema");

    // Entering through B, B's anchor redefinition wins
    assert!(validator.is_valid("urn:b", &json!(42)).expect("Unknown URI"));
    assert!(!validator.is_valid("urn:b", &json!("x")).expect("Unknown URI"));
    // Entering through A alone, A's own anchor applies
    assert!(!validator.is_valid("urn:a", &json!(42)).expect("Unknown URI"));
    assert!(validator.is_valid("urn:a", &json!("x")).expect("Unknown URI"));
}

#[test]
fn recursive_anchors_walk_to_the_outermost_root() {
    let mut validator = schemantic::options()
        .with_draft(Draft::Draft201909)
        .build_validator();
    validator
        .register_schema_at(
            "urn:tree",
            &json!({
                "$id": "urn:tree",
                "$recursiveAnchor": true,
                "type": "object",
                "properties": {
                    "children": {"type": "array", "items": {"$recursiveRef": "#"}}
                }
            }),
        )
        .expect("Invalid schema");
    validator
        .register_schema_at(
            "urn:strict-tree",
            &json!({
                "$id": "urn:strict-tree",
                "$recursiveAnchor": true,
                "$ref": "urn:tree",
                "unevaluatedProperties": false
            }),
        )
        .expect("Invalid schema");

    let sneaky = json!({"children": [{"extra": 1}]});
    // The plain tree does not constrain extra properties
    assert!(validator.is_valid("urn:tree", &sneaky).expect("Unknown URI"));
    // Entered through the strict tree, the recursive reference bounces back
    // to the strict root, which rejects them
    assert!(!validator.is_valid("urn:strict-tree", &sneaky).expect("Unknown URI"));
    assert!(validator
        .is_valid("urn:strict-tree", &json!({"children": [{"children": []}]}))
        .expect("Unknown URI"));
}

#[test]
fn self_referential_schema_fails_instead_of_overflowing() {
    let mut validator = Validator::new();
    validator
        .register_schema_at("x", &json!({"$id": "x", "$ref": "x"}))
        .expect("Invalid schema");
    let result = validator.validate("x", &json!(1)).expect("Unknown URI");
    assert!(!result.is_valid());
    assert!(result.errors()[0]
        .value()
        .to_string()
        .contains("Infinite recursion"));
}

#[test]
fn meta_schemas_validate_against_themselves() {
    let mut validator = Validator::new();
    // Any registration pulls the dialect meta-schemas in
    validator
        .register_schema(&json!({"type": "string"}))
        .expect("Invalid schema");
    for path in [
        "metaschemas/draft2020-12/schema.json",
        "metaschemas/draft2020-12/meta/core.json",
        "metaschemas/draft2020-12/meta/validation.json",
    ] {
        let document: Value =
            serde_json::from_str(&std::fs::read_to_string(path).expect("Missing meta-schema file"))
                .expect("Invalid meta-schema file");
        let result = validator
            .validate("https://json-schema.org/draft/2020-12/schema", &document)
            .expect("Unknown URI");
        assert!(result.is_valid(), "{path} failed the meta-schema");
    }
}

#[test]
fn external_documents_come_from_the_resolver_chain() {
    struct Remote;
    impl SchemaResolver for Remote {
        fn resolve(&self, uri: &str) -> Resolution {
            match uri {
                "https://example.com/name" => {
                    Resolution::FromString(r#"{"type": "string", "minLength": 1}"#.to_string())
                }
                "https://example.com/person" => Resolution::from_provider(|| {
                    Ok(json!({
                        "type": "object",
                        "properties": {"name": {"$ref": "name"}},
                        "required": ["name"]
                    }))
                }),
                _ => Resolution::Empty,
            }
        }
    }

    let mut validator = schemantic::options()
        .with_resolver(Arc::new(Remote))
        .build_validator();
    let uri = validator
        .register_schema(&json!({"$ref": "https://example.com/person"}))
        .expect("Invalid schema");
    assert!(validator
        .is_valid(uri.as_str(), &json!({"name": "Ada"}))
        .expect("Unknown URI"));
    assert!(!validator
        .is_valid(uri.as_str(), &json!({"name": ""}))
        .expect("Unknown URI"));
    assert!(!validator.is_valid(uri.as_str(), &json!({})).expect("Unknown URI"));
}

#[test]
fn keyword_order_is_independent_of_source_order() {
    let first = json!({
        "properties": {"a": {"type": "integer"}},
        "unevaluatedProperties": false
    });
    let second = json!({
        "unevaluatedProperties": false,
        "properties": {"a": {"type": "integer"}}
    });
    for schema in [first, second] {
        assert!(schemantic::is_valid(&schema, &json!({"a": 1})).expect("Invalid schema"));
        assert!(!schemantic::is_valid(&schema, &json!({"b": 1})).expect("Invalid schema"));
    }
}

#[test]
fn anchors_are_addressable_by_fragment() {
    let mut validator = Validator::new();
    validator
        .register_schema_at(
            "urn:doc",
            &json!({
                "$defs": {
                    "named": {"$anchor": "point", "type": "integer"}
                },
                "$ref": "#point"
            }),
        )
        .expect("Invalid schema");
    assert!(validator.is_valid("urn:doc", &json!(3)).expect("Unknown URI"));
    assert!(validator.is_valid("urn:doc#point", &json!(3)).expect("Unknown URI"));
    assert!(!validator.is_valid("urn:doc#point", &json!("x")).expect("Unknown URI"));
}

#[test]
fn embedded_resources_keep_both_addresses() {
    let mut validator = Validator::new();
    validator
        .register_schema_at(
            "urn:outer",
            &json!({
                "properties": {
                    "inner": {
                        "$id": "urn:inner",
                        "properties": {
                            "deep": {"type": "integer"}
                        }
                    }
                }
            }),
        )
        .expect("Invalid schema");
    // Via the embedded base URI, with re-based pointers
    assert!(!validator
        .is_valid("urn:inner#/properties/deep", &json!("x"))
        .expect("Unknown URI"));
    // Via the outer document pointers
    assert!(!validator
        .is_valid("urn:outer#/properties/inner/properties/deep", &json!("x"))
        .expect("Unknown URI"));
}

#[test]
fn unknown_uris_are_programmer_errors() {
    let validator = Validator::new();
    let error = validator
        .validate("urn:never", &json!(null))
        .expect_err("Should fail");
    assert_eq!(error.to_string(), "Schema 'urn:never' is not registered");
}
