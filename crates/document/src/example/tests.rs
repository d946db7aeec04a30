//! Example synthesis tests

use super::*;
use serde_json::json;

fn schema(value: Value) -> RefOr<Schema> {
    serde_json::from_value(value).unwrap()
}

fn synthesize_in(document: &Value, value: Value) -> Value {
    ExampleSynthesizer::new(Resolver::new(document)).synthesize(&schema(value))
}

#[test]
fn test_explicit_example_then_default() {
    let doc = json!({});
    assert_eq!(
        synthesize_in(&doc, json!({ "type": "integer", "example": 42, "default": 7 })),
        json!(42)
    );
    assert_eq!(
        synthesize_in(&doc, json!({ "type": "integer", "default": 7 })),
        json!(7)
    );
}

#[test]
fn test_scalar_types() {
    let doc = json!({});
    assert_eq!(synthesize_in(&doc, json!({ "type": "integer" })), json!(0));
    assert_eq!(synthesize_in(&doc, json!({ "type": "number" })), json!(0));
    assert_eq!(synthesize_in(&doc, json!({ "type": "boolean" })), json!(true));
    assert_eq!(synthesize_in(&doc, json!({ "type": "string" })), json!("string"));
    assert_eq!(synthesize_in(&doc, json!({ "type": "file" })), Value::Null);
    assert_eq!(synthesize_in(&doc, json!({})), Value::Null);
}

#[test]
fn test_string_formats_and_enum() {
    let doc = json!({});
    let cases = [
        ("date", "2024-01-01"),
        ("date-time", "2024-01-01T12:00:00Z"),
        ("email", "user@example.com"),
        ("uri", "https://example.com"),
        ("uuid", EXAMPLE_UUID),
        ("password", "string"),
    ];
    for (format, expected) in cases {
        assert_eq!(
            synthesize_in(&doc, json!({ "type": "string", "format": format })),
            json!(expected),
            "format {format}"
        );
    }

    assert_eq!(
        synthesize_in(
            &doc,
            json!({ "type": "string", "format": "email", "enum": ["active", "disabled"] })
        ),
        json!("active")
    );
}

#[test]
fn test_object_and_array_with_references() {
    let doc = json!({
        "components": {
            "schemas": {
                "Tag": {
                    "type": "object",
                    "properties": {
                        "id": { "type": "integer" },
                        "label": { "type": "string" }
                    }
                }
            }
        }
    });

    let value = synthesize_in(
        &doc,
        json!({
            "type": "object",
            "properties": {
                "tags": { "type": "array", "items": { "$ref": "#/components/schemas/Tag" } },
                "missing": { "$ref": "#/components/schemas/Nope" },
                "empty": { "type": "array" }
            }
        }),
    );

    assert_eq!(
        value,
        json!({
            "tags": [{ "id": 0, "label": "string" }],
            "missing": null,
            "empty": []
        })
    );
}

#[test]
fn test_property_order_follows_document() {
    let doc = json!({});
    let value = synthesize_in(
        &doc,
        json!({
            "type": "object",
            "properties": {
                "zeta": { "type": "string" },
                "alpha": { "type": "string" },
                "mid": { "type": "string" }
            }
        }),
    );

    let keys: Vec<_> = value.as_object().unwrap().keys().cloned().collect();
    assert_eq!(keys, vec!["zeta", "alpha", "mid"]);
}

#[test]
fn test_self_reference_terminates() {
    let doc = json!({
        "components": {
            "schemas": {
                "Node": {
                    "type": "object",
                    "properties": {
                        "name": { "type": "string" },
                        "self": { "$ref": "#/components/schemas/Node" }
                    }
                }
            }
        }
    });

    let mut current = synthesize_in(&doc, json!({ "$ref": "#/components/schemas/Node" }));
    let mut levels = 0;
    while let Value::Object(mut fields) = current {
        assert!(fields.contains_key("name"));
        current = fields.remove("self").unwrap();
        levels += 1;
    }

    assert_eq!(current, Value::Null);
    assert_eq!(levels, MAX_DEPTH + 1);
}

#[test]
fn test_reference_alias_cycle_terminates() {
    let doc = json!({
        "components": {
            "schemas": {
                "A": { "$ref": "#/components/schemas/B" },
                "B": { "$ref": "#/components/schemas/A" }
            }
        }
    });

    assert_eq!(
        synthesize_in(&doc, json!({ "$ref": "#/components/schemas/A" })),
        Value::Null
    );
}

#[test]
fn test_all_of_merges_objects() {
    let doc = json!({
        "components": {
            "schemas": {
                "Base": { "type": "object", "properties": { "id": { "type": "integer" } } }
            }
        }
    });

    let value = synthesize_in(
        &doc,
        json!({
            "allOf": [
                { "$ref": "#/components/schemas/Base" },
                { "type": "object", "properties": { "name": { "type": "string" } } }
            ]
        }),
    );
    assert_eq!(value, json!({ "id": 0, "name": "string" }));

    let value = synthesize_in(&doc, json!({ "oneOf": [{ "type": "boolean" }, { "type": "string" }] }));
    assert_eq!(value, json!(true));
}

#[test]
fn test_extract_prefers_example_and_parses_json_strings() {
    let doc = json!({});
    let synthesizer = ExampleSynthesizer::new(Resolver::new(&doc));

    let media: MediaType = serde_json::from_value(json!({
        "schema": { "type": "object" },
        "example": "{\"id\": 1}"
    }))
    .unwrap();
    assert_eq!(synthesizer.media_type_example(&media), json!({ "id": 1 }));

    let media: MediaType = serde_json::from_value(json!({
        "example": "{ not json"
    }))
    .unwrap();
    assert_eq!(synthesizer.media_type_example(&media), json!("{ not json"));
}

#[test]
fn test_extract_first_named_example() {
    let doc = json!({});
    let synthesizer = ExampleSynthesizer::new(Resolver::new(&doc));

    let media: MediaType = serde_json::from_value(json!({
        "schema": { "type": "string" },
        "examples": {
            "second-alphabetically": { "value": "[1, 2]" },
            "a-first-alphabetically": { "value": "ignored" }
        }
    }))
    .unwrap();
    assert_eq!(synthesizer.media_type_example(&media), json!([1, 2]));
}

#[test]
fn test_extract_reference_example_is_not_followed() {
    let doc = json!({
        "components": { "examples": { "User": { "value": { "id": 1 } } } }
    });
    let synthesizer = ExampleSynthesizer::new(Resolver::new(&doc));

    let media: MediaType = serde_json::from_value(json!({
        "schema": { "type": "object" },
        "examples": { "user": { "$ref": "#/components/examples/User" } }
    }))
    .unwrap();
    assert_eq!(synthesizer.media_type_example(&media), Value::Null);
}

#[test]
fn test_extract_falls_back_to_schema() {
    let doc = json!({});
    let synthesizer = ExampleSynthesizer::new(Resolver::new(&doc));

    let parameter: Parameter = serde_json::from_value(json!({
        "name": "limit",
        "in": "query",
        "schema": { "type": "integer", "default": 20 }
    }))
    .unwrap();
    assert_eq!(synthesizer.parameter_example(&parameter), json!(20));

    let parameter: Parameter = serde_json::from_value(json!({
        "name": "trace",
        "in": "header",
        "examples": { "external": { "externalValue": "https://example.com/trace.txt" } }
    }))
    .unwrap();
    assert_eq!(synthesizer.parameter_example(&parameter), Value::Null);
}
