//! Property and scenario tests for the schema engine

use contacts_core::{validate_schema_document, Names, Schema, Violation};
use proptest::prelude::*;
use serde_json::{json, Map, Value};

fn record(value: Value) -> Map<String, Value> {
    value.as_object().cloned().unwrap_or_default()
}

/// A small pool of field definitions, all valid on their own
fn field_params() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(json!({"type": "str"})),
        Just(json!({"type": "str", "required": true})),
        Just(json!({"type": "integer"})),
        Just(json!({"type": "toggle", "required": true})),
        Just(json!({"type": "email", "display_name": "Email"})),
        Just(json!({"type": "image", "additional_type_parameters": {"accepted_types": ["png"]}})),
        Just(json!({"type": "list", "additional_type_parameters": {"inner_type": "integer"}})),
    ]
}

fn field_value() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        Just(json!("text")),
        Just(json!("")),
        Just(json!("photo.PNG")),
        Just(json!(7)),
        Just(json!(true)),
        Just(json!([1, 2])),
        Just(json!(["a"])),
    ]
}

/// A valid document: `id` primary key plus up to six generated fields
fn document_fields() -> impl Strategy<Value = Vec<(String, Value)>> {
    prop::collection::vec(field_params(), 0..6).prop_map(|params| {
        let mut fields = vec![(
            "id".to_string(),
            json!({"type": "integer", "primary_key": true, "required": true}),
        )];
        fields.extend(
            params
                .into_iter()
                .enumerate()
                .map(|(i, p)| (format!("field{}", i), p)),
        );
        fields
    })
}

fn to_document(fields: &[(String, Value)]) -> Value {
    Value::Object(fields.iter().cloned().collect())
}

proptest! {
    #[test]
    fn loaded_schema_has_one_field_per_entry(fields in document_fields()) {
        let document = to_document(&fields);
        prop_assert!(validate_schema_document(&document).is_ok());
        let schema = Schema::load(&document).unwrap();
        prop_assert_eq!(schema.len(), fields.len());
    }

    #[test]
    fn check_does_not_depend_on_declaration_order(
        fields in document_fields(),
        values in prop::collection::vec(field_value(), 6),
        rotation in 0usize..6,
    ) {
        let forward = Schema::load(&to_document(&fields)).unwrap();
        let mut shuffled = fields.clone();
        shuffled.reverse();
        let len = shuffled.len();
        shuffled.rotate_left(rotation % len);
        let reordered = Schema::load(&to_document(&shuffled)).unwrap();

        let instance: Map<String, Value> = fields
            .iter()
            .skip(1)
            .zip(values)
            .map(|((name, _), value)| (name.clone(), value))
            .collect();

        prop_assert_eq!(
            forward.check(&instance, &["id"]).is_ok(),
            reordered.check(&instance, &["id"]).is_ok()
        );
    }

    #[test]
    fn missing_required_value_names_the_field(extra in document_fields()) {
        let mut fields = extra;
        fields.push(("mandatory".to_string(), json!({"type": "str", "required": true})));
        let schema = Schema::load(&to_document(&fields)).unwrap();

        let only_mandatory = Schema::load(&json!({
            "mandatory": {"type": "str", "required": true}
        })).unwrap();
        prop_assert_eq!(
            only_mandatory.check(&Map::new(), &[]),
            Err(Violation::MissingRequiredValue { field: "mandatory".to_string() })
        );

        let err = schema.check(&Map::new(), &["id"]).unwrap_err();
        prop_assert!(
            matches!(err, Violation::MissingRequiredValue { .. }),
            "expected MissingRequiredValue, got {:?}",
            err
        );
    }

    #[test]
    fn nested_lists_are_always_rejected(name in "[a-z]{1,8}") {
        prop_assume!(name != "id");
        let mut document = json!({
            "id": {"type": "integer", "primary_key": true, "required": true}
        });
        document.as_object_mut().unwrap().insert(
            name.clone(),
            json!({"type": "list", "additional_type_parameters": {"inner_type": "list"}}),
        );
        let err = validate_schema_document(&document).unwrap_err();
        prop_assert_eq!(err.param, Names::from("inner_type"));
        prop_assert_eq!(err.field, Names::from(name.as_str()));
    }

    #[test]
    fn every_primary_key_is_listed(count in 2usize..6) {
        let document: Map<String, Value> = (0..count)
            .map(|i| (format!("key{}", i), json!({"type": "integer", "primary_key": true, "required": true})))
            .collect();
        let err = validate_schema_document(&Value::Object(document)).unwrap_err();
        let expected: Vec<String> = (0..count).map(|i| format!("key{}", i)).collect();
        prop_assert_eq!(err.field, Names::Many(expected));
        prop_assert_eq!(err.param, Names::from("primary_key"));
    }
}

#[test]
fn skipped_primary_key_scenario() {
    let document = json!({
        "id": {"type": "integer", "primary_key": true, "required": true},
        "firstname": {"type": "str"}
    });
    let schema = Schema::validated(&document).unwrap();
    assert!(schema.check(&record(json!({"firstname": "Luke"})), &["id"]).is_ok());
}

#[test]
fn duplicate_sort_key_scenario() {
    let document = json!({
        "id": {"type": "integer", "primary_key": true, "required": true},
        "param1": {"type": "str", "sort_key": 1},
        "param2": {"type": "str", "sort_key": 1}
    });
    let err = validate_schema_document(&document).unwrap_err();
    assert_eq!(err.field, Names::from(vec!["param1", "param2"]));
    assert_eq!(err.param, Names::from("sort_key"));
}

#[test]
fn image_extension_scenario() {
    let document = json!({
        "id": {"type": "integer", "primary_key": true, "required": true},
        "photo": {"type": "image", "additional_type_parameters": {"accepted_types": ["png"]}}
    });
    let schema = Schema::validated(&document).unwrap();

    assert!(schema.check(&record(json!({"photo": "photo.PNG"})), &["id"]).is_ok());
    assert_eq!(
        schema.check(&record(json!({"photo": "photo"})), &["id"]),
        Err(Violation::WrongType {
            field: "photo".to_string(),
            expected_type: "image".to_string(),
        })
    );
}

#[test]
fn zero_primary_keys_scenario() {
    let err = validate_schema_document(&json!({"name": {"type": "str", "required": true}})).unwrap_err();
    assert_eq!(err.field, Names::from(""));
    assert_eq!(err.param, Names::from("primary_key"));
}
