//! Properties of the result projections and the export file.

use form_reader_lib::projector::{export_json, filter_confidence, filtered_json};
use form_reader_lib::{available_fields, build_field_map, DISPLAY_FIELDS};
use proptest::prelude::*;
use serde_json::{json, Map, Value};

fn has_confidence(v: &Value) -> bool {
    match v {
        Value::Array(items) => items.iter().any(has_confidence),
        Value::Object(obj) => obj.contains_key("confidence") || obj.values().any(has_confidence),
        _ => false,
    }
}

/// Reference removal of `confidence` keys, used to check nothing else changes.
fn strip(v: &Value) -> Value {
    let mut out = v.clone();
    fn walk(v: &mut Value) {
        match v {
            Value::Array(items) => items.iter_mut().for_each(walk),
            Value::Object(obj) => {
                obj.remove("confidence");
                obj.values_mut().for_each(walk);
            }
            _ => {}
        }
    }
    walk(&mut out);
    out
}

fn arb_json() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(|n| json!(n)),
        (0.0f64..1.0).prop_map(|f| json!(f)),
        "[a-z ]{0,8}".prop_map(Value::String),
    ];
    leaf.prop_recursive(5, 64, 6, |inner| {
        let key = prop_oneof![Just("confidence".to_string()), "[a-z]{1,6}"];
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..6).prop_map(Value::Array),
            prop::collection::vec((key, inner), 0..6)
                .prop_map(|kvs| Value::Object(kvs.into_iter().collect::<Map<String, Value>>())),
        ]
    })
}

proptest! {
    #[test]
    fn filtered_copy_has_no_confidence_keys(v in arb_json()) {
        prop_assert!(!has_confidence(&filter_confidence(&v)));
    }

    #[test]
    fn filtering_is_idempotent(v in arb_json()) {
        let once = filter_confidence(&v);
        prop_assert_eq!(filter_confidence(&once), once);
    }

    #[test]
    fn other_keys_are_preserved(v in arb_json()) {
        prop_assert_eq!(filter_confidence(&v), strip(&v));
    }

    #[test]
    fn available_fields_only_lists_truthy_values_in_order(
        values in prop::collection::vec(prop_oneof![Just(String::new()), "[A-Za-z0-9 ]{1,10}"], 6)
    ) {
        let keys = ["dob", "postcode", "address", "email", "phone", "name"];
        let fields: Vec<Value> = keys
            .iter()
            .zip(&values)
            .map(|(k, v)| json!({"name": k, "value": v, "confidence": 0.5}))
            .collect();
        let result = json!({"pages": [{"fields": fields}]});
        let map = build_field_map(Some(&result));
        let available = available_fields(&map, DISPLAY_FIELDS);

        for f in &available {
            let value = map[f.key].value.as_str().unwrap();
            prop_assert!(!value.is_empty());
        }
        let positions: Vec<usize> = available
            .iter()
            .map(|f| DISPLAY_FIELDS.iter().position(|d| d.key == f.key).unwrap())
            .collect();
        prop_assert!(positions.windows(2).all(|w| w[0] < w[1]));
        let expected = values.iter().filter(|v| !v.is_empty()).count();
        prop_assert_eq!(available.len(), expected);
    }
}

#[test]
fn export_of_nested_result_removes_confidence_at_every_depth() {
    let result = json!({
        "document_type": "handwritten_form",
        "pages": [{
            "page": 1,
            "fields": [
                {"name": "name", "value": "Jane Doe", "confidence": 0.97},
                {"name": "address", "value": "1 High St", "confidence": 0.5,
                 "parts": [{"line": "1 High St", "confidence": 0.4}]}
            ],
            "tables": [[{"cell": "a", "confidence": 0.1}], [{"cell": "b", "confidence": 0.2}]]
        }]
    });
    let dir = tempfile::tempdir().unwrap();

    let path = export_json(&result, dir.path()).unwrap();

    let name = path.file_name().unwrap().to_str().unwrap();
    let stamp = name
        .strip_prefix("extracted-data-")
        .and_then(|s| s.strip_suffix(".json"))
        .unwrap();
    assert!(stamp.parse::<i64>().unwrap() > 0);

    let contents = std::fs::read_to_string(&path).unwrap();
    assert_eq!(contents, filtered_json(&result).unwrap());
    assert!(contents.contains("\n  \"document_type\""));
    let parsed: Value = serde_json::from_str(&contents).unwrap();
    assert!(!has_confidence(&parsed));
    assert_eq!(parsed, strip(&result));
    assert!(has_confidence(&result));
}

#[test]
fn export_creates_missing_directory() {
    let dir = tempfile::tempdir().unwrap();
    let nested = dir.path().join("exports").join("today");
    let path = export_json(&json!({"pages": []}), &nested).unwrap();
    assert!(path.starts_with(&nested));
    assert_eq!(std::fs::read_to_string(path).unwrap(), "{\n  \"pages\": []\n}");
}
