// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use serde_json::json;

fn sample_schema() -> Value {
    json!({
        "$schema": "https://json-schema.org/draft/2020-12/schema",
        "type": "object",
        "properties": {
            "status": {"enum": ["success", "failure"]},
            "details": {"type": "object"},
        },
        "required": ["status"],
        "additionalProperties": false,
    })
}

#[test]
fn accepts_well_formed_schema() {
    validate_schema(&sample_schema()).unwrap();
}

#[test]
fn rejects_malformed_schema() {
    let err = validate_schema(&json!({"type": "not-a-type"})).unwrap_err();
    assert!(matches!(err, SchemaError::InvalidSchema(_)));
}

#[test]
fn payload_success() {
    validate_payload(&json!({"status": "success", "details": {}}), &sample_schema()).unwrap();
}

#[test]
fn payload_failure_lists_every_error() {
    let err = validate_payload(
        &json!({"details": [], "extra": 1}),
        &sample_schema(),
    )
    .unwrap_err();
    let SchemaError::Invalid { errors } = err else {
        panic!("expected validation failure");
    };
    assert_eq!(errors.len(), 3, "{errors:?}");
    assert!(errors.iter().any(|e| e.starts_with("/details: ")));
}

#[test]
fn compiled_schema_is_reusable() {
    let compiled = CompiledSchema::new(&sample_schema()).unwrap();
    assert!(compiled.is_valid(&json!({"status": "failure"})));
    assert!(!compiled.is_valid(&json!({"status": "maybe"})));
    assert!(compiled.validate(&json!({"status": "success"})).is_ok());
}
