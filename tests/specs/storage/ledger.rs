//! Append-only checksummed event ledger.

use crate::prelude::*;
use serde_json::{json, Map, Value};
use xm_common::append_event;
use xm_common::storage::{verify_ledger, LedgerError, LedgerEvent, LedgerWriter};

fn payload(value: Value) -> Map<String, Value> {
    value.as_object().unwrap().clone()
}

#[test]
fn each_append_is_one_verifiable_line() {
    let ws = Workspace::new();
    let path = ws.join("ledgers/run.jsonl");

    let first = append_event(&path, "stage.started", payload(json!({"stage": "clone"}))).unwrap();
    let second =
        append_event(&path, "stage.finished", payload(json!({"stage": "clone", "ok": true})))
            .unwrap();
    assert_ne!(first, second);

    let text = std::fs::read_to_string(&path).unwrap();
    let lines: Vec<Value> = text
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0]["sha256"], json!(first));
    assert_eq!(lines[1]["event_type"], "stage.finished");

    let entries = verify_ledger(&path).unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[1].event.payload["ok"], json!(true));
}

#[test]
fn checksum_is_independent_of_key_order() {
    let ws = Workspace::new();
    let writer = LedgerWriter::new(ws.join("a.jsonl")).unwrap();
    let stamp = "2025-10-13T12:30:00.000000+00:00";

    let forward = LedgerEvent::new("e", payload(json!({"a": 1, "b": {"y": 2, "x": 1}})))
        .with_emitted_at(stamp);
    let mut reversed = Map::new();
    reversed.insert("b".into(), json!({"x": 1, "y": 2}));
    reversed.insert("a".into(), json!(1));
    let backward = LedgerEvent::new("e", reversed).with_emitted_at(stamp);

    assert_eq!(writer.append(&forward).unwrap(), backward.checksum().unwrap());
}

#[test]
fn tampering_is_detected() {
    let ws = Workspace::new();
    let path = ws.join("run.jsonl");
    append_event(&path, "deploy", payload(json!({"target": "prod"}))).unwrap();

    let tampered = std::fs::read_to_string(&path)
        .unwrap()
        .replace("prod", "staging");
    std::fs::write(&path, tampered).unwrap();

    assert!(matches!(
        verify_ledger(&path),
        Err(LedgerError::ChecksumMismatch { line: 1 })
    ));
}
