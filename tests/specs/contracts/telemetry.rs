//! Telemetry envelope: build, emit to a sink, read back.

use crate::prelude::*;
use serde_json::{json, Map};
use serial_test::serial;
use std::io::Write;
use xm_common::contracts::{loads, validate_event, TelemetryEmitter};
use xm_common::{make_event, EventSpec, SchemaError, TelemetrySource, TelemetryStatus};

#[test]
fn built_events_validate_and_round_trip() {
    let mut details = Map::new();
    details.insert("artifact".into(), json!("reports/lint.json"));
    let event = make_event(
        EventSpec::new(TelemetrySource::Orchestrator, "lint", TelemetryStatus::Failed)
            .repository("acme/widgets")
            .attempt(2)
            .details(details),
    )
    .unwrap();

    let value = event.to_value().unwrap();
    validate_event(&value).unwrap();
    assert_eq!(value["source"], "orchestrator");
    assert_eq!(value["status"], "failed");
    assert_eq!(value["tool"], json!(null));

    let line = xm_common::contracts::dumps(&event).unwrap();
    assert_eq!(loads(&line).unwrap(), event);
}

#[test]
fn foreign_payloads_are_rejected_with_paths() {
    let err = validate_event(&json!({"version": "0.1.0", "phase": ""})).unwrap_err();
    let SchemaError::Invalid { errors } = err else {
        panic!("expected schema errors, got {err:?}");
    };
    assert!(!errors.is_empty());
    assert!(errors.iter().any(|e| e.contains("version")), "{errors:?}");
}

#[test]
#[serial]
fn emitter_writes_one_line_per_event_to_sink() {
    std::env::set_var("X_TELEMETRY_SUPPRESS_STDOUT", "1");
    let ws = Workspace::new();
    let sink_path = ws.join("telemetry.jsonl");
    let sink = std::fs::File::create(&sink_path).unwrap();

    let mut emitter = TelemetryEmitter::with_stdout(Box::new(std::io::sink()));
    emitter.configure_sink(Some(Box::new(sink) as Box<dyn Write + Send>), false);
    for phase in ["clone", "lint"] {
        let event = make_event(EventSpec::new(
            TelemetrySource::Visitor,
            phase,
            TelemetryStatus::Started,
        ))
        .unwrap();
        emitter.emit(&event).unwrap();
    }
    std::env::remove_var("X_TELEMETRY_SUPPRESS_STDOUT");

    let text = std::fs::read_to_string(&sink_path).unwrap();
    let phases: Vec<_> = text
        .lines()
        .map(|line| loads(line).unwrap().phase)
        .collect();
    assert_eq!(phases, vec!["clone", "lint"]);
}
