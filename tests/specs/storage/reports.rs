//! Timestamped run reports.

use crate::prelude::*;
use serde_json::{json, Map};
use xm_common::storage::{write_run_report, ReportOptions};

#[test]
fn report_lands_in_reports_dir_with_tool_and_time() {
    let ws = Workspace::new();
    let moment = xm_common::time_fmt::parse_timestamp("2025-10-13T12:30:05Z").unwrap();
    let mut payload = Map::new();
    payload.insert("repos".into(), json!(3));

    let path = write_run_report(
        "visitor",
        payload,
        &ReportOptions::default().base_dir(ws.path()).timestamp(moment),
    )
    .unwrap();

    assert_eq!(path, ws.join("reports/visitor_run_20251013_123005.json"));
    assert_json_eq(
        &read_json(&path),
        &json!({
            "repos": 3,
            "tool": "visitor",
            "generated_at": "2025-10-13T12:30:05Z",
        }),
    );
}

#[test]
fn caller_fields_are_not_overwritten() {
    let ws = Workspace::new();
    let mut payload = Map::new();
    payload.insert("tool".into(), json!("custom"));

    let path = write_run_report(
        "visitor",
        payload,
        &ReportOptions::default()
            .base_dir(ws.path())
            .reports_name("out")
            .filename("latest.json"),
    )
    .unwrap();

    assert_eq!(path, ws.join("out/latest.json"));
    let report = read_json(&path);
    assert_eq!(report["tool"], "custom");
    assert!(report["generated_at"].as_str().unwrap().ends_with('Z'));
}
