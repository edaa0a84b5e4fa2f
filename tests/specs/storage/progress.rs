//! Whole-run progress snapshot.

use crate::prelude::*;
use serde_json::{json, Map};
use xm_common::storage::{create_progress_snapshot, load_progress_snapshot, write_progress_snapshot};
use xm_common::{ProgressSnapshot, ProgressStatus};

#[test]
fn snapshot_round_trips_through_disk() {
    let ws = Workspace::new();
    let path = ws.join("progress.json");

    let mut snapshot = create_progress_snapshot([("clone", "Clone repos"), ("lint", "Lint")]);
    snapshot.update_stage("clone", "", "completed", ["done"], Map::new());
    snapshot.update_stage("lint", "", ProgressStatus::Running, Vec::<String>::new(), Map::new());
    write_progress_snapshot(&path, &snapshot).unwrap();

    let written = mask(
        read_json(&path),
        &["created_at", "updated_at"],
    );
    assert_json_eq(
        &written,
        &json!({
            "schema_version": "x_make.progress/1.0",
            "created_at": VOLATILE,
            "updated_at": VOLATILE,
            "summary": null,
            "stages": [
                {
                    "id": "clone",
                    "title": "Clone repos",
                    "status": "completed",
                    "messages": ["done"],
                    "metadata": {},
                    "updated_at": VOLATILE,
                },
                {
                    "id": "lint",
                    "title": "Lint",
                    "status": "running",
                    "messages": [],
                    "metadata": {},
                    "updated_at": VOLATILE,
                },
            ],
        }),
    );

    let loaded = load_progress_snapshot(&path).unwrap().unwrap();
    assert_eq!(loaded, snapshot);
    assert!(!loaded.is_complete());
}

#[test]
fn missing_snapshot_is_none_and_odd_statuses_are_tolerated() {
    let ws = Workspace::new();
    assert!(load_progress_snapshot(&ws.join("absent.json")).unwrap().is_none());

    let path = ws.file(
        "hand.json",
        r#"{"stages": [{"id": "a", "title": "A", "status": 7}, {"id": "b", "title": "B", "status": "WEIRD"}]}"#,
    );
    let snapshot: ProgressSnapshot = load_progress_snapshot(&path).unwrap().unwrap();
    assert_eq!(snapshot.stage("a").unwrap().status, ProgressStatus::Pending);
    assert_eq!(snapshot.stage("b").unwrap().status, ProgressStatus::Attention);
}
