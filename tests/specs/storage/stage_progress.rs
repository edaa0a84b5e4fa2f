//! Stage progress directory layout: one index plus one detail file per repo.

use crate::prelude::*;
use serde_json::json;
use xm_common::storage::{safe_repo_filename, EntryUpdate, StageProgressWriter};
use xm_common::RepoProgressReporter;

const TIMESTAMPS: &[&str] = &["updated_at", "started_at", "completed_at"];

#[test]
fn lifecycle_writes_detail_and_index() {
    let ws = Workspace::new();
    let root = ws.join("progress/clone");
    let writer = StageProgressWriter::new("clone", &root).unwrap();

    writer
        .record_pending("acme/widgets", EntryUpdate::new().display_name("Widgets"))
        .unwrap();
    writer
        .record_start("acme/widgets", EntryUpdate::new().message("cloning"))
        .unwrap();
    writer
        .record_success(
            "acme/widgets",
            EntryUpdate::new().metadata("commit", "abc123"),
        )
        .unwrap();
    writer
        .record_failure("acme/gadgets", EntryUpdate::new().message("auth failed"))
        .unwrap();

    let widgets_file = safe_repo_filename("acme/widgets");
    let gadgets_file = safe_repo_filename("acme/gadgets");
    let mut expected_files = vec![
        "index.json".to_string(),
        widgets_file.clone(),
        gadgets_file.clone(),
    ];
    expected_files.sort();
    assert_eq!(ws.list("progress/clone"), expected_files);

    let detail = mask(read_json(&root.join(&widgets_file)), TIMESTAMPS);
    assert_json_eq(
        &detail,
        &json!({
            "schema_version": "x_make.stage_progress.repo/1.0",
            "stage_id": "clone",
            "repo_id": "acme/widgets",
            "display_name": "Widgets",
            "status": "completed",
            "messages": ["cloning", "Completed successfully."],
            "metadata": {"commit": "abc123"},
            "started_at": VOLATILE,
            "completed_at": VOLATILE,
            "updated_at": VOLATILE,
        }),
    );

    let index = mask(read_json(writer.index_path()), TIMESTAMPS);
    assert_json_eq(
        &index,
        &json!({
            "schema_version": "x_make.stage_progress.index/1.0",
            "stage_id": "clone",
            "updated_at": VOLATILE,
            "entries_dir": root.display().to_string(),
            "total_entries": 2,
            "status_counts": {"attention": 1, "completed": 1},
            "entries": [
                {
                    "repo_id": "acme/gadgets",
                    "display_name": null,
                    "status": "attention",
                    "detail_path": gadgets_file,
                    "updated_at": VOLATILE,
                    "started_at": VOLATILE,
                    "completed_at": VOLATILE,
                    "message_preview": ["auth failed"],
                },
                {
                    "repo_id": "acme/widgets",
                    "display_name": "Widgets",
                    "status": "completed",
                    "detail_path": widgets_file,
                    "updated_at": VOLATILE,
                    "started_at": VOLATILE,
                    "completed_at": VOLATILE,
                    "message_preview": ["cloning", "Completed successfully."],
                },
            ],
        }),
    );
}

#[test]
fn new_writer_clears_previous_run() {
    let ws = Workspace::new();
    let root = ws.join("stage");
    ws.file("stage/stale_00000000.json", "{}");
    ws.file("stage/nested/old.json", "{}");

    let writer = StageProgressWriter::new("lint", &root).unwrap();

    assert_eq!(ws.list("stage"), vec!["index.json"]);
    let index = read_json(writer.index_path());
    assert_eq!(index["total_entries"], 0);
    assert_eq!(index["entries"], json!([]));
}
