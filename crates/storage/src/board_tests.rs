// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use chrono::Duration;
use serde_json::json;
use tempfile::tempdir;

#[test]
fn add_update_remove_round_trip() {
    let dir = tempdir().unwrap();
    let mut board = BoardState::new();
    board
        .add(CardRecord::new("chem-1", "Load JSON schema", "Backlog"))
        .unwrap();
    assert_eq!(board.list_cards().len(), 1);

    let updated = CardRecord::new("chem-1", "Load JSON schema", "InProgress")
        .with_description("Validating the samples");
    board.update(updated).unwrap();
    let stored = board.get("chem-1").unwrap();
    assert_eq!(stored.status, "InProgress");
    assert_eq!(stored.description.as_deref(), Some("Validating the samples"));

    let removed = board.remove("chem-1").unwrap();
    assert_eq!(removed.card_id, "chem-1");
    assert!(board.is_empty());

    let path = dir.path().join("board.json");
    save_board(&path, &board).unwrap();
    let reloaded = load_board(&path).unwrap();
    assert!(reloaded.is_empty());
}

#[test]
fn add_rejects_duplicates() {
    let mut board = BoardState::new();
    board.add(CardRecord::new("a", "A", "Backlog")).unwrap();
    let err = board.add(CardRecord::new("a", "A again", "Backlog")).unwrap_err();
    assert!(matches!(err, BoardError::Duplicate(id) if id == "a"));
}

#[test]
fn update_and_remove_require_existing_card() {
    let mut board = BoardState::new();
    let err = board.update(CardRecord::new("ghost", "G", "Backlog")).unwrap_err();
    assert!(matches!(err, BoardError::NotFound(_)));
    let err = board.remove("ghost").unwrap_err();
    assert_eq!(err.to_string(), "card not found: ghost");
}

#[test]
fn update_keeps_created_at() {
    let mut board = BoardState::new();
    board.add(CardRecord::new("a", "A", "Backlog")).unwrap();
    let created = board.get("a").unwrap().created_at;

    let mut replacement = CardRecord::new("a", "A", "Done");
    replacement.created_at = created + Duration::days(30);
    board.update(replacement).unwrap();

    let stored = board.get("a").unwrap();
    assert_eq!(stored.created_at, created);
    assert!(stored.updated_at >= created);
}

#[test]
fn to_json_orders_by_updated_at() {
    let base = Utc::now();
    let mut older = CardRecord::new("z-card", "Older", "Backlog");
    older.updated_at = base - Duration::minutes(5);
    let mut newer = CardRecord::new("a-card", "Newer", "Backlog");
    newer.updated_at = base;

    let board = board_from_records(&[newer.to_json(), older.to_json()]).unwrap();
    let ids: Vec<_> = board
        .to_json()
        .iter()
        .map(|c| c["id"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(ids, vec!["z-card", "a-card"]);
    assert_eq!(dump_board(&board), board.to_json());
}

#[test]
fn from_json_requires_id_and_title() {
    let err = CardRecord::from_json(&json!({"title": "No id"})).unwrap_err();
    assert_eq!(err.to_string(), "card payload missing required 'id' field");

    let err = CardRecord::from_json(&json!({"id": "x", "title": "   "})).unwrap_err();
    assert!(matches!(err, BoardError::MissingField("title")));

    let err = CardRecord::from_json(&json!({"id": 5, "title": "t"})).unwrap_err();
    assert!(matches!(err, BoardError::MissingField("id")));
}

#[test]
fn from_json_normalizes_fields() {
    let card = CardRecord::from_json(&json!({
        "id": "  card-7 ",
        "title": " Title ",
        "status": "   ",
        "description": 12,
        "created_at": "2025-10-13T12:00:00+00:00",
        "updated_at": "garbage",
    }))
    .unwrap();
    assert_eq!(card.card_id, "card-7");
    assert_eq!(card.title, "Title");
    assert_eq!(card.status, DEFAULT_CARD_STATUS);
    assert_eq!(card.description, None);
    assert_eq!(card.created_at.to_rfc3339(), "2025-10-13T12:00:00+00:00");
}

#[test]
fn load_missing_file_is_empty() {
    let dir = tempdir().unwrap();
    let board = load_board(&dir.path().join("nope.json")).unwrap();
    assert!(board.is_empty());
}

#[test]
fn load_rejects_non_list() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("broken.json");
    std::fs::write(&path, "{}").unwrap();
    let err = load_board(&path).unwrap_err();
    assert!(err.to_string().contains("must be a list"));
}

#[test]
fn load_skips_non_object_entries_and_keeps_timestamps() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("board.json");
    std::fs::write(
        &path,
        r#"[
            "stray",
            42,
            {"id": "c1", "title": "One", "status": "Review",
             "created_at": "2025-01-01T00:00:00Z", "updated_at": "2025-01-02T00:00:00Z"}
        ]"#,
    )
    .unwrap();

    let board = load_board(&path).unwrap();
    assert_eq!(board.len(), 1);
    let card = board.get("c1").unwrap();
    assert_eq!(card.status, "Review");
    assert_eq!(card.updated_at.to_rfc3339(), "2025-01-02T00:00:00+00:00");
}

#[test]
fn save_then_load_preserves_cards() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("board.json");
    let mut board = BoardState::new();
    board
        .add(CardRecord::new("c1", "One", "Backlog").with_description("first"))
        .unwrap();
    board.add(CardRecord::new("c2", "Two", "Done")).unwrap();

    save_board(&path, &board).unwrap();
    let reloaded = load_board(&path).unwrap();

    assert_eq!(reloaded, board);
    let raw: Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert!(raw.is_array());
    assert_eq!(raw[0]["description"], json!("first"));
}
