//! Card board persistence.

use crate::prelude::*;
use serde_json::json;
use xm_common::storage::BoardError;
use xm_common::{load_board, save_board, BoardState, CardRecord};

#[test]
fn saved_board_is_a_json_array_of_cards() {
    let ws = Workspace::new();
    let path = ws.join("board/cards.json");

    let mut board = BoardState::new();
    board
        .add(CardRecord::new("c-1", "Write docs", "todo").with_description("README"))
        .unwrap();
    save_board(&path, &board).unwrap();

    let saved = mask(read_json(&path), &["created_at", "updated_at"]);
    assert_json_eq(
        &saved,
        &json!([{
            "id": "c-1",
            "title": "Write docs",
            "status": "todo",
            "description": "README",
            "created_at": VOLATILE,
            "updated_at": VOLATILE,
        }]),
    );
    assert_eq!(load_board(&path).unwrap(), board);
}

#[test]
fn updates_survive_a_reload() {
    let ws = Workspace::new();
    let path = ws.join("cards.json");

    let mut board = BoardState::new();
    board.add(CardRecord::new("a", "First", "todo")).unwrap();
    board.add(CardRecord::new("b", "Second", "todo")).unwrap();
    save_board(&path, &board).unwrap();

    let mut reloaded = load_board(&path).unwrap();
    reloaded.update(CardRecord::new("a", "First", "done")).unwrap();
    reloaded.remove("b").unwrap();
    save_board(&path, &reloaded).unwrap();

    let cards = load_board(&path).unwrap();
    assert_eq!(cards.len(), 1);
    let card = cards.get("a").unwrap();
    assert_eq!(card.status, "done");
    assert_eq!(card.created_at, board.get("a").unwrap().created_at);
}

#[test]
fn hand_written_files_are_read_leniently() {
    let ws = Workspace::new();
    let path = ws.file(
        "cards.json",
        r#"[{"id": "x", "title": "Loose", "status": 3, "created_at": "not a date"}, "junk"]"#,
    );

    let board = load_board(&path).unwrap();
    assert_eq!(board.len(), 1);
    assert_eq!(board.get("x").unwrap().title, "Loose");

    let bad = ws.file("bad.json", r#"{"id": "x"}"#);
    assert!(matches!(load_board(&bad), Err(BoardError::NotAList)));
    assert!(load_board(&ws.join("missing.json")).unwrap().is_empty());
}
