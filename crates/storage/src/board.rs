// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! JSON-backed kanban board.
//!
//! The board file is a JSON array of card objects ordered by last update.
//! Mutations happen in memory on [`BoardState`] and are persisted with
//! [`save_board`].

use crate::atomic::{atomic_write_json, AtomicWriteError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;
use xm_core::lenient;

/// Status assigned to cards that arrive without one
pub const DEFAULT_CARD_STATUS: &str = "Backlog";

/// Errors from board operations
#[derive(Debug, Error)]
pub enum BoardError {
    #[error("card already exists: {0}")]
    Duplicate(String),
    #[error("card not found: {0}")]
    NotFound(String),
    #[error("card payload missing required '{0}' field")]
    MissingField(&'static str),
    #[error("card payload must be a JSON object")]
    NotAnObject,
    #[error("board JSON must be a list of card objects")]
    NotAList,
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Write(#[from] AtomicWriteError),
}

fn default_status() -> String {
    DEFAULT_CARD_STATUS.to_string()
}

fn status_or_default<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value
        .as_ref()
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map_or_else(default_status, str::to_string))
}

/// Single card stored on the board
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardRecord {
    #[serde(rename = "id")]
    pub card_id: String,
    pub title: String,
    #[serde(default = "default_status", deserialize_with = "status_or_default")]
    pub status: String,
    #[serde(default, deserialize_with = "lenient::string_or_none")]
    pub description: Option<String>,
    #[serde(default = "Utc::now", deserialize_with = "lenient::timestamp_or_now")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "Utc::now", deserialize_with = "lenient::timestamp_or_now")]
    pub updated_at: DateTime<Utc>,
}

impl CardRecord {
    pub fn new(
        card_id: impl Into<String>,
        title: impl Into<String>,
        status: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            card_id: card_id.into(),
            title: title.into(),
            status: status.into(),
            description: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Decode a card, requiring non-blank `id` and `title`.
    pub fn from_json(payload: &Value) -> Result<Self, BoardError> {
        let map = payload.as_object().ok_or(BoardError::NotAnObject)?;
        let card_id = lenient::required_str(map, "id").ok_or(BoardError::MissingField("id"))?;
        let title =
            lenient::required_str(map, "title").ok_or(BoardError::MissingField("title"))?;

        let mut record: CardRecord = serde_json::from_value(payload.clone())?;
        record.card_id = card_id;
        record.title = title;
        Ok(record)
    }

    pub fn to_json(&self) -> Value {
        serde_json::json!({
            "id": self.card_id,
            "title": self.title,
            "status": self.status,
            "description": self.description,
            "created_at": self.created_at,
            "updated_at": self.updated_at,
        })
    }
}

/// In-memory board keyed by card id
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoardState {
    cards: BTreeMap<String, CardRecord>,
}

impl BoardState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a new card, stamping both timestamps with now.
    pub fn add(&mut self, mut record: CardRecord) -> Result<(), BoardError> {
        if self.cards.contains_key(&record.card_id) {
            return Err(BoardError::Duplicate(record.card_id));
        }
        let now = Utc::now();
        record.created_at = now;
        record.updated_at = now;
        self.cards.insert(record.card_id.clone(), record);
        Ok(())
    }

    /// Replace an existing card, keeping its original `created_at`.
    pub fn update(&mut self, mut record: CardRecord) -> Result<(), BoardError> {
        let existing = self
            .cards
            .get_mut(&record.card_id)
            .ok_or_else(|| BoardError::NotFound(record.card_id.clone()))?;
        record.created_at = existing.created_at;
        record.updated_at = Utc::now();
        *existing = record;
        Ok(())
    }

    pub fn remove(&mut self, card_id: &str) -> Result<CardRecord, BoardError> {
        self.cards
            .remove(card_id)
            .ok_or_else(|| BoardError::NotFound(card_id.to_string()))
    }

    pub fn get(&self, card_id: &str) -> Option<&CardRecord> {
        self.cards.get(card_id)
    }

    /// All cards, ordered by id.
    pub fn list_cards(&self) -> Vec<&CardRecord> {
        self.cards.values().collect()
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Cards ordered by `updated_at` (oldest first), ties broken by id.
    pub fn ordered(&self) -> Vec<&CardRecord> {
        let mut ordered: Vec<_> = self.cards.values().collect();
        ordered.sort_by(|a, b| {
            a.updated_at
                .cmp(&b.updated_at)
                .then_with(|| a.card_id.cmp(&b.card_id))
        });
        ordered
    }

    pub fn to_json(&self) -> Vec<Value> {
        self.ordered().into_iter().map(CardRecord::to_json).collect()
    }

    /// Insert without touching timestamps (used when loading).
    fn restore(&mut self, record: CardRecord) {
        self.cards.insert(record.card_id.clone(), record);
    }
}

/// Load a board; a missing file yields an empty board.
///
/// Non-object array entries are ignored.
pub fn load_board(path: &Path) -> Result<BoardState, BoardError> {
    if !path.exists() {
        return Ok(BoardState::new());
    }
    let text = std::fs::read_to_string(path)?;
    let payload: Value = serde_json::from_str(&text)?;
    let Value::Array(entries) = payload else {
        return Err(BoardError::NotAList);
    };
    let mut state = BoardState::new();
    for entry in entries.iter().filter(|e| e.is_object()) {
        state.restore(CardRecord::from_json(entry)?);
    }
    Ok(state)
}

pub fn dump_board(state: &BoardState) -> Vec<Value> {
    state.to_json()
}

/// Persist the board atomically as a pretty JSON array.
pub fn save_board(path: &Path, state: &BoardState) -> Result<(), BoardError> {
    atomic_write_json(path, &state.ordered())?;
    Ok(())
}

/// Build a board from raw card payloads, keeping their timestamps.
pub fn board_from_records<'a, I>(records: I) -> Result<BoardState, BoardError>
where
    I: IntoIterator<Item = &'a Value>,
{
    let mut state = BoardState::new();
    for entry in records {
        state.restore(CardRecord::from_json(entry)?);
    }
    Ok(state)
}

#[cfg(test)]
#[path = "board_tests.rs"]
mod tests;
