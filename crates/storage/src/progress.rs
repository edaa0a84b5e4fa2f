// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Whole-run progress snapshot.
//!
//! A snapshot is a flat set of stages keyed by id. Orchestrator UIs poll
//! the file written by [`write_progress_snapshot`]; writes are atomic so a
//! reader never sees a half-written document.

use crate::atomic::{atomic_write_json, AtomicWriteError};
use crate::status::ProgressStatus;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use xm_core::lenient;

/// Version tag written at the top of every snapshot
pub const PROGRESS_SCHEMA_VERSION: &str = "x_make.progress/1.0";

/// Errors from progress snapshot operations
#[derive(Debug, Error)]
pub enum ProgressError {
    #[error("progress stage payload missing '{0}'")]
    MissingField(&'static str),
    #[error("progress snapshot requires 'stages' list")]
    StagesNotAList,
    #[error("progress snapshot JSON must be an object")]
    NotAnObject,
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Write(#[from] AtomicWriteError),
}

fn stage_status<'de, D: Deserializer<'de>>(deserializer: D) -> Result<ProgressStatus, D::Error> {
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value.as_ref().and_then(Value::as_str) {
        Some(raw) => ProgressStatus::normalize(raw).for_snapshot(),
        None => ProgressStatus::Pending,
    })
}

/// One stage of a run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressStage {
    #[serde(rename = "id")]
    pub stage_id: String,
    pub title: String,
    #[serde(default, deserialize_with = "stage_status")]
    pub status: ProgressStatus,
    #[serde(default, deserialize_with = "lenient::string_list")]
    pub messages: Vec<String>,
    #[serde(default, deserialize_with = "lenient::object_or_empty")]
    pub metadata: Map<String, Value>,
    #[serde(default = "Utc::now", deserialize_with = "lenient::timestamp_or_now")]
    pub updated_at: DateTime<Utc>,
}

impl ProgressStage {
    pub fn new(stage_id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            stage_id: stage_id.into(),
            title: title.into(),
            status: ProgressStatus::Pending,
            messages: Vec::new(),
            metadata: Map::new(),
            updated_at: Utc::now(),
        }
    }

    /// Decode a stage, requiring non-blank `id` and `title`.
    pub fn from_json(payload: &Value) -> Result<Self, ProgressError> {
        let map = payload.as_object().ok_or(ProgressError::NotAnObject)?;
        let stage_id = lenient::required_str(map, "id").ok_or(ProgressError::MissingField("id"))?;
        let title =
            lenient::required_str(map, "title").ok_or(ProgressError::MissingField("title"))?;
        let mut stage: ProgressStage = serde_json::from_value(payload.clone())?;
        stage.stage_id = stage_id;
        stage.title = title;
        Ok(stage)
    }

    pub fn to_json(&self) -> Value {
        json!({
            "id": self.stage_id,
            "title": self.title,
            "status": self.status,
            "messages": self.messages,
            "metadata": self.metadata,
            "updated_at": self.updated_at,
        })
    }
}

/// Snapshot of every stage in a run
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressSnapshot {
    pub stages: BTreeMap<String, ProgressStage>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub summary: Option<String>,
}

impl Default for ProgressSnapshot {
    fn default() -> Self {
        let now = Utc::now();
        Self {
            stages: BTreeMap::new(),
            created_at: now,
            updated_at: now,
            summary: None,
        }
    }
}

impl ProgressSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get or create a stage.
    ///
    /// A non-empty `title` that differs from the stored one renames the stage.
    pub fn ensure_stage(&mut self, stage_id: &str, title: &str) -> &mut ProgressStage {
        let stage_id = stage_id.trim();
        let title = title.trim();
        if !self.stages.contains_key(stage_id) {
            self.updated_at = Utc::now();
        }
        let stage = self
            .stages
            .entry(stage_id.to_string())
            .or_insert_with(|| ProgressStage::new(stage_id, title));
        if !title.is_empty() && stage.title != title {
            stage.title = title.to_string();
        }
        stage
    }

    /// Overwrite a stage's status, messages and metadata.
    pub fn update_stage<I, S>(
        &mut self,
        stage_id: &str,
        title: &str,
        status: impl Into<ProgressStatus>,
        messages: I,
        metadata: Map<String, Value>,
    ) where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let status = status.into().for_snapshot();
        let now = Utc::now();
        let stage = self.ensure_stage(stage_id, title);
        stage.status = status;
        stage.messages = lenient::clean_messages(messages);
        stage.metadata = metadata;
        stage.updated_at = now;
        self.updated_at = now;
    }

    pub fn stage(&self, stage_id: &str) -> Option<&ProgressStage> {
        self.stages.get(stage_id.trim())
    }

    /// Number of stages per status; statuses with no stages are omitted.
    pub fn status_counts(&self) -> BTreeMap<ProgressStatus, usize> {
        let mut counts = BTreeMap::new();
        for stage in self.stages.values() {
            *counts.entry(stage.status).or_insert(0) += 1;
        }
        counts
    }

    /// True once every stage has reached a terminal status.
    pub fn is_complete(&self) -> bool {
        !self.stages.is_empty() && self.stages.values().all(|s| s.status.is_completion())
    }

    pub fn to_json(&self) -> Value {
        json!({
            "schema_version": PROGRESS_SCHEMA_VERSION,
            "created_at": self.created_at,
            "updated_at": self.updated_at,
            "summary": self.summary,
            "stages": self.stages.values().map(ProgressStage::to_json).collect::<Vec<_>>(),
        })
    }

    pub fn from_json(payload: &Value) -> Result<Self, ProgressError> {
        let map = payload.as_object().ok_or(ProgressError::NotAnObject)?;
        let Some(Value::Array(entries)) = map.get("stages") else {
            return Err(ProgressError::StagesNotAList);
        };

        let mut snapshot = ProgressSnapshot::new();
        let timestamp = |field: &str| {
            map.get(field)
                .and_then(Value::as_str)
                .and_then(xm_core::parse_timestamp)
        };
        if let Some(created_at) = timestamp("created_at") {
            snapshot.created_at = created_at;
        }
        if let Some(updated_at) = timestamp("updated_at") {
            snapshot.updated_at = updated_at;
        }
        snapshot.summary = map
            .get("summary")
            .and_then(Value::as_str)
            .map(str::to_string);

        for entry in entries.iter().filter(|e| e.is_object()) {
            let stage = ProgressStage::from_json(entry)?;
            snapshot.stages.insert(stage.stage_id.clone(), stage);
        }
        Ok(snapshot)
    }
}

/// Build a snapshot with every stage pending.
pub fn create_progress_snapshot<I, K, T>(definitions: I) -> ProgressSnapshot
where
    I: IntoIterator<Item = (K, T)>,
    K: AsRef<str>,
    T: AsRef<str>,
{
    let mut snapshot = ProgressSnapshot::new();
    for (stage_id, title) in definitions {
        snapshot.ensure_stage(stage_id.as_ref(), title.as_ref());
    }
    snapshot
}

/// Write the snapshot atomically and return the path written.
pub fn write_progress_snapshot(
    path: &Path,
    snapshot: &ProgressSnapshot,
) -> Result<PathBuf, ProgressError> {
    atomic_write_json(path, &snapshot.to_json())?;
    tracing::debug!(
        path = %path.display(),
        stages = snapshot.stages.len(),
        "progress snapshot written",
    );
    Ok(path.to_path_buf())
}

/// Load a snapshot; `None` when the file does not exist.
pub fn load_progress_snapshot(path: &Path) -> Result<Option<ProgressSnapshot>, ProgressError> {
    if !path.exists() {
        return Ok(None);
    }
    let payload: Value = serde_json::from_str(&std::fs::read_to_string(path)?)?;
    if !payload.is_object() {
        return Err(ProgressError::NotAnObject);
    }
    ProgressSnapshot::from_json(&payload).map(Some)
}

#[cfg(test)]
#[path = "progress_tests.rs"]
mod tests;
