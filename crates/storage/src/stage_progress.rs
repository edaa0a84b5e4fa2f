// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-stage, per-repository progress files.
//!
//! A stage owns one directory:
//!
//! ```text
//! <root>/index.json              summary of every repository
//! <root>/<safe-name>_<hash>.json detail for one repository
//! ```
//!
//! Every update rewrites the repository's detail file and then the index,
//! both atomically. Readers polling the directory always see complete
//! documents, though the index may briefly lag a detail file.

use crate::atomic::{atomic_write_json, AtomicWriteError};
use crate::status::ProgressStatus;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use regex::Regex;
use serde::Serialize;
use serde_json::{json, Map, Value};
use sha1::{Digest, Sha1};
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use thiserror::Error;

/// Version tag of per-repository detail files
pub const DETAIL_SCHEMA_VERSION: &str = "x_make.stage_progress.repo/1.0";
/// Version tag of the stage index
pub const INDEX_SCHEMA_VERSION: &str = "x_make.stage_progress.index/1.0";
/// Messages kept per entry
pub const MESSAGE_LIMIT: usize = 10;
/// Messages copied into the index preview
pub const MESSAGE_PREVIEW: usize = 3;
/// Id used when a caller passes a blank repository id
pub const UNKNOWN_REPO_ID: &str = "<unknown>";

const INDEX_FILE_NAME: &str = "index.json";

// Allow expect here as the regexes are compile-time verified to be valid
#[allow(clippy::expect_used)]
static REPEATED_SLASHES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/+").expect("constant regex pattern is valid"));

#[allow(clippy::expect_used)]
static UNSAFE_FILENAME_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^A-Za-z0-9_.-]").expect("constant regex pattern is valid"));

/// Errors from stage progress writers
#[derive(Debug, Error)]
pub enum StageProgressError {
    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Write(#[from] AtomicWriteError),
}

/// Progress of one repository within a stage
#[derive(Debug, Clone, PartialEq)]
pub struct StageProgressEntry {
    pub repo_id: String,
    pub display_name: Option<String>,
    pub status: ProgressStatus,
    pub messages: Vec<String>,
    pub metadata: Map<String, Value>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

impl StageProgressEntry {
    pub fn new(repo_id: impl Into<String>) -> Self {
        Self {
            repo_id: repo_id.into(),
            display_name: None,
            status: ProgressStatus::Pending,
            messages: Vec::new(),
            metadata: Map::new(),
            started_at: None,
            completed_at: None,
            updated_at: Utc::now(),
        }
    }

    pub fn to_detail_payload(&self, stage_id: &str) -> Value {
        json!({
            "schema_version": DETAIL_SCHEMA_VERSION,
            "stage_id": stage_id,
            "repo_id": self.repo_id,
            "display_name": self.display_name,
            "status": self.status,
            "messages": self.messages,
            "metadata": self.metadata,
            "started_at": self.started_at,
            "completed_at": self.completed_at,
            "updated_at": self.updated_at,
        })
    }

    pub fn to_index_payload(&self, detail_path: &str) -> Value {
        let preview: Vec<_> = self.messages.iter().take(MESSAGE_PREVIEW).collect();
        json!({
            "repo_id": self.repo_id,
            "display_name": self.display_name,
            "status": self.status,
            "detail_path": detail_path,
            "updated_at": self.updated_at,
            "started_at": self.started_at,
            "completed_at": self.completed_at,
            "message_preview": preview,
        })
    }
}

/// Optional fields carried by every `record_*` call
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntryUpdate {
    pub display_name: Option<String>,
    pub metadata: Map<String, Value>,
    pub messages: Vec<String>,
}

impl EntryUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }

    pub fn metadata(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.messages.push(message.into());
        self
    }

    pub fn messages<I, S>(mut self, messages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.messages.extend(messages.into_iter().map(Into::into));
        self
    }
}

/// Sink for per-repository lifecycle events.
///
/// Stage runners take `&dyn RepoProgressReporter` so callers can pass a
/// real writer or [`NoOpProgressReporter`].
pub trait RepoProgressReporter: Send + Sync {
    fn record_pending(&self, repo_id: &str, update: EntryUpdate) -> Result<(), StageProgressError>;
    fn record_start(&self, repo_id: &str, update: EntryUpdate) -> Result<(), StageProgressError>;
    fn record_success(&self, repo_id: &str, update: EntryUpdate) -> Result<(), StageProgressError>;
    fn record_failure(&self, repo_id: &str, update: EntryUpdate) -> Result<(), StageProgressError>;
    fn record_skipped(&self, repo_id: &str, update: EntryUpdate) -> Result<(), StageProgressError>;
}

/// Reporter that discards everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpProgressReporter;

impl RepoProgressReporter for NoOpProgressReporter {
    fn record_pending(&self, _: &str, _: EntryUpdate) -> Result<(), StageProgressError> {
        Ok(())
    }

    fn record_start(&self, _: &str, _: EntryUpdate) -> Result<(), StageProgressError> {
        Ok(())
    }

    fn record_success(&self, _: &str, _: EntryUpdate) -> Result<(), StageProgressError> {
        Ok(())
    }

    fn record_failure(&self, _: &str, _: EntryUpdate) -> Result<(), StageProgressError> {
        Ok(())
    }

    fn record_skipped(&self, _: &str, _: EntryUpdate) -> Result<(), StageProgressError> {
        Ok(())
    }
}

/// Summary returned by [`StageProgressWriter::describe`]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StageProgressSummary {
    pub stage_id: String,
    pub index_path: PathBuf,
    pub entries_dir: PathBuf,
    pub total_entries: usize,
    pub status_counts: BTreeMap<ProgressStatus, usize>,
}

/// How a `record_*` call changes an entry
struct Transition {
    status: ProgressStatus,
    mark_started: bool,
    mark_completed: bool,
    replace_messages: bool,
    fallback_message: Option<&'static str>,
}

const PENDING: Transition = Transition {
    status: ProgressStatus::Pending,
    mark_started: false,
    mark_completed: false,
    replace_messages: true,
    fallback_message: None,
};

const START: Transition = Transition {
    status: ProgressStatus::Running,
    mark_started: true,
    mark_completed: false,
    replace_messages: false,
    fallback_message: None,
};

const SUCCESS: Transition = Transition {
    status: ProgressStatus::Completed,
    mark_started: true,
    mark_completed: true,
    replace_messages: false,
    fallback_message: Some("Completed successfully."),
};

const FAILURE: Transition = Transition {
    status: ProgressStatus::Attention,
    mark_started: true,
    mark_completed: true,
    replace_messages: false,
    fallback_message: Some("Failed with issues."),
};

const SKIPPED: Transition = Transition {
    status: ProgressStatus::Skipped,
    mark_started: false,
    mark_completed: true,
    replace_messages: false,
    fallback_message: Some("Skipped."),
};

#[derive(Default)]
struct WriterState {
    entries: HashMap<String, StageProgressEntry>,
    entry_files: HashMap<String, String>,
}

impl WriterState {
    fn status_counts(&self) -> BTreeMap<ProgressStatus, usize> {
        let mut counts = BTreeMap::new();
        for entry in self.entries.values() {
            *counts.entry(entry.status).or_insert(0) += 1;
        }
        counts
    }
}

/// File-backed [`RepoProgressReporter`] for one stage.
///
/// Construction wipes the stage directory. The writer can be shared across
/// threads; updates are serialized by an internal lock.
pub struct StageProgressWriter {
    stage_id: String,
    root_dir: PathBuf,
    index_path: PathBuf,
    state: Mutex<WriterState>,
}

impl StageProgressWriter {
    pub fn new(
        stage_id: impl Into<String>,
        root_dir: impl Into<PathBuf>,
    ) -> Result<Self, StageProgressError> {
        let root_dir = root_dir.into();
        create_dir(&root_dir)?;
        let writer = Self {
            stage_id: stage_id.into(),
            index_path: root_dir.join(INDEX_FILE_NAME),
            root_dir,
            state: Mutex::new(WriterState::default()),
        };
        writer.reset()?;
        Ok(writer)
    }

    pub fn stage_id(&self) -> &str {
        &self.stage_id
    }

    pub fn index_path(&self) -> &Path {
        &self.index_path
    }

    pub fn entries_dir(&self) -> &Path {
        &self.root_dir
    }

    /// Current entry for `repo_id`, if one has been recorded.
    pub fn entry(&self, repo_id: &str) -> Option<StageProgressEntry> {
        self.state.lock().entries.get(&normalize_repo_id(repo_id)).cloned()
    }

    pub fn describe(&self) -> StageProgressSummary {
        let counts = self.state.lock().status_counts();
        StageProgressSummary {
            stage_id: self.stage_id.clone(),
            index_path: self.index_path.clone(),
            entries_dir: self.root_dir.clone(),
            total_entries: counts.values().sum(),
            status_counts: counts,
        }
    }

    /// Forget every entry, empty the directory and write an empty index.
    ///
    /// Children that cannot be removed are left in place.
    pub fn reset(&self) -> Result<(), StageProgressError> {
        let mut state = self.state.lock();
        state.entries.clear();
        state.entry_files.clear();

        if let Ok(children) = std::fs::read_dir(&self.root_dir) {
            for child in children.flatten() {
                let path = child.path();
                let removed = if path.is_dir() {
                    std::fs::remove_dir_all(&path)
                } else {
                    std::fs::remove_file(&path)
                };
                if let Err(error) = removed {
                    tracing::warn!(path = %path.display(), %error, "could not clear stage entry");
                }
            }
        }
        create_dir(&self.root_dir)?;
        self.write_index(&state)
    }

    fn record(
        &self,
        repo_id: &str,
        update: EntryUpdate,
        transition: &Transition,
    ) -> Result<(), StageProgressError> {
        let repo_id = normalize_repo_id(repo_id);
        let mut state = self.state.lock();

        let entry = state
            .entries
            .entry(repo_id.clone())
            .or_insert_with(|| StageProgressEntry::new(repo_id.clone()));
        if let Some(name) = update.display_name.filter(|n| !n.is_empty()) {
            if entry.display_name.as_deref() != Some(name.as_str()) {
                entry.display_name = Some(name);
            }
        }

        let now = Utc::now();
        if transition.mark_started && entry.started_at.is_none() {
            entry.started_at = Some(now);
        }
        if (transition.mark_completed || transition.status.is_completion())
            && entry.completed_at.is_none()
        {
            entry.completed_at = Some(now);
        }
        entry.status = transition.status;

        let mut messages = sanitize_messages(&update.messages);
        if messages.is_empty() {
            if let Some(fallback) = transition.fallback_message {
                messages.push(fallback.to_string());
            }
        }
        if transition.replace_messages {
            entry.messages = messages;
        } else if !messages.is_empty() {
            entry.messages.extend(messages);
            entry.messages = sanitize_messages(&entry.messages);
        }

        entry.metadata.extend(update.metadata);
        entry.updated_at = now;

        let filename = safe_repo_filename(&repo_id);
        let payload = entry.to_detail_payload(&self.stage_id);
        let status = entry.status;
        atomic_write_json(&self.root_dir.join(&filename), &payload)?;
        state.entry_files.insert(repo_id.clone(), filename);
        tracing::debug!(
            stage = %self.stage_id,
            repo = %repo_id,
            %status,
            "stage progress recorded",
        );
        self.write_index(&state)
    }

    fn write_index(&self, state: &WriterState) -> Result<(), StageProgressError> {
        let mut ordered: Vec<_> = state.entries.values().collect();
        ordered.sort_by_cached_key(|e| e.repo_id.to_lowercase());
        let entries: Vec<_> = ordered
            .iter()
            .map(|entry| {
                let detail_path = state
                    .entry_files
                    .get(&entry.repo_id)
                    .map(String::as_str)
                    .unwrap_or("");
                entry.to_index_payload(detail_path)
            })
            .collect();

        let payload = json!({
            "schema_version": INDEX_SCHEMA_VERSION,
            "stage_id": self.stage_id,
            "updated_at": Utc::now(),
            "entries_dir": self.root_dir.display().to_string(),
            "total_entries": ordered.len(),
            "status_counts": state.status_counts(),
            "entries": entries,
        });
        atomic_write_json(&self.index_path, &payload)?;
        Ok(())
    }
}

impl RepoProgressReporter for StageProgressWriter {
    fn record_pending(&self, repo_id: &str, update: EntryUpdate) -> Result<(), StageProgressError> {
        self.record(repo_id, update, &PENDING)
    }

    fn record_start(&self, repo_id: &str, update: EntryUpdate) -> Result<(), StageProgressError> {
        self.record(repo_id, update, &START)
    }

    fn record_success(&self, repo_id: &str, update: EntryUpdate) -> Result<(), StageProgressError> {
        self.record(repo_id, update, &SUCCESS)
    }

    fn record_failure(&self, repo_id: &str, update: EntryUpdate) -> Result<(), StageProgressError> {
        self.record(repo_id, update, &FAILURE)
    }

    fn record_skipped(&self, repo_id: &str, update: EntryUpdate) -> Result<(), StageProgressError> {
        self.record(repo_id, update, &SKIPPED)
    }
}

fn create_dir(path: &Path) -> Result<(), StageProgressError> {
    std::fs::create_dir_all(path).map_err(|source| StageProgressError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn normalize_repo_id(repo_id: &str) -> String {
    match repo_id.trim() {
        "" => UNKNOWN_REPO_ID.to_string(),
        trimmed => trimmed.to_string(),
    }
}

/// Trim, drop empties and duplicates, keep the first [`MESSAGE_LIMIT`].
pub fn sanitize_messages<S: AsRef<str>>(messages: &[S]) -> Vec<String> {
    let mut kept: Vec<String> = Vec::new();
    for message in messages {
        let text = message.as_ref().trim();
        if text.is_empty() || kept.iter().any(|k| k == text) {
            continue;
        }
        kept.push(text.to_string());
        if kept.len() >= MESSAGE_LIMIT {
            break;
        }
    }
    kept
}

/// Filesystem-safe, collision-resistant detail file name for a repository.
pub fn safe_repo_filename(repo_id: &str) -> String {
    let cleaned = repo_id.trim().replace('\\', "/");
    let cleaned = REPEATED_SLASHES.replace_all(&cleaned, "/").replace('/', "__");
    let cleaned = UNSAFE_FILENAME_CHARS.replace_all(&cleaned, "_");
    let cleaned = cleaned.trim_matches(|c: char| c == '.' || c == '_');
    let stem = if cleaned.is_empty() { "repo" } else { cleaned };
    let digest = format!("{:x}", Sha1::digest(repo_id.as_bytes()));
    format!("{stem}_{}.json", &digest[..8])
}

#[cfg(test)]
#[path = "stage_progress_tests.rs"]
mod tests;
