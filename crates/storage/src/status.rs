// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Progress status shared by snapshots and stage progress files

use serde::Deserialize;
use std::fmt;

/// Lifecycle status of a tracked stage or repository
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum ProgressStatus {
    #[default]
    Pending,
    Running,
    /// Needs a human look; also the landing spot for unrecognized values
    Attention,
    Completed,
    Blocked,
    Skipped,
}

impl ProgressStatus {
    pub const ALL: [ProgressStatus; 6] = [
        ProgressStatus::Pending,
        ProgressStatus::Running,
        ProgressStatus::Attention,
        ProgressStatus::Completed,
        ProgressStatus::Blocked,
        ProgressStatus::Skipped,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProgressStatus::Pending => "pending",
            ProgressStatus::Running => "running",
            ProgressStatus::Attention => "attention",
            ProgressStatus::Completed => "completed",
            ProgressStatus::Blocked => "blocked",
            ProgressStatus::Skipped => "skipped",
        }
    }

    /// Parse leniently: trimmed, case-insensitive, unknown values map to `Attention`.
    pub fn normalize(raw: &str) -> Self {
        let lowered = raw.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|s| s.as_str() == lowered)
            .unwrap_or(ProgressStatus::Attention)
    }

    /// Statuses that mark an entry as finished.
    pub fn is_completion(&self) -> bool {
        matches!(
            self,
            ProgressStatus::Completed
                | ProgressStatus::Attention
                | ProgressStatus::Blocked
                | ProgressStatus::Skipped
        )
    }

    /// Snapshot stages have no `skipped` state; it folds into `Attention`.
    pub fn for_snapshot(self) -> Self {
        match self {
            ProgressStatus::Skipped => ProgressStatus::Attention,
            other => other,
        }
    }
}

impl fmt::Display for ProgressStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for ProgressStatus {
    fn from(raw: &str) -> Self {
        ProgressStatus::normalize(raw)
    }
}

impl serde::Serialize for ProgressStatus {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ProgressStatus {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        // Non-string values (numbers, null) are unreadable, not fatal
        let value = serde_json::Value::deserialize(deserializer)?;
        Ok(match value.as_str() {
            Some(s) => ProgressStatus::normalize(s),
            None => ProgressStatus::Attention,
        })
    }
}

#[cfg(test)]
#[path = "status_tests.rs"]
mod tests;
