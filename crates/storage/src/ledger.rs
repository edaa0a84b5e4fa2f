// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Append-only JSONL ledger with per-entry checksums.
//!
//! Each line is `{"event_type":..,"payload":{..},"emitted_at":..,"sha256":..}`.
//! The checksum covers the canonical encoding of the first three fields
//! (compact, keys sorted, non-ASCII escaped as `\uXXXX`), so any edit to a
//! line is detectable.

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::ser::{Formatter, Serializer};
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors from ledger operations
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("malformed ledger entry at line {line}: {message}")]
    Corrupt { line: usize, message: String },
    #[error("checksum mismatch at line {line}")]
    ChecksumMismatch { line: usize },
}

/// Structured event suitable for immutable ledgers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerEvent {
    pub event_type: String,
    pub payload: Map<String, Value>,
    pub emitted_at: String,
}

impl LedgerEvent {
    /// Create an event stamped with the current time.
    pub fn new(event_type: impl Into<String>, payload: Map<String, Value>) -> Self {
        Self {
            event_type: event_type.into(),
            payload,
            emitted_at: Utc::now().to_rfc3339_opts(SecondsFormat::Micros, false),
        }
    }

    pub fn with_emitted_at(mut self, emitted_at: impl Into<String>) -> Self {
        self.emitted_at = emitted_at.into();
        self
    }

    /// Hex sha256 over the canonical encoding.
    pub fn checksum(&self) -> Result<String, LedgerError> {
        let mut canonical = Vec::new();
        let mut ser = Serializer::with_formatter(&mut canonical, AsciiFormatter);
        canonicalize(serde_json::to_value(self)?).serialize(&mut ser)?;
        Ok(format!("{:x}", Sha256::digest(&canonical)))
    }
}

/// Compact output restricted to printable ASCII.
///
/// Characters outside `' '..='~'` are written as `\uXXXX`, with surrogate
/// pairs above the BMP.
struct AsciiFormatter;

impl Formatter for AsciiFormatter {
    fn write_string_fragment<W>(&mut self, writer: &mut W, fragment: &str) -> io::Result<()>
    where
        W: ?Sized + Write,
    {
        for ch in fragment.chars() {
            if (' '..='~').contains(&ch) {
                writer.write_all(&[ch as u8])?;
            } else {
                let mut units = [0u16; 2];
                for unit in ch.encode_utf16(&mut units) {
                    write!(writer, "\\u{unit:04x}")?;
                }
            }
        }
        Ok(())
    }
}

/// Rebuild objects with keys in sorted order at every depth.
fn canonicalize(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<_> = map.into_iter().collect();
            entries.sort_by(|a, b| a.0.cmp(&b.0));
            Value::Object(
                entries
                    .into_iter()
                    .map(|(k, v)| (k, canonicalize(v)))
                    .collect(),
            )
        }
        Value::Array(items) => Value::Array(items.into_iter().map(canonicalize).collect()),
        other => other,
    }
}

/// One line of the ledger
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerEntry {
    #[serde(flatten)]
    pub event: LedgerEvent,
    pub sha256: String,
}

/// Append-only JSONL writer
#[derive(Debug, Clone)]
pub struct LedgerWriter {
    path: PathBuf,
}

impl LedgerWriter {
    /// Create a writer, making sure the parent directory exists.
    pub fn new(path: impl Into<PathBuf>) -> Result<Self, LedgerError> {
        let path = path.into();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append `event`, returning its checksum.
    pub fn append(&self, event: &LedgerEvent) -> Result<String, LedgerError> {
        let digest = event.checksum()?;
        let entry = LedgerEntry {
            event: event.clone(),
            sha256: digest.clone(),
        };
        let mut line = serde_json::to_vec(&entry)?;
        line.push(b'\n');

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.write_all(&line)?;
        file.flush()?;
        tracing::debug!(
            path = %self.path.display(),
            event_type = %event.event_type,
            sha256 = %digest,
            "ledger entry appended",
        );
        Ok(digest)
    }
}

/// Append an event to the ledger at `path`, returning the checksum.
pub fn append_event(
    path: &Path,
    event_type: &str,
    payload: Map<String, Value>,
) -> Result<String, LedgerError> {
    LedgerWriter::new(path)?.append(&LedgerEvent::new(event_type, payload))
}

/// Read every entry without checking checksums. Blank lines are skipped.
pub fn read_ledger(path: &Path) -> Result<Vec<LedgerEntry>, LedgerError> {
    let reader = BufReader::new(File::open(path)?);
    let mut entries = Vec::new();
    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let entry: LedgerEntry =
            serde_json::from_str(&line).map_err(|e| LedgerError::Corrupt {
                line: index + 1,
                message: e.to_string(),
            })?;
        entries.push(entry);
    }
    Ok(entries)
}

/// Read every entry and recompute its checksum.
///
/// Fails on the first line whose stored digest does not match.
pub fn verify_ledger(path: &Path) -> Result<Vec<LedgerEntry>, LedgerError> {
    let reader = BufReader::new(File::open(path)?);
    let mut entries = Vec::new();
    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let entry: LedgerEntry =
            serde_json::from_str(&line).map_err(|e| LedgerError::Corrupt {
                line: index + 1,
                message: e.to_string(),
            })?;
        if entry.event.checksum()? != entry.sha256 {
            return Err(LedgerError::ChecksumMismatch { line: index + 1 });
        }
        entries.push(entry);
    }
    Ok(entries)
}

#[cfg(test)]
#[path = "ledger_tests.rs"]
mod tests;
