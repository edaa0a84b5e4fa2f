// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Versioned telemetry envelope shared by x_make tools.
//!
//! Events are validated against [`TELEMETRY_SCHEMA`] when built and when
//! parsed, so anything written to a sink is known-good. On the wire an event
//! is one compact JSON object per line with keys sorted.

use crate::schema::{CompiledSchema, SchemaError};
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::fmt;
use std::io::{self, Write};
use std::sync::LazyLock;
use thiserror::Error;
use xm_core::ensure_timestamp;

/// Envelope version; bump when the schema changes
pub const SCHEMA_VERSION: &str = "0.20.0";

/// Tracing target used for every emitted event
pub const TELEMETRY_TARGET: &str = "xm::telemetry";

/// Draft 2020-12 schema every event must satisfy
pub static TELEMETRY_SCHEMA: LazyLock<Value> = LazyLock::new(|| {
    json!({
        "$schema": "https://json-schema.org/draft/2020-12/schema",
        "$id": "https://x-make.dev/schemas/telemetry-event.json",
        "title": "x_make telemetry event",
        "type": "object",
        "additionalProperties": false,
        "required": [
            "version", "timestamp", "source", "phase", "status",
            "repository", "tool", "attempt", "duration_ms", "details",
        ],
        "properties": {
            "version": {"const": SCHEMA_VERSION},
            "timestamp": {
                "type": "string",
                "pattern": r"^\d{4}-\d{2}-\d{2}T\d{2}:\d{2}:\d{2}(\.\d+)?Z$",
            },
            "source": {"enum": TelemetrySource::ALL.map(TelemetrySource::as_str)},
            "phase": {"type": "string", "minLength": 1},
            "status": {"enum": TelemetryStatus::ALL.map(TelemetryStatus::as_str)},
            "repository": {"type": ["string", "null"]},
            "tool": {"type": ["string", "null"]},
            "attempt": {"type": ["integer", "null"], "minimum": 1},
            "duration_ms": {"type": ["integer", "null"], "minimum": 0},
            "details": {"type": ["object", "null"]},
        },
    })
});

// Allow expect here as the schema is a constant covered by tests
#[allow(clippy::expect_used)]
static VALIDATOR: LazyLock<CompiledSchema> = LazyLock::new(|| {
    CompiledSchema::new(&TELEMETRY_SCHEMA).expect("telemetry schema is valid")
});

#[derive(Debug, Error)]
pub enum TelemetryError {
    #[error(transparent)]
    Schema(#[from] SchemaError),
    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Tool family that produced an event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TelemetrySource {
    Orchestrator,
    Visitor,
    Cloner,
    Publisher,
    Exporter,
    Kanban,
    Progress,
    Tooling,
}

impl TelemetrySource {
    pub const ALL: [TelemetrySource; 8] = [
        TelemetrySource::Orchestrator,
        TelemetrySource::Visitor,
        TelemetrySource::Cloner,
        TelemetrySource::Publisher,
        TelemetrySource::Exporter,
        TelemetrySource::Kanban,
        TelemetrySource::Progress,
        TelemetrySource::Tooling,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            TelemetrySource::Orchestrator => "orchestrator",
            TelemetrySource::Visitor => "visitor",
            TelemetrySource::Cloner => "cloner",
            TelemetrySource::Publisher => "publisher",
            TelemetrySource::Exporter => "exporter",
            TelemetrySource::Kanban => "kanban",
            TelemetrySource::Progress => "progress",
            TelemetrySource::Tooling => "tooling",
        }
    }
}

impl fmt::Display for TelemetrySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome reported by an event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TelemetryStatus {
    Started,
    Succeeded,
    Failed,
    Skipped,
    Retried,
    Cancelled,
}

impl TelemetryStatus {
    pub const ALL: [TelemetryStatus; 6] = [
        TelemetryStatus::Started,
        TelemetryStatus::Succeeded,
        TelemetryStatus::Failed,
        TelemetryStatus::Skipped,
        TelemetryStatus::Retried,
        TelemetryStatus::Cancelled,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            TelemetryStatus::Started => "started",
            TelemetryStatus::Succeeded => "succeeded",
            TelemetryStatus::Failed => "failed",
            TelemetryStatus::Skipped => "skipped",
            TelemetryStatus::Retried => "retried",
            TelemetryStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for TelemetryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A validated telemetry event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetryEvent {
    pub version: String,
    pub timestamp: String,
    pub source: TelemetrySource,
    pub phase: String,
    pub status: TelemetryStatus,
    pub repository: Option<String>,
    pub tool: Option<String>,
    pub attempt: Option<u32>,
    pub duration_ms: Option<u64>,
    pub details: Option<Map<String, Value>>,
}

impl TelemetryEvent {
    pub fn to_value(&self) -> Result<Value, TelemetryError> {
        Ok(serde_json::to_value(self)?)
    }
}

/// Inputs to [`make_event`]
#[derive(Debug, Clone, PartialEq)]
pub struct EventSpec {
    pub source: TelemetrySource,
    pub phase: String,
    pub status: TelemetryStatus,
    pub repository: Option<String>,
    pub tool: Option<String>,
    pub attempt: Option<u32>,
    pub duration_ms: Option<u64>,
    pub details: Option<Map<String, Value>>,
    /// Defaults to now
    pub timestamp: Option<DateTime<Utc>>,
}

impl EventSpec {
    pub fn new(source: TelemetrySource, phase: impl Into<String>, status: TelemetryStatus) -> Self {
        Self {
            source,
            phase: phase.into(),
            status,
            repository: None,
            tool: None,
            attempt: None,
            duration_ms: None,
            details: None,
            timestamp: None,
        }
    }

    pub fn repository(mut self, repository: impl Into<String>) -> Self {
        self.repository = Some(repository.into());
        self
    }

    pub fn tool(mut self, tool: impl Into<String>) -> Self {
        self.tool = Some(tool.into());
        self
    }

    pub fn attempt(mut self, attempt: u32) -> Self {
        self.attempt = Some(attempt);
        self
    }

    pub fn duration_ms(mut self, duration_ms: u64) -> Self {
        self.duration_ms = Some(duration_ms);
        self
    }

    pub fn details(mut self, details: Map<String, Value>) -> Self {
        self.details = Some(details);
        self
    }

    pub fn timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }
}

/// Build and validate an event stamped with the current schema version.
pub fn make_event(spec: EventSpec) -> Result<TelemetryEvent, TelemetryError> {
    let event = TelemetryEvent {
        version: SCHEMA_VERSION.to_string(),
        timestamp: ensure_timestamp(&spec.timestamp.unwrap_or_else(Utc::now)),
        source: spec.source,
        phase: spec.phase,
        status: spec.status,
        repository: spec.repository,
        tool: spec.tool,
        attempt: spec.attempt,
        duration_ms: spec.duration_ms,
        details: spec.details,
    };
    validate_event(&event.to_value()?)?;
    Ok(event)
}

pub fn validate_event(payload: &Value) -> Result<(), SchemaError> {
    VALIDATOR.validate(payload)
}

/// Validate a raw payload and decode it.
pub fn coerce_event(payload: Value) -> Result<TelemetryEvent, TelemetryError> {
    validate_event(&payload)?;
    Ok(serde_json::from_value(payload)?)
}

/// Compact JSON with sorted keys.
pub fn dumps(event: &TelemetryEvent) -> Result<String, TelemetryError> {
    Ok(serde_json::to_string(&event.to_value()?)?)
}

pub fn loads(text: &str) -> Result<TelemetryEvent, TelemetryError> {
    coerce_event(serde_json::from_str(text)?)
}

/// Writes events to an optional sink and to stdout.
///
/// Without a sink every event goes to stdout. With one, stdout only gets a
/// copy when `echo` is set. `X_TELEMETRY_SUPPRESS_STDOUT` silences stdout
/// in both cases.
pub struct TelemetryEmitter {
    sink: Option<Box<dyn Write + Send>>,
    echo: bool,
    stdout: Box<dyn Write + Send>,
}

impl Default for TelemetryEmitter {
    fn default() -> Self {
        Self::with_stdout(Box::new(io::stdout()))
    }
}

impl TelemetryEmitter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_stdout(stdout: Box<dyn Write + Send>) -> Self {
        Self {
            sink: None,
            echo: false,
            stdout,
        }
    }

    /// Replace the sink, returning the previous one.
    pub fn configure_sink(
        &mut self,
        sink: Option<Box<dyn Write + Send>>,
        echo: bool,
    ) -> Option<Box<dyn Write + Send>> {
        self.echo = echo;
        std::mem::replace(&mut self.sink, sink)
    }

    pub fn emit(&mut self, event: &TelemetryEvent) -> Result<(), TelemetryError> {
        let line = dumps(event)?;
        tracing::info!(
            target: TELEMETRY_TARGET,
            source = %event.source,
            phase = %event.phase,
            status = %event.status,
            repository = event.repository.as_deref(),
            "telemetry event: {line}",
        );

        let mirror = match self.sink.as_mut() {
            Some(sink) => {
                writeln!(sink, "{line}")?;
                sink.flush()?;
                self.echo
            }
            None => true,
        };
        if mirror && !crate::env::suppress_telemetry_stdout() {
            writeln!(self.stdout, "{line}")?;
            self.stdout.flush()?;
        }
        Ok(())
    }
}

impl fmt::Debug for TelemetryEmitter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TelemetryEmitter")
            .field("has_sink", &self.sink.is_some())
            .field("echo", &self.echo)
            .finish()
    }
}

static GLOBAL_EMITTER: LazyLock<Mutex<TelemetryEmitter>> =
    LazyLock::new(|| Mutex::new(TelemetryEmitter::new()));

/// Set the process-wide sink used by [`emit_event`], returning the old one.
pub fn configure_event_sink(
    sink: Option<Box<dyn Write + Send>>,
    echo: bool,
) -> Option<Box<dyn Write + Send>> {
    GLOBAL_EMITTER.lock().configure_sink(sink, echo)
}

/// Emit through the process-wide emitter.
pub fn emit_event(event: &TelemetryEvent) -> Result<(), TelemetryError> {
    GLOBAL_EMITTER.lock().emit(event)
}

#[cfg(test)]
#[path = "telemetry_tests.rs"]
mod tests;
