// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Data contracts: JSON Schema validation, telemetry events and persona vetting

pub mod env;
pub mod persona;
pub mod schema;
pub mod telemetry;

pub use persona::normalizer::{
    extract_answer_text, extract_highlights, extract_tags, format_persona_question,
    score_from_answer, source_from_response, synopsis_from_answer, DEFAULT_PERSONA_PROMPT,
};
pub use persona::{EvidenceDetails, PersonaError, PersonaEvidence, PersonaVettingService};
pub use schema::{validate_payload, validate_schema, CompiledSchema, SchemaError};
pub use telemetry::{
    coerce_event, configure_event_sink, dumps, emit_event, loads, make_event, validate_event,
    EventSpec, TelemetryEmitter, TelemetryError, TelemetryEvent, TelemetrySource,
    TelemetryStatus, SCHEMA_VERSION, TELEMETRY_SCHEMA,
};
