// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! xm-common: shared utilities for the x_make workspace tools
//!
//! Each concern lives in its own crate; this crate re-exports them under one
//! roof so tools depend on a single package.

pub use xm_adapters as adapters;
pub use xm_contracts as contracts;
pub use xm_detect as detect;
pub use xm_storage as storage;

pub use xm_core::{
    env, get_env_bool, get_env_str, init_logging, lenient, logging, time_fmt, LogConfig,
    LoggingError,
};

pub use xm_adapters::{
    run_command, CommandError, CommandOutput, ExportResult, Exporter, HttpClient,
    HttpClientConfig, HttpError, HttpResponse, RunOptions,
};
pub use xm_contracts::{
    emit_event, make_event, validate_payload, validate_schema, EventSpec, SchemaError,
    TelemetryEvent, TelemetrySource, TelemetryStatus,
};
pub use xm_detect::{scan_python_entrypoints, EntryPointDiscovery, ScanOptions};
pub use xm_storage::{
    append_event, atomic_write, atomic_write_json, load_board, save_board, BoardState,
    CardRecord, ProgressSnapshot, ProgressStatus, RepoProgressReporter, StageProgressWriter,
};
