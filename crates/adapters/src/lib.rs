// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
// Enable coverage(off) attribute for excluding test infrastructure
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Adapters for external I/O: processes, HTTP and renderers

pub mod env;
pub mod export;
pub mod http;
pub mod runner;
pub mod subprocess;
pub mod traced;

pub use export::{
    default_markdown_to_html, pre_wrapped_html, resolve_binary, BinarySpec, ExportError, ExportResult, Exporter,
    GraphvizOptions, MermaidOptions, PdfOptions, SystemSearch,
};
pub use http::{HttpClient, HttpClientConfig, HttpError, HttpResponse};
pub use runner::{CommandError, CommandOutput, CommandRequest, CommandRunner, ProcessRunner};
pub use subprocess::{format_command, run_command, run_command_with, RunOptions};
pub use traced::TracedRunner;

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
pub use runner::FakeCommandRunner;
