// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Heuristic discovery of runnable entrypoints in a source tree

mod entrypoints;

pub use entrypoints::{
    default_name_patterns, scan_python_entrypoints, DetectError, EntryPointCandidate,
    EntryPointDiscovery, ScanOptions, DEFAULT_EXCLUDE_DIRS, DEFAULT_NAME_PATTERNS,
};
