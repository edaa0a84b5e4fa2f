// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Environment variables read by the contracts crate.

use xm_core::get_env_bool;

/// Skip mirroring telemetry to stdout (`X_TELEMETRY_SUPPRESS_STDOUT`).
pub fn suppress_telemetry_stdout() -> bool {
    get_env_bool("X_TELEMETRY_SUPPRESS_STDOUT", false)
}
