// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the adapters crate.

use std::path::PathBuf;

/// Override for the wkhtmltopdf binary.
pub const WKHTMLTOPDF_PATH_VAR: &str = "X_WKHTMLTOPDF_PATH";

/// Override for the Graphviz `dot` binary.
pub const GRAPHVIZ_DOT_VAR: &str = "GRAPHVIZ_DOT";

/// Override for the mermaid-cli `mmdc` binary.
pub const MMDC_VAR: &str = "MMDC";

/// Binary named by `var`, if it points at an existing file.
pub fn binary_override(var: &str) -> Option<PathBuf> {
    xm_core::get_env_str(var, None)
        .map(PathBuf::from)
        .filter(|path| path.is_file())
}
