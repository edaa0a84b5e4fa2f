// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Locating renderer binaries

use crate::env::{binary_override, GRAPHVIZ_DOT_VAR, MMDC_VAR, WKHTMLTOPDF_PATH_VAR};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};

/// How to find one external renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BinarySpec {
    pub env_var: &'static str,
    /// Names tried against `PATH`, in order
    pub fallback_names: &'static [&'static str],
    /// Well-known install locations tried last
    pub default_candidates: &'static [&'static str],
    /// Detail reported when nothing is found
    pub missing_detail: &'static str,
    /// Detail reported when the command runs but produces nothing
    pub failed_detail: &'static str,
}

impl BinarySpec {
    pub const WKHTMLTOPDF: BinarySpec = BinarySpec {
        env_var: WKHTMLTOPDF_PATH_VAR,
        fallback_names: &["wkhtmltopdf", "wkhtmltopdf.exe"],
        default_candidates: &[
            r"C:\Program Files\wkhtmltopdf\bin\wkhtmltopdf.exe",
            r"C:\Program Files (x86)\wkhtmltopdf\bin\wkhtmltopdf.exe",
            "/usr/local/bin/wkhtmltopdf",
            "/usr/bin/wkhtmltopdf",
        ],
        missing_detail: "wkhtmltopdf binary not found; install it or set X_WKHTMLTOPDF_PATH",
        failed_detail: "wkhtmltopdf execution failed",
    };

    pub const GRAPHVIZ_DOT: BinarySpec = BinarySpec {
        env_var: GRAPHVIZ_DOT_VAR,
        fallback_names: &["dot", "dot.exe"],
        default_candidates: &[],
        missing_detail: "graphviz 'dot' binary not found; install Graphviz or set GRAPHVIZ_DOT",
        failed_detail: "dot execution failed",
    };

    pub const MERMAID_CLI: BinarySpec = BinarySpec {
        env_var: MMDC_VAR,
        fallback_names: &["mmdc", "mmdc.cmd", "mmdc.ps1"],
        default_candidates: &[],
        missing_detail: "mermaid-cli 'mmdc' not found; install mermaid-cli or set MMDC",
        failed_detail: "mmdc execution failed",
    };
}

/// Where [`resolve_binary`] may look beyond the explicit path and env var.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SystemSearch {
    /// The process `PATH` plus the spec's default candidates
    #[default]
    Enabled,
    /// Only the given directories, no default candidates
    Dirs(Vec<PathBuf>),
    Disabled,
}

/// Resolve a binary: explicit path, then env var, then `PATH`, then
/// default install locations.
///
/// An explicit path that does not exist is still returned when
/// `allow_missing_preferred` is set.
pub fn resolve_binary(
    preferred: Option<&Path>,
    spec: &BinarySpec,
    allow_missing_preferred: bool,
    search: &SystemSearch,
) -> Option<PathBuf> {
    if let Some(path) = preferred {
        if allow_missing_preferred || path.is_file() {
            return Some(path.to_path_buf());
        }
    }

    if let Some(path) = binary_override(spec.env_var) {
        return Some(path);
    }

    match search {
        SystemSearch::Enabled => std::env::var_os("PATH")
            .and_then(|path_var| find_on_path(&path_var, spec.fallback_names))
            .or_else(|| {
                spec.default_candidates
                    .iter()
                    .map(PathBuf::from)
                    .find(|candidate| candidate.is_file())
            }),
        SystemSearch::Dirs(dirs) => {
            let joined = std::env::join_paths(dirs).ok()?;
            find_on_path(&joined, spec.fallback_names)
        }
        SystemSearch::Disabled => None,
    }
}

fn find_on_path(path_var: &OsStr, names: &[&str]) -> Option<PathBuf> {
    names.iter().find_map(|name| {
        std::env::split_paths(path_var)
            .map(|dir| dir.join(name))
            .find(|candidate| candidate.is_file())
    })
}

#[cfg(test)]
#[path = "binary_tests.rs"]
mod tests;
