// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access shared by the workspace tools.

/// Trimmed value of `name`, falling back to `default` when unset or blank.
pub fn get_env_str(name: &str, default: Option<&str>) -> Option<String> {
    match std::env::var(name) {
        Ok(value) => {
            let trimmed = value.trim();
            if trimmed.is_empty() {
                default.map(str::to_string)
            } else {
                Some(trimmed.to_string())
            }
        }
        Err(_) => default.map(str::to_string),
    }
}

/// Interpret a flag value: `1/true/yes/on` and `0/false/no/off`.
///
/// Returns `None` for anything else so callers can apply their own default.
pub fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Interpret `name` as a boolean flag, falling back to `default`.
pub fn get_env_bool(name: &str, default: bool) -> bool {
    std::env::var(name)
        .ok()
        .and_then(|v| parse_flag(&v))
        .unwrap_or(default)
}

// --- Well-known variables ---

/// Echo automation commands before running them (`X_MAKE_TEST_MODE`).
pub fn test_mode() -> bool {
    get_env_bool("X_MAKE_TEST_MODE", false)
}

/// Log filter override (`XM_LOG`), preferred over `RUST_LOG`.
pub fn log_filter() -> Option<String> {
    get_env_str("XM_LOG", None).or_else(|| get_env_str("RUST_LOG", None))
}

#[cfg(test)]
#[path = "env_tests.rs"]
mod tests;
