// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Python entrypoint scanner

use regex::Regex;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::collections::BTreeSet;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::{DirEntry, WalkDir};

/// File name patterns that mark a likely entrypoint.
pub const DEFAULT_NAME_PATTERNS: &[&str] = &[
    r"(?i)^run_[a-z0-9_]+\.py$",
    r"(?i)^[a-z0-9_]+_cli\.py$",
    r"(?i)^cli_[a-z0-9_]+\.py$",
    r"(?i)^main\.py$",
    r"^__main__\.py$",
];

/// Directory names never descended into. Dot directories are skipped too.
pub const DEFAULT_EXCLUDE_DIRS: &[&str] = &[
    ".git",
    ".hg",
    ".svn",
    "__pycache__",
    ".mypy_cache",
    ".ruff_cache",
    ".pytest_cache",
    ".venv",
    "venv",
    "node_modules",
    "build",
    "dist",
    "artifacts",
    "out",
    "logs",
];

/// Only this much of each file is inspected for markers.
const TEXT_PREFIX_LIMIT: u64 = 64 * 1024;

const IMPORT_HINTS: &[&str] = &["argparse", "click", "fire", "typer"];

#[derive(Debug, Error)]
pub enum DetectError {
    #[error("cannot scan {path}: {source}")]
    Root {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{path} is not a directory")]
    NotADirectory { path: PathBuf },
    #[error("invalid name pattern {pattern:?}: {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

/// [`DEFAULT_NAME_PATTERNS`] compiled.
pub fn default_name_patterns() -> Vec<Regex> {
    DEFAULT_NAME_PATTERNS
        .iter()
        .filter_map(|pattern| Regex::new(pattern).ok())
        .collect()
}

#[derive(Debug, Clone)]
pub struct ScanOptions {
    pub name_patterns: Vec<Regex>,
    pub exclude_dirs: BTreeSet<String>,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            name_patterns: default_name_patterns(),
            exclude_dirs: DEFAULT_EXCLUDE_DIRS.iter().map(|d| d.to_string()).collect(),
        }
    }
}

impl ScanOptions {
    /// Replace the name patterns, compiling each one.
    pub fn with_name_patterns<I, S>(mut self, patterns: I) -> Result<Self, DetectError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.name_patterns = patterns
            .into_iter()
            .map(|pattern| {
                let pattern = pattern.as_ref();
                Regex::new(pattern).map_err(|source| DetectError::Pattern {
                    pattern: pattern.to_string(),
                    source,
                })
            })
            .collect::<Result<_, _>>()?;
        Ok(self)
    }

    pub fn with_exclude_dirs<I, S>(mut self, dirs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude_dirs = dirs.into_iter().map(Into::into).collect();
        self
    }
}

/// A file that looks runnable, with the evidence for it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntryPointCandidate {
    /// Relative to the scan root
    pub path: String,
    pub score: f64,
    pub reasons: Vec<String>,
    pub size_bytes: u64,
    pub sha256: String,
    pub has_main_guard: bool,
    pub has_shebang: bool,
    pub import_hints: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntryPointDiscovery {
    pub root: String,
    /// Highest score first, ties by path
    pub candidates: Vec<EntryPointCandidate>,
    pub total_files_scanned: usize,
}

/// Scan `root` for Python files that look like entrypoints.
///
/// Unreadable directories and files are skipped rather than failing the
/// scan.
pub fn scan_python_entrypoints(
    root: &Path,
    options: &ScanOptions,
) -> Result<EntryPointDiscovery, DetectError> {
    let absolute_root = root.canonicalize().map_err(|source| DetectError::Root {
        path: root.to_path_buf(),
        source,
    })?;
    if !absolute_root.is_dir() {
        return Err(DetectError::NotADirectory {
            path: absolute_root,
        });
    }

    let mut candidates = Vec::new();
    let mut total_files_scanned = 0;
    let walker = WalkDir::new(&absolute_root)
        .into_iter()
        .filter_entry(|entry| entry.depth() == 0 || !is_excluded_dir(entry, &options.exclude_dirs));
    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                tracing::debug!(error = %e, "skipping unreadable entry");
                continue;
            }
        };
        if !entry.file_type().is_file() || !has_py_extension(entry.path()) {
            continue;
        }
        total_files_scanned += 1;
        if let Some(candidate) = inspect_file(entry.path(), &absolute_root, options) {
            candidates.push(candidate);
        }
    }

    candidates.sort_by(|a, b| b.score.total_cmp(&a.score).then_with(|| a.path.cmp(&b.path)));
    tracing::debug!(
        root = %absolute_root.display(),
        scanned = total_files_scanned,
        found = candidates.len(),
        "entrypoint scan complete"
    );
    Ok(EntryPointDiscovery {
        root: absolute_root.display().to_string(),
        candidates,
        total_files_scanned,
    })
}

fn is_excluded_dir(entry: &DirEntry, exclude_dirs: &BTreeSet<String>) -> bool {
    if !entry.file_type().is_dir() {
        return false;
    }
    let name = entry.file_name().to_string_lossy();
    name.starts_with('.') || exclude_dirs.contains(&*name)
}

fn has_py_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("py"))
}

fn inspect_file(path: &Path, root: &Path, options: &ScanOptions) -> Option<EntryPointCandidate> {
    let text = read_text_prefix(path);
    let mut reasons = name_reasons(path, &options.name_patterns);
    let has_main_guard = main_guard_present(&text);
    let has_shebang = shebang_present(&text);
    let import_hints = import_hints(&text);
    if has_main_guard {
        reasons.push("contains __main__ guard".to_string());
    }
    if has_shebang {
        reasons.push("has python shebang".to_string());
    }
    if !import_hints.is_empty() {
        reasons.push(format!("imports {}", import_hints.join(", ")));
    }
    if reasons.is_empty() {
        return None;
    }

    let score = 1.0 + 0.5 * (reasons.len() - 1) as f64;
    let relative = path.strip_prefix(root).unwrap_or(path);
    Some(EntryPointCandidate {
        path: relative.display().to_string(),
        score,
        reasons,
        size_bytes: std::fs::metadata(path).map(|m| m.len()).unwrap_or(0),
        sha256: file_sha256(path).unwrap_or_default(),
        has_main_guard,
        has_shebang,
        import_hints,
    })
}

fn name_reasons(path: &Path, patterns: &[Regex]) -> Vec<String> {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy())
        .unwrap_or_default();
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy())
        .unwrap_or_default();

    let mut reasons: Vec<String> = patterns
        .iter()
        .filter(|pattern| pattern.is_match(&name))
        .map(|pattern| format!("name matches {}", pattern.as_str()))
        .collect();
    if stem.ends_with("_runner") {
        reasons.push("name ends with _runner".to_string());
    }
    if stem.contains("run") {
        reasons.push("stem contains 'run'".to_string());
    }
    reasons
}

fn read_text_prefix(path: &Path) -> String {
    let mut buf = Vec::new();
    let read = File::open(path).and_then(|file| file.take(TEXT_PREFIX_LIMIT).read_to_end(&mut buf));
    match read {
        Ok(_) => String::from_utf8_lossy(&buf).into_owned(),
        Err(_) => String::new(),
    }
}

fn file_sha256(path: &Path) -> Option<String> {
    let mut file = File::open(path).ok()?;
    let mut hasher = Sha256::new();
    std::io::copy(&mut file, &mut hasher).ok()?;
    Some(format!("{:x}", hasher.finalize()))
}

fn main_guard_present(text: &str) -> bool {
    text.contains(r#"if __name__ == "__main__""#) || text.contains("if __name__ == '__main__'")
}

fn shebang_present(text: &str) -> bool {
    text.lines()
        .next()
        .is_some_and(|first| first.starts_with("#!/") && first.to_lowercase().contains("python"))
}

fn import_hints(text: &str) -> Vec<String> {
    IMPORT_HINTS
        .iter()
        .filter(|hint| text.contains(*hint))
        .map(|hint| hint.to_string())
        .collect()
}

#[cfg(test)]
#[path = "entrypoints_tests.rs"]
mod tests;
