// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Crash-safe file replacement.
//!
//! Contents go to `<name>.tmp` next to the target, are fsynced, then renamed
//! over the target. A crash at any point leaves either the old file or the
//! new one, never a torn write.
//!
//! Renames over a file another process has open can fail transiently
//! (notably on Windows, where readers hold share locks). Those failures are
//! retried a bounded number of times with a linear backoff before giving up.

use serde::Serialize;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::warn;

/// Attempts made to rename the temp file into place.
pub const MAX_REPLACE_ATTEMPTS: u32 = 5;

/// Sleep before retry `n` is `n * REPLACE_RETRY_BASE`.
pub const REPLACE_RETRY_BASE: Duration = Duration::from_millis(100);

// ERROR_ACCESS_DENIED, ERROR_SHARING_VIOLATION
#[cfg(windows)]
const TRANSIENT_OS_ERRORS: &[i32] = &[5, 32];
// EPERM, EACCES
#[cfg(not(windows))]
const TRANSIENT_OS_ERRORS: &[i32] = &[1, 13];

/// Errors from atomic writes
#[derive(Debug, Error)]
pub enum AtomicWriteError {
    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("replacing {path} failed after {attempts} attempt(s): {source}")]
    Replace {
        path: PathBuf,
        attempts: u32,
        #[source]
        source: io::Error,
    },
    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Moves a finished temp file over its target.
///
/// Abstracted so tests can inject lock contention.
pub trait FileReplacer: Send + Sync {
    fn replace(&self, from: &Path, to: &Path) -> io::Result<()>;
}

/// Production replacer using `fs::rename`.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsReplacer;

impl FileReplacer for FsReplacer {
    fn replace(&self, from: &Path, to: &Path) -> io::Result<()> {
        fs::rename(from, to)
    }
}

/// Whether a rename failure is worth retrying.
pub fn is_transient(err: &io::Error) -> bool {
    err.kind() == io::ErrorKind::PermissionDenied
        || err
            .raw_os_error()
            .is_some_and(|code| TRANSIENT_OS_ERRORS.contains(&code))
}

/// Temp path used while writing `path`: the file name plus `.tmp`.
pub fn tmp_path_for(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Atomic writer with configurable retry behavior.
#[derive(Debug, Clone)]
pub struct AtomicWriter<R: FileReplacer = FsReplacer> {
    replacer: R,
    max_attempts: u32,
    retry_base: Duration,
}

impl AtomicWriter<FsReplacer> {
    pub fn new() -> Self {
        Self::with_replacer(FsReplacer)
    }
}

impl Default for AtomicWriter<FsReplacer> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: FileReplacer> AtomicWriter<R> {
    /// Create a writer with a custom replacer (for testing).
    pub fn with_replacer(replacer: R) -> Self {
        Self {
            replacer,
            max_attempts: MAX_REPLACE_ATTEMPTS,
            retry_base: REPLACE_RETRY_BASE,
        }
    }

    /// Override the retry budget. At least one attempt is always made.
    pub fn with_retry(mut self, max_attempts: u32, retry_base: Duration) -> Self {
        self.max_attempts = max_attempts.max(1);
        self.retry_base = retry_base;
        self
    }

    /// Replace `path` with `contents`.
    pub fn write(&self, path: &Path, contents: &[u8]) -> Result<(), AtomicWriteError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| AtomicWriteError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let tmp_path = tmp_path_for(path);
        if let Err(source) = write_synced(&tmp_path, contents) {
            let _ = fs::remove_file(&tmp_path);
            return Err(AtomicWriteError::Io {
                path: tmp_path,
                source,
            });
        }

        let mut last_error = None;
        for attempt in 1..=self.max_attempts {
            match self.replacer.replace(&tmp_path, path) {
                Ok(()) => {
                    sync_parent_dir(path);
                    return Ok(());
                }
                Err(e) if is_transient(&e) => {
                    warn!(
                        path = %path.display(),
                        attempt,
                        error = %e,
                        "file replace blocked, retrying",
                    );
                    last_error = Some(e);
                    if attempt < self.max_attempts {
                        std::thread::sleep(self.retry_base * attempt);
                    }
                }
                Err(source) => {
                    let _ = fs::remove_file(&tmp_path);
                    return Err(AtomicWriteError::Replace {
                        path: path.to_path_buf(),
                        attempts: attempt,
                        source,
                    });
                }
            }
        }

        let _ = fs::remove_file(&tmp_path);
        Err(AtomicWriteError::Replace {
            path: path.to_path_buf(),
            attempts: self.max_attempts,
            source: last_error.unwrap_or_else(|| {
                io::Error::new(io::ErrorKind::PermissionDenied, "replace repeatedly failed")
            }),
        })
    }

    /// Serialize `value` as pretty JSON and replace `path` with it.
    pub fn write_json<T: Serialize + ?Sized>(
        &self,
        path: &Path,
        value: &T,
    ) -> Result<(), AtomicWriteError> {
        let serialized = serde_json::to_vec_pretty(value)?;
        self.write(path, &serialized)
    }
}

/// Replace `path` with `contents` using the default retry budget.
pub fn atomic_write(path: &Path, contents: &[u8]) -> Result<(), AtomicWriteError> {
    AtomicWriter::new().write(path, contents)
}

/// Replace `path` with pretty-printed JSON.
pub fn atomic_write_json<T: Serialize + ?Sized>(
    path: &Path,
    value: &T,
) -> Result<(), AtomicWriteError> {
    AtomicWriter::new().write_json(path, value)
}

fn write_synced(path: &Path, contents: &[u8]) -> io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(contents)?;
    file.sync_all()
}

/// Best effort: make the rename durable. Directories can't be opened on
/// every platform, so failures are ignored.
fn sync_parent_dir(path: &Path) {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        if let Ok(dir) = File::open(parent) {
            let _ = dir.sync_all();
        }
    }
}

#[cfg(test)]
#[path = "atomic_tests.rs"]
mod tests;
