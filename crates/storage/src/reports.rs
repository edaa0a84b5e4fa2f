// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Timestamped JSON run reports under `<base>/reports/`

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use thiserror::Error;
use xm_core::{isoformat_timestamp, TIMESTAMP_FILENAME_FORMAT};

/// Directory name used for run reports
pub const REPORTS_DIR_NAME: &str = "reports";

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Where and under what name a report is written
#[derive(Debug, Clone, Default)]
pub struct ReportOptions {
    /// Defaults to the current directory
    pub base_dir: Option<PathBuf>,
    /// Defaults to `{slug}_run_{YYYYmmdd_HHMMSS}.json`
    pub filename: Option<String>,
    /// Defaults to now
    pub timestamp: Option<DateTime<Utc>>,
    /// Defaults to [`REPORTS_DIR_NAME`]
    pub reports_name: Option<String>,
}

impl ReportOptions {
    pub fn base_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.base_dir = Some(dir.into());
        self
    }

    pub fn filename(mut self, name: impl Into<String>) -> Self {
        self.filename = Some(name.into());
        self
    }

    pub fn timestamp(mut self, moment: DateTime<Utc>) -> Self {
        self.timestamp = Some(moment);
        self
    }

    pub fn reports_name(mut self, name: impl Into<String>) -> Self {
        self.reports_name = Some(name.into());
        self
    }
}

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> ReportError + '_ {
    move |source| ReportError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Create `<base>/<reports_name>` and return it.
pub fn ensure_reports_dir(
    base_dir: Option<&Path>,
    reports_name: &str,
) -> Result<PathBuf, ReportError> {
    let base = match base_dir {
        Some(dir) => dir.to_path_buf(),
        None => std::env::current_dir().map_err(io_error(Path::new(".")))?,
    };
    let reports_dir = base.join(reports_name);
    std::fs::create_dir_all(&reports_dir).map_err(io_error(&reports_dir))?;
    Ok(reports_dir)
}

/// Write `payload` as pretty JSON and return the report path.
///
/// `tool` and `generated_at` are added unless the payload already has them.
pub fn write_run_report(
    tool_slug: &str,
    mut payload: Map<String, Value>,
    options: &ReportOptions,
) -> Result<PathBuf, ReportError> {
    let moment = options.timestamp.unwrap_or_else(Utc::now);
    let reports_name = options.reports_name.as_deref().unwrap_or(REPORTS_DIR_NAME);
    let reports_dir = ensure_reports_dir(options.base_dir.as_deref(), reports_name)?;

    let filename = match &options.filename {
        Some(name) => name.clone(),
        None => format!(
            "{tool_slug}_run_{}.json",
            moment.format(TIMESTAMP_FILENAME_FORMAT)
        ),
    };
    let report_path = reports_dir.join(filename);

    payload
        .entry("tool")
        .or_insert_with(|| Value::String(tool_slug.to_string()));
    payload
        .entry("generated_at")
        .or_insert_with(|| Value::String(isoformat_timestamp(Some(moment))));

    let text = serde_json::to_string_pretty(&payload)?;
    std::fs::write(&report_path, text).map_err(io_error(&report_path))?;
    tracing::info!(tool = tool_slug, path = %report_path.display(), "run report written");
    Ok(report_path)
}

#[cfg(test)]
#[path = "reports_tests.rs"]
mod tests;
