// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared timestamp formatting and parsing.

use chrono::{DateTime, NaiveDateTime, SecondsFormat, TimeZone, Utc};

/// `strftime` pattern used in report filenames, e.g. `20251013_123000`.
pub const TIMESTAMP_FILENAME_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Render `moment` (default: now) as `YYYY-MM-DDTHH:MM:SSZ`.
///
/// Sub-second precision is dropped.
pub fn isoformat_timestamp(moment: Option<DateTime<Utc>>) -> String {
    moment
        .unwrap_or_else(Utc::now)
        .to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Normalize an aware timestamp to the UTC `...Z` form.
pub fn ensure_timestamp<Tz: TimeZone>(moment: &DateTime<Tz>) -> String {
    isoformat_timestamp(Some(moment.with_timezone(&Utc)))
}

/// Normalize a naive timestamp, interpreting it as UTC.
pub fn ensure_naive_timestamp(moment: NaiveDateTime) -> String {
    isoformat_timestamp(Some(moment.and_utc()))
}

/// Parse an ISO-8601 timestamp.
///
/// Accepts RFC 3339 (any offset, converted to UTC) and naive
/// `YYYY-MM-DDTHH:MM:SS[.f]` values, which are taken as UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
#[path = "time_fmt_tests.rs"]
mod tests;
