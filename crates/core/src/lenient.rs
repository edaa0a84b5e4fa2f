// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Tolerant field decoders for persisted JSON.
//!
//! Files written by older tools (or edited by hand) may carry odd field
//! types. These helpers are meant for `#[serde(deserialize_with = ...)]`
//! and never fail on a well-formed JSON value: bad input degrades to a
//! neutral default instead. Pair each with `#[serde(default)]` so missing
//! fields behave the same as malformed ones.

use crate::time_fmt::parse_timestamp;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

/// Render a JSON value as display text (strings are not quoted).
pub fn stringify(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Trim each message, dropping empty ones.
pub fn clean_messages<I, S>(messages: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    messages
        .into_iter()
        .map(|m| m.as_ref().trim().to_string())
        .filter(|m| !m.is_empty())
        .collect()
}

/// Timestamp string; missing or unparsable values become now.
pub fn timestamp_or_now<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value
        .as_ref()
        .and_then(Value::as_str)
        .and_then(parse_timestamp)
        .unwrap_or_else(Utc::now))
}

/// Optional timestamp string; unparsable values become `None`.
pub fn optional_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value
        .as_ref()
        .and_then(Value::as_str)
        .and_then(parse_timestamp))
}

/// List of messages; non-arrays become empty, entries are stringified and trimmed.
pub fn string_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Array(items)) => clean_messages(items.iter().map(stringify)),
        _ => Vec::new(),
    })
}

/// JSON object; anything else becomes an empty map.
pub fn object_or_empty<'de, D>(deserializer: D) -> Result<Map<String, Value>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Object(map)) => map,
        _ => Map::new(),
    })
}

/// String value; other types become `None`.
pub fn string_or_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => Some(s),
        _ => None,
    })
}

/// Required non-empty string field of a JSON object, trimmed.
pub fn required_str(payload: &Map<String, Value>, field: &str) -> Option<String> {
    payload
        .get(field)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
#[path = "lenient_tests.rs"]
mod tests;
