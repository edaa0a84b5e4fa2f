// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Helpers for turning a model's persona answer into structured evidence

use super::PersonaError;
use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;
use xm_core::lenient::stringify;

pub const DEFAULT_PERSONA_PROMPT: &str = "You are reviewing the persona '{persona_id}'. \
     Summarize their mission, highlight notable traits, add hashtags, and \
     return a fitness score between 0.0 and 1.0.";

const PLACEHOLDER: &str = "{persona_id}";
const FIELD: &str = "persona_id";
const MAX_TAGGED_HIGHLIGHTS: usize = 5;
const MAX_SENTENCE_HIGHLIGHTS: usize = 3;
const MAX_SYNOPSIS_CHARS: usize = 240;
const SCORE_FULL_LENGTH: f64 = 600.0;
const SCORE_KEYWORD_WEIGHT: f64 = 0.05;

// Allow expect here as the regexes are compile-time verified to be valid
#[allow(clippy::expect_used)]
static HASHTAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"#([\w-]{2,32})").expect("constant regex pattern is valid"));

#[allow(clippy::expect_used)]
static SENTENCE_BREAK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[.!?]\s+").expect("constant regex pattern is valid"));

#[allow(clippy::expect_used)]
static POSITIVE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(excellent|strong|trusted|reliable|experienced)\b")
        .expect("constant regex pattern is valid")
});

#[allow(clippy::expect_used)]
static NEGATIVE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(risk|concern|fraud|unsafe|unknown)\b").expect("constant regex pattern is valid")
});

/// Render `template` for a persona.
///
/// `{{` and `}}` are literal braces. `{persona_id}` is the only field.
pub fn format_persona_question(persona_id: &str, template: &str) -> Result<String, PersonaError> {
    let persona_id = persona_id.trim();
    if persona_id.is_empty() {
        return Err(PersonaError::EmptyId);
    }
    if !template.contains(PLACEHOLDER) {
        return Err(PersonaError::MissingPlaceholder);
    }
    Ok(render_template(template, persona_id)?.trim().to_string())
}

fn render_template(template: &str, persona_id: &str) -> Result<String, PersonaError> {
    let mut out = String::with_capacity(template.len() + persona_id.len());
    let mut chars = template.chars().peekable();
    while let Some(ch) = chars.next() {
        match ch {
            '{' if chars.next_if_eq(&'{').is_some() => out.push('{'),
            '}' if chars.next_if_eq(&'}').is_some() => out.push('}'),
            '{' => {
                let mut field = String::new();
                loop {
                    match chars.next() {
                        Some('}') => break,
                        Some('{') | None => {
                            return Err(PersonaError::InvalidPlaceholder(format!("{{{field}")))
                        }
                        Some(c) => field.push(c),
                    }
                }
                if field != FIELD {
                    return Err(PersonaError::InvalidPlaceholder(format!("{{{field}}}")));
                }
                out.push_str(persona_id);
            }
            '}' => return Err(PersonaError::InvalidPlaceholder("}".to_string())),
            c => out.push(c),
        }
    }
    Ok(out)
}

fn non_blank_str<'a>(value: Option<&'a Value>) -> Option<&'a str> {
    value
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

/// `answer`, else `cli.stdout`, else empty.
pub fn extract_answer_text(response: &Value) -> String {
    non_blank_str(response.get("answer"))
        .or_else(|| non_blank_str(response.get("cli").and_then(|cli| cli.get("stdout"))))
        .unwrap_or_default()
        .to_string()
}

fn clean_list(items: &[Value]) -> Vec<String> {
    items
        .iter()
        .map(|item| stringify(item).trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn dedupe(items: impl IntoIterator<Item = String>) -> Vec<String> {
    let mut seen = Vec::new();
    for item in items {
        if !seen.contains(&item) {
            seen.push(item);
        }
    }
    seen
}

/// Explicit `tags`, else lowercased `#hashtags` from the answer.
pub fn extract_tags(response: &Value) -> Vec<String> {
    if let Some(tags) = response.get("tags").and_then(Value::as_array) {
        return dedupe(clean_list(tags));
    }
    let answer = extract_answer_text(response);
    dedupe(
        HASHTAG
            .captures_iter(&answer)
            .map(|caps| caps[1].to_lowercase()),
    )
}

/// Explicit `highlights`, else bullet lines, else leading sentences.
pub fn extract_highlights(response: &Value) -> Vec<String> {
    if let Some(highlights) = response.get("highlights").and_then(Value::as_array) {
        let mut items = clean_list(highlights);
        items.truncate(MAX_TAGGED_HIGHLIGHTS);
        return items;
    }

    let answer = extract_answer_text(response);
    if answer.is_empty() {
        return Vec::new();
    }
    let bullets: Vec<String> = answer
        .lines()
        .map(str::trim)
        .filter(|line| line.starts_with(['-', '*', '•']))
        .map(|line| {
            line.trim_start_matches(['-', '*', '•', ' '])
                .to_string()
        })
        .take(MAX_TAGGED_HIGHLIGHTS)
        .collect();
    if !bullets.is_empty() {
        return bullets;
    }

    SENTENCE_BREAK
        .split(&answer)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .take(MAX_SENTENCE_HIGHLIGHTS)
        .map(str::to_string)
        .collect()
}

/// Coarse confidence from answer length and keyword tone, clamped to `[0, 1]`.
pub fn score_from_answer(answer: &str) -> f64 {
    let text = answer.trim();
    if text.is_empty() {
        return 0.0;
    }
    let lowered = text.to_lowercase();
    let positive = POSITIVE.find_iter(&lowered).count() as f64;
    let negative = NEGATIVE.find_iter(&lowered).count() as f64;
    let base = (text.chars().count() as f64 / SCORE_FULL_LENGTH).min(1.0);
    (base + SCORE_KEYWORD_WEIGHT * positive - SCORE_KEYWORD_WEIGHT * negative).clamp(0.0, 1.0)
}

/// `source`, else `cli.model`, else `"unknown"`.
pub fn source_from_response(response: &Value) -> String {
    non_blank_str(response.get("source"))
        .or_else(|| non_blank_str(response.get("cli").and_then(|cli| cli.get("model"))))
        .unwrap_or("unknown")
        .to_string()
}

/// First sentence of the answer, at most 240 characters.
pub fn synopsis_from_answer(answer: &str) -> Option<String> {
    let text = answer.trim();
    let first = SENTENCE_BREAK.splitn(text, 2).next()?.trim();
    if first.is_empty() {
        return None;
    }
    Some(first.chars().take(MAX_SYNOPSIS_CHARS).collect())
}

#[cfg(test)]
#[path = "normalizer_tests.rs"]
mod tests;
