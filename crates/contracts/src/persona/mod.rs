// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Persona vetting contracts.
//!
//! A [`PersonaVettingService`] looks a persona up and answers with
//! [`PersonaEvidence`]. The [`normalizer`] helpers turn a free-form model
//! response into the pieces of that evidence.

pub mod normalizer;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PersonaError {
    #[error("Persona identifier must be a non-empty string.")]
    EmptyId,
    #[error("Prompt template must include the '{{persona_id}}' placeholder.")]
    MissingPlaceholder,
    #[error("Invalid prompt placeholder: {0}")]
    InvalidPlaceholder(String),
    #[error("persona lookup failed for {persona_id}: {message}")]
    Lookup { persona_id: String, message: String },
}

/// Result of vetting one persona
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonaEvidence {
    pub persona_id: String,
    /// Fitness in `[0, 1]`
    pub score: f64,
    pub source: String,
    pub display_name: Option<String>,
    pub synopsis: Option<String>,
    pub tags: Vec<String>,
    pub reasons: Vec<String>,
}

/// Optional parts of [`PersonaEvidence`] passed to [`PersonaVettingService::build_result`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EvidenceDetails {
    pub display_name: Option<String>,
    pub synopsis: Option<String>,
    pub tags: Vec<String>,
    pub reasons: Vec<String>,
}

pub trait PersonaVettingService: Send + Sync {
    fn lookup(&self, persona_id: &str) -> Result<PersonaEvidence, PersonaError>;

    /// Assemble evidence with trimmed, non-empty tags and reasons.
    fn build_result(
        &self,
        persona_id: &str,
        score: f64,
        source: &str,
        details: EvidenceDetails,
    ) -> PersonaEvidence {
        let clean = |items: Vec<String>| -> Vec<String> {
            items
                .into_iter()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect()
        };
        PersonaEvidence {
            persona_id: persona_id.to_string(),
            score,
            source: source.to_string(),
            display_name: details.display_name,
            synopsis: details.synopsis,
            tags: clean(details.tags),
            reasons: clean(details.reasons),
        }
    }
}

#[cfg(test)]
#[path = "../persona_tests.rs"]
mod tests;
