// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::normalizer::{
    extract_answer_text, extract_highlights, extract_tags, score_from_answer,
    source_from_response, synopsis_from_answer,
};
use super::*;
use serde_json::{json, Value};

/// Service backed by canned model responses
struct CannedService {
    responses: Vec<(String, Value)>,
}

impl PersonaVettingService for CannedService {
    fn lookup(&self, persona_id: &str) -> Result<PersonaEvidence, PersonaError> {
        let response = self
            .responses
            .iter()
            .find(|(id, _)| id == persona_id)
            .map(|(_, response)| response)
            .ok_or_else(|| PersonaError::Lookup {
                persona_id: persona_id.to_string(),
                message: "no response recorded".into(),
            })?;
        let answer = extract_answer_text(response);
        Ok(self.build_result(
            persona_id,
            score_from_answer(&answer),
            &source_from_response(response),
            EvidenceDetails {
                display_name: None,
                synopsis: synopsis_from_answer(&answer),
                tags: extract_tags(response),
                reasons: extract_highlights(response),
            },
        ))
    }
}

#[test]
fn service_builds_evidence_from_response() {
    let service = CannedService {
        responses: vec![(
            "ada".into(),
            json!({
                "answer": "Ada is an experienced and trusted reviewer. #Math #math #pioneer",
                "cli": {"model": "gpt-x"},
            }),
        )],
    };
    let evidence = service.lookup("ada").unwrap();
    assert_eq!(evidence.source, "gpt-x");
    assert_eq!(evidence.tags, vec!["math", "pioneer"]);
    assert_eq!(
        evidence.synopsis.as_deref(),
        Some("Ada is an experienced and trusted reviewer")
    );
    assert!(evidence.score > 0.1 && evidence.score < 0.3);

    let err = service.lookup("bob").unwrap_err();
    assert!(matches!(err, PersonaError::Lookup { .. }));
}

#[test]
fn build_result_cleans_tags_and_reasons() {
    let service = CannedService { responses: vec![] };
    let evidence = service.build_result(
        "p1",
        0.5,
        "manual",
        EvidenceDetails {
            display_name: Some("Persona One".into()),
            synopsis: None,
            tags: vec![" a ".into(), "".into(), "b".into()],
            reasons: vec!["   ".into(), "ok".into()],
        },
    );
    assert_eq!(evidence.tags, vec!["a", "b"]);
    assert_eq!(evidence.reasons, vec!["ok"]);
    assert_eq!(evidence.display_name.as_deref(), Some("Persona One"));
}
