// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! JSON Schema (Draft 2020-12) validation

use jsonschema::Validator;
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SchemaError {
    #[error("invalid JSON schema: {0}")]
    InvalidSchema(String),
    #[error("payload failed validation: {}", .errors.join("; "))]
    Invalid { errors: Vec<String> },
}

/// Check that `schema` is itself a valid Draft 2020-12 schema.
pub fn validate_schema(schema: &Value) -> Result<(), SchemaError> {
    jsonschema::draft202012::meta::validate(schema)
        .map_err(|e| SchemaError::InvalidSchema(e.to_string()))
}

/// Validate `payload` against `schema`, compiling the schema each call.
///
/// Use [`CompiledSchema`] when validating many payloads.
pub fn validate_payload(payload: &Value, schema: &Value) -> Result<(), SchemaError> {
    CompiledSchema::new(schema)?.validate(payload)
}

/// A schema compiled once and reused
pub struct CompiledSchema {
    validator: Validator,
}

impl CompiledSchema {
    pub fn new(schema: &Value) -> Result<Self, SchemaError> {
        validate_schema(schema)?;
        let validator = jsonschema::draft202012::new(schema)
            .map_err(|e| SchemaError::InvalidSchema(e.to_string()))?;
        Ok(Self { validator })
    }

    pub fn is_valid(&self, payload: &Value) -> bool {
        self.validator.is_valid(payload)
    }

    /// Validate, collecting every violation as `<path>: <message>`.
    pub fn validate(&self, payload: &Value) -> Result<(), SchemaError> {
        let errors: Vec<String> = self
            .validator
            .iter_errors(payload)
            .map(|e| {
                let path = e.instance_path.to_string();
                if path.is_empty() {
                    e.to_string()
                } else {
                    format!("{path}: {e}")
                }
            })
            .collect();
        if errors.is_empty() {
            Ok(())
        } else {
            Err(SchemaError::Invalid { errors })
        }
    }
}

impl std::fmt::Debug for CompiledSchema {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompiledSchema").finish_non_exhaustive()
    }
}

#[cfg(test)]
#[path = "schema_tests.rs"]
mod tests;
