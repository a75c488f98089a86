//! Decoding of oracle replies into closed per-call-site types.
//!
//! Models routinely wrap JSON answers in Markdown code fences; the fence is
//! stripped before decoding. Anything that still fails to decode is a schema
//! violation and fatal for the invoking step.

use serde::de::DeserializeOwned;

use crate::DeskpilotError;

const MAX_REPORTED_OUTPUT: usize = 200;

pub fn parse_structured<T: DeserializeOwned>(
    expected: &'static str,
    raw: &str,
) -> Result<T, DeskpilotError> {
    let cleaned = strip_code_fence(raw);
    serde_json::from_str(cleaned).map_err(|_| DeskpilotError::SchemaViolation {
        expected,
        output: clip(raw),
    })
}

fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let body = if let Some(rest) = trimmed.strip_prefix("```json") {
        rest
    } else if let Some(rest) = trimmed.strip_prefix("```") {
        rest
    } else {
        return trimmed;
    };
    body.strip_suffix("```").unwrap_or(body).trim()
}

fn clip(raw: &str) -> String {
    if raw.chars().count() <= MAX_REPORTED_OUTPUT {
        return raw.to_string();
    }
    let clipped: String = raw.chars().take(MAX_REPORTED_OUTPUT).collect();
    format!("{clipped}…")
}
