use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DeskpilotError {
    #[error("decision oracle failed: {0}")]
    Oracle(String),
    #[error("oracle output did not match the '{expected}' schema: {output}")]
    SchemaViolation {
        expected: &'static str,
        output: String,
    },
    #[error("checkpoint failed: {0}")]
    CheckpointFailed(String),
    #[error("max step retries ({max}) exceeded")]
    MaxRetriesExceeded { max: u32 },
    #[error("operation timed out after {0:?}")]
    Timeout(Duration),
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("serialization/deserialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("{0}")]
    Custom(String),
}
