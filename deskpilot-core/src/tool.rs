use thiserror::Error;

use crate::{ToolSpec, Value};

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("execution failed: {0}")]
    ExecutionFailed(String),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// An external action binding a worker may invoke with oracle-supplied
/// arguments. Implementations translate domain failures (a taken slot, a
/// missing FAQ entry) into user-facing `Ok` payloads; `Err` is reserved for
/// invalid arguments and infrastructure faults.
#[async_trait::async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &str;
    fn description(&self) -> &str;
    fn schema(&self) -> Value;
    async fn invoke(&self, args: Value) -> Result<Value, ToolError>;

    /// Spec handed to the oracle when this tool is offered for a step.
    fn spec(&self) -> ToolSpec {
        ToolSpec {
            name: self.name().to_string(),
            description: self.description().to_string(),
            parameters: self.schema(),
        }
    }
}
