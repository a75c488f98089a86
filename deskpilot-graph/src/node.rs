use async_trait::async_trait;

use deskpilot_core::DeskpilotError;

use crate::StateSchema;

/// Identifiers for the invocation a node runs inside. `thread_id` keys
/// persistence and per-thread serialization; `run_id` is fresh per invocation
/// so nodes can derive attempt-scoped tokens.
#[derive(Clone, Debug)]
pub struct NodeContext {
    pub thread_id: String,
    pub run_id: String,
}

impl NodeContext {
    pub fn new(thread_id: impl Into<String>, run_id: impl Into<String>) -> Self {
        Self {
            thread_id: thread_id.into(),
            run_id: run_id.into(),
        }
    }
}

#[async_trait]
pub trait Node<S: StateSchema>: Send + Sync {
    async fn run(&self, ctx: &NodeContext, state: S) -> Result<S, DeskpilotError>;
}
