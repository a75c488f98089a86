use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use deskpilot_core::{DecisionOracle, DeskpilotError, Message, OracleRequest, Tool};
use deskpilot_graph::{Node, NodeContext};

use crate::prompts::worker_system;
use crate::reviewer::retry_count;
use crate::state::{ConversationState, WorkerKind};

/// One capability handler; the runtime registers three instances with
/// distinct tool bindings.
///
/// The oracle sees the step, the scratchpad and the whole transcript, and
/// answers with free text or one action request. An action request always
/// completes the step: either the action's payload or a handler-specific
/// failure notice becomes the reply. Free text completes the step unless it
/// asks the user a question.
pub struct WorkerNode {
    kind: WorkerKind,
    oracle: Arc<dyn DecisionOracle>,
    tool: Arc<dyn Tool>,
}

impl WorkerNode {
    pub fn booking(oracle: Arc<dyn DecisionOracle>, tool: Arc<dyn Tool>) -> Self {
        Self::bound(WorkerKind::Booking, oracle, tool)
    }

    pub fn support(oracle: Arc<dyn DecisionOracle>, tool: Arc<dyn Tool>) -> Self {
        Self::bound(WorkerKind::Support, oracle, tool)
    }

    pub fn crisis(oracle: Arc<dyn DecisionOracle>, tool: Arc<dyn Tool>) -> Self {
        Self::bound(WorkerKind::Crisis, oracle, tool)
    }

    fn bound(kind: WorkerKind, oracle: Arc<dyn DecisionOracle>, tool: Arc<dyn Tool>) -> Self {
        Self { kind, oracle, tool }
    }

    fn failure_notice(&self) -> &'static str {
        match self.kind {
            WorkerKind::Booking => "Something went wrong while booking. Please try again.",
            WorkerKind::Support => {
                "I couldn't reach the knowledge base just now. Please try again."
            }
            WorkerKind::Crisis => {
                "I couldn't open the escalation ticket just now. Please try again."
            }
        }
    }
}

#[async_trait]
impl Node<ConversationState> for WorkerNode {
    async fn run(
        &self,
        ctx: &NodeContext,
        mut state: ConversationState,
    ) -> Result<ConversationState, DeskpilotError> {
        let Some(step) = state.current_step().map(str::to_string) else {
            // A route that outlived its plan completes silently.
            tracing::warn!(
                thread_id = %ctx.thread_id,
                step = state.current_step_index,
                "dispatched past the end of the plan"
            );
            state.task_complete = true;
            return Ok(state);
        };

        let scratchpad =
            serde_json::to_string(&state.scratchpad).unwrap_or_else(|_| "{}".to_string());
        let mut context = Vec::with_capacity(state.messages.len() + 1);
        context.push(Message::system(worker_system(self.kind, &step, &scratchpad)));
        context.extend(state.messages.iter().cloned());

        let reply = self
            .oracle
            .decide(OracleRequest::new(context).with_tools(vec![self.tool.spec()]))
            .await?;

        if let Some(call) = reply.requested_action() {
            // Attempt number folds the retry count in so a retried step gets
            // a fresh token while a replayed one does not.
            let attempt = retry_count(&state) + 1;
            let token = format!("{}:{}:{}", ctx.thread_id, state.current_step_index, attempt);
            let mut args = call.args.clone();
            if let Some(fields) = args.as_object_mut() {
                fields.insert("idempotency_key".to_string(), Value::String(token));
            }

            tracing::info!(
                thread_id = %ctx.thread_id,
                worker = self.kind.node_name(),
                tool = %call.name,
                attempt,
                "invoking action"
            );
            let content = match self.tool.invoke(args).await {
                Ok(Value::String(text)) => text,
                Ok(other) => other.to_string(),
                Err(err) => {
                    tracing::error!(
                        thread_id = %ctx.thread_id,
                        worker = self.kind.node_name(),
                        tool = %self.tool.name(),
                        error = %err,
                        "action failed"
                    );
                    self.failure_notice().to_string()
                }
            };
            state.messages.push(Message::assistant(content));
            state.task_complete = true;
        } else {
            let content = reply.text().to_string();
            state.task_complete = !content.contains('?');
            state.messages.push(Message::assistant(content));
        }
        Ok(state)
    }
}
