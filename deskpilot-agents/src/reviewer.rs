use async_trait::async_trait;
use serde_json::Value;

use deskpilot_core::DeskpilotError;
use deskpilot_graph::{Node, NodeContext};

use crate::state::{ConversationState, ResumePoint};

pub(crate) const CRITIQUE_KEY: &str = "critique";
pub(crate) const RETRIES_KEY: &str = "retries";

const CRITIQUE_NOTE: &str = "Previous attempt failed. Retry.";

/// Verdict on the step the worker just attempted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewOutcome {
    /// The step is done; the cursor moves forward.
    Advance,
    /// The worker asked the user something; the run suspends as it stands.
    Suspend,
    /// The step failed without asking anything; it is dispatched again.
    Retry,
}

/// Classifies the attempt from the state alone. Shared by the reviewer node
/// and its outgoing edge so the mutation and the routing cannot disagree.
pub fn review_outcome(state: &ConversationState) -> ReviewOutcome {
    if state.task_complete {
        return ReviewOutcome::Advance;
    }
    let asked_user = state
        .last_message()
        .map(|message| message.content.contains('?'))
        .unwrap_or(false);
    if asked_user {
        ReviewOutcome::Suspend
    } else {
        ReviewOutcome::Retry
    }
}

/// Retries recorded against the current step so far.
pub(crate) fn retry_count(state: &ConversationState) -> u32 {
    state
        .scratchpad
        .get(RETRIES_KEY)
        .and_then(Value::as_u64)
        .unwrap_or(0) as u32
}

/// Applies the review verdict to the state.
///
/// Advancing clears the per-step notes. Suspending touches nothing except
/// the resume marker, so the same state persisted twice stays identical.
/// Retries are counted in the scratchpad and the run fails once the count
/// would pass the cap.
pub struct ReviewerNode {
    max_retries: u32,
}

impl ReviewerNode {
    pub fn new(max_retries: u32) -> Self {
        Self { max_retries }
    }
}

#[async_trait]
impl Node<ConversationState> for ReviewerNode {
    async fn run(
        &self,
        ctx: &NodeContext,
        mut state: ConversationState,
    ) -> Result<ConversationState, DeskpilotError> {
        match review_outcome(&state) {
            ReviewOutcome::Advance => {
                state.current_step_index += 1;
                state.scratchpad.remove(CRITIQUE_KEY);
                state.scratchpad.remove(RETRIES_KEY);
                tracing::debug!(
                    thread_id = %ctx.thread_id,
                    next_step = state.current_step_index,
                    "step advanced"
                );
            }
            ReviewOutcome::Suspend => {
                state.resume = ResumePoint::HasPlanAwaitingStep;
                tracing::info!(thread_id = %ctx.thread_id, "awaiting user input");
            }
            ReviewOutcome::Retry => {
                let attempts = retry_count(&state) + 1;
                if attempts > self.max_retries {
                    return Err(DeskpilotError::MaxRetriesExceeded {
                        max: self.max_retries,
                    });
                }
                state
                    .scratchpad
                    .insert(RETRIES_KEY.to_string(), Value::from(attempts));
                state.scratchpad.insert(
                    CRITIQUE_KEY.to_string(),
                    Value::String(CRITIQUE_NOTE.to_string()),
                );
                tracing::warn!(
                    thread_id = %ctx.thread_id,
                    attempt = attempts,
                    max = self.max_retries,
                    "retrying step"
                );
            }
        }
        Ok(state)
    }
}
