use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;

use deskpilot_core::{parse_structured, DecisionOracle, DeskpilotError, Message, OracleRequest};
use deskpilot_graph::{Node, NodeContext};
use deskpilot_memory::RecallStore;

use crate::prompts::planner_system;
use crate::state::{ConversationState, ResumePoint};

/// How many recall notes feed the planning prompt.
const RECALL_K: usize = 3;

#[derive(Debug, Deserialize)]
struct PlanOutline {
    steps: Vec<String>,
}

/// Turns the latest user request into an ordered step list.
///
/// Runs once per task: a new plan resets the cursor, the scratchpad and the
/// completion flag, and marks the thread as resumable at the supervisor.
/// Recall context is best-effort; a failing store degrades the prompt, not
/// the run.
pub struct PlannerNode {
    oracle: Arc<dyn DecisionOracle>,
    recall: Arc<dyn RecallStore>,
}

impl PlannerNode {
    pub fn new(oracle: Arc<dyn DecisionOracle>, recall: Arc<dyn RecallStore>) -> Self {
        Self { oracle, recall }
    }
}

#[async_trait]
impl Node<ConversationState> for PlannerNode {
    async fn run(
        &self,
        ctx: &NodeContext,
        mut state: ConversationState,
    ) -> Result<ConversationState, DeskpilotError> {
        let request = state
            .messages
            .iter()
            .rev()
            .find(|message| message.is_user())
            .map(|message| message.content.clone())
            .unwrap_or_default();

        let context = match self.recall.search(&state.user_id, &request, RECALL_K).await {
            Ok(notes) => notes.join("\n"),
            Err(err) => {
                tracing::warn!(user_id = %state.user_id, error = %err, "recall search failed");
                "No memory available.".to_string()
            }
        };

        let reply = self
            .oracle
            .decide(OracleRequest::new(vec![
                Message::system(planner_system(&context)),
                Message::user(request),
            ]))
            .await?;
        let outline: PlanOutline = parse_structured("plan outline", reply.text())?;
        if outline.steps.is_empty() {
            return Err(DeskpilotError::Oracle(
                "planner produced an empty step list".to_string(),
            ));
        }

        tracing::info!(
            thread_id = %ctx.thread_id,
            steps = outline.steps.len(),
            "plan generated"
        );
        state.plan = outline.steps;
        state.current_step_index = 0;
        state.scratchpad = HashMap::new();
        state.task_complete = false;
        state.next_worker = None;
        state.resume = ResumePoint::HasPlanAwaitingStep;
        Ok(state)
    }
}
