use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;

use deskpilot_core::{parse_structured, DecisionOracle, DeskpilotError, Message, OracleRequest};
use deskpilot_graph::{Node, NodeContext};

use crate::prompts::supervisor_system;
use crate::state::{ConversationState, ResumePoint, Route, WorkerKind};

/// The closed set of names the routing oracle may answer with. Anything
/// outside it is a schema violation, not a guess.
#[derive(Debug, Deserialize)]
enum WorkerName {
    BookingAgent,
    SupportAgent,
    CrisisAgent,
}

#[derive(Debug, Deserialize)]
struct RouteChoice {
    next_worker: WorkerName,
}

impl From<WorkerName> for WorkerKind {
    fn from(name: WorkerName) -> Self {
        match name {
            WorkerName::BookingAgent => WorkerKind::Booking,
            WorkerName::SupportAgent => WorkerKind::Support,
            WorkerName::CrisisAgent => WorkerKind::Crisis,
        }
    }
}

/// Routes the current step to a worker, or finishes the run when the plan
/// is spent.
///
/// The bounds check comes before any oracle call: an exhausted plan routes
/// to Finish deterministically and flags the thread for fresh planning.
pub struct SupervisorNode {
    oracle: Arc<dyn DecisionOracle>,
}

impl SupervisorNode {
    pub fn new(oracle: Arc<dyn DecisionOracle>) -> Self {
        Self { oracle }
    }
}

#[async_trait]
impl Node<ConversationState> for SupervisorNode {
    async fn run(
        &self,
        ctx: &NodeContext,
        mut state: ConversationState,
    ) -> Result<ConversationState, DeskpilotError> {
        if state.plan_exhausted() {
            tracing::info!(thread_id = %ctx.thread_id, "plan exhausted, finishing run");
            state.next_worker = Some(Route::Finish);
            state.resume = ResumePoint::NeedsPlan;
            return Ok(state);
        }

        let step = state.plan[state.current_step_index].clone();
        let reply = self
            .oracle
            .decide(OracleRequest::new(vec![Message::system(
                supervisor_system(&state.plan, &step),
            )]))
            .await?;
        let choice: RouteChoice = parse_structured("routing decision", reply.text())?;
        let kind = WorkerKind::from(choice.next_worker);

        tracing::debug!(
            thread_id = %ctx.thread_id,
            step = %step,
            worker = kind.node_name(),
            "step routed"
        );
        state.next_worker = Some(Route::Worker(kind));
        Ok(state)
    }
}
