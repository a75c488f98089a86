use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;
use uuid::Uuid;

use deskpilot_core::{DecisionOracle, DeskpilotError, Message, Tool};
use deskpilot_graph::{
    Checkpoint, Checkpointer, ExecutionLimits, Graph, GraphBuilder, GraphError, NodeContext, END,
};
use deskpilot_memory::RecallStore;

use crate::planner::PlannerNode;
use crate::reviewer::{review_outcome, ReviewOutcome, ReviewerNode};
use crate::state::{ConversationState, ResumePoint, Route};
use crate::supervisor::SupervisorNode;
use crate::workers::WorkerNode;

/// Fallback reply when a run ends without the assistant having said anything.
const NO_REPLY_APOLOGY: &str = "I apologize, but I encountered an internal issue and couldn't \
                                process your request. Please try again.";

/// Caps for a single run.
#[derive(Debug, Clone)]
pub struct RunSettings {
    /// Retries allowed per step before the run fails with
    /// [`DeskpilotError::MaxRetriesExceeded`].
    pub max_step_retries: u32,
    /// Node transitions allowed per run.
    pub max_transitions: usize,
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            max_step_retries: 3,
            max_transitions: 50,
        }
    }
}

/// Collaborators the runtime is assembled from. All of them are trait
/// objects; tests swap in scripted oracles and in-memory backends.
pub struct AgentDeps {
    pub oracle: Arc<dyn DecisionOracle>,
    pub recall: Arc<dyn RecallStore>,
    pub booking_tool: Arc<dyn Tool>,
    pub support_tool: Arc<dyn Tool>,
    pub crisis_tool: Arc<dyn Tool>,
    pub checkpointer: Arc<dyn Checkpointer<ConversationState>>,
}

/// What one inbound message produced.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub reply: String,
    pub plan: Vec<String>,
    pub current_step: usize,
    pub task_complete: bool,
}

/// Drives one graph run per inbound message and owns thread persistence.
///
/// Runs on the same thread are serialized; runs on different threads are
/// independent. State is checkpointed only when a run exits cleanly, so a
/// failed run leaves the thread exactly as the previous checkpoint had it.
pub struct AgentRuntime {
    graph: Graph<ConversationState>,
    checkpointer: Arc<dyn Checkpointer<ConversationState>>,
    thread_locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl AgentRuntime {
    pub fn new(deps: AgentDeps, settings: RunSettings) -> Result<Self, DeskpilotError> {
        let graph = build_graph(&deps, &settings)?;
        Ok(Self {
            graph,
            checkpointer: deps.checkpointer,
            thread_locks: Mutex::new(HashMap::new()),
        })
    }

    /// Appends the user's message to the thread and runs the graph until it
    /// finishes or suspends for input.
    ///
    /// A thread resumes where its checkpoint says: at the planner on a fresh
    /// task, at the supervisor when a plan is still in flight. The plan and
    /// cursor survive suspension untouched.
    pub async fn handle_message(
        &self,
        thread_id: &str,
        user_id: &str,
        message: &str,
    ) -> Result<RunOutcome, DeskpilotError> {
        let lock = self.thread_lock(thread_id).await;
        let _guard = lock.lock().await;

        let (mut state, seq) = match self.checkpointer.load(thread_id).await? {
            Some(checkpoint) => (checkpoint.state, checkpoint.seq),
            None => (ConversationState::new_thread(user_id), 0),
        };
        state.messages.push(Message::user(message));

        let entry = match state.resume {
            ResumePoint::NeedsPlan => "planner",
            ResumePoint::HasPlanAwaitingStep => "supervisor",
        };
        let ctx = NodeContext::new(thread_id, Uuid::new_v4().to_string());
        tracing::info!(thread_id = %ctx.thread_id, run_id = %ctx.run_id, entry, "run started");

        let mut state = self.graph.run_from(&ctx, state, entry).await?;

        let reply = match state.last_message() {
            Some(last) if !last.is_user() => last.content.clone(),
            _ => {
                tracing::warn!(thread_id = %ctx.thread_id, "run produced no assistant reply");
                NO_REPLY_APOLOGY.to_string()
            }
        };

        let rest_node = match state.next_worker {
            Some(Route::Finish) => "supervisor",
            _ => "reviewer",
        };
        // The routing slot never outlives the run that wrote it.
        state.next_worker = None;
        self.checkpointer
            .save(&Checkpoint::new(thread_id, state.clone(), seq + 1, rest_node))
            .await?;

        tracing::info!(
            thread_id = %ctx.thread_id,
            task_complete = state.task_complete,
            current_step = state.current_step_index,
            "run finished"
        );
        Ok(RunOutcome {
            reply,
            plan: state.plan,
            current_step: state.current_step_index,
            task_complete: state.task_complete,
        })
    }

    async fn thread_lock(&self, thread_id: &str) -> Arc<Mutex<()>> {
        let mut locks = self.thread_locks.lock().await;
        locks.entry(thread_id.to_string()).or_default().clone()
    }
}

fn build_graph(
    deps: &AgentDeps,
    settings: &RunSettings,
) -> Result<Graph<ConversationState>, GraphError> {
    GraphBuilder::new()
        .add_node(
            "planner",
            PlannerNode::new(deps.oracle.clone(), deps.recall.clone()),
        )
        .add_node("supervisor", SupervisorNode::new(deps.oracle.clone()))
        .add_node(
            "booking",
            WorkerNode::booking(deps.oracle.clone(), deps.booking_tool.clone()),
        )
        .add_node(
            "support",
            WorkerNode::support(deps.oracle.clone(), deps.support_tool.clone()),
        )
        .add_node(
            "crisis",
            WorkerNode::crisis(deps.oracle.clone(), deps.crisis_tool.clone()),
        )
        .add_node("reviewer", ReviewerNode::new(settings.max_step_retries))
        .add_edge("planner", "supervisor")
        .add_conditional_edge("supervisor", |state: &ConversationState| {
            match state.next_worker {
                Some(Route::Worker(kind)) => kind.node_name().to_string(),
                Some(Route::Finish) | None => END.to_string(),
            }
        })
        .add_edge("booking", "reviewer")
        .add_edge("support", "reviewer")
        .add_edge("crisis", "reviewer")
        .add_conditional_edge("reviewer", |state: &ConversationState| {
            match review_outcome(state) {
                // Advancing returns to the supervisor, which alone decides
                // whether any step remains.
                ReviewOutcome::Advance | ReviewOutcome::Retry => "supervisor".to_string(),
                ReviewOutcome::Suspend => END.to_string(),
            }
        })
        .set_entry("planner")
        .with_limits(ExecutionLimits {
            max_transitions: Some(settings.max_transitions),
        })
        .build()
}
