use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use deskpilot_core::Message;
use deskpilot_graph::StateSchema;

/// Capability a plan step can be dispatched to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WorkerKind {
    Booking,
    Support,
    Crisis,
}

impl WorkerKind {
    /// Node name this worker is registered under in the graph.
    pub fn node_name(self) -> &'static str {
        match self {
            WorkerKind::Booking => "booking",
            WorkerKind::Support => "support",
            WorkerKind::Crisis => "crisis",
        }
    }
}

/// Routing decision the supervisor leaves for its outgoing edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Route {
    Worker(WorkerKind),
    Finish,
}

/// Where the next inbound message re-enters the graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ResumePoint {
    /// Fresh thread, or the previous task ran to completion.
    #[default]
    NeedsPlan,
    /// A plan with unfinished steps is waiting on the user.
    HasPlanAwaitingStep,
}

/// Everything a thread carries between runs.
///
/// The transcript is append-only; a new plan resets the cursor and
/// scratchpad but never the messages. `next_worker` is consumed by the
/// supervisor's edge within a run and is cleared before the state is
/// checkpointed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConversationState {
    #[serde(default)]
    pub messages: Vec<Message>,
    #[serde(default)]
    pub plan: Vec<String>,
    #[serde(default)]
    pub current_step_index: usize,
    /// Cross-attempt notes for the current step, such as retry critiques.
    #[serde(default)]
    pub scratchpad: HashMap<String, Value>,
    #[serde(default)]
    pub task_complete: bool,
    #[serde(default)]
    pub user_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_worker: Option<Route>,
    #[serde(default)]
    pub resume: ResumePoint,
}

impl StateSchema for ConversationState {}

impl ConversationState {
    pub fn new_thread(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            ..Self::default()
        }
    }

    /// The step the cursor points at, if any remain.
    pub fn current_step(&self) -> Option<&str> {
        self.plan.get(self.current_step_index).map(String::as_str)
    }

    /// True once the cursor has moved past the last step.
    pub fn plan_exhausted(&self) -> bool {
        self.current_step_index >= self.plan.len()
    }

    pub fn last_message(&self) -> Option<&Message> {
        self.messages.last()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_state_needs_a_plan() {
        let state = ConversationState::new_thread("user-1");
        assert_eq!(state.resume, ResumePoint::NeedsPlan);
        assert!(state.plan_exhausted());
        assert!(state.current_step().is_none());
    }

    #[test]
    fn cursor_tracks_plan_steps() {
        let mut state = ConversationState::new_thread("user-1");
        state.plan = vec!["greet".to_string(), "book".to_string()];
        assert_eq!(state.current_step(), Some("greet"));
        state.current_step_index = 1;
        assert_eq!(state.current_step(), Some("book"));
        state.current_step_index = 2;
        assert!(state.plan_exhausted());
    }

    #[test]
    fn next_worker_is_dropped_from_serialized_state_when_unset() {
        let state = ConversationState::new_thread("user-1");
        let raw = serde_json::to_string(&state).unwrap();
        assert!(!raw.contains("next_worker"));

        let restored: ConversationState = serde_json::from_str(&raw).unwrap();
        assert!(restored.next_worker.is_none());
    }
}
