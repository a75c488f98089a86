//! Plan-driven conversational agents.
//!
//! One inbound message becomes one run of a small state machine: a planner
//! turns the request into ordered steps, a supervisor routes each step to a
//! capability worker, and a reviewer decides whether the step advanced, needs
//! a retry, or must wait for the user. The [`AgentRuntime`] wraps the graph
//! with per-thread persistence: it loads the thread's checkpoint, re-enters
//! the graph at the right node, and writes a new checkpoint only when the run
//! exits cleanly.

mod planner;
mod prompts;
mod reviewer;
mod runtime;
mod state;
mod supervisor;
mod workers;

pub use planner::PlannerNode;
pub use reviewer::{review_outcome, ReviewOutcome, ReviewerNode};
pub use runtime::{AgentDeps, AgentRuntime, RunOutcome, RunSettings};
pub use state::{ConversationState, ResumePoint, Route, WorkerKind};
pub use supervisor::SupervisorNode;
pub use workers::WorkerNode;
