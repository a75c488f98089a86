use thiserror::Error;

use deskpilot_core::DeskpilotError;

#[derive(Debug, Error)]
pub enum GraphError {
    #[error("missing node: {node}")]
    MissingNode { node: String },
    #[error("edge from '{from}' leads to unknown node '{to}'")]
    InvalidEdge { from: String, to: String },
    #[error("transition limit reached: {max} nodes executed without an end")]
    TransitionLimit { max: usize },
    #[error("checkpoint failed: {0}")]
    Checkpoint(String),
    #[error("node '{node}' failed: {source}")]
    Node {
        node: String,
        #[source]
        source: DeskpilotError,
    },
}

impl From<GraphError> for DeskpilotError {
    fn from(err: GraphError) -> Self {
        match err {
            // Keep the typed node error so callers can match on it.
            GraphError::Node { source, .. } => source,
            GraphError::Checkpoint(msg) => DeskpilotError::CheckpointFailed(msg),
            other => DeskpilotError::Custom(other.to_string()),
        }
    }
}
