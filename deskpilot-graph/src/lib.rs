mod checkpoint;
mod error;
mod file_checkpointer;
mod graph;
mod limits;
mod node;
mod state;

pub use checkpoint::{Checkpoint, Checkpointer, InMemoryCheckpointer};
pub use error::GraphError;
pub use file_checkpointer::FileCheckpointer;
pub use graph::{Graph, GraphBuilder, END};
pub use limits::ExecutionLimits;
pub use node::{Node, NodeContext};
pub use state::StateSchema;
