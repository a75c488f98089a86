mod error;
mod message;
mod oracle;
mod structured;
mod tool;
mod value;

pub use error::DeskpilotError;
pub use message::{Message, Role};
pub use oracle::{DecisionOracle, OracleReply, OracleRequest, ToolCall, ToolSpec};
pub use structured::parse_structured;
pub use tool::{Tool, ToolError};
pub use value::Value;
