use serde::{Deserialize, Serialize};

use crate::{DeskpilotError, Message, Value};

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct ToolSpec {
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct ToolCall {
    pub id: String,
    pub name: String,
    pub args: Value,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct OracleRequest {
    pub messages: Vec<Message>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<ToolSpec>,
}

impl OracleRequest {
    pub fn new(messages: Vec<Message>) -> Self {
        Self {
            messages,
            tools: Vec::new(),
        }
    }

    pub fn with_tools(mut self, tools: Vec<ToolSpec>) -> Self {
        self.tools = tools;
        self
    }
}

/// What the oracle came back with: free text, or a request to invoke one of
/// the offered tools.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct OracleReply {
    pub content: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<ToolCall>,
}

impl OracleReply {
    pub fn from_text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            tool_calls: Vec::new(),
        }
    }

    pub fn text(&self) -> &str {
        &self.content
    }

    /// The action the oracle asked for, if any. Workers act on at most one
    /// tool call per step, so only the first is ever consulted.
    pub fn requested_action(&self) -> Option<&ToolCall> {
        self.tool_calls.first()
    }
}

/// The language-understanding boundary. Everything the loop needs from it is
/// one call: a prompt context in, either free text or a tool request out.
/// The model identifier is client configuration, not request payload.
#[async_trait::async_trait]
pub trait DecisionOracle: Send + Sync + 'static {
    async fn decide(&self, request: OracleRequest) -> Result<OracleReply, DeskpilotError>;
}
