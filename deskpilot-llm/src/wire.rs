//! Request/response bodies for the chat-completions endpoint, including the
//! nested tool-call shape (`function.arguments` arrives as a JSON string).

use serde::{Deserialize, Serialize};

use deskpilot_core::{DeskpilotError, Message, Role, ToolCall, ToolSpec, Value};

#[derive(Serialize, Debug, Clone)]
pub(crate) struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<WireMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<WireTool>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    pub stream: bool,
}

#[derive(Serialize, Debug, Clone)]
pub(crate) struct WireMessage {
    pub role: &'static str,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<WireToolCall>>,
}

#[derive(Serialize, Debug, Clone)]
pub(crate) struct WireTool {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub function: WireFunctionDef,
}

#[derive(Serialize, Debug, Clone)]
pub(crate) struct WireFunctionDef {
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub(crate) struct WireToolCall {
    pub id: String,
    #[serde(rename = "type", default = "function_kind")]
    pub kind: String,
    pub function: WireFunctionCall,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub(crate) struct WireFunctionCall {
    pub name: String,
    pub arguments: String,
}

fn function_kind() -> String {
    "function".to_string()
}

#[derive(Deserialize, Debug, Clone)]
pub(crate) struct ChatCompletionResponse {
    pub choices: Vec<Choice>,
}

#[derive(Deserialize, Debug, Clone)]
pub(crate) struct Choice {
    pub message: ResponseMessage,
}

#[derive(Deserialize, Debug, Clone)]
pub(crate) struct ResponseMessage {
    pub content: Option<String>,
    #[serde(default)]
    pub tool_calls: Option<Vec<WireToolCall>>,
}

#[derive(Deserialize, Debug, Clone)]
pub(crate) struct ApiErrorBody {
    pub error: ApiErrorDetail,
}

#[derive(Deserialize, Debug, Clone)]
pub(crate) struct ApiErrorDetail {
    pub message: String,
}

pub(crate) fn to_wire_message(message: &Message) -> WireMessage {
    let role = match message.role {
        Role::System => "system",
        Role::User => "user",
        Role::Assistant => "assistant",
        Role::Tool => "tool",
    };
    let tool_calls = if message.tool_calls.is_empty() {
        None
    } else {
        Some(message.tool_calls.iter().map(to_wire_tool_call).collect())
    };
    WireMessage {
        role,
        content: message.content.clone(),
        tool_call_id: message.tool_call_id.clone(),
        tool_calls,
    }
}

pub(crate) fn to_wire_tool(spec: &ToolSpec) -> WireTool {
    WireTool {
        kind: "function",
        function: WireFunctionDef {
            name: spec.name.clone(),
            description: spec.description.clone(),
            parameters: spec.parameters.clone(),
        },
    }
}

fn to_wire_tool_call(call: &ToolCall) -> WireToolCall {
    WireToolCall {
        id: call.id.clone(),
        kind: "function".to_string(),
        function: WireFunctionCall {
            name: call.name.clone(),
            arguments: call.args.to_string(),
        },
    }
}

pub(crate) fn from_wire_tool_call(call: WireToolCall) -> Result<ToolCall, DeskpilotError> {
    let args: Value = serde_json::from_str(&call.function.arguments).map_err(|_| {
        DeskpilotError::SchemaViolation {
            expected: "tool call arguments",
            output: call.function.arguments.clone(),
        }
    })?;
    Ok(ToolCall {
        id: call.id,
        name: call.function.name,
        args,
    })
}
