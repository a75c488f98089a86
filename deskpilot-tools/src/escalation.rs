use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;

use deskpilot_core::{Tool, ToolError, Value};

#[derive(Debug, Error)]
pub enum TicketError {
    #[error("ticket sink failure: {0}")]
    Sink(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

#[derive(Debug, Clone)]
pub struct TicketRequest {
    pub idempotency_key: Option<String>,
    pub summary: String,
    pub severity: Severity,
    pub emotion: String,
}

#[derive(Debug, Clone)]
pub struct Ticket {
    pub id: String,
}

/// Ticketing seam for the escalation tool.
///
/// `open` with a previously seen idempotency key must return the original
/// ticket without opening a second one.
#[async_trait]
pub trait TicketSink: Send + Sync {
    async fn open(&self, request: TicketRequest) -> Result<Ticket, TicketError>;
}

#[derive(Default)]
struct SinkInner {
    opened: Vec<TicketRequest>,
    replays: HashMap<String, Ticket>,
}

/// Ticket sink held in process memory, for tests and single-node demos.
#[derive(Clone, Default)]
pub struct InMemoryTicketSink {
    inner: Arc<Mutex<SinkInner>>,
}

impl InMemoryTicketSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tickets opened so far, in order.
    pub fn opened(&self) -> Vec<TicketRequest> {
        self.inner
            .lock()
            .map(|inner| inner.opened.clone())
            .unwrap_or_default()
    }
}

fn ticket_id(summary: &str) -> String {
    let mut hasher = DefaultHasher::new();
    summary.hash(&mut hasher);
    format!("TICKET-{}", hasher.finish() % 100_000)
}

#[async_trait]
impl TicketSink for InMemoryTicketSink {
    async fn open(&self, request: TicketRequest) -> Result<Ticket, TicketError> {
        let mut inner = self
            .inner
            .lock()
            .map_err(|_| TicketError::Sink("lock".to_string()))?;
        if let Some(key) = &request.idempotency_key {
            if let Some(prior) = inner.replays.get(key) {
                tracing::debug!(idempotency_key = %key, "replaying ticket");
                return Ok(prior.clone());
            }
        }

        let ticket = Ticket {
            id: ticket_id(&request.summary),
        };
        if let Some(key) = request.idempotency_key.clone() {
            inner.replays.insert(key, ticket.clone());
        }
        inner.opened.push(request);
        Ok(ticket)
    }
}

/// Hands the conversation to a human with a severity-matched promise.
pub struct EscalateTool {
    sink: Arc<dyn TicketSink>,
}

#[derive(Debug, Deserialize)]
struct EscalateArgs {
    issue_summary: String,
    severity: Severity,
    user_emotion: String,
    #[serde(default)]
    idempotency_key: Option<String>,
}

impl EscalateTool {
    pub fn new(sink: Arc<dyn TicketSink>) -> Self {
        Self { sink }
    }
}

#[async_trait]
impl Tool for EscalateTool {
    fn name(&self) -> &str {
        "escalate_to_human"
    }

    fn description(&self) -> &str {
        "Escalates the conversation to a human agent when the user is \
         distressed, demands a person or the request cannot be handled here"
    }

    fn schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "issue_summary": {
                    "type": "string",
                    "description": "A brief summary of the user's issue or request"
                },
                "severity": {
                    "type": "string",
                    "enum": ["Low", "Medium", "High", "Critical"],
                    "description": "Low: general questions, minor complaints. \
                                    Medium: recurring issues, frustration. \
                                    High: angry user, service outage, financial dispute. \
                                    Critical: safety threats, legal threats, extreme distress."
                },
                "user_emotion": {
                    "type": "string",
                    "description": "Detected emotion, e.g. Frustrated, Angry, Anxious, Neutral"
                }
            },
            "required": ["issue_summary", "severity", "user_emotion"]
        })
    }

    async fn invoke(&self, args: Value) -> Result<Value, ToolError> {
        let args: EscalateArgs = serde_json::from_value(args)?;
        tracing::info!(
            severity = ?args.severity,
            emotion = %args.user_emotion,
            summary = %args.issue_summary,
            "escalation requested"
        );

        let ticket = self
            .sink
            .open(TicketRequest {
                idempotency_key: args.idempotency_key.clone(),
                summary: args.issue_summary.clone(),
                severity: args.severity,
                emotion: args.user_emotion.clone(),
            })
            .await
            .map_err(|err| ToolError::ExecutionFailed(err.to_string()))?;

        let message = match args.severity {
            Severity::Critical => format!(
                "**Immediate escalation triggered**\n\n\
                 I have alerted our senior support team about this critical issue.\n\n\
                 **Issue:** {}\n\
                 **Priority:** CRITICAL\n\
                 **Ticket ID:** {}\n\n\
                 A human supervisor has been notified and will join this chat or contact you \
                 within **5 minutes**.\n\n\
                 Please stay online.",
                args.issue_summary, ticket.id
            ),
            Severity::High => format!(
                "**Escalating to a human specialist**\n\n\
                 I understand this is important and requires human attention. I've flagged it \
                 for immediate review.\n\n\
                 **Issue:** {}\n\
                 **Status:** High Priority\n\
                 **Ticket ID:** {}\n\n\
                 A specialist will review your case and respond within **1 hour**.\n\n\
                 Is there anything else you'd like to add to the ticket before they review it?",
                args.issue_summary, ticket.id
            ),
            Severity::Medium => format!(
                "**Connecting you with support**\n\n\
                 I see you're feeling {}. I'm passing this conversation to a support agent who \
                 can help you better.\n\n\
                 **Ticket created:** {}\n\
                 **Topic:** {}\n\n\
                 An agent will be with you shortly (estimated wait: 2-4 hours).",
                args.user_emotion.to_lowercase(),
                ticket.id,
                args.issue_summary
            ),
            Severity::Low => format!(
                "**Support ticket created**\n\n\
                 I've created a support ticket for your request: \"{}\".\n\n\
                 **Ticket ID:** {}\n\n\
                 Our team reviews these requests daily. You can expect a response via email \
                 within 24 hours.\n\n\
                 Can I help you with anything else in the meantime?",
                args.issue_summary, ticket.id
            ),
        };

        Ok(Value::String(message))
    }
}
