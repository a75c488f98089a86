use std::sync::Arc;
use std::time::Duration;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tower_http::limit::RequestBodyLimitLayer;

use deskpilot_agents::AgentRuntime;
use deskpilot_memory::RecallStore;

/// Failure body mirrors the success shape so clients parse one thing. The
/// text matches the runtime's own no-reply apology.
const RUN_FAILURE_APOLOGY: &str = "I apologize, but I encountered an internal issue and couldn't \
                                   process your request. Please try again.";

const MAX_BODY_BYTES: usize = 64 * 1024;

#[derive(Clone)]
pub struct AppState {
    pub runtime: Arc<AgentRuntime>,
    pub recall: Arc<dyn RecallStore>,
    pub run_timeout: Duration,
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    #[serde(default = "default_thread")]
    pub thread_id: String,
    #[serde(default = "default_user")]
    pub user_id: String,
}

fn default_thread() -> String {
    "default".to_string()
}

fn default_user() -> String {
    "default_user".to_string()
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub response: String,
    pub plan: Vec<String>,
    pub current_step: usize,
    pub task_complete: bool,
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/chat", post(chat))
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .with_state(state)
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

/// One exchange: run the thread's graph, then remember the user's message.
/// Internal failure detail goes to the log; the client sees only the apology.
async fn chat(
    State(state): State<AppState>,
    Json(payload): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, (StatusCode, Json<ChatResponse>)> {
    let run = tokio::time::timeout(
        state.run_timeout,
        state
            .runtime
            .handle_message(&payload.thread_id, &payload.user_id, &payload.message),
    )
    .await;

    let outcome = match run {
        Ok(Ok(outcome)) => outcome,
        Ok(Err(err)) => {
            tracing::error!(thread_id = %payload.thread_id, error = %err, "run failed");
            return Err(failure_response());
        }
        Err(_) => {
            tracing::error!(
                thread_id = %payload.thread_id,
                timeout = ?state.run_timeout,
                "run timed out"
            );
            return Err(failure_response());
        }
    };

    if let Err(err) = state.recall.add(&payload.user_id, &payload.message).await {
        tracing::warn!(user_id = %payload.user_id, error = %err, "recall write failed");
    }

    Ok(Json(ChatResponse {
        response: outcome.reply,
        plan: outcome.plan,
        current_step: outcome.current_step,
        task_complete: outcome.task_complete,
    }))
}

fn failure_response() -> (StatusCode, Json<ChatResponse>) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ChatResponse {
            response: RUN_FAILURE_APOLOGY.to_string(),
            plan: Vec::new(),
            current_step: 0,
            task_complete: false,
        }),
    )
}
