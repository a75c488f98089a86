//! HTTP transport for the Deskpilot assistant.
//!
//! `POST /chat` hands one user message to the agent runtime and returns the
//! assistant's reply together with the thread's plan position. `GET /health`
//! reports liveness. Composition (oracle client, recall store, tools,
//! checkpointing) happens in the binary from [`ServerConfig`].

mod config;
mod routes;

pub use config::ServerConfig;
pub use routes::{build_router, AppState, ChatRequest, ChatResponse};
