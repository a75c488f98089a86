//! OpenAI-compatible chat-completions client behind the `DecisionOracle`
//! trait. Works against any provider speaking that wire format (OpenAI,
//! OpenRouter, local gateways); the base URL carries the version segment.

mod client;
mod wire;

pub use client::{OpenAiCompatibleOracle, OpenAiCompatibleOracleBuilder};
pub use deskpilot_core::{DecisionOracle, OracleReply, OracleRequest};
