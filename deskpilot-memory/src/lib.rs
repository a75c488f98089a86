//! Long-lived recall for Deskpilot conversations.
//!
//! A [`RecallStore`] keeps short free-text notes per user across threads.
//! Agents search it to personalize planning and append to it after a turn
//! completes. [`InMemoryRecallStore`] backs tests and single-process
//! deployments; [`HttpRecallStore`] talks to a record-search service.

mod error;
mod http;
mod store;

pub use error::RecallError;
pub use http::HttpRecallStore;
pub use store::{InMemoryRecallStore, RecallStore};
