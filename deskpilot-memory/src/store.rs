use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;

use crate::RecallError;

/// Per-user note storage with free-text search.
///
/// Notes are short sentences ("prefers morning slots", "works at Acme").
/// `search` returns the `k` most relevant notes for the user, best first,
/// and an empty vec when nothing matches.
#[async_trait]
pub trait RecallStore: Send + Sync {
    async fn add(&self, user_id: &str, text: &str) -> Result<(), RecallError>;

    async fn search(
        &self,
        user_id: &str,
        query: &str,
        k: usize,
    ) -> Result<Vec<String>, RecallError>;
}

/// Token-overlap recall store for tests and single-process runs.
#[derive(Clone, Default)]
pub struct InMemoryRecallStore {
    notes: Arc<RwLock<HashMap<String, Vec<String>>>>,
}

impl InMemoryRecallStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn tokens(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(|t| t.to_lowercase())
        .collect()
}

fn overlap(query_tokens: &[String], note: &str) -> usize {
    let note_tokens = tokens(note);
    query_tokens
        .iter()
        .filter(|t| note_tokens.contains(t))
        .count()
}

#[async_trait]
impl RecallStore for InMemoryRecallStore {
    async fn add(&self, user_id: &str, text: &str) -> Result<(), RecallError> {
        let mut notes = self
            .notes
            .write()
            .map_err(|_| RecallError::Transport("lock".to_string()))?;
        notes
            .entry(user_id.to_string())
            .or_default()
            .push(text.to_string());
        Ok(())
    }

    async fn search(
        &self,
        user_id: &str,
        query: &str,
        k: usize,
    ) -> Result<Vec<String>, RecallError> {
        let notes = self
            .notes
            .read()
            .map_err(|_| RecallError::Transport("lock".to_string()))?;
        let Some(user_notes) = notes.get(user_id) else {
            return Ok(Vec::new());
        };

        let query_tokens = tokens(query);
        let mut scored: Vec<(usize, &String)> = user_notes
            .iter()
            .map(|note| (overlap(&query_tokens, note), note))
            .filter(|(score, _)| *score > 0)
            .collect();
        scored.sort_by(|a, b| b.0.cmp(&a.0));

        Ok(scored.into_iter().take(k).map(|(_, n)| n.clone()).collect())
    }
}
