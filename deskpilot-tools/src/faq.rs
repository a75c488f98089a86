use std::cmp::Ordering;
use std::sync::Arc;

use async_trait::async_trait;
use rand::seq::SliceRandom;
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;

use deskpilot_core::{Tool, ToolError, Value};

/// A hit only counts as an answer above this score.
const ANSWER_THRESHOLD: f32 = 0.5;

/// Hits below this floor are dropped before ranking.
const RETRIEVER_FLOOR: f32 = 0.3;

#[derive(Debug, Error)]
pub enum FaqError {
    #[error("faq index failure: {0}")]
    Index(String),
}

#[derive(Debug, Clone)]
pub struct FaqEntry {
    pub question: String,
    pub answer: String,
}

impl FaqEntry {
    pub fn new(question: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            answer: answer.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct FaqHit {
    pub entry: FaqEntry,
    pub score: f32,
}

/// Question-answer retrieval seam for the FAQ tool.
#[async_trait]
pub trait FaqIndex: Send + Sync {
    /// Best matches for `query`, highest score first, scores in `0.0..=1.0`.
    async fn search(&self, query: &str, top_k: usize) -> Result<Vec<FaqHit>, FaqError>;

    /// A random sample of entries for the browse listing.
    async fn sample(&self, k: usize) -> Result<Vec<FaqEntry>, FaqError>;
}

/// Token-overlap index over a fixed entry list.
#[derive(Clone, Default)]
pub struct InMemoryFaqIndex {
    entries: Vec<FaqEntry>,
}

impl InMemoryFaqIndex {
    pub fn new(entries: Vec<FaqEntry>) -> Self {
        Self { entries }
    }
}

fn tokens(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(|t| t.to_lowercase())
        .collect()
}

fn score(query_tokens: &[String], question: &str) -> f32 {
    if query_tokens.is_empty() {
        return 0.0;
    }
    let question_tokens = tokens(question);
    let shared = query_tokens
        .iter()
        .filter(|t| question_tokens.contains(t))
        .count();
    shared as f32 / query_tokens.len() as f32
}

#[async_trait]
impl FaqIndex for InMemoryFaqIndex {
    async fn search(&self, query: &str, top_k: usize) -> Result<Vec<FaqHit>, FaqError> {
        let query_tokens = tokens(query);
        let mut hits: Vec<FaqHit> = self
            .entries
            .iter()
            .map(|entry| FaqHit {
                entry: entry.clone(),
                score: score(&query_tokens, &entry.question),
            })
            .filter(|hit| hit.score > RETRIEVER_FLOOR)
            .collect();
        hits.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
        hits.truncate(top_k);
        Ok(hits)
    }

    async fn sample(&self, k: usize) -> Result<Vec<FaqEntry>, FaqError> {
        let sampled = self
            .entries
            .choose_multiple(&mut rand::thread_rng(), k)
            .cloned()
            .collect();
        Ok(sampled)
    }
}

/// Answers informational questions from a [`FaqIndex`].
pub struct FaqTool {
    index: Arc<dyn FaqIndex>,
}

#[derive(Debug, Deserialize)]
struct FaqArgs {
    message: String,
}

impl FaqTool {
    pub fn new(index: Arc<dyn FaqIndex>) -> Self {
        Self { index }
    }
}

#[async_trait]
impl Tool for FaqTool {
    fn name(&self) -> &str {
        "faq_lookup"
    }

    fn description(&self) -> &str {
        "Answers questions about services, pricing and how things work from \
         the FAQ knowledge base, or lists common questions on request"
    }

    fn schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "message": {"type": "string", "description": "The user's question"}
            },
            "required": ["message"]
        })
    }

    async fn invoke(&self, args: Value) -> Result<Value, ToolError> {
        let args: FaqArgs = serde_json::from_value(args)?;
        let lowered = args.message.trim().to_lowercase();

        if matches!(
            lowered.as_str(),
            "faq" | "show faq" | "help" | "what can you do"
        ) {
            let sampled = self
                .index
                .sample(5)
                .await
                .map_err(|err| ToolError::ExecutionFailed(err.to_string()))?;
            if sampled.is_empty() {
                return Ok(Value::String(
                    "How can I help you today? Feel free to ask any questions!".to_string(),
                ));
            }

            let mut listing = String::from("**Common Questions:**\n\n");
            for (position, entry) in sampled.iter().enumerate() {
                listing.push_str(&format!("{}. {}\n", position + 1, entry.question));
            }
            listing.push_str("\nFeel free to ask any of these questions or ask your own!");
            return Ok(Value::String(listing));
        }

        let hits = self
            .index
            .search(&args.message, 1)
            .await
            .map_err(|err| ToolError::ExecutionFailed(err.to_string()))?;

        match hits.first() {
            Some(hit) if hit.score > ANSWER_THRESHOLD => Ok(Value::String(format!(
                "**Answer found**\n\n**Q:** {}\n\n**A:** {}\n\n---\nNeed more information or have another question? Just ask!",
                hit.entry.question, hit.entry.answer
            ))),
            _ => Ok(Value::String(
                "I couldn't find a specific answer to that question.\n\n\
                 Would you like to:\n\
                 1. **Rephrase** - Try asking in a different way\n\
                 2. **See common questions** - Type \"FAQ\"\n\
                 3. **Talk to a specialist** - Type \"book a meeting\"\n\n\
                 How can I help?"
                    .to_string(),
            )),
        }
    }
}
