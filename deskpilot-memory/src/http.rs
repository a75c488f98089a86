use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::{RecallError, RecallStore};

/// Recall store backed by a text-record search service.
///
/// Records carry the note text plus the owning `user_id`; the service
/// embeds on ingest and filters search results by user.
#[derive(Clone, Debug)]
pub struct HttpRecallStore {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

#[derive(Serialize)]
struct UpsertRequest {
    records: Vec<RecallRecord>,
}

#[derive(Serialize)]
struct RecallRecord {
    id: String,
    user_id: String,
    text: String,
}

#[derive(Serialize)]
struct SearchRequest {
    query: SearchQuery,
}

#[derive(Serialize)]
struct SearchQuery {
    inputs: SearchInputs,
    top_k: usize,
    filter: Value,
}

#[derive(Serialize)]
struct SearchInputs {
    text: String,
}

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    result: SearchResult,
}

#[derive(Deserialize, Default)]
struct SearchResult {
    #[serde(default)]
    hits: Vec<SearchHit>,
}

#[derive(Deserialize)]
struct SearchHit {
    #[serde(default)]
    fields: Value,
}

impl HttpRecallStore {
    pub fn new(base_url: String, api_key: String) -> Result<Self, RecallError> {
        if api_key.trim().is_empty() {
            return Err(RecallError::Config("api_key cannot be empty".to_string()));
        }

        reqwest::Url::parse(&base_url)
            .map_err(|err| RecallError::Config(format!("invalid base_url: {err}")))?;

        Ok(Self {
            http: reqwest::Client::new(),
            base_url,
            api_key,
        })
    }

    async fn post_json<Req: Serialize>(
        &self,
        path: &str,
        payload: &Req,
    ) -> Result<Value, RecallError> {
        let url = format!("{}{}", self.base_url.trim_end_matches('/'), path);
        let response = self
            .http
            .post(url)
            .header("Api-Key", &self.api_key)
            .header("Content-Type", "application/json")
            .json(payload)
            .send()
            .await
            .map_err(|err| RecallError::Transport(err.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return response
                .json::<Value>()
                .await
                .map_err(|err| RecallError::Malformed(err.to_string()));
        }

        let body: Value = response
            .json::<Value>()
            .await
            .unwrap_or_else(|_| Value::String(String::new()));
        let message = body
            .get("message")
            .and_then(Value::as_str)
            .or_else(|| body.get("error").and_then(Value::as_str))
            .unwrap_or("unknown recall error")
            .to_string();

        Err(RecallError::Api {
            status: status.as_u16(),
            message,
        })
    }
}

#[async_trait]
impl RecallStore for HttpRecallStore {
    async fn add(&self, user_id: &str, text: &str) -> Result<(), RecallError> {
        let payload = UpsertRequest {
            records: vec![RecallRecord {
                id: Uuid::new_v4().to_string(),
                user_id: user_id.to_string(),
                text: text.to_string(),
            }],
        };

        self.post_json("/records/upsert", &payload).await?;
        tracing::debug!(user_id = %user_id, "recall note stored");
        Ok(())
    }

    async fn search(
        &self,
        user_id: &str,
        query: &str,
        k: usize,
    ) -> Result<Vec<String>, RecallError> {
        let payload = SearchRequest {
            query: SearchQuery {
                inputs: SearchInputs {
                    text: query.to_string(),
                },
                top_k: k,
                filter: serde_json::json!({"user_id": user_id}),
            },
        };

        let raw = self.post_json("/records/search", &payload).await?;
        let parsed: SearchResponse =
            serde_json::from_value(raw).map_err(|err| RecallError::Malformed(err.to_string()))?;

        let notes = parsed
            .result
            .hits
            .into_iter()
            .filter_map(|hit| {
                hit.fields
                    .get("text")
                    .or_else(|| hit.fields.get("chunk_text"))
                    .and_then(Value::as_str)
                    .map(ToOwned::to_owned)
            })
            .collect();
        Ok(notes)
    }
}
