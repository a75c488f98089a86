use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use url::Url;

use deskpilot_core::{DecisionOracle, DeskpilotError, OracleReply, OracleRequest};

use crate::wire::{
    from_wire_tool_call, to_wire_message, to_wire_tool, ApiErrorBody, ChatCompletionRequest,
    ChatCompletionResponse,
};

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Chat-completions client for any OpenAI-compatible endpoint.
#[derive(Clone, Debug)]
pub struct OpenAiCompatibleOracle {
    http: reqwest::Client,
    base_url: Url,
    api_key: SecretString,
    model: String,
    temperature: Option<f32>,
    timeout: Duration,
}

pub struct OpenAiCompatibleOracleBuilder {
    base_url: String,
    api_key: Option<String>,
    model: Option<String>,
    temperature: Option<f32>,
    timeout: Duration,
}

impl OpenAiCompatibleOracle {
    pub fn builder() -> OpenAiCompatibleOracleBuilder {
        OpenAiCompatibleOracleBuilder {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: None,
            model: None,
            temperature: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/chat/completions",
            self.base_url.as_str().trim_end_matches('/')
        )
    }
}

impl OpenAiCompatibleOracleBuilder {
    /// Endpoint root including the version segment, e.g.
    /// `https://openrouter.ai/api/v1`.
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn build(self) -> Result<OpenAiCompatibleOracle, DeskpilotError> {
        let base_url = Url::parse(&self.base_url)
            .map_err(|err| DeskpilotError::InvalidConfig(format!("invalid base_url: {err}")))?;
        let api_key = self
            .api_key
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| DeskpilotError::InvalidConfig("api_key cannot be empty".to_string()))?;
        let model = self
            .model
            .filter(|model| !model.trim().is_empty())
            .ok_or_else(|| DeskpilotError::InvalidConfig("model cannot be empty".to_string()))?;
        let http = reqwest::Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(|err| DeskpilotError::InvalidConfig(err.to_string()))?;

        Ok(OpenAiCompatibleOracle {
            http,
            base_url,
            api_key: SecretString::new(api_key),
            model,
            temperature: self.temperature,
            timeout: self.timeout,
        })
    }
}

#[async_trait::async_trait]
impl DecisionOracle for OpenAiCompatibleOracle {
    async fn decide(&self, request: OracleRequest) -> Result<OracleReply, DeskpilotError> {
        let body = ChatCompletionRequest {
            model: self.model.clone(),
            messages: request.messages.iter().map(to_wire_message).collect(),
            tools: if request.tools.is_empty() {
                None
            } else {
                Some(request.tools.iter().map(to_wire_tool).collect())
            },
            temperature: self.temperature,
            stream: false,
        };

        tracing::debug!(
            model = %self.model,
            messages = body.messages.len(),
            tools = request.tools.len(),
            "oracle request"
        );

        let response = self
            .http
            .post(self.endpoint())
            .bearer_auth(self.api_key.expose_secret())
            .json(&body)
            .send()
            .await
            .map_err(|err| {
                if err.is_timeout() {
                    DeskpilotError::Timeout(self.timeout)
                } else {
                    DeskpilotError::Oracle(err.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .json::<ApiErrorBody>()
                .await
                .map(|body| body.error.message)
                .unwrap_or_else(|_| "unknown provider error".to_string());
            return Err(DeskpilotError::Oracle(format!(
                "provider returned {status}: {message}"
            )));
        }

        let completion: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|err| DeskpilotError::Oracle(format!("malformed completion: {err}")))?;
        let choice = completion
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| DeskpilotError::Oracle("completion had no choices".to_string()))?;

        let tool_calls = choice
            .message
            .tool_calls
            .unwrap_or_default()
            .into_iter()
            .map(from_wire_tool_call)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(OracleReply {
            content: choice.message.content.unwrap_or_default(),
            tool_calls,
        })
    }
}
