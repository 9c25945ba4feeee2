//! LLM completion boundary and an OpenAI-compatible chat client.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::error::CurationError;

/// Longest provider error body kept in [`CurationError::LlmStatus`].
const ERROR_BODY_LIMIT: usize = 500;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatPrompt {
    pub system: String,
    pub user: String,
}

/// One prompt in, raw completion text out. Implementations do not retry.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Model identifier recorded on translated drafts.
    fn model(&self) -> &str;

    /// # Errors
    ///
    /// Transport, status, timeout and empty-response failures.
    async fn complete(&self, prompt: &ChatPrompt) -> Result<String, CurationError>;
}

/// `POST {base_url}/chat/completions` with bearer auth.
pub struct OpenAiChatClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
    timeout_secs: u64,
}

impl OpenAiChatClient {
    /// # Errors
    ///
    /// [`CurationError::Http`] if the HTTP client cannot be built.
    pub fn new(api_key: &str, model: &str, timeout_secs: u64) -> Result<Self, CurationError> {
        Self::with_base_url("https://api.openai.com/v1", api_key, model, timeout_secs)
    }

    /// Targets any OpenAI-compatible endpoint (proxies, local gateways).
    ///
    /// # Errors
    ///
    /// [`CurationError::Http`] if the HTTP client cannot be built.
    pub fn with_base_url(
        base_url: &str,
        api_key: &str,
        model: &str,
        timeout_secs: u64,
    ) -> Result<Self, CurationError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_owned(),
            api_key: api_key.to_owned(),
            model: model.to_owned(),
            timeout_secs,
        })
    }
}

#[async_trait]
impl LlmClient for OpenAiChatClient {
    fn model(&self) -> &str {
        &self.model
    }

    async fn complete(&self, prompt: &ChatPrompt) -> Result<String, CurationError> {
        let body = json!({
            "model": self.model,
            "messages": [
                {"role": "system", "content": prompt.system},
                {"role": "user", "content": prompt.user}
            ],
            "temperature": 0.4,
            "response_format": {"type": "json_object"}
        });

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| self.map_transport_error(e))?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after_secs = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok());
            return Err(CurationError::RateLimited { retry_after_secs });
        }
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(CurationError::LlmStatus {
                status: status.as_u16(),
                body: text.chars().take(ERROR_BODY_LIMIT).collect(),
            });
        }

        let payload: Value = response
            .json()
            .await
            .map_err(|e| self.map_transport_error(e))?;
        let content = payload
            .get("choices")
            .and_then(Value::as_array)
            .and_then(|choices| choices.first())
            .and_then(|choice| choice.get("message"))
            .and_then(|message| message.get("content"))
            .and_then(Value::as_str)
            .map(str::trim)
            .unwrap_or_default();

        if content.is_empty() {
            return Err(CurationError::EmptyResponse);
        }
        Ok(content.to_owned())
    }
}

impl OpenAiChatClient {
    fn map_transport_error(&self, err: reqwest::Error) -> CurationError {
        if err.is_timeout() {
            CurationError::Timeout {
                secs: self.timeout_secs,
            }
        } else {
            CurationError::Http(err)
        }
    }
}
