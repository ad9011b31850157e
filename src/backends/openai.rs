use super::{missing_field, send_json};
use crate::client::{GenerationParams, LlmClient};
use crate::config::{Backend, DEFAULT_OPENAI_BASE_URL, DEFAULT_OPENAI_MODEL};
use crate::error::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use tracing::debug;

/// OpenAI legacy text completions (`/completions`).
#[derive(Clone)]
pub struct OpenAiClient {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl std::fmt::Debug for OpenAiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiClient")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .finish_non_exhaustive()
    }
}

impl OpenAiClient {
    pub fn new(client: Client, api_key: impl Into<String>) -> Self {
        Self {
            client,
            api_key: api_key.into(),
            base_url: DEFAULT_OPENAI_BASE_URL.to_string(),
            model: DEFAULT_OPENAI_MODEL.to_string(),
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }
}

#[async_trait]
impl LlmClient for OpenAiClient {
    async fn complete(&self, prompt: &str, params: &GenerationParams) -> Result<String> {
        let body = json!({
            "model": self.model,
            "prompt": prompt,
            "temperature": params.temperature,
            "max_tokens": params.max_tokens,
        });

        let url = format!("{}/completions", self.base_url.trim_end_matches('/'));
        debug!(model = %self.model, %url, "Calling OpenAI");

        let request = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body);
        let json_response = send_json(Backend::CloudCompletion, &url, request).await?;

        json_response
            .get("choices")
            .and_then(|c| c.get(0))
            .and_then(|c| c.get("text"))
            .and_then(|t| t.as_str())
            .map(str::to_string)
            .ok_or_else(|| missing_field(Backend::CloudCompletion, "choices[0].text"))
    }

    fn backend(&self) -> Backend {
        Backend::CloudCompletion
    }
}
