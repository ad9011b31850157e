use super::{missing_field, send_json};
use crate::client::{GenerationParams, LlmClient};
use crate::config::{Backend, DEFAULT_OLLAMA_MODEL};
use crate::error::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use tracing::debug;

/// Local model served by Ollama's `/api/generate`.
#[derive(Debug, Clone)]
pub struct OllamaClient {
    client: Client,
    endpoint: String,
    model: String,
}

impl OllamaClient {
    pub fn new(client: Client, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
            model: DEFAULT_OLLAMA_MODEL.to_string(),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl LlmClient for OllamaClient {
    async fn complete(&self, prompt: &str, params: &GenerationParams) -> Result<String> {
        let body = json!({
            "model": self.model,
            "prompt": prompt,
            "stream": false,
            "options": {
                "temperature": params.temperature,
                "num_predict": params.max_tokens,
            },
        });

        let url = format!("{}/api/generate", self.endpoint.trim_end_matches('/'));
        debug!(model = %self.model, %url, "Calling Ollama");

        let json_response =
            send_json(Backend::Local, &url, self.client.post(&url).json(&body)).await?;

        json_response
            .get("response")
            .and_then(|v| v.as_str())
            .map(str::to_string)
            .ok_or_else(|| missing_field(Backend::Local, "response"))
    }

    fn backend(&self) -> Backend {
        Backend::Local
    }
}
