//! Concrete [`LlmClient`] implementations and the factory that picks one.

pub mod anthropic;
pub mod ollama;
pub mod openai;

pub use anthropic::AnthropicClient;
pub use ollama::OllamaClient;
pub use openai::OpenAiClient;

use crate::client::LlmClient;
use crate::config::{Backend, Settings};
use crate::error::{PipelineError, Result};
use reqwest::RequestBuilder;
use serde_json::Value;
use std::sync::Arc;
use tracing::info;

/// Create the client selected by `settings`.
///
/// Validates the settings first, so a missing key surfaces here rather than
/// on the first request.
pub fn create_client(settings: &Settings) -> Result<Arc<dyn LlmClient>> {
    settings.validate()?;
    let http = reqwest::Client::new();
    let backend = settings.backend();

    let client: Arc<dyn LlmClient> = match backend {
        Backend::Local => Arc::new(
            OllamaClient::new(http, &settings.ollama_endpoint).with_model(&settings.ollama_model),
        ),
        Backend::CloudChat => Arc::new(
            AnthropicClient::new(http, settings.anthropic_key()?)
                .with_base_url(&settings.anthropic_base_url)
                .with_model(&settings.anthropic_model),
        ),
        Backend::CloudCompletion => Arc::new(
            OpenAiClient::new(http, settings.openai_key()?)
                .with_base_url(&settings.openai_base_url)
                .with_model(&settings.openai_model),
        ),
    };

    info!(backend = %backend, "Initialized LLM client");
    Ok(client)
}

/// Send a request and decode the JSON body, mapping every failure to
/// `BackendUnavailable`.
pub(crate) async fn send_json(backend: Backend, url: &str, request: RequestBuilder) -> Result<Value> {
    let resp = request.send().await.map_err(|e| {
        PipelineError::backend(
            backend.as_str(),
            format!("failed to connect to {}: {}", url, e),
        )
    })?;

    let status = resp.status();
    if !status.is_success() {
        let text = resp.text().await.unwrap_or_default();
        let message = if status.as_u16() == 401 || status.as_u16() == 403 {
            format!("authentication failed (HTTP {}): {}", status, text)
        } else {
            format!("HTTP {}: {}", status, text)
        };
        return Err(PipelineError::backend(backend.as_str(), message));
    }

    resp.json::<Value>()
        .await
        .map_err(|e| PipelineError::backend(backend.as_str(), format!("invalid response body: {}", e)))
}

pub(crate) fn missing_field(backend: Backend, field: &str) -> PipelineError {
    PipelineError::backend(
        backend.as_str(),
        format!("response is missing '{}'", field),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_factory_selects_ollama() {
        let settings = Settings::builder().use_ollama(true).build().unwrap();
        let client = create_client(&settings).unwrap();
        assert_eq!(client.backend(), Backend::Local);
    }

    #[test]
    fn test_factory_selects_anthropic() {
        let settings = Settings::builder()
            .use_anthropic(true)
            .anthropic_api_key("key")
            .build()
            .unwrap();
        let client = create_client(&settings).unwrap();
        assert_eq!(client.backend(), Backend::CloudChat);
    }

    #[test]
    fn test_factory_defaults_to_openai() {
        let settings = Settings::builder().openai_api_key("sk-test").build().unwrap();
        let client = create_client(&settings).unwrap();
        assert_eq!(client.backend(), Backend::CloudCompletion);
    }

    #[test]
    fn test_factory_rejects_unusable_settings() {
        let result = create_client(&Settings::default());
        assert!(matches!(result, Err(PipelineError::Configuration(_))));
    }
}
