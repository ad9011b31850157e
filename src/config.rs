use crate::client::GenerationParams;
use crate::error::{PipelineError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

pub const DEFAULT_OLLAMA_ENDPOINT: &str = "http://localhost:11434";
pub const DEFAULT_OLLAMA_MODEL: &str = "llama2";
pub const DEFAULT_ANTHROPIC_BASE_URL: &str = "https://api.anthropic.com/v1";
pub const DEFAULT_ANTHROPIC_MODEL: &str = "claude-3-sonnet-20240229";
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-3.5-turbo-instruct";

/// Which LLM provider fulfils generation requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Backend {
    /// Locally hosted Ollama server.
    Local,
    /// Anthropic Messages API.
    CloudChat,
    /// OpenAI text completions API.
    CloudCompletion,
}

impl Backend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Backend::Local => "ollama",
            Backend::CloudChat => "anthropic",
            Backend::CloudCompletion => "openai",
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tone of the generated blog post.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Style {
    Formal,
    #[default]
    Informal,
    Humorous,
    Professional,
}

impl Style {
    /// All styles, in the order shown by the interactive menu.
    pub const ALL: [Style; 4] = [
        Style::Formal,
        Style::Informal,
        Style::Humorous,
        Style::Professional,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Style::Formal => "formal",
            Style::Informal => "informal",
            Style::Humorous => "humorous",
            Style::Professional => "professional",
        }
    }

    /// Look up a style by its 1-based menu position.
    pub fn from_choice(choice: usize) -> Option<Style> {
        choice
            .checked_sub(1)
            .and_then(|idx| Self::ALL.get(idx))
            .copied()
    }
}

impl fmt::Display for Style {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Style {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|style| style.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| PipelineError::UnknownStyle(s.to_string()))
    }
}

/// Application settings, built once at startup and passed explicitly to the
/// backend factory and the generator.
///
/// Use [`Settings::builder()`] for ergonomic construction, or
/// [`Settings::default()`] for the stock values (OpenAI backend, no key).
#[derive(Debug, Clone)]
pub struct Settings {
    /// Use a local Ollama server. Takes precedence over every cloud backend.
    pub use_ollama: bool,

    /// Use Anthropic instead of OpenAI when Ollama is off.
    pub use_anthropic: bool,

    pub openai_api_key: Option<String>,
    pub anthropic_api_key: Option<String>,

    pub ollama_endpoint: String,
    pub ollama_model: String,
    pub anthropic_base_url: String,
    pub anthropic_model: String,
    pub openai_base_url: String,
    pub openai_model: String,

    /// Sampling temperature passed to every stage.
    pub temperature: f64,

    /// Upper bound on generated tokens per stage.
    pub max_tokens: u32,

    /// Directory receiving one report file per successful run.
    pub output_dir: PathBuf,

    /// Write a report file after each successful run.
    pub save_to_file: bool,
}

impl Default for Settings {
    fn default() -> Self {
        let params = GenerationParams::default();
        Self {
            use_ollama: false,
            use_anthropic: false,
            openai_api_key: None,
            anthropic_api_key: None,
            ollama_endpoint: DEFAULT_OLLAMA_ENDPOINT.to_string(),
            ollama_model: DEFAULT_OLLAMA_MODEL.to_string(),
            anthropic_base_url: DEFAULT_ANTHROPIC_BASE_URL.to_string(),
            anthropic_model: DEFAULT_ANTHROPIC_MODEL.to_string(),
            openai_base_url: DEFAULT_OPENAI_BASE_URL.to_string(),
            openai_model: DEFAULT_OPENAI_MODEL.to_string(),
            temperature: params.temperature,
            max_tokens: params.max_tokens,
            output_dir: PathBuf::from("output"),
            save_to_file: true,
        }
    }
}

impl Settings {
    /// Start building settings with the builder pattern.
    pub fn builder() -> SettingsBuilder {
        SettingsBuilder::default()
    }

    /// The backend these settings select. Ollama wins over Anthropic, which
    /// wins over OpenAI.
    pub fn backend(&self) -> Backend {
        if self.use_ollama {
            Backend::Local
        } else if self.use_anthropic {
            Backend::CloudChat
        } else {
            Backend::CloudCompletion
        }
    }

    pub fn generation_params(&self) -> GenerationParams {
        GenerationParams::default()
            .with_temperature(self.temperature)
            .with_max_tokens(self.max_tokens)
    }

    /// Check that a backend is usable and the generation parameters are sane.
    pub fn validate(&self) -> Result<()> {
        if !self.use_ollama
            && non_empty(&self.openai_api_key).is_none()
            && non_empty(&self.anthropic_api_key).is_none()
        {
            return Err(PipelineError::Configuration(
                "set OPENAI_API_KEY, ANTHROPIC_API_KEY, or USE_OLLAMA=true".to_string(),
            ));
        }

        let backend = self.backend();
        match backend {
            Backend::Local => {}
            Backend::CloudChat => {
                self.anthropic_key()?;
            }
            Backend::CloudCompletion => {
                self.openai_key()?;
            }
        }

        let params = self.generation_params();
        params.validate()?;
        if backend == Backend::CloudChat && params.temperature > 1.0 {
            return Err(PipelineError::Configuration(format!(
                "temperature {} is outside anthropic's range 0.0..=1.0",
                params.temperature
            )));
        }

        Ok(())
    }

    pub(crate) fn openai_key(&self) -> Result<&str> {
        non_empty(&self.openai_api_key).ok_or_else(|| {
            PipelineError::Configuration("OPENAI_API_KEY is required for the openai backend".into())
        })
    }

    pub(crate) fn anthropic_key(&self) -> Result<&str> {
        non_empty(&self.anthropic_api_key).ok_or_else(|| {
            PipelineError::Configuration(
                "ANTHROPIC_API_KEY is required for the anthropic backend".into(),
            )
        })
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Builder for [`Settings`].
#[derive(Default)]
pub struct SettingsBuilder {
    settings: Settings,
}

impl SettingsBuilder {
    pub fn use_ollama(mut self, enabled: bool) -> Self {
        self.settings.use_ollama = enabled;
        self
    }

    pub fn use_anthropic(mut self, enabled: bool) -> Self {
        self.settings.use_anthropic = enabled;
        self
    }

    pub fn openai_api_key(mut self, key: impl Into<String>) -> Self {
        self.settings.openai_api_key = Some(key.into());
        self
    }

    pub fn anthropic_api_key(mut self, key: impl Into<String>) -> Self {
        self.settings.anthropic_api_key = Some(key.into());
        self
    }

    pub fn ollama_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.settings.ollama_endpoint = endpoint.into();
        self
    }

    pub fn ollama_model(mut self, model: impl Into<String>) -> Self {
        self.settings.ollama_model = model.into();
        self
    }

    pub fn anthropic_base_url(mut self, url: impl Into<String>) -> Self {
        self.settings.anthropic_base_url = url.into();
        self
    }

    pub fn anthropic_model(mut self, model: impl Into<String>) -> Self {
        self.settings.anthropic_model = model.into();
        self
    }

    pub fn openai_base_url(mut self, url: impl Into<String>) -> Self {
        self.settings.openai_base_url = url.into();
        self
    }

    pub fn openai_model(mut self, model: impl Into<String>) -> Self {
        self.settings.openai_model = model.into();
        self
    }

    pub fn temperature(mut self, temperature: f64) -> Self {
        self.settings.temperature = temperature;
        self
    }

    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.settings.max_tokens = max_tokens;
        self
    }

    pub fn output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.settings.output_dir = dir.into();
        self
    }

    pub fn save_to_file(mut self, enabled: bool) -> Self {
        self.settings.save_to_file = enabled;
        self
    }

    /// Build and validate the final [`Settings`].
    pub fn build(self) -> Result<Settings> {
        self.settings.validate()?;
        Ok(self.settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_style_parse_case_insensitive() {
        assert_eq!("Humorous".parse::<Style>().unwrap(), Style::Humorous);
        assert_eq!(" formal ".parse::<Style>().unwrap(), Style::Formal);
    }

    #[test]
    fn test_style_parse_unknown() {
        match "sarcastic".parse::<Style>() {
            Err(PipelineError::UnknownStyle(s)) => assert_eq!(s, "sarcastic"),
            other => panic!("Expected UnknownStyle, got {:?}", other),
        }
    }

    #[test]
    fn test_style_from_choice() {
        assert_eq!(Style::from_choice(1), Some(Style::Formal));
        assert_eq!(Style::from_choice(2), Some(Style::Informal));
        assert_eq!(Style::from_choice(4), Some(Style::Professional));
        assert_eq!(Style::from_choice(0), None);
        assert_eq!(Style::from_choice(5), None);
    }

    #[test]
    fn test_default_style_is_informal() {
        assert_eq!(Style::default(), Style::Informal);
    }

    #[test]
    fn test_backend_precedence() {
        let s = Settings {
            use_ollama: true,
            use_anthropic: true,
            ..Settings::default()
        };
        assert_eq!(s.backend(), Backend::Local);

        let s = Settings {
            use_anthropic: true,
            ..Settings::default()
        };
        assert_eq!(s.backend(), Backend::CloudChat);

        assert_eq!(Settings::default().backend(), Backend::CloudCompletion);
    }

    #[test]
    fn test_no_backend_is_configuration_error() {
        let result = Settings::default().validate();
        assert!(matches!(result, Err(PipelineError::Configuration(_))));
    }

    #[test]
    fn test_blank_key_counts_as_missing() {
        let result = Settings::builder().openai_api_key("   ").build();
        assert!(matches!(result, Err(PipelineError::Configuration(_))));
    }

    #[test]
    fn test_anthropic_selected_without_key() {
        let result = Settings::builder()
            .use_anthropic(true)
            .openai_api_key("sk-test")
            .build();
        match result {
            Err(PipelineError::Configuration(msg)) => assert!(msg.contains("ANTHROPIC_API_KEY")),
            other => panic!("Expected Configuration error, got {:?}", other),
        }
    }

    #[test]
    fn test_ollama_needs_no_key() {
        let settings = Settings::builder().use_ollama(true).build().unwrap();
        assert_eq!(settings.backend(), Backend::Local);
        assert_eq!(settings.ollama_model, "llama2");
    }

    #[test]
    fn test_anthropic_temperature_range() {
        let result = Settings::builder()
            .use_anthropic(true)
            .anthropic_api_key("key")
            .temperature(1.5)
            .build();
        assert!(matches!(result, Err(PipelineError::Configuration(_))));
    }

    #[test]
    fn test_defaults() {
        let s = Settings::default();
        assert_eq!(s.temperature, 0.7);
        assert_eq!(s.max_tokens, 1000);
        assert_eq!(s.output_dir, PathBuf::from("output"));
        assert!(s.save_to_file);
    }
}
