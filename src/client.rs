use crate::config::Backend;
use crate::error::{PipelineError, Result};
use async_trait::async_trait;

/// Sampling parameters shared by every stage of a pipeline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationParams {
    /// Temperature (0.0 = deterministic, higher = more creative).
    pub temperature: f64,

    /// Maximum tokens to generate.
    pub max_tokens: u32,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            max_tokens: 1000,
        }
    }
}

impl GenerationParams {
    pub fn with_temperature(mut self, temp: f64) -> Self {
        self.temperature = temp;
        self
    }

    pub fn with_max_tokens(mut self, tokens: u32) -> Self {
        self.max_tokens = tokens;
        self
    }

    /// Reject values no supported backend accepts.
    pub fn validate(&self) -> Result<()> {
        if !self.temperature.is_finite() || !(0.0..=2.0).contains(&self.temperature) {
            return Err(PipelineError::Configuration(format!(
                "temperature must be within 0.0..=2.0, got {}",
                self.temperature
            )));
        }
        if self.max_tokens == 0 {
            return Err(PipelineError::Configuration(
                "max_tokens must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// A text-completion backend.
///
/// Each call is independent: implementations keep no conversation state and
/// never retry. Any transport, auth, or quota failure is reported as
/// [`PipelineError::BackendUnavailable`].
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Generate text for `prompt`.
    async fn complete(&self, prompt: &str, params: &GenerationParams) -> Result<String>;

    /// Which provider this client talks to.
    fn backend(&self) -> Backend;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generation_params_defaults() {
        let params = GenerationParams::default();
        assert_eq!(params.temperature, 0.7);
        assert_eq!(params.max_tokens, 1000);
        assert!(params.validate().is_ok());
    }

    #[test]
    fn test_generation_params_builder() {
        let params = GenerationParams::default()
            .with_temperature(0.3)
            .with_max_tokens(4096);
        assert_eq!(params.temperature, 0.3);
        assert_eq!(params.max_tokens, 4096);
    }

    #[test]
    fn test_zero_max_tokens_rejected() {
        let params = GenerationParams::default().with_max_tokens(0);
        assert!(matches!(
            params.validate(),
            Err(PipelineError::Configuration(_))
        ));
    }

    #[test]
    fn test_temperature_out_of_range_rejected() {
        for temp in [-0.1, 2.5, f64::NAN] {
            let params = GenerationParams::default().with_temperature(temp);
            assert!(params.validate().is_err(), "accepted {}", temp);
        }
    }
}
