use crate::client::{GenerationParams, LlmClient};
use crate::error::Result;
use crate::prompt;
use crate::types::Variables;
use tracing::debug;

/// One render-then-generate step of a pipeline.
///
/// The variables a stage needs are read off its template once, at
/// construction, so the pipeline builder can check them before anything runs.
#[derive(Debug, Clone)]
pub struct Stage {
    /// Stage name (for logging and error reporting).
    pub name: String,

    /// Prompt template with `{variable}` placeholders.
    pub template: String,

    /// Key the generated text is stored under.
    pub output_key: String,

    required: Vec<String>,
}

impl Stage {
    pub fn new(
        name: impl Into<String>,
        template: impl Into<String>,
        output_key: impl Into<String>,
    ) -> Self {
        let template = template.into();
        let required = prompt::placeholders(&template);
        Self {
            name: name.into(),
            template,
            output_key: output_key.into(),
            required,
        }
    }

    /// Variable names referenced by the template, in order of appearance.
    pub fn required_variables(&self) -> &[String] {
        &self.required
    }

    /// Render the template against `variables`.
    pub fn render_prompt(&self, variables: &Variables) -> Result<String> {
        prompt::render(&self.template, variables)
    }

    /// Render the prompt, call the backend, and return `(output_key, text)`.
    ///
    /// The generated text is returned exactly as the backend produced it.
    pub async fn execute(
        &self,
        client: &dyn LlmClient,
        params: &GenerationParams,
        variables: &Variables,
    ) -> Result<(String, String)> {
        let prompt = self.render_prompt(variables)?;
        debug!(stage = %self.name, prompt_len = prompt.len(), "Rendered prompt");

        let text = client.complete(&prompt, params).await?;
        Ok((self.output_key.clone(), text))
    }
}
