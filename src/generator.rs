//! The three-stage content chain: topic → blog idea → blog post → social post.

use crate::backends::create_client;
use crate::client::{GenerationParams, LlmClient};
use crate::config::{Settings, Style};
use crate::error::{PipelineError, Result};
use crate::pipeline::Pipeline;
use crate::report;
use crate::stage::Stage;
use crate::types::{GeneratedContent, Variables};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info, warn};

pub const TOPIC: &str = "topic";
pub const STYLE: &str = "style";
pub const BLOG_IDEA: &str = "blog_idea";
pub const BLOG_POST: &str = "blog_post";
pub const SOCIAL_POST: &str = "social_post";

pub const IDEA_TEMPLATE: &str = "You are a creative content manager.

Task: Come up with an interesting, timely blog post topic in the area of: {topic}

Requirements:
- The topic must be specific and appealing
- It should spark interest in the target audience
- It should be relevant to current trends

Reply with the topic title only, without any extra explanation.

Blog post topic:";

pub const POST_TEMPLATE: &str = "You are an experienced blogger and copywriter.

Task: Write a short blog post on the topic: {blog_idea}

Requirements:
- Length: 200-300 words
- Style: {style}
- Structure: introduction, main body, conclusion
- Use clear, accessible language
- Give the reader practical value

Blog post:";

pub const SOCIAL_TEMPLATE: &str = "You are an SMM specialist and an expert in viral content.

Task: Write a short social media post based on this blog post:

{blog_post}

Requirements:
- At most 280 characters (hashtags included)
- Catchy, engaging wording
- 2-3 relevant hashtags
- A call to action or an intriguing question

Social media post:";

/// Where finished runs are written, if anywhere.
#[derive(Debug, Clone, Default)]
pub struct OutputOptions {
    pub save_to_file: bool,
    pub output_dir: PathBuf,
}

/// Generates a blog idea, blog post, and social post for a topic in a fixed
/// style.
///
/// Built once per style and reusable across topics.
#[derive(Debug)]
pub struct ContentGenerator {
    pipeline: Pipeline,
    style: Style,
    output: OutputOptions,
}

impl ContentGenerator {
    pub fn new(client: Arc<dyn LlmClient>, params: GenerationParams, style: Style) -> Result<Self> {
        let pipeline = build_pipeline(client, params)?;
        info!(style = %style, "Content chain created");
        Ok(Self {
            pipeline,
            style,
            output: OutputOptions::default(),
        })
    }

    /// Like [`ContentGenerator::new`], parsing `style` first so an unknown
    /// name fails before any backend is touched.
    pub fn from_style_name(
        client: Arc<dyn LlmClient>,
        params: GenerationParams,
        style: &str,
    ) -> Result<Self> {
        let style: Style = style.parse()?;
        Self::new(client, params, style)
    }

    /// Build the backend and chain described by `settings`.
    pub fn from_settings(settings: &Settings, style: Style) -> Result<Self> {
        let client = create_client(settings)?;
        let generator = Self::new(client, settings.generation_params(), style)?;
        Ok(generator.with_output(OutputOptions {
            save_to_file: settings.save_to_file,
            output_dir: settings.output_dir.clone(),
        }))
    }

    pub fn with_output(mut self, output: OutputOptions) -> Self {
        self.output = output;
        self
    }

    pub fn style(&self) -> Style {
        self.style
    }

    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    /// Run the chain for `topic`.
    ///
    /// Any stage failure aborts the run. A failure to save the report is
    /// logged and leaves `saved_to` empty; the content is still returned.
    pub async fn generate(&self, topic: &str) -> Result<GeneratedContent> {
        if topic.trim().is_empty() {
            return Err(PipelineError::InvalidInput(
                "topic must not be empty".to_string(),
            ));
        }

        info!(topic = %topic, style = %self.style, "Starting content generation");

        let inputs = Variables::new()
            .insert(TOPIC, topic)
            .insert(STYLE, self.style.as_str());

        let mut result = match self.pipeline.execute(inputs).await {
            Ok(vars) => vars,
            Err(e) => {
                error!(error = %e, "Content generation failed");
                return Err(e);
            }
        };

        let mut take = |key: &str| {
            result
                .data
                .remove(key)
                .ok_or_else(|| PipelineError::MissingVariable {
                    variable: key.to_string(),
                })
        };

        let mut content = GeneratedContent {
            topic: topic.to_string(),
            style: self.style,
            blog_idea: take(BLOG_IDEA)?,
            blog_post: take(BLOG_POST)?,
            social_post: take(SOCIAL_POST)?,
            saved_to: None,
        };

        info!("Content generated");
        report::log_results(&content);

        if self.output.save_to_file {
            match report::save(&self.output.output_dir, &content) {
                Ok(path) => {
                    info!(path = %path.display(), "Results saved");
                    content.saved_to = Some(path);
                }
                Err(e) => warn!(error = %e, "Could not save results"),
            }
        }

        Ok(content)
    }
}

/// The idea → post → social pipeline.
pub fn build_pipeline(client: Arc<dyn LlmClient>, params: GenerationParams) -> Result<Pipeline> {
    Pipeline::builder(client)
        .with_params(params)
        .input_variables([TOPIC, STYLE])
        .add_stage(Stage::new("idea", IDEA_TEMPLATE, BLOG_IDEA))
        .add_stage(Stage::new("post", POST_TEMPLATE, BLOG_POST))
        .add_stage(Stage::new("social", SOCIAL_TEMPLATE, SOCIAL_POST))
        .output_variables([BLOG_IDEA, BLOG_POST, SOCIAL_POST])
        .build()
}
