//! # Content Chain
//!
//! Three-stage LLM content generation: a blog post idea from a topic, a
//! short blog post from that idea, and a social media post from the blog
//! post.
//!
//! Each stage renders a prompt template against a shared mapping of named
//! variables, calls an LLM backend, and stores the reply under its output
//! key for later stages to use.
//!
//! ## Features
//!
//! - **Sequential pipelines**: stages chained through named variables,
//!   validated when the pipeline is built
//! - **Interchangeable backends**: local Ollama, Anthropic Messages, or
//!   OpenAI completions behind one [`LlmClient`] trait
//! - **All-or-nothing runs**: the first failing stage aborts the run
//! - **Reports**: log previews, length statistics, and a plain-text file per run
//!
//! ## Quick Start
//!
//! ```no_run
//! use content_chain::{ContentGenerator, Settings, Style};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let settings = Settings::builder().use_ollama(true).build()?;
//!     let generator = ContentGenerator::from_settings(&settings, Style::Humorous)?;
//!
//!     let content = generator.generate("space travel").await?;
//!     println!("{}", content.social_post);
//!     Ok(())
//! }
//! ```

pub mod backends;
pub mod client;
pub mod config;
pub mod error;
pub mod generator;
pub mod pipeline;
pub mod prompt;
pub mod report;
pub mod stage;
pub mod types;

pub use backends::create_client;
pub use client::{GenerationParams, LlmClient};
pub use config::{Backend, Settings, SettingsBuilder, Style};
pub use error::{PipelineError, Result};
pub use generator::{ContentGenerator, OutputOptions};
pub use pipeline::{Pipeline, PipelineBuilder};
pub use stage::Stage;
pub use types::{GeneratedContent, PipelineProgress, PipelineState, Variables};
