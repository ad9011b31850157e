use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    #[error("Unknown style '{0}'. Available styles: formal, informal, humorous, professional")]
    UnknownStyle(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Template references undefined variable '{variable}'")]
    MissingVariable { variable: String },

    #[error("Backend '{backend}' unavailable: {message}")]
    BackendUnavailable { backend: String, message: String },

    #[error("Stage '{stage}' failed: {source}")]
    StageFailed {
        stage: String,
        #[source]
        source: Box<PipelineError>,
    },

    #[error("Failed to save results to {}: {source}", path.display())]
    Persistence {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl PipelineError {
    pub(crate) fn backend(backend: impl Into<String>, message: impl Into<String>) -> Self {
        PipelineError::BackendUnavailable {
            backend: backend.into(),
            message: message.into(),
        }
    }

    /// The error underneath any `StageFailed` wrappers.
    pub fn root_cause(&self) -> &PipelineError {
        match self {
            PipelineError::StageFailed { source, .. } => source.root_cause(),
            other => other,
        }
    }

    /// Name of the stage that failed, if the error came out of a pipeline run.
    pub fn stage(&self) -> Option<&str> {
        match self {
            PipelineError::StageFailed { stage, .. } => Some(stage.as_str()),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, PipelineError>;
