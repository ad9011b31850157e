use crate::config::Style;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// Named values threaded through a pipeline run and substituted into
/// `{key}` placeholders.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variables {
    pub data: HashMap<String, String>,
}

impl Variables {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.data.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.data.get(key).map(|s| s.as_str())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.data.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Lifecycle of a single pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PipelineState {
    Idle,
    Running,
    Completed,
    Failed,
}

/// Progress update emitted during pipeline execution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineProgress {
    /// State of the run at the time of the update.
    pub state: PipelineState,

    /// Index of the stage about to run or that just failed (0-based).
    /// `None` for run-level transitions.
    pub stage_index: Option<usize>,

    /// Total number of stages in the pipeline.
    pub total_stages: usize,

    /// Name of the stage, when `stage_index` is set.
    pub stage_name: Option<String>,
}

/// The three pieces of content produced for one topic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedContent {
    pub topic: String,
    pub style: Style,
    pub blog_idea: String,
    pub blog_post: String,
    pub social_post: String,

    /// Where the report was written, if saving was enabled and succeeded.
    pub saved_to: Option<PathBuf>,
}
