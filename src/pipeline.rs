use crate::{
    client::{GenerationParams, LlmClient},
    error::Result,
    stage::Stage,
    types::{PipelineProgress, PipelineState, Variables},
    PipelineError,
};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{error, info};

/// Sequential executor for multi-stage LLM workflows.
///
/// Stages run in declaration order against one accumulating [`Variables`]
/// mapping: each stage's output is stored under its output key and is
/// visible to every later stage's template. The first failure aborts the run
/// and nothing is returned but the error.
///
/// A pipeline is immutable once built and can be executed any number of
/// times, including concurrently; each run owns its own mapping.
pub struct Pipeline {
    stages: Vec<Stage>,
    input_variables: Vec<String>,
    output_variables: Vec<String>,
    client: Arc<dyn LlmClient>,
    params: GenerationParams,
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field(
                "stages",
                &self.stages.iter().map(|s| &s.name).collect::<Vec<_>>(),
            )
            .field("input_variables", &self.input_variables)
            .field("output_variables", &self.output_variables)
            .field("backend", &self.client.backend())
            .field("params", &self.params)
            .finish()
    }
}

impl Pipeline {
    /// Create a new pipeline builder around `client`.
    pub fn builder(client: Arc<dyn LlmClient>) -> PipelineBuilder {
        PipelineBuilder::new(client)
    }

    /// Get a reference to the pipeline's stages.
    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    /// Variables the caller must supply to [`Pipeline::execute`].
    pub fn input_variables(&self) -> &[String] {
        &self.input_variables
    }

    /// Keys the pipeline exposes as its result.
    pub fn output_variables(&self) -> &[String] {
        &self.output_variables
    }

    pub fn params(&self) -> &GenerationParams {
        &self.params
    }

    /// Run every stage and return the full mapping (inputs plus all stage
    /// outputs).
    pub async fn execute(&self, inputs: Variables) -> Result<Variables> {
        self.execute_with_progress(inputs, |_| {}).await
    }

    /// Run the pipeline, reporting state transitions to `on_progress`.
    ///
    /// The callback sees `Running` once for the run and once per stage, then
    /// exactly one of `Completed` or `Failed`.
    pub async fn execute_with_progress<F>(
        &self,
        inputs: Variables,
        mut on_progress: F,
    ) -> Result<Variables>
    where
        F: FnMut(PipelineProgress),
    {
        let total_stages = self.stages.len();
        let mut report = |state, stage: Option<(usize, &Stage)>| {
            on_progress(PipelineProgress {
                state,
                stage_index: stage.map(|(idx, _)| idx),
                total_stages,
                stage_name: stage.map(|(_, s)| s.name.clone()),
            })
        };

        report(PipelineState::Running, None);
        info!(stages = total_stages, "Pipeline started");

        if let Some(missing) = self
            .input_variables
            .iter()
            .find(|name| !inputs.contains(name))
        {
            error!(variable = %missing, "Pipeline input missing");
            report(PipelineState::Failed, None);
            return Err(PipelineError::MissingVariable {
                variable: missing.clone(),
            });
        }

        let mut variables = inputs;

        for (idx, stage) in self.stages.iter().enumerate() {
            report(PipelineState::Running, Some((idx, stage)));
            info!(
                stage = %stage.name,
                step = idx + 1,
                total = total_stages,
                "Running stage"
            );

            match stage
                .execute(self.client.as_ref(), &self.params, &variables)
                .await
            {
                Ok((key, text)) => {
                    info!(stage = %stage.name, output_key = %key, chars = text.chars().count(), "Stage finished");
                    variables.data.insert(key, text);
                }
                Err(e) => {
                    error!(stage = %stage.name, error = %e, "Stage failed");
                    report(PipelineState::Failed, Some((idx, stage)));
                    return Err(PipelineError::StageFailed {
                        stage: stage.name.clone(),
                        source: Box::new(e),
                    });
                }
            }
        }

        report(PipelineState::Completed, None);
        info!("Pipeline completed");
        Ok(variables)
    }
}

/// Builder for creating pipelines.
pub struct PipelineBuilder {
    stages: Vec<Stage>,
    input_variables: Vec<String>,
    output_variables: Option<Vec<String>>,
    client: Arc<dyn LlmClient>,
    params: GenerationParams,
}

impl PipelineBuilder {
    pub fn new(client: Arc<dyn LlmClient>) -> Self {
        Self {
            stages: Vec::new(),
            input_variables: Vec::new(),
            output_variables: None,
            client,
            params: GenerationParams::default(),
        }
    }

    /// Add a stage to the pipeline.
    pub fn add_stage(mut self, stage: Stage) -> Self {
        self.stages.push(stage);
        self
    }

    /// Declare the variables callers must provide.
    pub fn input_variables<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.input_variables = names.into_iter().map(Into::into).collect();
        self
    }

    /// Declare the keys exposed as the pipeline's result. Defaults to every
    /// stage's output key.
    pub fn output_variables<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.output_variables = Some(names.into_iter().map(Into::into).collect());
        self
    }

    /// Set the generation parameters used for every stage.
    pub fn with_params(mut self, params: GenerationParams) -> Self {
        self.params = params;
        self
    }

    /// Build the pipeline, validating configuration.
    ///
    /// Every variable a stage references must be an input or the output of
    /// an earlier stage, and output keys must be unique.
    pub fn build(self) -> Result<Pipeline> {
        if self.stages.is_empty() {
            return Err(PipelineError::Configuration(
                "Pipeline must have at least one stage".to_string(),
            ));
        }

        self.params.validate()?;

        let mut available: HashSet<&str> = HashSet::new();
        for name in &self.input_variables {
            if !available.insert(name.as_str()) {
                return Err(PipelineError::Configuration(format!(
                    "input variable '{}' declared twice",
                    name
                )));
            }
        }

        for stage in &self.stages {
            if let Some(missing) = stage
                .required_variables()
                .iter()
                .find(|name| !available.contains(name.as_str()))
            {
                return Err(PipelineError::StageFailed {
                    stage: stage.name.clone(),
                    source: Box::new(PipelineError::MissingVariable {
                        variable: missing.clone(),
                    }),
                });
            }

            if !available.insert(stage.output_key.as_str()) {
                return Err(PipelineError::Configuration(format!(
                    "stage '{}' output key '{}' is already defined",
                    stage.name, stage.output_key
                )));
            }
        }

        let output_variables = match self.output_variables {
            Some(outputs) => {
                if let Some(unknown) = outputs.iter().find(|k| !available.contains(k.as_str())) {
                    return Err(PipelineError::Configuration(format!(
                        "output variable '{}' is never produced",
                        unknown
                    )));
                }
                outputs
            }
            None => self.stages.iter().map(|s| s.output_key.clone()).collect(),
        };

        Ok(Pipeline {
            stages: self.stages,
            input_variables: self.input_variables,
            output_variables,
            client: self.client,
            params: self.params,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Backend;
    use async_trait::async_trait;

    struct Fixed;

    #[async_trait]
    impl LlmClient for Fixed {
        async fn complete(&self, _prompt: &str, _params: &GenerationParams) -> Result<String> {
            Ok("fixed".to_string())
        }

        fn backend(&self) -> Backend {
            Backend::Local
        }
    }

    fn builder() -> PipelineBuilder {
        Pipeline::builder(Arc::new(Fixed))
    }

    #[test]
    fn test_pipeline_builder_success() {
        let result = builder()
            .input_variables(["topic"])
            .add_stage(Stage::new("stage1", "Test: {topic}", "a"))
            .add_stage(Stage::new("stage2", "Refine: {a}", "b"))
            .build();
        assert!(result.is_ok());
        assert_eq!(result.unwrap().output_variables(), &["a", "b"]);
    }

    #[test]
    fn test_empty_pipeline_fails() {
        let result = builder().build();
        match result.unwrap_err() {
            PipelineError::Configuration(msg) => {
                assert!(msg.contains("at least one stage"));
            }
            other => panic!("Expected Configuration error, got {:?}", other),
        }
    }

    #[test]
    fn test_forward_reference_rejected() {
        let result = builder()
            .input_variables(["topic"])
            .add_stage(Stage::new("first", "{topic} {later}", "early"))
            .add_stage(Stage::new("second", "{early}", "later"))
            .build();
        let err = result.unwrap_err();
        assert_eq!(err.stage(), Some("first"));
        match err.root_cause() {
            PipelineError::MissingVariable { variable } => assert_eq!(variable, "later"),
            other => panic!("Expected MissingVariable, got {:?}", other),
        }
    }

    #[test]
    fn test_duplicate_output_key_rejected() {
        let result = builder()
            .add_stage(Stage::new("a", "one", "out"))
            .add_stage(Stage::new("b", "two", "out"))
            .build();
        assert!(matches!(result, Err(PipelineError::Configuration(_))));
    }

    #[test]
    fn test_output_key_shadowing_input_rejected() {
        let result = builder()
            .input_variables(["topic"])
            .add_stage(Stage::new("a", "{topic}", "topic"))
            .build();
        assert!(matches!(result, Err(PipelineError::Configuration(_))));
    }

    #[test]
    fn test_unknown_output_variable_rejected() {
        let result = builder()
            .add_stage(Stage::new("a", "p", "out"))
            .output_variables(["nope"])
            .build();
        assert!(matches!(result, Err(PipelineError::Configuration(_))));
    }

    #[test]
    fn test_invalid_params_rejected() {
        let result = builder()
            .add_stage(Stage::new("a", "p", "out"))
            .with_params(GenerationParams::default().with_max_tokens(0))
            .build();
        assert!(matches!(result, Err(PipelineError::Configuration(_))));
    }

    #[test]
    fn test_pipeline_stages_accessor() {
        let pipeline = builder()
            .add_stage(Stage::new("a", "p1", "x"))
            .add_stage(Stage::new("b", "p2", "y"))
            .build()
            .unwrap();
        assert_eq!(pipeline.stages().len(), 2);
        assert_eq!(pipeline.stages()[0].name, "a");
        assert_eq!(pipeline.stages()[1].name, "b");
    }

    #[tokio::test]
    async fn test_missing_input_fails_before_stages() {
        let pipeline = builder()
            .input_variables(["topic"])
            .add_stage(Stage::new("a", "{topic}", "x"))
            .build()
            .unwrap();

        let mut states = Vec::new();
        let result = pipeline
            .execute_with_progress(Variables::new(), |p| states.push((p.state, p.stage_index)))
            .await;

        assert!(matches!(result, Err(PipelineError::MissingVariable { .. })));
        assert_eq!(
            states,
            vec![(PipelineState::Running, None), (PipelineState::Failed, None)]
        );
    }

    #[tokio::test]
    async fn test_progress_transitions_on_success() {
        let pipeline = builder()
            .add_stage(Stage::new("a", "p1", "x"))
            .add_stage(Stage::new("b", "{x}", "y"))
            .build()
            .unwrap();

        let mut states = Vec::new();
        let result = pipeline
            .execute_with_progress(Variables::new(), |p| states.push((p.state, p.stage_index)))
            .await
            .unwrap();

        assert_eq!(result.get("y"), Some("fixed"));
        assert_eq!(
            states,
            vec![
                (PipelineState::Running, None),
                (PipelineState::Running, Some(0)),
                (PipelineState::Running, Some(1)),
                (PipelineState::Completed, None),
            ]
        );
    }
}
