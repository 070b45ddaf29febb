//! Two-stage brief pipeline: refine, then create the task.
//!
//! ## Flow
//! 1. Send the raw brief to the [`Refiner`]
//! 2. Stop if the model produced nothing usable
//! 3. Hand the refined text to the [`TaskCreator`]
//!
//! Nothing is deduplicated: running the same brief twice creates two tasks.

use std::sync::Arc;

use thiserror::Error;

use crate::asana::AsanaClient;
use crate::config::Config;
use crate::llm::{LlmError, OllamaClient};
use crate::refiner::Refiner;
use crate::task::{CreatedTask, TaskCreationError, TaskCreator, TaskTarget};

/// Why the pipeline did not produce a task.
#[derive(Debug, Clone, Error)]
pub enum PipelineError {
    /// The language model call failed.
    #[error("brief refinement failed: {0}")]
    Generation(#[from] LlmError),

    /// The model answered with empty text.
    #[error("refined brief missing")]
    RefinedBriefMissing,

    #[error(transparent)]
    Task(#[from] TaskCreationError),
}

/// Everything a caller may report about one pipeline run.
#[derive(Debug, Clone)]
pub struct PipelineOutcome {
    /// Refined text, when refinement returned any.
    pub refined_brief: Option<String>,
    pub result: Result<CreatedTask, PipelineError>,
}

impl PipelineOutcome {
    fn failed(refined_brief: Option<String>, error: PipelineError) -> Self {
        Self {
            refined_brief,
            result: Err(error),
        }
    }
}

/// Refiner followed by task creator.
#[derive(Clone)]
pub struct BriefPipeline {
    refiner: Refiner,
    creator: TaskCreator,
}

impl BriefPipeline {
    pub fn new(refiner: Refiner, creator: TaskCreator) -> Self {
        Self { refiner, creator }
    }

    /// Wire the pipeline to the Ollama and Asana endpoints named in `config`.
    pub fn from_config(config: &Config) -> Self {
        let llm = Arc::new(OllamaClient::new(config.refiner.ollama_base_url.clone()));
        let refiner = Refiner::new(
            llm,
            config.refiner.model.clone(),
            config.refiner.template.clone(),
        )
        .with_options(config.refiner.options.clone());

        let asana = Arc::new(AsanaClient::new(
            config.asana.api_url.clone(),
            config.asana.access_token.clone(),
        ));
        let creator = TaskCreator::new(asana, TaskTarget::from(&config.asana));

        Self::new(refiner, creator)
    }

    /// Run both stages for one brief.
    ///
    /// `assignees` overrides the configured default assignees when non-empty.
    pub async fn run(&self, raw_brief: &str, assignees: &[String]) -> PipelineOutcome {
        let refined = match self.refiner.refine(raw_brief).await {
            Ok(text) => text,
            Err(e) => {
                tracing::error!(
                    transient = e.is_transient(),
                    "Refinement failed with model {}: {}",
                    self.refiner.model(),
                    e
                );
                return PipelineOutcome::failed(None, e.into());
            }
        };

        if refined.trim().is_empty() {
            tracing::warn!("Model returned an empty refinement, skipping task creation");
            return PipelineOutcome::failed(Some(refined), PipelineError::RefinedBriefMissing);
        }

        let result = self
            .creator
            .create(&refined, assignees)
            .await
            .map_err(PipelineError::from);

        PipelineOutcome {
            refined_brief: Some(refined),
            result,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asana::{AsanaError, TaskService};
    use crate::llm::LlmClient;
    use crate::refiner::PromptLanguage;
    use crate::test_support::{RecordingTaskService, StubLlm};

    const REFINED: &str = "Resolve login authentication defect.\nPriority: high.";

    fn pipeline(
        llm: Arc<dyn LlmClient>,
        service: Arc<dyn TaskService>,
        defaults: &[&str],
    ) -> BriefPipeline {
        let refiner = Refiner::new(llm, "llama3.2", PromptLanguage::English.template());
        let creator = TaskCreator::new(
            service,
            TaskTarget {
                workspace_gid: "ws-1".to_string(),
                project_gid: "proj-1".to_string(),
                default_assignee_gids: defaults.iter().map(|s| s.to_string()).collect(),
            },
        );
        BriefPipeline::new(refiner, creator)
    }

    #[tokio::test]
    async fn refined_text_flows_into_task_creation() {
        let service = Arc::new(RecordingTaskService::new());
        let pipeline = pipeline(
            Arc::new(StubLlm::replying(REFINED)),
            service.clone(),
            &["user-1"],
        );

        let outcome = pipeline.run("fix login bug asap", &[]).await;

        assert_eq!(outcome.refined_brief.as_deref(), Some(REFINED));
        let created = outcome.result.expect("task created");
        assert_eq!(created.name, "Resolve login authentication defect.");
        assert_eq!(service.requests()[0].notes, REFINED);
    }

    #[tokio::test]
    async fn empty_refinement_skips_task_creation() {
        let service = Arc::new(RecordingTaskService::new());
        let pipeline = pipeline(Arc::new(StubLlm::replying("  \n")), service.clone(), &["user-1"]);

        let outcome = pipeline.run("fix login bug asap", &[]).await;

        let error = outcome.result.expect_err("should fail");
        assert!(matches!(error, PipelineError::RefinedBriefMissing));
        assert_eq!(error.to_string(), "refined brief missing");
        assert_eq!(service.call_count(), 0);
    }

    #[tokio::test]
    async fn generation_failure_is_typed_and_skips_task_creation() {
        let service = Arc::new(RecordingTaskService::new());
        let pipeline = pipeline(
            Arc::new(StubLlm::failing(LlmError::network_error(
                "Connection failed: refused".to_string(),
            ))),
            service.clone(),
            &["user-1"],
        );

        let outcome = pipeline.run("fix login bug asap", &[]).await;

        assert!(outcome.refined_brief.is_none());
        assert!(matches!(outcome.result, Err(PipelineError::Generation(_))));
        assert_eq!(service.call_count(), 0);
    }

    #[tokio::test]
    async fn missing_assignees_surface_after_refinement() {
        let service = Arc::new(RecordingTaskService::new());
        let pipeline = pipeline(Arc::new(StubLlm::replying(REFINED)), service.clone(), &[]);

        let outcome = pipeline.run("fix login bug asap", &[]).await;

        assert_eq!(outcome.refined_brief.as_deref(), Some(REFINED));
        let error = outcome.result.expect_err("should fail");
        assert!(error.to_string().contains("assignee"));
        assert_eq!(service.call_count(), 0);
    }

    #[tokio::test]
    async fn remote_error_message_reaches_the_caller() {
        let service = Arc::new(RecordingTaskService::failing(AsanaError::Api {
            status: 429,
            message: "Rate limit exceeded".to_string(),
        }));
        let pipeline = pipeline(Arc::new(StubLlm::replying(REFINED)), service, &["user-1"]);

        let outcome = pipeline.run("fix login bug asap", &[]).await;

        let error = outcome.result.expect_err("should fail");
        assert!(error.to_string().contains("Rate limit exceeded"));
    }

    #[tokio::test]
    async fn identical_runs_create_distinct_tasks() {
        let service = Arc::new(RecordingTaskService::new());
        let pipeline = pipeline(
            Arc::new(StubLlm::replying(REFINED)),
            service.clone(),
            &["user-1"],
        );

        let first = pipeline.run("fix login bug asap", &[]).await.result.expect("first");
        let second = pipeline.run("fix login bug asap", &[]).await.result.expect("second");

        assert_ne!(first.gid, second.gid);
        assert_eq!(service.call_count(), 2);
    }
}
