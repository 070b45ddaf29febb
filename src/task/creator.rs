//! Task creation against the remote task service.

use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;

use super::draft::TaskDraft;
use crate::asana::{AsanaError, NewTask, TaskRecord, TaskService};
use crate::config::AsanaConfig;

/// Where new tasks land and who gets them by default.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskTarget {
    pub workspace_gid: String,
    pub project_gid: String,
    pub default_assignee_gids: Vec<String>,
}

impl From<&AsanaConfig> for TaskTarget {
    fn from(config: &AsanaConfig) -> Self {
        Self {
            workspace_gid: config.workspace_gid.clone(),
            project_gid: config.project_gid.clone(),
            default_assignee_gids: config.default_assignee_gids.clone(),
        }
    }
}

/// A task that exists in Asana.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreatedTask {
    pub gid: String,
    pub name: String,
    pub notes: Option<String>,
    pub permalink_url: Option<String>,
}

/// Why a task was not created.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TaskCreationError {
    /// Neither the caller nor the configuration supplied an assignee.
    #[error("no assignees available")]
    NoAssignees,

    /// Asana rejected the request.
    #[error("Asana API error: {message}")]
    Remote { status: u16, message: String },

    /// Asana answered, but without the task's gid or name.
    #[error("task created, but gid/name not found in response: {0}")]
    IncompleteResponse(String),

    /// Transport or decoding failure.
    #[error("unexpected error during Asana task creation: {0}")]
    Unexpected(String),
}

impl From<AsanaError> for TaskCreationError {
    fn from(err: AsanaError) -> Self {
        match err {
            AsanaError::Api { status, message } => TaskCreationError::Remote { status, message },
            other @ (AsanaError::Network(_) | AsanaError::Decode(_)) => {
                TaskCreationError::Unexpected(other.to_string())
            }
        }
    }
}

/// Turns refined text into exactly one Asana task.
#[derive(Clone)]
pub struct TaskCreator {
    service: Arc<dyn TaskService>,
    target: TaskTarget,
}

impl TaskCreator {
    pub fn new(service: Arc<dyn TaskService>, target: TaskTarget) -> Self {
        Self { service, target }
    }

    /// Pick the assignee list: explicit GIDs when given, configured defaults otherwise.
    fn resolve_assignees<'a>(&'a self, assignees: &'a [String]) -> &'a [String] {
        if assignees.is_empty() {
            &self.target.default_assignee_gids
        } else {
            assignees
        }
    }

    /// Create a task from refined text.
    ///
    /// Only the first resolved assignee is sent; Asana tasks carry a single
    /// assignee. When no assignee is available the remote service is not
    /// contacted.
    pub async fn create(
        &self,
        refined: &str,
        assignees: &[String],
    ) -> Result<CreatedTask, TaskCreationError> {
        let resolved = self.resolve_assignees(assignees);
        let Some((assignee, ignored)) = resolved.split_first() else {
            tracing::warn!("No assignee GIDs supplied or configured, skipping task creation");
            return Err(TaskCreationError::NoAssignees);
        };
        if !ignored.is_empty() {
            tracing::debug!("Only the first assignee is used, ignoring {:?}", ignored);
        }

        let draft = TaskDraft::from_refined(refined);
        let request = NewTask {
            name: draft.title,
            notes: draft.notes,
            projects: vec![self.target.project_gid.clone()],
            workspace: self.target.workspace_gid.clone(),
            assignee: assignee.clone(),
        };

        let record = self.service.create_task(&request).await?;
        let created = into_created_task(record)?;
        tracing::info!(
            "Created Asana task {} ({})",
            created.gid,
            created.permalink_url.as_deref().unwrap_or("no permalink")
        );
        Ok(created)
    }
}

fn into_created_task(record: TaskRecord) -> Result<CreatedTask, TaskCreationError> {
    match record {
        TaskRecord {
            gid: Some(gid),
            name: Some(name),
            notes,
            permalink_url,
        } if !gid.is_empty() => Ok(CreatedTask {
            gid,
            name,
            notes,
            permalink_url,
        }),
        other => Err(TaskCreationError::IncompleteResponse(format!("{:?}", other))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::RecordingTaskService;

    fn target(defaults: &[&str]) -> TaskTarget {
        TaskTarget {
            workspace_gid: "ws-1".to_string(),
            project_gid: "proj-1".to_string(),
            default_assignee_gids: defaults.iter().map(|s| s.to_string()).collect(),
        }
    }

    const REFINED: &str = "Resolve login authentication defect.\nPriority: high.";

    #[tokio::test]
    async fn creates_task_with_first_default_assignee() {
        let service = Arc::new(RecordingTaskService::new());
        let creator = TaskCreator::new(service.clone(), target(&["user-1", "user-2"]));

        let created = creator.create(REFINED, &[]).await.expect("task created");

        assert_eq!(created.gid, "task-1");
        assert_eq!(created.name, "Resolve login authentication defect.");
        assert_eq!(created.notes.as_deref(), Some(REFINED));
        let sent = service.requests();
        assert_eq!(
            sent,
            vec![NewTask {
                name: "Resolve login authentication defect.".to_string(),
                notes: REFINED.to_string(),
                projects: vec!["proj-1".to_string()],
                workspace: "ws-1".to_string(),
                assignee: "user-1".to_string(),
            }]
        );
    }

    #[tokio::test]
    async fn explicit_assignees_override_defaults() {
        let service = Arc::new(RecordingTaskService::new());
        let creator = TaskCreator::new(service.clone(), target(&["user-1"]));

        creator
            .create(REFINED, &["user-9".to_string(), "user-8".to_string()])
            .await
            .expect("task created");

        assert_eq!(service.requests()[0].assignee, "user-9");
    }

    #[tokio::test]
    async fn no_assignees_never_calls_the_service() {
        let service = Arc::new(RecordingTaskService::new());
        let creator = TaskCreator::new(service.clone(), target(&[]));

        let error = creator.create(REFINED, &[]).await.expect_err("should fail");

        assert_eq!(error, TaskCreationError::NoAssignees);
        assert!(error.to_string().contains("assignee"));
        assert_eq!(service.call_count(), 0);
    }

    #[tokio::test]
    async fn remote_rejection_carries_service_message() {
        let service = Arc::new(RecordingTaskService::failing(AsanaError::Api {
            status: 403,
            message: "Forbidden".to_string(),
        }));
        let creator = TaskCreator::new(service.clone(), target(&["user-1"]));

        let error = creator.create(REFINED, &[]).await.expect_err("should fail");

        assert_eq!(
            error,
            TaskCreationError::Remote {
                status: 403,
                message: "Forbidden".to_string()
            }
        );
        assert!(error.to_string().contains("Forbidden"));
        assert_eq!(service.call_count(), 1);
    }

    #[tokio::test]
    async fn transport_failure_is_unexpected_not_a_panic() {
        let service = Arc::new(RecordingTaskService::failing(AsanaError::Network(
            "connection reset".to_string(),
        )));
        let creator = TaskCreator::new(service, target(&["user-1"]));

        let error = creator.create(REFINED, &[]).await.expect_err("should fail");

        assert!(matches!(error, TaskCreationError::Unexpected(ref m) if m.contains("connection reset")));
    }

    #[tokio::test]
    async fn response_without_gid_is_incomplete() {
        let service = Arc::new(RecordingTaskService::returning(TaskRecord {
            gid: None,
            name: Some("Resolve login authentication defect.".to_string()),
            notes: None,
            permalink_url: None,
        }));
        let creator = TaskCreator::new(service, target(&["user-1"]));

        let error = creator.create(REFINED, &[]).await.expect_err("should fail");

        assert!(matches!(error, TaskCreationError::IncompleteResponse(_)));
    }

    #[tokio::test]
    async fn empty_name_in_response_is_still_a_created_task() {
        let service = Arc::new(RecordingTaskService::returning(TaskRecord {
            gid: Some("77".to_string()),
            name: Some(String::new()),
            notes: None,
            permalink_url: None,
        }));
        let creator = TaskCreator::new(service, target(&["user-1"]));

        let created = creator.create("\nbody", &[]).await.expect("task created");

        assert_eq!(created.gid, "77");
        assert_eq!(created.name, "");
        assert!(created.permalink_url.is_none());
    }
}
