//! Asana REST client.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use url::Url;

use super::{AsanaError, NewTask, TaskRecord, TaskService};

/// Fields requested back from Asana on task creation.
const TASK_OPT_FIELDS: &str = "gid,name,notes,projects,assignee,permalink_url";

/// Asana API client authenticated with a personal access token.
pub struct AsanaClient {
    client: Client,
    base_url: Url,
    access_token: String,
}

impl AsanaClient {
    pub fn new(base_url: Url, access_token: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url,
            access_token: access_token.into(),
        }
    }

    fn tasks_url(&self) -> String {
        format!("{}/tasks", self.base_url.as_str().trim_end_matches('/'))
    }

    /// Build an API error from a non-success response.
    ///
    /// Asana wraps failures as `{"errors": [{"message": "..."}]}`. All
    /// messages are kept, joined with `; `. Anything else is passed through.
    fn create_error(status: reqwest::StatusCode, body: &str) -> AsanaError {
        let message = serde_json::from_str::<AsanaErrorBody>(body)
            .ok()
            .map(|b| {
                b.errors
                    .into_iter()
                    .map(|e| e.message)
                    .collect::<Vec<_>>()
                    .join("; ")
            })
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| body.to_string());

        AsanaError::Api {
            status: status.as_u16(),
            message,
        }
    }
}

#[async_trait]
impl TaskService for AsanaClient {
    async fn create_task(&self, task: &NewTask) -> Result<TaskRecord, AsanaError> {
        tracing::debug!(
            "Creating Asana task: name={:?}, assignee={}, projects={:?}",
            task.name,
            task.assignee,
            task.projects
        );

        let response = self
            .client
            .post(self.tasks_url())
            .query(&[("opt_fields", TASK_OPT_FIELDS)])
            .bearer_auth(&self.access_token)
            .json(&AsanaEnvelope { data: task })
            .send()
            .await
            .map_err(|e| AsanaError::Network(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| AsanaError::Network(format!("failed to read response: {}", e)))?;

        if !status.is_success() {
            let error = Self::create_error(status, &body);
            tracing::warn!("{}", error);
            return Err(error);
        }

        let parsed: AsanaEnvelope<TaskRecord> = serde_json::from_str(&body)
            .map_err(|e| AsanaError::Decode(format!("{}, body: {}", e, body)))?;

        tracing::debug!("Asana response: {:?}", parsed.data);
        Ok(parsed.data)
    }
}

/// Asana wraps request and response payloads in a `data` object.
#[derive(Debug, Serialize, Deserialize)]
struct AsanaEnvelope<T> {
    data: T,
}

#[derive(Debug, Deserialize)]
struct AsanaErrorBody {
    #[serde(default)]
    errors: Vec<AsanaErrorEntry>,
}

#[derive(Debug, Deserialize)]
struct AsanaErrorEntry {
    message: String,
}
