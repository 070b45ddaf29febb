//! Asana task service.
//!
//! [`TaskService`] is the seam between task creation and the remote API.
//! [`AsanaClient`] implements it over Asana's REST interface; tests swap in
//! recording stubs.

mod client;

pub use client::AsanaClient;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Fields sent to Asana when creating a task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewTask {
    pub name: String,
    pub notes: String,
    /// Project GIDs the task is added to.
    pub projects: Vec<String>,
    pub workspace: String,
    /// GID of the single assignee.
    pub assignee: String,
}

/// Task record returned by Asana.
///
/// Every field is optional on the wire; callers decide which ones they need.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct TaskRecord {
    #[serde(default)]
    pub gid: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub permalink_url: Option<String>,
}

/// Errors returned by task service implementations.
#[derive(Debug, Clone, Error)]
pub enum AsanaError {
    /// Asana rejected the request (auth, validation, rate limit, ...).
    #[error("Asana API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    /// The request never produced a response.
    #[error("Asana request failed: {0}")]
    Network(String),

    /// The response could not be decoded.
    #[error("Failed to decode Asana response: {0}")]
    Decode(String),
}

/// Remote task creation contract.
#[async_trait]
pub trait TaskService: Send + Sync {
    /// Create exactly one task.
    async fn create_task(&self, task: &NewTask) -> Result<TaskRecord, AsanaError>;
}
