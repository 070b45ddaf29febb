//! API request and response types.

use serde::{Deserialize, Serialize};

/// Request to turn a brief into an Asana task.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateFromBriefRequest {
    /// The raw, informal brief
    pub brief_content: Option<String>,

    /// Optional assignee override (uses `DEFAULT_ASSIGNEE_GIDS` if absent, null or empty)
    #[serde(default)]
    pub assignee_gids: Option<Vec<String>>,
}

/// Response after the task was created.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateFromBriefResponse {
    /// Always `"success"`
    pub status: String,

    pub refined_brief: String,

    pub asana_task_id: String,

    pub asana_task_name: String,

    /// Link to the task in Asana, when Asana returned one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub asana_task_url: Option<String>,

    pub message: String,
}

/// Pipeline failure after the brief was accepted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineFailureResponse {
    /// Always `"error"`
    pub status: String,

    pub message: String,

    /// Refined text for diagnostics, when refinement got that far
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refined_brief: Option<String>,
}

/// Request rejected or processing aborted before the task stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}
