//! HTTP route handlers.

use std::any::Any;
use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::{Instrument, Level};
use uuid::Uuid;

use crate::config::Config;
use crate::pipeline::{BriefPipeline, PipelineError};

use super::types::*;

/// Shared application state.
pub struct AppState {
    /// Refine-then-create pipeline shared by all requests
    pub pipeline: BriefPipeline,
}

/// Start the HTTP server.
pub async fn serve(config: Config) -> anyhow::Result<()> {
    let state = Arc::new(AppState {
        pipeline: BriefPipeline::from_config(&config),
    });

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Listening on {}", listener.local_addr()?);

    axum::serve(listener, router(state)).await?;

    Ok(())
}

/// Build the application router.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/create_asana_from_brief", post(create_asana_from_brief))
        .layer(CatchPanicLayer::custom(unexpected_fault))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .with_state(state)
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Refine a brief and create the Asana task.
///
/// The body is read raw so that malformed JSON gets the same 400 as a
/// missing `brief_content`.
async fn create_asana_from_brief(State(state): State<Arc<AppState>>, body: Bytes) -> Response {
    let request_id = Uuid::new_v4();
    let span = tracing::info_span!("create_asana_from_brief", %request_id);
    handle_brief(state, body).instrument(span).await
}

async fn handle_brief(state: Arc<AppState>, body: Bytes) -> Response {
    let Some((brief, assignees)) = parse_request(&body) else {
        tracing::error!("Invalid request: Missing 'brief_content'");
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: "Invalid request: Missing brief_content".to_string(),
                details: None,
            }),
        )
            .into_response();
    };

    tracing::info!(
        "Processing brief ({} chars, {} explicit assignees)",
        brief.chars().count(),
        assignees.len()
    );
    let outcome = state.pipeline.run(&brief, &assignees).await;

    match outcome.result {
        Ok(task) => {
            tracing::info!("Asana task {} created", task.gid);
            (
                StatusCode::OK,
                Json(CreateFromBriefResponse {
                    status: "success".to_string(),
                    refined_brief: outcome.refined_brief.unwrap_or_default(),
                    asana_task_id: task.gid,
                    asana_task_name: task.name,
                    asana_task_url: task.permalink_url,
                    message: "Asana task created successfully.".to_string(),
                }),
            )
                .into_response()
        }
        Err(PipelineError::Generation(e)) => {
            tracing::error!("Error processing brief with language model: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Error processing brief with language model".to_string(),
                    details: Some(e.to_string()),
                }),
            )
                .into_response()
        }
        Err(e) => {
            tracing::error!("Error creating Asana task: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(PipelineFailureResponse {
                    status: "error".to_string(),
                    message: e.to_string(),
                    refined_brief: outcome.refined_brief,
                }),
            )
                .into_response()
        }
    }
}

/// Extract a non-blank brief and the cleaned assignee override.
///
/// Only a JSON object is accepted; serde would otherwise fill the request
/// from an array by position.
fn parse_request(body: &[u8]) -> Option<(String, Vec<String>)> {
    let value: serde_json::Value = serde_json::from_slice(body).ok()?;
    if !value.is_object() {
        return None;
    }
    let request: CreateFromBriefRequest = serde_json::from_value(value).ok()?;
    let brief = request.brief_content.filter(|b| !b.trim().is_empty())?;
    let assignees = request
        .assignee_gids
        .unwrap_or_default()
        .into_iter()
        .map(|gid| gid.trim().to_string())
        .filter(|gid| !gid.is_empty())
        .collect();
    Some((brief, assignees))
}

/// Turn a handler panic into a 500 instead of a dropped connection.
fn unexpected_fault(err: Box<dyn Any + Send + 'static>) -> Response {
    let details = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic".to_string()
    };
    tracing::error!("Unexpected API error: {}", details);

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse {
            error: "Unexpected API error".to_string(),
            details: Some(details),
        }),
    )
        .into_response()
}
