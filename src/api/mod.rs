//! HTTP API for the brief agent.
//!
//! ## Endpoints
//!
//! - `POST /create_asana_from_brief` - Refine a brief and create an Asana task
//! - `GET /health` - Health check

mod routes;
pub mod types;

pub use routes::{router, serve, AppState};
pub use types::*;
