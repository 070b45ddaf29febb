//! # Brief Agent
//!
//! Turns short, informal task briefs into well-formed Asana tasks.
//!
//! ## Flow
//!
//! ```text
//!   HTTP POST ──┐          ┌──> Refiner ──> Ollama /api/generate
//!               ├─> Pipeline
//!   Console ────┘          └──> Task creator ──> Asana /tasks
//! ```
//!
//! 1. Receive a brief over HTTP or from the console
//! 2. Ask a local language model to rewrite it as a task description
//! 3. Create an Asana task titled after the first line of that description
//!
//! ## Modules
//! - `refiner`: prompt templates and the refinement step
//! - `task`: title derivation and task creation
//! - `pipeline`: the two stages chained together
//! - `api` / `console`: the two front doors

pub mod api;
pub mod asana;
pub mod config;
pub mod console;
pub mod llm;
pub mod logging;
pub mod pipeline;
pub mod refiner;
pub mod task;

#[cfg(test)]
mod test_support;

pub use config::Config;
pub use pipeline::{BriefPipeline, PipelineError, PipelineOutcome};
