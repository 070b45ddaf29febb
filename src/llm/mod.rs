//! LLM client module for interacting with language models.
//!
//! This module provides a trait-based abstraction over text-generation
//! endpoints, with a local Ollama server as the primary implementation.

mod error;
mod ollama;

pub use error::{classify_http_status, LlmError, LlmErrorKind};
pub use ollama::OllamaClient;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Response from a text generation call.
#[derive(Debug, Clone)]
pub struct GenerateResponse {
    /// Generated text, exactly as returned by the model.
    pub text: String,
    pub model: Option<String>,
    pub usage: Option<TokenUsage>,
}

/// Token usage information (if provided by the upstream server).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
    pub total_tokens: u64,
}

impl TokenUsage {
    /// Create a usage object ensuring `total_tokens` is consistent.
    pub fn new(prompt_tokens: u64, completion_tokens: u64) -> Self {
        Self {
            prompt_tokens,
            completion_tokens,
            total_tokens: prompt_tokens.saturating_add(completion_tokens),
        }
    }
}

/// Optional sampling parameters for generation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GenerateOptions {
    /// Sampling temperature (0 = deterministic).
    pub temperature: Option<f64>,
    /// Top-p nucleus sampling.
    pub top_p: Option<f64>,
    /// Maximum output tokens to generate.
    pub max_tokens: Option<u64>,
}

impl GenerateOptions {
    /// True when no option is set and the server defaults apply.
    pub fn is_empty(&self) -> bool {
        self.temperature.is_none() && self.top_p.is_none() && self.max_tokens.is_none()
    }
}

/// Trait for LLM clients.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Generate a completion for a single prompt.
    async fn generate(&self, model: &str, prompt: &str) -> Result<GenerateResponse, LlmError>;

    /// Generate a completion with optional sampling parameters.
    ///
    /// Default implementation ignores options and calls `generate`.
    async fn generate_with_options(
        &self,
        model: &str,
        prompt: &str,
        _options: GenerateOptions,
    ) -> Result<GenerateResponse, LlmError> {
        self.generate(model, prompt).await
    }
}
