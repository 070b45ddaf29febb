//! Ollama API client implementation.
//!
//! Talks to the non-streaming `/api/generate` endpoint of a local Ollama
//! server. Each call is a single attempt; failures are classified and handed
//! back to the caller untouched.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use url::Url;

use super::error::LlmError;
use super::{GenerateOptions, GenerateResponse, LlmClient, TokenUsage};

/// Ollama API client.
pub struct OllamaClient {
    client: Client,
    base_url: Url,
}

impl OllamaClient {
    /// Create a new client for the Ollama server at `base_url`.
    pub fn new(base_url: Url) -> Self {
        Self {
            client: Client::new(),
            base_url,
        }
    }

    /// Full URL of the generate endpoint, keeping any path prefix of the base URL.
    fn generate_url(&self) -> String {
        format!("{}/api/generate", self.base_url.as_str().trim_end_matches('/'))
    }

    /// Create an LlmError from HTTP response status and body.
    ///
    /// Ollama reports failures as `{"error": "..."}`; anything else is passed
    /// through verbatim.
    fn create_error(status: reqwest::StatusCode, body: &str) -> LlmError {
        let message = serde_json::from_str::<OllamaErrorBody>(body)
            .map(|e| e.error)
            .unwrap_or_else(|_| body.to_string());
        LlmError::from_status(status.as_u16(), message)
    }

    /// Execute a single request.
    async fn execute_request(
        &self,
        request: &OllamaGenerateRequest<'_>,
    ) -> Result<GenerateResponse, LlmError> {
        let response = match self
            .client
            .post(self.generate_url())
            .json(request)
            .send()
            .await
        {
            Ok(r) => r,
            Err(e) => {
                if e.is_timeout() {
                    return Err(LlmError::network_error(format!("Request timeout: {}", e)));
                } else if e.is_connect() {
                    return Err(LlmError::network_error(format!("Connection failed: {}", e)));
                } else {
                    return Err(LlmError::network_error(format!("Request failed: {}", e)));
                }
            }
        };

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| LlmError::network_error(format!("Failed to read response: {}", e)))?;

        if !status.is_success() {
            return Err(Self::create_error(status, &body));
        }

        let parsed: OllamaGenerateResponse = serde_json::from_str(&body).map_err(|e| {
            LlmError::parse_error(format!("Failed to parse response: {}, body: {}", e, body))
        })?;

        let usage = match (parsed.prompt_eval_count, parsed.eval_count) {
            (None, None) => None,
            (prompt, completion) => Some(TokenUsage::new(
                prompt.unwrap_or_default(),
                completion.unwrap_or_default(),
            )),
        };

        Ok(GenerateResponse {
            text: parsed.response,
            model: parsed.model.or_else(|| Some(request.model.to_string())),
            usage,
        })
    }
}

#[async_trait]
impl LlmClient for OllamaClient {
    async fn generate(&self, model: &str, prompt: &str) -> Result<GenerateResponse, LlmError> {
        self.generate_with_options(model, prompt, GenerateOptions::default())
            .await
    }

    async fn generate_with_options(
        &self,
        model: &str,
        prompt: &str,
        options: GenerateOptions,
    ) -> Result<GenerateResponse, LlmError> {
        let request = OllamaGenerateRequest {
            model,
            prompt,
            stream: false,
            options: (!options.is_empty()).then(|| OllamaOptions {
                temperature: options.temperature,
                top_p: options.top_p,
                num_predict: options.max_tokens,
            }),
        };

        tracing::debug!("Sending request to Ollama: model={}", model);

        self.execute_request(&request).await
    }
}

/// Ollama `/api/generate` request format.
#[derive(Debug, Serialize)]
struct OllamaGenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    options: Option<OllamaOptions>,
}

/// Model parameters in Ollama's naming.
#[derive(Debug, Serialize)]
struct OllamaOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    num_predict: Option<u64>,
}

/// Ollama `/api/generate` response format (non-streaming).
#[derive(Debug, Deserialize)]
struct OllamaGenerateResponse {
    response: String,
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    prompt_eval_count: Option<u64>,
    #[serde(default)]
    eval_count: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct OllamaErrorBody {
    error: String,
}
