//! Configuration management for the brief agent.
//!
//! Configuration is read once at startup from environment variables (the
//! binaries load a `.env` file first when one exists):
//! - `ASANA_ACCESS_TOKEN` - Required. Asana personal access token.
//! - `ASANA_WORKSPACE_GID` - Required. Workspace new tasks belong to.
//! - `ASANA_PROJECT_GID` - Required. Project new tasks are added to.
//! - `DEFAULT_ASSIGNEE_GIDS` - Optional. Comma-separated user GIDs used when a request names none.
//! - `ASANA_API_URL` - Optional. Defaults to `https://app.asana.com/api/1.0`.
//! - `OLLAMA_BASE_URL` - Optional. Defaults to `http://localhost:11434`.
//! - `REFINER_LANGUAGE` - Optional. `en` or `el`. Defaults to `en`.
//! - `REFINER_MODEL` - Optional. Defaults to the language's model (`llama3.2` for `en`).
//! - `REFINER_PROMPT_FILE` - Optional. Custom prompt template containing `{raw_brief}`.
//! - `REFINER_TEMPERATURE` - Optional. Sampling temperature sent to the model.
//! - `REFINER_TOP_P` - Optional. Nucleus sampling cutoff.
//! - `REFINER_MAX_TOKENS` - Optional. Cap on generated tokens.
//! - `HOST` - Optional. Server host. Defaults to `127.0.0.1`.
//! - `PORT` - Optional. Server port. Defaults to `5000`.
//! - `LOG_FILE` - Optional. Append-only request log. Defaults to `api.log`; empty disables it.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;
use url::Url;

use crate::llm::GenerateOptions;
use crate::refiner::{PromptLanguage, PromptTemplate};

pub const DEFAULT_ASANA_API_URL: &str = "https://app.asana.com/api/1.0";
pub const DEFAULT_OLLAMA_BASE_URL: &str = "http://localhost:11434";
const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 5000;
const DEFAULT_LOG_FILE: &str = "api.log";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

/// Asana access and task placement.
#[derive(Clone)]
pub struct AsanaConfig {
    /// Personal access token
    pub access_token: String,

    pub workspace_gid: String,

    pub project_gid: String,

    /// Assignees used when a request names none (only the first is applied)
    pub default_assignee_gids: Vec<String>,

    /// Base URL of the Asana REST API
    pub api_url: Url,
}

impl fmt::Debug for AsanaConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AsanaConfig")
            .field("access_token", &"<redacted>")
            .field("workspace_gid", &self.workspace_gid)
            .field("project_gid", &self.project_gid)
            .field("default_assignee_gids", &self.default_assignee_gids)
            .field("api_url", &self.api_url.as_str())
            .finish()
    }
}

/// Language model used to refine briefs.
#[derive(Debug, Clone)]
pub struct RefinerConfig {
    /// Ollama server base URL
    pub ollama_base_url: Url,

    pub language: PromptLanguage,

    /// Model identifier as known to Ollama
    pub model: String,

    pub template: PromptTemplate,

    pub options: GenerateOptions,
}

/// Agent configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub asana: AsanaConfig,

    pub refiner: RefinerConfig,

    /// Server host
    pub host: String,

    /// Server port
    pub port: u16,

    /// Request log file, if file logging is enabled
    pub log_file: Option<PathBuf>,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingEnvVar` if an Asana credential or GID is
    /// not set, and `ConfigError::InvalidValue` for unparseable values.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let required = |key: &str| {
            var(key)
                .map(|v| v.trim().to_string())
                .ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))
        };

        let access_token = required("ASANA_ACCESS_TOKEN")?;
        let workspace_gid = required("ASANA_WORKSPACE_GID")?;
        let project_gid = required("ASANA_PROJECT_GID")?;
        let default_assignee_gids = var("DEFAULT_ASSIGNEE_GIDS")
            .map(|raw| parse_gid_list(&raw))
            .unwrap_or_default();
        let api_url = parse_url(
            "ASANA_API_URL",
            var("ASANA_API_URL").as_deref().unwrap_or(DEFAULT_ASANA_API_URL),
        )?;

        let ollama_base_url = parse_url(
            "OLLAMA_BASE_URL",
            var("OLLAMA_BASE_URL")
                .as_deref()
                .unwrap_or(DEFAULT_OLLAMA_BASE_URL),
        )?;

        let language = match var("REFINER_LANGUAGE") {
            Some(raw) => raw
                .parse::<PromptLanguage>()
                .map_err(|e| ConfigError::InvalidValue("REFINER_LANGUAGE".to_string(), e))?,
            None => PromptLanguage::default(),
        };

        let model = var("REFINER_MODEL")
            .map(|m| m.trim().to_string())
            .unwrap_or_else(|| language.default_model().to_string());

        let template = match var("REFINER_PROMPT_FILE") {
            Some(path) => load_template(path.trim())?,
            None => language.template(),
        };

        let options = GenerateOptions {
            temperature: parse_optional("REFINER_TEMPERATURE", var("REFINER_TEMPERATURE"))?,
            top_p: parse_optional("REFINER_TOP_P", var("REFINER_TOP_P"))?,
            max_tokens: parse_optional("REFINER_MAX_TOKENS", var("REFINER_MAX_TOKENS"))?,
        };

        let host = var("HOST").unwrap_or_else(|| DEFAULT_HOST.to_string());

        let port = match var("PORT") {
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|e| ConfigError::InvalidValue("PORT".to_string(), format!("{}", e)))?,
            None => DEFAULT_PORT,
        };

        // An explicitly empty LOG_FILE turns file logging off.
        let log_file = match lookup("LOG_FILE") {
            Some(path) if path.trim().is_empty() => None,
            Some(path) => Some(PathBuf::from(path.trim())),
            None => Some(PathBuf::from(DEFAULT_LOG_FILE)),
        };

        Ok(Self {
            asana: AsanaConfig {
                access_token,
                workspace_gid,
                project_gid,
                default_assignee_gids,
                api_url,
            },
            refiner: RefinerConfig {
                ollama_base_url,
                language,
                model,
                template,
                options,
            },
            host,
            port,
            log_file,
        })
    }

    /// Log the effective configuration and anything that will fail later.
    pub fn log_summary(&self) {
        tracing::info!(
            "Loaded configuration: model={}, language={}, workspace={}, project={}",
            self.refiner.model,
            self.refiner.language,
            self.asana.workspace_gid,
            self.asana.project_gid
        );
        if self.asana.default_assignee_gids.is_empty() {
            tracing::warn!(
                "DEFAULT_ASSIGNEE_GIDS not set or empty. Requests without explicit assignees will fail."
            );
        }
    }
}

/// Parse an optional numeric setting, naming the variable on failure.
fn parse_optional<T>(name: &str, raw: Option<String>) -> Result<Option<T>, ConfigError>
where
    T: std::str::FromStr,
    T::Err: fmt::Display,
{
    raw.map(|raw| {
        raw.trim()
            .parse::<T>()
            .map_err(|e| ConfigError::InvalidValue(name.to_string(), e.to_string()))
    })
    .transpose()
}

/// Split a comma-separated GID list, dropping blank entries.
pub fn parse_gid_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|gid| !gid.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_url(key: &str, raw: &str) -> Result<Url, ConfigError> {
    Url::parse(raw.trim())
        .map_err(|e| ConfigError::InvalidValue(key.to_string(), format!("{}", e)))
}

fn load_template(path: &str) -> Result<PromptTemplate, ConfigError> {
    let text = std::fs::read_to_string(path).map_err(|e| {
        ConfigError::InvalidValue("REFINER_PROMPT_FILE".to_string(), format!("{}: {}", path, e))
    })?;
    PromptTemplate::new(text)
        .map_err(|e| ConfigError::InvalidValue("REFINER_PROMPT_FILE".to_string(), e.to_string()))
}
