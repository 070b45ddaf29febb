//! Brief refinement through a language model.
//!
//! A [`Refiner`] renders a [`PromptTemplate`] around the raw brief and asks
//! the configured model for a rewrite. The call is made once; any failure is
//! returned to the caller as an [`LlmError`].

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use thiserror::Error;

use crate::llm::{GenerateOptions, LlmClient, LlmError};

/// Placeholder replaced by the raw brief when rendering a template.
pub const BRIEF_PLACEHOLDER: &str = "{raw_brief}";

const ENGLISH_TEMPLATE: &str = "
You are an expert project manager. Your task is to take a raw, informal brief and refine it into a clear, professional, and actionable task description suitable for an Asana task.

Focus on:
- Clarity and conciseness.
- Professional tone.
- Including all essential information from the original brief.
- Avoiding informal language or slang.
- Formatting it as a straightforward text description.

Original Brief:
{raw_brief}

Refined Task Description:
";

const GREEK_TEMPLATE: &str = "
Μετάτρεψε την παρακάτω \"Αρχική Περιγραφή\" σε μια σαφή και επαγγελματική \"Επεξεργασμένη Περιγραφή Εργασίας\" κατάλληλη για το Asana.
Η απάντησή σου πρέπει να περιέχει ΜΟΝΟ την επεξεργασμένη περιγραφή εργασίας.

Αρχική Περιγραφή:
{raw_brief}

Επεξεργασμένη Περιγραφή Εργασίας:
";

/// Language of the built-in refinement prompts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PromptLanguage {
    #[default]
    English,
    Greek,
}

impl PromptLanguage {
    /// Model tuned for prompts in this language.
    pub fn default_model(self) -> &'static str {
        match self {
            PromptLanguage::English => "llama3.2",
            PromptLanguage::Greek => "ilsp/meltemi-instruct-v1.5",
        }
    }

    /// The built-in template for this language.
    pub fn template(self) -> PromptTemplate {
        let text = match self {
            PromptLanguage::English => ENGLISH_TEMPLATE,
            PromptLanguage::Greek => GREEK_TEMPLATE,
        };
        PromptTemplate {
            text: text.to_string(),
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            PromptLanguage::English => "en",
            PromptLanguage::Greek => "el",
        }
    }
}

impl FromStr for PromptLanguage {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "en" | "english" => Ok(PromptLanguage::English),
            "el" | "greek" => Ok(PromptLanguage::Greek),
            other => Err(format!("unsupported language '{}', expected en or el", other)),
        }
    }
}

impl fmt::Display for PromptLanguage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("prompt template must contain the {{raw_brief}} placeholder")]
pub struct MissingPlaceholder;

/// Instruction template wrapped around every brief.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplate {
    text: String,
}

impl PromptTemplate {
    /// Create a custom template.
    ///
    /// # Errors
    ///
    /// Returns [`MissingPlaceholder`] if `text` has no `{raw_brief}` slot.
    pub fn new(text: impl Into<String>) -> Result<Self, MissingPlaceholder> {
        let text = text.into();
        if !text.contains(BRIEF_PLACEHOLDER) {
            return Err(MissingPlaceholder);
        }
        Ok(Self { text })
    }

    /// Substitute the brief into the template.
    pub fn render(&self, raw_brief: &str) -> String {
        self.text.replace(BRIEF_PLACEHOLDER, raw_brief)
    }
}

/// Rewrites raw briefs into professional task descriptions.
#[derive(Clone)]
pub struct Refiner {
    client: Arc<dyn LlmClient>,
    model: String,
    template: PromptTemplate,
    options: GenerateOptions,
}

impl Refiner {
    pub fn new(client: Arc<dyn LlmClient>, model: impl Into<String>, template: PromptTemplate) -> Self {
        Self {
            client,
            model: model.into(),
            template,
            options: GenerateOptions::default(),
        }
    }

    /// Set sampling options forwarded with every generation request.
    pub fn with_options(mut self, options: GenerateOptions) -> Self {
        self.options = options;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Refine a raw brief.
    ///
    /// The model output is returned verbatim, including surrounding
    /// whitespace; deciding whether it is usable is the caller's job.
    pub async fn refine(&self, raw_brief: &str) -> Result<String, LlmError> {
        let prompt = self.template.render(raw_brief);
        let response = self
            .client
            .generate_with_options(&self.model, &prompt, self.options.clone())
            .await?;

        if let Some(usage) = &response.usage {
            tracing::debug!(
                model = %self.model,
                prompt_tokens = usage.prompt_tokens,
                completion_tokens = usage.completion_tokens,
                total_tokens = usage.total_tokens,
                "Brief refined"
            );
        }
        tracing::info!("Refined brief:\n{}", response.text);

        Ok(response.text)
    }
}
