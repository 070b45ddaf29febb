//! Task draft derived from a refined brief.
//!
//! # Invariants
//! - `title` is the first line of the refined text (split on `\n`)
//! - `title` holds at most [`MAX_TITLE_CHARS`] characters
//! - `notes` is the refined text, unmodified

/// Upper bound on the task title, in characters.
pub const MAX_TITLE_CHARS: usize = 250;

/// Title and notes for a task about to be created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskDraft {
    pub title: String,
    pub notes: String,
}

impl TaskDraft {
    /// Derive a draft from refined text.
    pub fn from_refined(refined: &str) -> Self {
        Self {
            title: derive_title(refined),
            notes: refined.to_string(),
        }
    }
}

/// First line of `text`, truncated to [`MAX_TITLE_CHARS`] characters.
///
/// Counts Unicode scalar values so multi-byte text is never split mid-character.
pub fn derive_title(text: &str) -> String {
    let first_line = text.split('\n').next().unwrap_or_default();
    first_line.chars().take(MAX_TITLE_CHARS).collect()
}
