//! Task module - turns refined briefs into Asana tasks.
//!
//! - [`TaskDraft`] derives the title and notes (pure, no IO)
//! - [`TaskCreator`] resolves the assignee and calls the task service

mod creator;
mod draft;

pub use creator::{CreatedTask, TaskCreationError, TaskCreator, TaskTarget};
pub use draft::{derive_title, TaskDraft, MAX_TITLE_CHARS};
