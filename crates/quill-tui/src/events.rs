//! UI event types.
//!
//! Everything the runtime feeds to the reducer is a `UiEvent`: terminal
//! input, the periodic tick, and the results of async work arriving through
//! the inbox channel.

use std::path::PathBuf;

use quill_core::attachment::{Attachment, AttachmentError};

use crate::common::{TaskCompleted, TaskKind, TaskStarted};

/// Events consumed by the reducer.
#[derive(Debug)]
pub enum UiEvent {
    /// Periodic tick for animations and timed state (notice expiry).
    Tick,

    /// A raw terminal event (key press, paste, resize).
    Terminal(crossterm::event::Event),

    /// An async task started; the reducer records it for progress and
    /// cancellation.
    TaskStarted { kind: TaskKind, started: TaskStarted },

    /// An async task finished. The boxed inner event is re-dispatched if the
    /// task is still the active one for its kind.
    TaskCompleted {
        kind: TaskKind,
        completed: TaskCompleted<Box<UiEvent>>,
    },

    /// Project file listing finished (for the completion popup).
    FilesListed { result: Result<Vec<PathBuf>, String> },

    /// A pasted path finished loading as an attachment, or was rejected.
    FilePicked {
        result: Result<Attachment, RejectedPaste>,
    },

    /// The external editor closed.
    ///
    /// `Ok(Some(text))` carries the edited draft, `Ok(None)` means the editor
    /// exited nonzero and the edit is discarded.
    EditorFinished {
        result: Result<Option<String>, String>,
    },

    /// The agent produced a reply to the last message.
    AgentReplied { text: String },
}

/// A paste that did not become an attachment.
///
/// Carries the original pasted text so the reducer can fall back to
/// inserting it literally.
#[derive(Debug)]
pub struct RejectedPaste {
    pub text: String,
    pub reason: AttachmentError,
}
