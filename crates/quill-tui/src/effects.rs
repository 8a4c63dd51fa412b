//! UI effect types.
//!
//! Effects are commands returned by the reducer that the runtime executes.
//! They represent I/O and task spawning only (no direct UI mutations).
//!
//! This keeps the reducer pure: it only mutates state and returns effects,
//! never performs I/O or spawns tasks directly.

use std::path::PathBuf;

use quill_core::attachment::Attachment;
use tokio_util::sync::CancellationToken;

use crate::common::{TaskId, TaskKind};

/// Effects returned by the reducer for the runtime to execute.
///
/// The reducer returns `Vec<UiEffect>` from each update call. Task ids are
/// assigned by the reducer from the state's task sequence, so completion
/// events can be matched back to the task that is still active.
#[derive(Debug)]
pub enum UiEffect {
    /// Quit the application.
    Quit,

    /// Send a message to the agent with its attachments.
    SendMessage {
        task: TaskId,
        text: String,
        attachments: Vec<Attachment>,
    },

    /// List project files for the completion popup.
    ListFiles { task: TaskId },

    /// Load a pasted file path as an attachment.
    LoadAttachment {
        task: TaskId,
        path: PathBuf,
        /// The original pasted text, echoed back on rejection.
        pasted: String,
    },

    /// Suspend the TUI and open the draft in the external editor.
    OpenExternalEditor { text: String },

    /// Cancel an in-progress task.
    ///
    /// With no token attached, the runtime cancels the token stored in the
    /// task state for `kind`.
    CancelTask {
        kind: TaskKind,
        token: Option<CancellationToken>,
    },
}
