//! Cross-feature state mutations.
//!
//! Feature reducers mutate their own slice directly and return
//! `StateMutation`s for writes that cross feature boundaries (an overlay
//! editing the draft, the editor appending to the transcript). The top-level
//! reducer applies them in order.

use crate::features::transcript::TranscriptCell;

/// A deferred write to another feature's state.
#[derive(Debug)]
pub enum StateMutation {
    Editor(EditorMutation),
    Transcript(TranscriptMutation),
    /// Show a transient warning in the status area.
    Notice(String),
}

/// Mutations applied to the message editor.
#[derive(Debug)]
pub enum EditorMutation {
    /// Replaces the byte range `start..end` of the draft with `text` and
    /// moves the cursor to the end of the buffer.
    ReplaceRange {
        start: usize,
        end: usize,
        text: String,
    },
    /// Returns the editor to its initial state.
    Reset,
}

/// Mutations applied to the transcript.
#[derive(Debug)]
pub enum TranscriptMutation {
    AppendCell(TranscriptCell),
    Clear,
    PageUp,
    PageDown,
}
