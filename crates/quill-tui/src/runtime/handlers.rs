//! Effect handlers for the TUI runtime.
//!
//! Handlers are pure async functions that return a `UiEvent`. The runtime
//! spawns them and forwards the result to the inbox; they never mutate
//! state directly. Filesystem work runs in `spawn_blocking` so the loop
//! thread stays responsive.

use std::path::PathBuf;
use std::time::Duration;

use quill_core::attachment::{Attachment, AttachmentError, load_attachment};
use quill_core::config::AttachmentsConfig;
use quill_core::files::list_project_files;
use tokio_util::sync::CancellationToken;

use crate::events::{RejectedPaste, UiEvent};

/// How long the bundled echo responder "thinks" before replying.
const ECHO_DELAY: Duration = Duration::from_millis(400);

/// Lists project files for the completion popup.
pub async fn file_listing(root: PathBuf, cancel: Option<CancellationToken>) -> UiEvent {
    let cancel = cancel.unwrap_or_default();
    let result = tokio::task::spawn_blocking(move || list_project_files(&root, &cancel))
        .await
        .map_err(|e| format!("listing task failed: {e}"));
    UiEvent::FilesListed { result }
}

/// Runs the attachment validation pipeline on a pasted path.
///
/// Failures carry the original pasted text so the reducer can fall back to
/// inserting it literally.
pub async fn attachment_load(path: PathBuf, pasted: String, rules: AttachmentsConfig) -> UiEvent {
    let result = tokio::task::spawn_blocking(move || load_attachment(&path, &rules))
        .await
        .unwrap_or_else(|e| Err(AttachmentError::Io(format!("load task failed: {e}"))));

    UiEvent::FilePicked {
        result: result.map_err(|reason| RejectedPaste {
            text: pasted,
            reason,
        }),
    }
}

/// The bundled local responder: echoes the message back after a short delay.
///
/// Stands in for a real backend so the send pipeline, the busy gate, and
/// the transcript have a full lifecycle.
pub async fn agent_turn(text: String, attachments: Vec<Attachment>) -> UiEvent {
    tokio::time::sleep(ECHO_DELAY).await;

    let mut reply = format!("You said: {text}");
    if !attachments.is_empty() {
        let names: Vec<&str> = attachments.iter().map(|a| a.file_name.as_str()).collect();
        reply.push_str(&format!(
            "\n(received {} attachment{}: {})",
            attachments.len(),
            if attachments.len() == 1 { "" } else { "s" },
            names.join(", ")
        ));
    }

    UiEvent::AgentReplied { text: reply }
}
