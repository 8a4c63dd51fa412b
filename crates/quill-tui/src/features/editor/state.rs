//! State for the message editor: draft text, pending attachments, and the
//! attachment delete mode.

use quill_core::attachment::Attachment;

use crate::features::editor::text_buffer::TextBuffer;
use crate::mutations::EditorMutation;

/// Upper bound on attachments per message.
pub const MAX_ATTACHMENTS: usize = 5;

/// The message editor slice of application state.
#[derive(Debug, Default)]
pub struct EditorState {
    /// The draft message text.
    pub buffer: TextBuffer,
    /// Files queued for the next message, in attach order.
    pub attachments: Vec<Attachment>,
    /// True while the next digit key deletes an attachment.
    pub delete_mode: bool,
}

impl EditorState {
    /// Queues an attachment for the next message.
    ///
    /// Returns false when the per-message limit is already reached; the
    /// editor state is unchanged in that case. The same file may be attached
    /// more than once.
    pub fn add_attachment(&mut self, attachment: Attachment) -> bool {
        if self.attachments.len() >= MAX_ATTACHMENTS {
            return false;
        }
        self.attachments.push(attachment);
        true
    }

    /// Removes the attachment at `index`, preserving the order of the rest.
    ///
    /// Out-of-range indices are ignored.
    pub fn remove_attachment(&mut self, index: usize) {
        if index < self.attachments.len() {
            self.attachments.remove(index);
        }
    }

    /// Drops all queued attachments.
    pub fn clear_attachments(&mut self) {
        self.attachments.clear();
    }

    /// Detaches the queued attachments for an outgoing message.
    pub fn take_attachments(&mut self) -> Vec<Attachment> {
        std::mem::take(&mut self.attachments)
    }

    /// Returns the editor to its initial state: empty buffer, no
    /// attachments, delete mode off.
    pub fn reset(&mut self) {
        self.buffer.clear();
        self.attachments.clear();
        self.delete_mode = false;
    }

    /// Applies a cross-feature mutation.
    pub fn apply(&mut self, mutation: EditorMutation) {
        match mutation {
            EditorMutation::ReplaceRange { start, end, text } => {
                self.buffer.delete_range(start, end);
                self.buffer.insert_str(&text);
                self.buffer.move_to_end();
            }
            EditorMutation::Reset => self.reset(),
        }
    }
}
