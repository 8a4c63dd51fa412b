//! Message editor feature slice.
//!
//! Single authority over the draft: buffer text, queued attachments, and
//! the attachment delete mode.
//!
//! ## Module Structure
//!
//! - `state.rs`: `EditorState` (draft buffer, attachments, delete mode)
//! - `text_buffer.rs`: `TextBuffer`, the multi-line editing primitive
//! - `update.rs`: key and paste handling
//! - `render.rs`: input area rendering

mod render;
mod state;
mod text_buffer;
mod update;

pub use render::{calculate_editor_height, render_editor, render_editor_with_cursor};
pub use state::{EditorState, MAX_ATTACHMENTS};
pub use text_buffer::{CursorMove, TextBuffer};
pub use update::{
    EditorContext, handle_main_key, handle_paste, insert_literal_paste, route_completion_editing,
};
