//! Transcript feature slice: the conversation scrollback.

mod render;
mod state;

pub use render::{build_transcript_lines, render_transcript};
pub use state::{TranscriptCell, TranscriptState};
