//! Transcript state: the scrollback of sent messages and replies.

use crate::mutations::TranscriptMutation;

/// Lines to scroll per PageUp/PageDown press.
const PAGE_SCROLL_LINES: usize = 10;

/// One entry in the conversation scrollback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TranscriptCell {
    /// A message the user sent, with the names of any attached files.
    User {
        text: String,
        attachment_names: Vec<String>,
    },
    /// A reply from the agent.
    Agent { text: String },
}

impl TranscriptCell {
    pub fn user(text: impl Into<String>, attachment_names: Vec<String>) -> Self {
        Self::User {
            text: text.into(),
            attachment_names,
        }
    }

    pub fn agent(text: impl Into<String>) -> Self {
        Self::Agent { text: text.into() }
    }
}

/// The transcript slice of application state.
#[derive(Debug, Default)]
pub struct TranscriptState {
    cells: Vec<TranscriptCell>,
    /// Scroll position in lines from the bottom; 0 follows the latest cell.
    /// Clamped against the actual content height at render time.
    pub scroll_offset: usize,
}

impl TranscriptState {
    pub fn cells(&self) -> &[TranscriptCell] {
        &self.cells
    }

    /// Appends a cell and snaps the view back to the latest content.
    pub fn push_cell(&mut self, cell: TranscriptCell) {
        self.cells.push(cell);
        self.scroll_offset = 0;
    }

    pub fn clear(&mut self) {
        self.cells.clear();
        self.scroll_offset = 0;
    }

    pub fn page_up(&mut self) {
        self.scroll_offset = self.scroll_offset.saturating_add(PAGE_SCROLL_LINES);
    }

    pub fn page_down(&mut self) {
        self.scroll_offset = self.scroll_offset.saturating_sub(PAGE_SCROLL_LINES);
    }

    /// Applies a cross-feature mutation.
    pub fn apply(&mut self, mutation: TranscriptMutation) {
        match mutation {
            TranscriptMutation::AppendCell(cell) => self.push_cell(cell),
            TranscriptMutation::Clear => self.clear(),
            TranscriptMutation::PageUp => self.page_up(),
            TranscriptMutation::PageDown => self.page_down(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_cell_resets_scroll() {
        let mut transcript = TranscriptState::default();
        transcript.page_up();
        assert!(transcript.scroll_offset > 0);

        transcript.push_cell(TranscriptCell::agent("hi"));
        assert_eq!(transcript.scroll_offset, 0);
    }

    #[test]
    fn page_down_saturates_at_bottom() {
        let mut transcript = TranscriptState::default();
        transcript.page_down();
        assert_eq!(transcript.scroll_offset, 0);
    }

    #[test]
    fn apply_clear_drops_cells() {
        let mut transcript = TranscriptState::default();
        transcript.push_cell(TranscriptCell::user("hello", vec![]));
        transcript.push_cell(TranscriptCell::agent("hi"));

        transcript.apply(TranscriptMutation::Clear);
        assert!(transcript.cells().is_empty());
    }
}
