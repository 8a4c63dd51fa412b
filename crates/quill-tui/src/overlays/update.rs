//! Overlay key handling and update logic.

use std::path::PathBuf;

use crossterm::event::KeyEvent;

use super::{Overlay, OverlayUpdate};
use crate::state::TuiState;

/// Routes a key press to the active overlay.
///
/// Returns None when no overlay is open. Editing keys for the file
/// completion popup never reach this: the caller routes them to the editor
/// first and re-derives the query afterwards.
pub fn handle_overlay_key(
    tui: &TuiState,
    overlay: &mut Option<Overlay>,
    key: KeyEvent,
) -> Option<OverlayUpdate> {
    overlay.as_mut().map(|o| o.handle_key(tui, key))
}

/// Installs a finished file listing into the completion popup, if it is
/// still open. Listings that arrive after the popup closed are dropped.
pub fn handle_files_listed(overlay: &mut Option<Overlay>, files: Vec<PathBuf>) {
    if let Some(completion) = overlay.as_mut().and_then(Overlay::as_file_completion_mut) {
        completion.set_files(files);
    }
}
