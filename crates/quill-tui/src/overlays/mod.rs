//! Overlay modules for the TUI.
//!
//! Overlays are modal UI components that temporarily take over keyboard input.
//! Each overlay is self-contained: it owns its state, key handler, and render function.
//!
//! ## Module Structure
//!
//! - `command_palette.rs`: Command palette (`/` when the draft is empty)
//! - `file_completion.rs`: File completion popup triggered by `@`
//! - `quit_confirm.rs`: Quit confirmation dialog
//! - `render_utils.rs`: Shared rendering utilities for overlays
//! - `update.rs`: Overlay key handling and update logic
//!
//! ## Extension Trait
//!
//! `OverlayExt` provides convenience methods for `Option<Overlay>` to encapsulate
//! the common patterns used in the reducer.

pub mod command_palette;
pub mod file_completion;
pub mod quit_confirm;
pub mod render_utils;
mod update;

pub use command_palette::CommandPaletteState;
use crossterm::event::KeyEvent;
pub use file_completion::{FileCompletionState, FileMatch};
pub use quit_confirm::QuitConfirmState;
use ratatui::Frame;
use ratatui::layout::Rect;
// Re-export update functions
pub use update::{handle_files_listed, handle_overlay_key};

use crate::effects::UiEffect;
use crate::mutations::StateMutation;
use crate::state::TuiState;
use crate::theme::Theme;

// ============================================================================
// OverlayRequest / OverlayTransition / OverlayUpdate
// ============================================================================

/// Requests to open a new overlay.
#[derive(Debug)]
pub enum OverlayRequest {
    CommandPalette,
    FileCompletion {
        /// Byte offset of the `@` in the draft.
        anchor: usize,
    },
    QuitConfirm,
}

/// Transition returned by overlay key handlers.
#[derive(Debug)]
pub enum OverlayTransition {
    Stay,
    Close,
    Open(OverlayRequest),
}

/// Update returned by overlay key handlers.
#[derive(Debug)]
pub struct OverlayUpdate {
    pub transition: OverlayTransition,
    pub mutations: Vec<StateMutation>,
    pub effects: Vec<UiEffect>,
}

impl OverlayUpdate {
    fn new(transition: OverlayTransition) -> Self {
        Self {
            transition,
            mutations: Vec::new(),
            effects: Vec::new(),
        }
    }

    pub fn stay() -> Self {
        Self::new(OverlayTransition::Stay)
    }

    pub fn close() -> Self {
        Self::new(OverlayTransition::Close)
    }

    pub fn open(request: OverlayRequest) -> Self {
        Self::new(OverlayTransition::Open(request))
    }

    #[must_use]
    pub fn with_mutations(mut self, mutations: Vec<StateMutation>) -> Self {
        self.mutations = mutations;
        self
    }

    #[must_use]
    pub fn with_ui_effects(mut self, effects: Vec<UiEffect>) -> Self {
        self.effects = effects;
        self
    }
}

// ============================================================================
// Overlay
// ============================================================================

#[derive(Debug)]
pub enum Overlay {
    CommandPalette(CommandPaletteState),
    FileCompletion(FileCompletionState),
    QuitConfirm(QuitConfirmState),
}

impl Overlay {
    pub fn render(&self, frame: &mut Frame, area: Rect, input_y: u16, theme: &Theme) {
        match self {
            Overlay::CommandPalette(p) => p.render(frame, area, input_y, theme),
            Overlay::FileCompletion(c) => c.render(frame, area, input_y, theme),
            Overlay::QuitConfirm(q) => q.render(frame, area, input_y, theme),
        }
    }

    pub fn handle_key(&mut self, tui: &TuiState, key: KeyEvent) -> OverlayUpdate {
        match self {
            Overlay::CommandPalette(p) => p.handle_key(tui, key),
            Overlay::FileCompletion(c) => c.handle_key(&tui.editor, key),
            Overlay::QuitConfirm(q) => q.handle_key(key),
        }
    }

    pub fn as_file_completion_mut(&mut self) -> Option<&mut FileCompletionState> {
        match self {
            Overlay::FileCompletion(c) => Some(c),
            _ => None,
        }
    }
}

// ============================================================================
// OverlayExt - Extension trait for Option<Overlay>
// ============================================================================

/// Extension trait for `Option<Overlay>` providing convenience render helpers.
pub trait OverlayExt {
    /// Renders the overlay if one is active.
    fn render(&self, frame: &mut Frame, area: Rect, input_y: u16, theme: &Theme);
}

impl OverlayExt for Option<Overlay> {
    fn render(&self, frame: &mut Frame, area: Rect, input_y: u16, theme: &Theme) {
        if let Some(overlay) = self {
            overlay.render(frame, area, input_y, theme);
        }
    }
}
