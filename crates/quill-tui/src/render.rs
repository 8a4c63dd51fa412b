//! Pure view functions for the TUI.
//!
//! Functions here take `&AppState` by immutable reference, draw to a ratatui
//! frame, and never mutate state or return effects.

use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::features::editor::{calculate_editor_height, render_editor_with_cursor};
use crate::features::transcript::render_transcript;
use crate::overlays::OverlayExt;
use crate::state::{AppState, TuiState};

/// Height of the status line below the input area.
const STATUS_HEIGHT: u16 = 1;

/// Renders the entire TUI to the frame.
pub fn render(app: &AppState, frame: &mut Frame) {
    let area = frame.area();
    let state = &app.tui;

    let input_height = calculate_editor_height(state, area.height);
    let [transcript_area, editor_area, status_area] = Layout::vertical([
        Constraint::Min(1),
        Constraint::Length(input_height),
        Constraint::Length(STATUS_HEIGHT),
    ])
    .areas(area);

    render_transcript(state, frame, transcript_area);

    // The terminal cursor belongs to whichever component owns the keyboard.
    let overlay_active = app.overlay.is_some();
    render_editor_with_cursor(state, frame, editor_area, !overlay_active);

    render_status_line(state, frame, status_area);

    app.overlay.render(frame, area, editor_area.y, &state.theme);
}

fn render_status_line(state: &TuiState, frame: &mut Frame, area: Rect) {
    let theme = &state.theme;

    let line = if let Some(notice) = &state.notice {
        Line::from(Span::styled(
            notice.text.clone(),
            Style::default().fg(theme.warning),
        ))
    } else {
        Line::from(Span::styled(
            "enter send · @ files · / commands · ctrl+o editor · ctrl+c quit",
            Style::default().fg(theme.dim),
        ))
    };

    frame.render_widget(Paragraph::new(line), area);
}
