//! Quit confirmation dialog.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::Frame;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use super::OverlayUpdate;
use crate::effects::UiEffect;
use crate::theme::Theme;

/// State for the quit confirmation overlay.
#[derive(Debug, Clone, Default)]
pub struct QuitConfirmState;

impl QuitConfirmState {
    pub fn open() -> (Self, Vec<UiEffect>) {
        (Self, vec![])
    }

    pub fn render(&self, frame: &mut Frame, area: Rect, input_y: u16, theme: &Theme) {
        render_quit_confirm(frame, area, input_y, theme);
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> OverlayUpdate {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

        match key.code {
            KeyCode::Char('y' | 'Y') | KeyCode::Enter => {
                OverlayUpdate::close().with_ui_effects(vec![UiEffect::Quit])
            }
            KeyCode::Char('n' | 'N') | KeyCode::Esc => OverlayUpdate::close(),
            KeyCode::Char('c') if ctrl => OverlayUpdate::close(),
            _ => OverlayUpdate::stay(),
        }
    }
}

fn render_quit_confirm(frame: &mut Frame, area: Rect, input_top_y: u16, theme: &Theme) {
    use super::render_utils::{InputHint, OverlayConfig, render_overlay};

    let hints = [InputHint::new("y", "quit"), InputHint::new("n", "stay")];
    let layout = render_overlay(
        frame,
        area,
        input_top_y,
        theme,
        &OverlayConfig {
            title: "Quit",
            border_color: theme.warning,
            width: 36,
            height: 6,
            hints: &hints,
        },
    );

    let lines = vec![
        Line::default(),
        Line::from(Span::styled(
            "Leave Quill?",
            Style::default().add_modifier(Modifier::BOLD),
        )),
    ];
    let message = Paragraph::new(lines).alignment(Alignment::Center);
    frame.render_widget(message, layout.body);
}
