#![allow(clippy::cast_possible_truncation)]

//! Transcript rendering functions.
//!
//! Builds the scrollback view from transcript cells: user messages with a
//! gutter prefix, agent replies as plain paragraphs, and the busy spinner
//! while a reply is pending.

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use unicode_width::UnicodeWidthChar;

use super::state::TranscriptCell;
use crate::state::TuiState;
use crate::theme::Theme;

/// Braille dots (⠋⠙⠹) may not render correctly in all terminals/fonts.
const SPINNER_FRAMES: &[&str] = &["◐", "◓", "◑", "◒"];

/// Spinner speed divisor (render frames per spinner frame).
pub const SPINNER_SPEED_DIVISOR: usize = 6;

/// Gutter prefix for user messages.
const USER_PREFIX: &str = "│ ";

/// Renders the transcript into the given area, honoring the scroll offset.
pub fn render_transcript(state: &TuiState, frame: &mut Frame, area: Rect) {
    let width = area.width as usize;
    let lines = build_transcript_lines(state, width);

    let total = lines.len();
    let viewport = area.height as usize;

    // scroll_offset counts lines up from the bottom; clamp so scrolling past
    // the first line is impossible.
    let max_offset = total.saturating_sub(viewport);
    let offset = state.transcript.scroll_offset.min(max_offset);
    let start = total.saturating_sub(viewport + offset);

    let visible: Vec<Line> = lines.into_iter().skip(start).take(viewport).collect();
    frame.render_widget(Paragraph::new(visible), area);
}

/// Builds the full transcript as styled lines, wrapped to `width`.
pub fn build_transcript_lines(state: &TuiState, width: usize) -> Vec<Line<'static>> {
    let theme = &state.theme;
    let mut lines: Vec<Line<'static>> = Vec::new();

    if state.transcript.cells().is_empty() {
        lines.extend(welcome_lines(theme));
    }

    for cell in state.transcript.cells() {
        if !lines.is_empty() {
            lines.push(Line::default());
        }
        match cell {
            TranscriptCell::User {
                text,
                attachment_names,
            } => {
                lines.extend(user_lines(text, attachment_names, width, theme));
            }
            TranscriptCell::Agent { text } => {
                lines.extend(wrapped_lines(text, width, Style::default()));
            }
        }
    }

    if state.is_agent_busy() {
        let frame_idx = (state.spinner_frame / SPINNER_SPEED_DIVISOR) % SPINNER_FRAMES.len();
        lines.push(Line::default());
        lines.push(Line::from(vec![
            Span::styled(
                SPINNER_FRAMES[frame_idx].to_string(),
                Style::default().fg(theme.accent),
            ),
            Span::styled(" thinking...", Style::default().fg(theme.dim)),
        ]));
    }

    lines
}

fn welcome_lines(theme: &Theme) -> Vec<Line<'static>> {
    vec![
        Line::from(Span::styled(
            "quill",
            Style::default()
                .fg(theme.accent)
                .add_modifier(Modifier::BOLD),
        )),
        Line::default(),
        Line::from(Span::styled(
            "/ commands · @ attach a file · ctrl+o external editor",
            Style::default().fg(theme.dim),
        )),
        Line::from(Span::styled(
            "ctrl+r then a digit removes an attachment · enter sends",
            Style::default().fg(theme.dim),
        )),
    ]
}

fn user_lines(
    text: &str,
    attachment_names: &[String],
    width: usize,
    theme: &Theme,
) -> Vec<Line<'static>> {
    let prefix_style = Style::default().fg(theme.accent);
    let content_width = width.saturating_sub(USER_PREFIX.chars().count());

    let mut lines: Vec<Line<'static>> = wrapped_lines(text, content_width, Style::default())
        .into_iter()
        .map(|line| {
            let mut spans = vec![Span::styled(USER_PREFIX.to_string(), prefix_style)];
            spans.extend(line.spans);
            Line::from(spans)
        })
        .collect();

    if !attachment_names.is_empty() {
        lines.push(Line::from(vec![
            Span::styled(USER_PREFIX.to_string(), prefix_style),
            Span::styled(
                format!("(attached: {})", attachment_names.join(", ")),
                Style::default().fg(theme.dim),
            ),
        ]));
    }

    lines
}

/// Wraps plain text to `width` display columns, one styled span per line.
fn wrapped_lines(text: &str, width: usize, style: Style) -> Vec<Line<'static>> {
    let width = width.max(1);
    let mut lines = Vec::new();

    for logical in text.split('\n') {
        if logical.is_empty() {
            lines.push(Line::default());
            continue;
        }

        let mut current = String::new();
        let mut current_width = 0usize;
        for ch in logical.chars() {
            let w = ch.width().unwrap_or(0);
            if current_width + w > width && !current.is_empty() {
                lines.push(Line::from(Span::styled(
                    std::mem::take(&mut current),
                    style,
                )));
                current_width = 0;
            }
            current.push(ch);
            current_width += w;
        }
        lines.push(Line::from(Span::styled(current, style)));
    }

    lines
}
