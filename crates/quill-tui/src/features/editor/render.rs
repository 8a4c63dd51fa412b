#![allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]

//! Editor feature view.
//!
//! Pure rendering functions for the draft input area: the bordered text
//! box, the attachment row, and cursor placement.

use ratatui::Frame;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use unicode_width::UnicodeWidthChar;

use super::state::{EditorState, MAX_ATTACHMENTS};
use super::text_buffer::TextBuffer;
use crate::common::{truncate_start_with_ellipsis, truncate_with_ellipsis};
use crate::state::TuiState;
use crate::theme::Theme;

/// Minimum height of the input area (lines, including borders).
const INPUT_HEIGHT_MIN: u16 = 5;

/// Maximum height of the input area as a fraction of screen height.
const INPUT_HEIGHT_MAX_PERCENT: f32 = 0.4;

/// Longest attachment name shown in a chip before truncation.
const CHIP_NAME_WIDTH: usize = 20;

/// Result of wrapping the draft with Unicode-aware cursor tracking.
struct WrappedDraft {
    /// Wrapped lines ready to render.
    lines: Vec<Line<'static>>,
    /// Visual row where the cursor is (0-indexed, after wrapping).
    cursor_row: usize,
    /// Visual column where the cursor is (display width units).
    cursor_col: usize,
}

/// Wraps draft content respecting Unicode display width.
///
/// Multi-width characters (CJK, emoji) count by display width, not chars,
/// so wrap points and the cursor column line up with what the terminal
/// shows.
fn wrap_draft(buffer: &TextBuffer, available_width: usize) -> WrappedDraft {
    let (cursor_line, cursor_col) = buffer.cursor();

    let mut lines: Vec<Line<'static>> = Vec::new();
    let mut cursor_visual_row = 0usize;
    let mut cursor_visual_col = 0usize;

    for (line_idx, logical) in buffer.lines().iter().enumerate() {
        let is_cursor_line = line_idx == cursor_line;
        let mut current = String::new();
        let mut current_width = 0usize;
        let mut char_count = 0usize;

        if is_cursor_line && cursor_col == 0 {
            cursor_visual_row = lines.len();
            cursor_visual_col = 0;
        }

        for (char_idx, ch) in logical.chars().enumerate() {
            let w = ch.width().unwrap_or(0);
            if current_width + w > available_width && !current.is_empty() {
                lines.push(Line::from(std::mem::take(&mut current)));
                current_width = 0;
            }
            if is_cursor_line && char_idx == cursor_col {
                cursor_visual_row = lines.len();
                cursor_visual_col = current_width;
            }
            current.push(ch);
            current_width += w;
            char_count = char_idx + 1;
        }

        // cursor past the last character sits at the end of the line
        if is_cursor_line && cursor_col >= char_count && cursor_col > 0 {
            cursor_visual_row = lines.len();
            cursor_visual_col = current_width;
        }

        lines.push(Line::from(current));
    }

    if lines.is_empty() {
        lines.push(Line::from(""));
    }

    WrappedDraft {
        lines,
        cursor_row: cursor_visual_row,
        cursor_col: cursor_visual_col,
    }
}

/// Calculates the dynamic input height based on content and terminal size.
///
/// - Minimum: `INPUT_HEIGHT_MIN` (3 text lines with borders)
/// - Maximum: 40% of terminal height
/// - One extra row when attachments are queued
pub fn calculate_editor_height(state: &TuiState, terminal_height: u16) -> u16 {
    let attachment_rows = u16::from(!state.editor.attachments.is_empty());
    let line_count = state.editor.buffer.lines().len() as u16;

    let desired = (line_count.max(3) + 2 + attachment_rows).max(INPUT_HEIGHT_MIN);
    let max_height = ((f32::from(terminal_height) * INPUT_HEIGHT_MAX_PERCENT) as u16)
        .max(INPUT_HEIGHT_MIN + attachment_rows);

    desired.min(max_height)
}

/// Renders the input area.
pub fn render_editor(state: &TuiState, frame: &mut Frame, area: Rect) {
    render_editor_with_cursor(state, frame, area, true);
}

/// Renders the input area. When `show_cursor` is false (an overlay owns the
/// screen), the terminal cursor is not placed.
pub fn render_editor_with_cursor(
    state: &TuiState,
    frame: &mut Frame,
    area: Rect,
    show_cursor: bool,
) {
    let theme = &state.theme;
    let editor = &state.editor;

    let (title, border_color) = if editor.delete_mode {
        (
            " delete: digit removes, r removes all, esc cancels ",
            theme.warning,
        )
    } else {
        (" message ", theme.dim)
    };

    let mut block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(Line::from(Span::styled(
            title,
            Style::default().fg(border_color),
        )))
        .title_bottom(
            Line::from(Span::styled(
                format!(
                    " {} ",
                    truncate_start_with_ellipsis(
                        &state.root.display().to_string(),
                        (area.width / 2) as usize,
                    )
                ),
                Style::default().fg(theme.dim),
            ))
            .alignment(Alignment::Right),
        );

    if !editor.attachments.is_empty() {
        block = block.title_bottom(
            Line::from(Span::styled(
                format!(" {}/{MAX_ATTACHMENTS} attachments ", editor.attachments.len()),
                Style::default().fg(theme.dim),
            ))
            .alignment(Alignment::Left),
        );
    }

    let inner = block.inner(area);
    frame.render_widget(block, area);

    if inner.width == 0 || inner.height == 0 {
        return;
    }

    // Attachment chips take the first inner row when present.
    let chip_rows = u16::from(!editor.attachments.is_empty());
    if chip_rows > 0 {
        let chips_area = Rect::new(inner.x, inner.y, inner.width, 1);
        let chips = Paragraph::new(build_attachment_chips(editor, theme));
        frame.render_widget(chips, chips_area);
    }

    let text_area = Rect::new(
        inner.x,
        inner.y + chip_rows,
        inner.width,
        inner.height.saturating_sub(chip_rows),
    );
    if text_area.height == 0 {
        return;
    }

    let wrapped = wrap_draft(&editor.buffer, text_area.width as usize);

    // Scroll to keep the cursor visible, biased to the middle of the box.
    let total_rows = wrapped.lines.len();
    let viewport = text_area.height as usize;
    let scroll_offset = if total_rows <= viewport {
        0
    } else {
        let ideal = viewport / 2;
        if wrapped.cursor_row < ideal {
            0
        } else if wrapped.cursor_row >= total_rows.saturating_sub(ideal) {
            total_rows.saturating_sub(viewport)
        } else {
            wrapped.cursor_row.saturating_sub(ideal)
        }
    };

    let visible: Vec<Line> = wrapped
        .lines
        .into_iter()
        .skip(scroll_offset)
        .take(viewport)
        .collect();
    frame.render_widget(Paragraph::new(visible), text_area);

    let cursor_x = text_area.x + wrapped.cursor_col as u16;
    let cursor_y = text_area.y + wrapped.cursor_row.saturating_sub(scroll_offset) as u16;
    if show_cursor
        && cursor_x < text_area.x + text_area.width
        && cursor_y < text_area.y + text_area.height
    {
        frame.set_cursor_position((cursor_x, cursor_y));
    }
}

/// Builds the attachment chip row: `[0:photo.png] [1:diagram.jpg]`.
///
/// The digit prefix is the index a digit key deletes in delete mode.
fn build_attachment_chips(editor: &EditorState, theme: &Theme) -> Line<'static> {
    let style = if editor.delete_mode {
        Style::default()
            .fg(theme.warning)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(theme.accent)
    };

    let mut spans = Vec::new();
    for (idx, attachment) in editor.attachments.iter().enumerate() {
        if idx > 0 {
            spans.push(Span::raw(" "));
        }
        let name = truncate_with_ellipsis(&attachment.file_name, CHIP_NAME_WIDTH);
        spans.push(Span::styled(format!("[{idx}:{name}]"), style));
    }
    Line::from(spans)
}
