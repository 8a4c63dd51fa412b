#![allow(clippy::cast_possible_truncation)]

//! File completion popup, opened by typing `@` in the editor.
//!
//! While open, plain editing keys keep going to the editor; after each edit
//! the reducer calls `update_from_editor` to re-derive the query from the
//! token at the cursor and decide whether the popup should stay open.

use std::path::PathBuf;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use nucleo_matcher::pattern::{CaseMatching, Normalization, Pattern};
use nucleo_matcher::{Config, Matcher, Utf32Str};
use ratatui::Frame;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{List, ListItem, ListState, Paragraph};
use unicode_width::UnicodeWidthStr;

use super::OverlayUpdate;
use crate::common::{TaskId, truncate_start_with_ellipsis};
use crate::effects::UiEffect;
use crate::features::editor::EditorState;
use crate::mutations::{EditorMutation, StateMutation};
use crate::theme::Theme;

const MAX_VISIBLE_FILES: usize = 10;
const VISIBLE_HEIGHT: usize = MAX_VISIBLE_FILES - 2;

/// A matched file with its score and matched character indices.
#[derive(Debug, Clone)]
pub struct FileMatch {
    /// Index into the files Vec.
    pub file_idx: usize,
    /// Match score (higher = better match). None for unfiltered results.
    pub score: Option<i64>,
    /// Byte indices of matched characters for highlighting.
    pub match_indices: Vec<usize>,
}

/// File completion state.
///
/// `anchor` is the byte offset of the `@` in the draft; `query` is the text
/// between the `@` and the cursor. File listing runs asynchronously and the
/// results arrive via the inbox.
#[derive(Debug)]
pub struct FileCompletionState {
    pub anchor: usize,
    pub query: String,
    pub files: Vec<PathBuf>,
    /// Filtered results with match info for scoring and highlighting.
    pub filtered: Vec<FileMatch>,
    pub selected: usize,
    pub offset: usize,
    pub loading: bool,
}

impl FileCompletionState {
    pub fn open(anchor: usize, task: TaskId) -> (Self, Vec<UiEffect>) {
        (
            Self {
                anchor,
                query: String::new(),
                files: Vec::new(),
                filtered: Vec::new(),
                selected: 0,
                offset: 0,
                loading: true,
            },
            vec![UiEffect::ListFiles { task }],
        )
    }

    pub fn render(&self, frame: &mut Frame, area: Rect, input_y: u16, theme: &Theme) {
        render_file_completion(frame, self, area, input_y, theme);
    }

    pub fn handle_key(&mut self, editor: &EditorState, key: KeyEvent) -> OverlayUpdate {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

        match key.code {
            KeyCode::Esc => OverlayUpdate::close(),
            KeyCode::Char('c') if ctrl => OverlayUpdate::close(),
            // Enter inserts and dismisses; Tab inserts and keeps the popup
            // open until the next edit.
            KeyCode::Enter | KeyCode::Tab => {
                let mut mutations = Vec::new();
                if let Some(mutation) = self.splice_selected(editor) {
                    mutations.push(StateMutation::Editor(mutation));
                }
                let update = if key.code == KeyCode::Tab && !mutations.is_empty() {
                    OverlayUpdate::stay()
                } else {
                    OverlayUpdate::close()
                };
                update.with_mutations(mutations)
            }
            KeyCode::Up => {
                self.select_prev();
                OverlayUpdate::stay()
            }
            KeyCode::Down => {
                self.select_next();
                OverlayUpdate::stay()
            }
            KeyCode::Char('p') if ctrl => {
                self.select_prev();
                OverlayUpdate::stay()
            }
            KeyCode::Char('n') if ctrl => {
                self.select_next();
                OverlayUpdate::stay()
            }
            _ => OverlayUpdate::stay(),
        }
    }

    /// Returns true for keys that should keep editing the draft while the
    /// popup is open.
    pub fn should_route_input_key(key: KeyEvent) -> bool {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Esc | KeyCode::Enter | KeyCode::Tab | KeyCode::Up | KeyCode::Down => false,
            KeyCode::Char('p' | 'n' | 'c') if ctrl => false,
            _ => true,
        }
    }

    pub fn selected_file(&self) -> Option<&PathBuf> {
        self.filtered
            .get(self.selected)
            .and_then(|m| self.files.get(m.file_idx))
    }

    fn select_prev(&mut self) {
        if self.selected > 0 {
            self.selected -= 1;
            if self.selected < self.offset {
                self.offset = self.selected;
            }
        }
    }

    fn select_next(&mut self) {
        if self.selected < self.filtered.len().saturating_sub(1) {
            self.selected += 1;
            if self.selected >= self.offset + VISIBLE_HEIGHT {
                self.offset = self.selected - VISIBLE_HEIGHT + 1;
            }
        }
    }

    /// Re-derives the query from the token at the cursor after an edit.
    ///
    /// Returns true when the popup should close: the `@` token is gone, or
    /// the cursor moved to or before the anchor.
    pub fn update_from_editor(&mut self, editor: &EditorState) -> bool {
        let Some((start, word)) = editor.buffer.word_at_cursor() else {
            return true;
        };
        if !word.starts_with('@') {
            return true;
        }
        let cursor = editor.buffer.cursor_offset();
        if cursor <= start {
            return true;
        }

        self.anchor = start;
        self.query = word[1..cursor - start].to_string();
        self.apply_filter();
        false
    }

    /// Builds the mutation replacing the whole `@` token with the selected
    /// path. The `@` is consumed; the cursor ends up at the end of the draft.
    fn splice_selected(&self, editor: &EditorState) -> Option<EditorMutation> {
        let path = self.selected_file()?.to_string_lossy().into_owned();

        let end = match editor.buffer.word_at_cursor() {
            Some((start, word)) if start == self.anchor => start + word.len(),
            _ => editor.buffer.cursor_offset(),
        };

        Some(EditorMutation::ReplaceRange {
            start: self.anchor,
            end,
            text: path,
        })
    }

    /// Rebuilds `filtered` from `files` and the current query.
    pub fn apply_filter(&mut self) {
        if self.query.is_empty() {
            // No filter: show all files without highlighting
            self.filtered = (0..self.files.len())
                .map(|idx| FileMatch {
                    file_idx: idx,
                    score: None,
                    match_indices: Vec::new(),
                })
                .collect();
        } else {
            let mut matcher = Matcher::new(Config::DEFAULT);
            let pattern = Pattern::parse(&self.query, CaseMatching::Ignore, Normalization::Smart);

            let mut matched_files: Vec<FileMatch> = self
                .files
                .iter()
                .enumerate()
                .filter_map(|(idx, path)| {
                    let path_str = path.to_string_lossy();
                    let mut buf = Vec::new();
                    let haystack = Utf32Str::new(&path_str, &mut buf);

                    pattern.score(haystack, &mut matcher).map(|score| {
                        let mut char_indices = Vec::new();
                        pattern.indices(haystack, &mut matcher, &mut char_indices);
                        let byte_indices = char_to_byte_indices(&path_str, &char_indices);

                        FileMatch {
                            file_idx: idx,
                            score: Some(i64::from(score)),
                            match_indices: byte_indices,
                        }
                    })
                })
                .collect();

            // Sort by score descending (best matches first)
            matched_files.sort_by_key(|m| std::cmp::Reverse(m.score.unwrap_or(i64::MIN)));

            self.filtered = matched_files;
        }

        self.selected = 0;
        self.offset = 0;
    }

    /// Installs the listing results, keeping whatever query the user has
    /// typed while the walk was running.
    pub fn set_files(&mut self, files: Vec<PathBuf>) {
        self.files = files;
        self.loading = false;
        self.apply_filter();
    }
}

/// Converts character indices to byte indices.
///
/// Nucleo returns character indices, but highlighting works in byte offsets
/// into the path string.
fn char_to_byte_indices(text: &str, char_indices: &[u32]) -> Vec<usize> {
    if char_indices.is_empty() {
        return Vec::new();
    }

    let mut byte_indices = Vec::with_capacity(char_indices.len());
    let char_set: std::collections::HashSet<u32> = char_indices.iter().copied().collect();

    for (char_idx, (byte_idx, _)) in text.char_indices().enumerate() {
        if char_set.contains(&(char_idx as u32)) {
            byte_indices.push(byte_idx);
        }
    }

    byte_indices
}

/// Builds a line with highlighted matched characters.
fn build_highlighted_line(text: &str, match_indices: &[usize], theme: &Theme) -> Line<'static> {
    use std::collections::HashSet;

    let plain = Style::default().fg(theme.accent);
    let matched = Style::default()
        .fg(theme.warning)
        .add_modifier(Modifier::BOLD);

    if match_indices.is_empty() {
        return Line::from(Span::styled(text.to_string(), plain));
    }

    let match_set: HashSet<usize> = match_indices.iter().copied().collect();
    let mut spans = Vec::new();
    let mut current_span = String::new();
    let mut current_is_match = false;

    for (byte_idx, ch) in text.char_indices() {
        let is_match = match_set.contains(&byte_idx);

        if is_match != current_is_match && !current_span.is_empty() {
            let style = if current_is_match { matched } else { plain };
            spans.push(Span::styled(std::mem::take(&mut current_span), style));
        }

        current_span.push(ch);
        current_is_match = is_match;
    }

    if !current_span.is_empty() {
        let style = if current_is_match { matched } else { plain };
        spans.push(Span::styled(current_span, style));
    }

    Line::from(spans)
}

pub fn render_file_completion(
    frame: &mut Frame,
    completion: &FileCompletionState,
    area: Rect,
    input_top_y: u16,
    theme: &Theme,
) {
    use super::render_utils::{InputHint, OverlayConfig, render_overlay, render_separator};

    let file_count = completion.filtered.len();
    let visible_count = file_count.min(MAX_VISIBLE_FILES);

    let popup_width = 50;
    let base_height = if completion.loading || file_count == 0 {
        5
    } else {
        visible_count as u16 + 4
    };
    let popup_height = base_height.max(7);

    let title = if completion.loading {
        "Files (loading...)".to_string()
    } else {
        format!("Files ({file_count})")
    };
    let hints = [
        InputHint::new("↑↓", "nav"),
        InputHint::new("Enter", "insert"),
        InputHint::new("Tab", "insert, keep open"),
        InputHint::new("Esc", "close"),
    ];
    let layout = render_overlay(
        frame,
        area,
        input_top_y,
        theme,
        &OverlayConfig {
            title: &title,
            border_color: theme.accent,
            width: popup_width,
            height: popup_height,
            hints: &hints,
        },
    );

    if completion.loading {
        let loading_msg = Paragraph::new("Loading files...")
            .style(Style::default().fg(theme.dim))
            .alignment(Alignment::Center);
        frame.render_widget(loading_msg, layout.body);
        return;
    }

    if completion.filtered.is_empty() {
        let empty_msg = if completion.files.is_empty() {
            "No files found"
        } else {
            "No matches"
        };
        let msg = Paragraph::new(vec![
            Line::from(Span::styled(empty_msg, Style::default().fg(theme.dim))),
            Line::default(),
            Line::from(Span::styled(
                "Esc to close",
                Style::default().fg(theme.dim),
            )),
        ])
        .alignment(Alignment::Center);
        frame.render_widget(msg, layout.body);
        return;
    }

    let list_height = layout.body.height.saturating_sub(1) as usize;
    let list_area = Rect::new(
        layout.body.x,
        layout.body.y,
        layout.body.width,
        list_height as u16,
    );

    let items: Vec<ListItem> = completion
        .filtered
        .iter()
        .skip(completion.offset)
        .take(list_height)
        .filter_map(|file_match| {
            completion.files.get(file_match.file_idx).map(|path| {
                let path_str = path.to_string_lossy();
                let max_width = layout.body.width.saturating_sub(4) as usize;

                // Truncate from the start, keeping the end of the path, and
                // shift the match indices accordingly.
                let (display, adjusted_indices) = if path_str.width() > max_width {
                    let truncated = truncate_start_with_ellipsis(&path_str, max_width);
                    let ellipsis_len = "…".len();
                    // The kept tail is byte-identical to the original suffix,
                    // so indices shift by the cut prefix minus the ellipsis.
                    // Indices in the cut prefix are dropped.
                    let cut = path_str.len() - (truncated.len() - ellipsis_len);
                    let adjusted: Vec<usize> = file_match
                        .match_indices
                        .iter()
                        .filter_map(|&idx| (idx >= cut).then(|| idx - cut + ellipsis_len))
                        .collect();

                    (truncated, adjusted)
                } else {
                    (path_str.to_string(), file_match.match_indices.clone())
                };

                let line = build_highlighted_line(&display, &adjusted_indices, theme);
                ListItem::new(line)
            })
        })
        .collect();

    let list = List::new(items)
        .highlight_style(
            Style::default()
                .bg(theme.dim)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("▶ ");

    let mut list_state = ListState::default();
    let visible_selected = completion.selected.saturating_sub(completion.offset);
    list_state.select(Some(visible_selected));
    frame.render_stateful_widget(list, list_area, &mut list_state);

    render_separator(frame, layout.body, theme, list_height as u16);
}
