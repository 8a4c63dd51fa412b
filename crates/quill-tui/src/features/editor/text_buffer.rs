//! Multi-line text buffer for the draft message.
//!
//! Line storage with a (row, col) cursor in char units. On top of the basic
//! editing operations it exposes the byte-offset view the completion session
//! works in: `cursor_offset`, `word_at_cursor`, and `delete_range` all speak
//! byte offsets into the `\n`-joined text.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

/// Cursor movement commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorMove {
    Up,
    Down,
    Forward,
    Back,
    Head,
    End,
    Top,
    Bottom,
}

/// The draft text with a cursor.
#[derive(Debug, Clone)]
pub struct TextBuffer {
    lines: Vec<String>,
    cursor_row: usize,
    cursor_col: usize,
}

impl Default for TextBuffer {
    fn default() -> Self {
        Self {
            lines: vec![String::new()],
            cursor_row: 0,
            cursor_col: 0,
        }
    }
}

impl TextBuffer {
    /// Returns all lines in the buffer.
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Returns the full text with lines joined by `\n`.
    pub fn text(&self) -> String {
        self.lines.join("\n")
    }

    /// Returns true if the buffer holds no text at all.
    pub fn is_empty(&self) -> bool {
        self.lines.iter().all(String::is_empty)
    }

    /// Returns the current cursor position as (row, col) in char units.
    pub fn cursor(&self) -> (usize, usize) {
        (self.cursor_row, self.cursor_col)
    }

    /// Returns the byte offset of the cursor in the joined text.
    pub fn cursor_offset(&self) -> usize {
        let mut offset = 0;
        for line in &self.lines[..self.cursor_row] {
            offset += line.len() + 1;
        }
        offset + char_to_byte_index(&self.lines[self.cursor_row], self.cursor_col)
    }

    /// Returns the character immediately before the cursor.
    ///
    /// At the start of a non-first line this is the joining `\n`; at the very
    /// start of the buffer there is none.
    pub fn char_before_cursor(&self) -> Option<char> {
        if self.cursor_col > 0 {
            return self.lines[self.cursor_row].chars().nth(self.cursor_col - 1);
        }
        if self.cursor_row > 0 {
            return Some('\n');
        }
        None
    }

    /// Returns the whitespace-delimited token at the cursor with its byte
    /// offset in the joined text.
    ///
    /// The token is the run of non-whitespace characters the cursor sits
    /// inside or immediately after. With the cursor at the start of a line or
    /// right after whitespace there is no token.
    pub fn word_at_cursor(&self) -> Option<(usize, String)> {
        let line = &self.lines[self.cursor_row];
        let chars: Vec<char> = line.chars().collect();
        let col = self.cursor_col.min(chars.len());

        if col == 0 || chars[col - 1].is_whitespace() {
            return None;
        }

        let mut start = col;
        while start > 0 && !chars[start - 1].is_whitespace() {
            start -= 1;
        }
        let mut end = col;
        while end < chars.len() && !chars[end].is_whitespace() {
            end += 1;
        }

        let mut line_start = 0;
        for prev in &self.lines[..self.cursor_row] {
            line_start += prev.len() + 1;
        }

        let word: String = chars[start..end].iter().collect();
        Some((line_start + char_to_byte_index(line, start), word))
    }

    /// Inserts a string at the cursor, advancing the cursor.
    pub fn insert_str(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }

        let row = self.cursor_row;

        if !text.contains('\n') {
            let line = &mut self.lines[row];
            let byte_idx = char_to_byte_index(line, self.cursor_col);
            line.insert_str(byte_idx, text);
            self.cursor_col += text.chars().count();
            return;
        }

        let current_line = self.lines[row].clone();
        let byte_idx = char_to_byte_index(&current_line, self.cursor_col);
        let (prefix, suffix) = current_line.split_at(byte_idx);

        let parts: Vec<&str> = text.split('\n').collect();

        let mut new_lines: Vec<String> = Vec::with_capacity(parts.len());
        new_lines.push(format!("{}{}", prefix, parts[0]));
        if parts.len() > 2 {
            for part in &parts[1..parts.len() - 1] {
                new_lines.push((*part).to_string());
            }
        }
        new_lines.push(format!("{}{}", parts[parts.len() - 1], suffix));

        self.lines.splice(row..=row, new_lines);
        self.cursor_row = row + parts.len() - 1;
        self.cursor_col = parts[parts.len() - 1].chars().count();
    }

    /// Inserts a single character at the cursor.
    pub fn insert_char(&mut self, ch: char) {
        if ch == '\n' {
            self.insert_newline();
            return;
        }
        let mut buf = [0u8; 4];
        self.insert_str(ch.encode_utf8(&mut buf));
    }

    /// Inserts a newline at the cursor.
    pub fn insert_newline(&mut self) {
        self.insert_str("\n");
    }

    /// Replaces the whole buffer, leaving the cursor at the end.
    pub fn set_text(&mut self, text: &str) {
        self.clear();
        self.insert_str(text);
    }

    /// Empties the buffer and resets the cursor.
    pub fn clear(&mut self) {
        self.lines.clear();
        self.lines.push(String::new());
        self.cursor_row = 0;
        self.cursor_col = 0;
    }

    /// Deletes the character at the cursor (Delete key semantics).
    pub fn delete_next_char(&mut self) {
        let row = self.cursor_row;
        let col = self.cursor_col;
        let line_len = line_char_len(&self.lines[row]);

        if col >= line_len {
            if row + 1 < self.lines.len() {
                let next = self.lines.remove(row + 1);
                self.lines[row].push_str(&next);
            }
            return;
        }

        let line = &mut self.lines[row];
        let start = char_to_byte_index(line, col);
        let end = char_to_byte_index(line, col + 1);
        line.replace_range(start..end, "");
    }

    /// Deletes the character before the cursor (Backspace semantics).
    pub fn delete_prev_char(&mut self) {
        if self.cursor_col > 0 {
            let row = self.cursor_row;
            let col = self.cursor_col - 1;
            let line = &mut self.lines[row];
            let start = char_to_byte_index(line, col);
            let end = char_to_byte_index(line, col + 1);
            line.replace_range(start..end, "");
            self.cursor_col = col;
            return;
        }

        if self.cursor_row == 0 {
            return;
        }

        let row = self.cursor_row;
        let prev_len = line_char_len(&self.lines[row - 1]);
        let current = self.lines.remove(row);
        self.lines[row - 1].push_str(&current);
        self.cursor_row = row - 1;
        self.cursor_col = prev_len;
    }

    /// Deletes the byte range `start..end` of the joined text, leaving the
    /// cursor at `start`.
    pub fn delete_range(&mut self, start: usize, end: usize) {
        if start >= end {
            return;
        }

        let (start_row, start_col) = self.offset_to_cursor(start);
        let (end_row, end_col) = self.offset_to_cursor(end);

        if start_row == end_row {
            let line = &mut self.lines[start_row];
            let start_byte = char_to_byte_index(line, start_col);
            let end_byte = char_to_byte_index(line, end_col);
            line.replace_range(start_byte..end_byte, "");
        } else {
            let start_line = self.lines[start_row].clone();
            let end_line = self.lines[end_row].clone();
            let start_byte = char_to_byte_index(&start_line, start_col);
            let end_byte = char_to_byte_index(&end_line, end_col);

            let merged = format!("{}{}", &start_line[..start_byte], &end_line[end_byte..]);
            self.lines.splice(start_row..=end_row, [merged]);
        }

        self.cursor_row = start_row;
        self.cursor_col = start_col;
    }

    /// Deletes the word immediately to the left of the cursor.
    pub fn delete_word_left(&mut self) {
        if self.cursor_row == 0 && self.cursor_col == 0 {
            return;
        }

        if self.cursor_col == 0 {
            self.delete_prev_char();
            return;
        }

        let line = &self.lines[self.cursor_row];
        let chars: Vec<char> = line.chars().collect();
        let start_col = scan_left_segment(&chars, self.cursor_col.min(chars.len()));

        let line = &mut self.lines[self.cursor_row];
        let start = char_to_byte_index(line, start_col);
        let end = char_to_byte_index(line, self.cursor_col);
        line.replace_range(start..end, "");
        self.cursor_col = start_col;
    }

    /// Moves the cursor according to a movement command.
    pub fn move_cursor(&mut self, movement: CursorMove) {
        match movement {
            CursorMove::Up => {
                if self.cursor_row > 0 {
                    self.cursor_row -= 1;
                    self.clamp_col();
                }
            }
            CursorMove::Down => {
                if self.cursor_row + 1 < self.lines.len() {
                    self.cursor_row += 1;
                    self.clamp_col();
                }
            }
            CursorMove::Forward => {
                let len = line_char_len(&self.lines[self.cursor_row]);
                if self.cursor_col < len {
                    self.cursor_col += 1;
                } else if self.cursor_row + 1 < self.lines.len() {
                    self.cursor_row += 1;
                    self.cursor_col = 0;
                }
            }
            CursorMove::Back => {
                if self.cursor_col > 0 {
                    self.cursor_col -= 1;
                } else if self.cursor_row > 0 {
                    self.cursor_row -= 1;
                    self.cursor_col = line_char_len(&self.lines[self.cursor_row]);
                }
            }
            CursorMove::Head => {
                self.cursor_col = 0;
            }
            CursorMove::End => {
                self.cursor_col = line_char_len(&self.lines[self.cursor_row]);
            }
            CursorMove::Top => {
                self.cursor_row = 0;
                self.clamp_col();
            }
            CursorMove::Bottom => {
                self.cursor_row = self.lines.len().saturating_sub(1);
                self.clamp_col();
            }
        }
    }

    /// Moves the cursor past the last character of the buffer.
    pub fn move_to_end(&mut self) {
        self.move_cursor(CursorMove::Bottom);
        self.move_cursor(CursorMove::End);
    }

    /// Handles a key input for basic editing.
    pub fn input(&mut self, key: KeyEvent) {
        if matches!(key.kind, KeyEventKind::Release) {
            return;
        }

        if key.code == KeyCode::Backspace && key.modifiers.contains(KeyModifiers::ALT) {
            self.delete_word_left();
            return;
        }

        match key.code {
            KeyCode::Char(ch)
                if !key
                    .modifiers
                    .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) =>
            {
                self.insert_char(ch);
            }
            KeyCode::Enter => self.insert_newline(),
            KeyCode::Backspace => self.delete_prev_char(),
            KeyCode::Delete => self.delete_next_char(),
            KeyCode::Left => self.move_cursor(CursorMove::Back),
            KeyCode::Right => self.move_cursor(CursorMove::Forward),
            KeyCode::Up => self.move_cursor(CursorMove::Up),
            KeyCode::Down => self.move_cursor(CursorMove::Down),
            KeyCode::Home => self.move_cursor(CursorMove::Head),
            KeyCode::End => self.move_cursor(CursorMove::End),
            _ => {}
        }
    }

    /// Converts a byte offset in the joined text to a (row, col) cursor.
    fn offset_to_cursor(&self, offset: usize) -> (usize, usize) {
        let mut line_start = 0;
        for (row, line) in self.lines.iter().enumerate() {
            let line_end = line_start + line.len();
            if offset <= line_end {
                let col = line[..offset - line_start].chars().count();
                return (row, col);
            }
            line_start = line_end + 1;
        }

        let last = self.lines.len() - 1;
        (last, line_char_len(&self.lines[last]))
    }

    fn clamp_col(&mut self) {
        let len = line_char_len(&self.lines[self.cursor_row]);
        self.cursor_col = self.cursor_col.min(len);
    }
}

fn line_char_len(line: &str) -> usize {
    line.chars().count()
}

fn char_to_byte_index(line: &str, col: usize) -> usize {
    if col == 0 {
        return 0;
    }
    line.char_indices()
        .nth(col)
        .map_or(line.len(), |(i, _)| i)
}

/// Scans left over one run of same-class characters (word, punctuation, or
/// whitespace), returning the new column.
fn scan_left_segment(chars: &[char], mut idx: usize) -> usize {
    #[derive(PartialEq)]
    enum Class {
        Whitespace,
        Word,
        Punct,
    }
    fn class(c: char) -> Class {
        if c.is_whitespace() {
            Class::Whitespace
        } else if c.is_alphanumeric() || c == '_' {
            Class::Word
        } else {
            Class::Punct
        }
    }

    if idx == 0 {
        return 0;
    }
    let first = class(chars[idx - 1]);
    while idx > 0 && class(chars[idx - 1]) == first {
        idx -= 1;
    }
    idx
}
