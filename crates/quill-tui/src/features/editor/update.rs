//! Editor feature reducer.
//!
//! Handles keyboard input for the draft: text editing, the attachment
//! delete mode, completion and palette triggers, and submission. All editor
//! state mutations happen here; cross-feature changes are returned as
//! mutations for the caller to apply.

use std::path::Path;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers as CrosstermKeyModifiers};
use quill_core::attachment::{is_extension_allowed, normalize_pasted_path};
use quill_core::config::AttachmentsConfig;

use super::CursorMove;
use super::state::EditorState;
use crate::common::TaskSeq;
use crate::effects::UiEffect;
use crate::features::transcript::TranscriptCell;
use crate::mutations::{StateMutation, TranscriptMutation};
use crate::overlays::OverlayRequest;

/// Result type for key handlers.
type KeyResult = (Vec<UiEffect>, Vec<StateMutation>, Option<OverlayRequest>);

/// Context for handling main key input.
///
/// Groups the contextual state needed to decide how to handle a key press,
/// avoiding excessive function parameters. `task_seq` is mutable so
/// handlers can mint ids for the effects they emit.
pub struct EditorContext<'a> {
    pub agent_busy: bool,
    pub root: &'a Path,
    pub attachments: &'a AttachmentsConfig,
    pub task_seq: &'a mut TaskSeq,
}

/// Handles paste events for the editor.
///
/// A paste whose text normalizes to a path with an allowed attachment
/// extension starts an asynchronous attachment load; everything else is
/// inserted as literal draft text. The remaining checks (regular file,
/// size, readability) run in the load task so the loop never touches the
/// filesystem, and a failed load falls back to the same literal insertion.
pub fn handle_paste(
    editor: &mut EditorState,
    ctx: &mut EditorContext<'_>,
    text: &str,
) -> Vec<UiEffect> {
    let path = normalize_pasted_path(text, ctx.root);
    if is_extension_allowed(&path, ctx.attachments) {
        let task = ctx.task_seq.next_id();
        return vec![UiEffect::LoadAttachment {
            task,
            path,
            pasted: text.to_string(),
        }];
    }

    insert_literal_paste(editor, text);
    vec![]
}

/// Inserts pasted text into the draft as-is, with line endings normalized.
pub fn insert_literal_paste(editor: &mut EditorState, text: &str) {
    let normalized = text.replace("\r\n", "\n").replace('\r', "\n");
    editor.buffer.insert_str(&normalized);
}

/// Handles main key input when no overlay is active.
pub fn handle_main_key(
    editor: &mut EditorState,
    ctx: &mut EditorContext<'_>,
    key: KeyEvent,
) -> KeyResult {
    let mods = Modifiers::from(&key);

    // Try each handler category in order; first match wins
    handle_delete_mode(editor, key.code, &mods)
        .or_else(|| handle_line_editing(editor, key.code, &mods))
        .or_else(|| handle_word_editing(editor, key.code, &mods))
        .or_else(|| handle_navigation(key.code, &mods))
        .or_else(|| handle_control_keys(editor, ctx, key.code, &mods))
        .or_else(|| handle_overlays(editor, key.code, &mods))
        .or_else(|| handle_submission(editor, ctx, key.code, &mods))
        .unwrap_or_else(|| handle_default_input(editor, key))
}

/// Applies an editing key that was routed past the file completion popup.
///
/// Same keys the default handler would forward to the buffer, plus the
/// newline binding so multi-line edits behave identically with the popup
/// open.
pub fn route_completion_editing(editor: &mut EditorState, key: KeyEvent) {
    let mods = Modifiers::from(&key);
    match key.code {
        KeyCode::Char('j') if mods.only_ctrl() => editor.buffer.insert_newline(),
        KeyCode::Char('a') if mods.only_ctrl() => editor.buffer.move_cursor(CursorMove::Head),
        KeyCode::Char('e') if mods.only_ctrl() => editor.buffer.move_cursor(CursorMove::End),
        KeyCode::Char('w') if mods.only_ctrl() => editor.buffer.delete_word_left(),
        _ => editor.buffer.input(key),
    }
}

/// Parsed key modifiers for cleaner pattern matching.
struct Modifiers {
    ctrl: bool,
    shift: bool,
    alt: bool,
    super_key: bool,
}

impl Modifiers {
    fn from(key: &KeyEvent) -> Self {
        Self {
            ctrl: key.modifiers.contains(CrosstermKeyModifiers::CONTROL),
            shift: key.modifiers.contains(CrosstermKeyModifiers::SHIFT),
            alt: key.modifiers.contains(CrosstermKeyModifiers::ALT),
            super_key: key.modifiers.contains(CrosstermKeyModifiers::SUPER),
        }
    }

    fn none(&self) -> bool {
        !self.ctrl && !self.shift && !self.alt && !self.super_key
    }

    fn only_ctrl(&self) -> bool {
        self.ctrl && !self.shift && !self.alt && !self.super_key
    }
}

// =============================================================================
// Delete mode: one digit deletes one attachment
// =============================================================================

fn handle_delete_mode(
    editor: &mut EditorState,
    code: KeyCode,
    mods: &Modifiers,
) -> Option<KeyResult> {
    if !editor.delete_mode {
        return None;
    }

    match code {
        // Digit: delete that attachment by display index. The mode always
        // clears after one digit; out-of-range digits delete nothing and
        // never reach the buffer.
        KeyCode::Char(c) if c.is_ascii_digit() && mods.none() => {
            editor.delete_mode = false;
            let index = c as usize - '0' as usize;
            editor.remove_attachment(index);
            Some((vec![], vec![], None))
        }
        // r: delete all attachments
        KeyCode::Char('r') if mods.none() => {
            editor.delete_mode = false;
            editor.clear_attachments();
            Some((vec![], vec![], None))
        }
        // Escape: leave the mode, attachments untouched
        KeyCode::Esc => {
            editor.delete_mode = false;
            Some((vec![], vec![], None))
        }
        _ => None,
    }
}

// =============================================================================
// Line editing: Ctrl+A, Ctrl+E, Ctrl+J
// =============================================================================

fn handle_line_editing(
    editor: &mut EditorState,
    code: KeyCode,
    mods: &Modifiers,
) -> Option<KeyResult> {
    match code {
        // Ctrl+A: move to beginning of line
        KeyCode::Char('a') if mods.only_ctrl() => {
            editor.buffer.move_cursor(CursorMove::Head);
            Some((vec![], vec![], None))
        }
        // Ctrl+E: move to end of line
        KeyCode::Char('e') if mods.only_ctrl() => {
            editor.buffer.move_cursor(CursorMove::End);
            Some((vec![], vec![], None))
        }
        // Ctrl+J: insert newline (like Shift+Enter in some editors)
        KeyCode::Char('j') if mods.only_ctrl() => {
            editor.buffer.insert_newline();
            Some((vec![], vec![], None))
        }
        _ => None,
    }
}

// =============================================================================
// Word editing: Ctrl+W
// =============================================================================

fn handle_word_editing(
    editor: &mut EditorState,
    code: KeyCode,
    mods: &Modifiers,
) -> Option<KeyResult> {
    match code {
        // Ctrl+W: delete word backward (common readline binding).
        // Alt+Backspace goes through the buffer's own input handling.
        KeyCode::Char('w') if mods.only_ctrl() => {
            editor.buffer.delete_word_left();
            Some((vec![], vec![], None))
        }
        _ => None,
    }
}

// =============================================================================
// Navigation: PageUp/Down scroll the transcript
// =============================================================================

fn handle_navigation(code: KeyCode, _mods: &Modifiers) -> Option<KeyResult> {
    match code {
        KeyCode::PageUp => Some((
            vec![],
            vec![StateMutation::Transcript(TranscriptMutation::PageUp)],
            None,
        )),
        KeyCode::PageDown => Some((
            vec![],
            vec![StateMutation::Transcript(TranscriptMutation::PageDown)],
            None,
        )),
        _ => None,
    }
}

// =============================================================================
// Control keys: Ctrl+C, Ctrl+R, Ctrl+O
// =============================================================================

fn handle_control_keys(
    editor: &mut EditorState,
    ctx: &EditorContext<'_>,
    code: KeyCode,
    mods: &Modifiers,
) -> Option<KeyResult> {
    match code {
        // Ctrl+C: clear the draft, or confirm quit when already empty
        KeyCode::Char('c') if mods.ctrl => {
            if editor.buffer.is_empty() && editor.attachments.is_empty() {
                Some((vec![], vec![], Some(OverlayRequest::QuitConfirm)))
            } else {
                editor.reset();
                Some((vec![], vec![], None))
            }
        }
        // Ctrl+R: arm delete mode; the next digit removes that attachment
        KeyCode::Char('r') if mods.only_ctrl() => {
            editor.delete_mode = true;
            Some((vec![], vec![], None))
        }
        // Ctrl+O: edit the draft in the external editor
        KeyCode::Char('o') if mods.only_ctrl() => {
            if ctx.agent_busy {
                Some((
                    vec![],
                    vec![StateMutation::Notice(
                        "Agent is busy, wait for the reply to finish.".to_string(),
                    )],
                    None,
                ))
            } else {
                Some((
                    vec![UiEffect::OpenExternalEditor {
                        text: editor.buffer.text(),
                    }],
                    vec![],
                    None,
                ))
            }
        }
        _ => None,
    }
}

// =============================================================================
// Overlays: command palette
// =============================================================================

fn handle_overlays(editor: &EditorState, code: KeyCode, mods: &Modifiers) -> Option<KeyResult> {
    match code {
        // `/` when the draft is empty: open command palette, no insertion
        KeyCode::Char('/') if mods.none() && editor.buffer.is_empty() => {
            Some((vec![], vec![], Some(OverlayRequest::CommandPalette)))
        }
        // Ctrl+P: open command palette
        KeyCode::Char('p') if mods.only_ctrl() => {
            Some((vec![], vec![], Some(OverlayRequest::CommandPalette)))
        }
        _ => None,
    }
}

// =============================================================================
// Submission: Enter key
// =============================================================================

fn handle_submission(
    editor: &mut EditorState,
    ctx: &mut EditorContext<'_>,
    code: KeyCode,
    mods: &Modifiers,
) -> Option<KeyResult> {
    match code {
        KeyCode::Enter if !mods.shift && !mods.alt => Some(submit_draft(editor, ctx)),
        _ => None,
    }
}

// =============================================================================
// Default input handling: character insertion, cursor keys, deletion
// =============================================================================

fn handle_default_input(editor: &mut EditorState, key: KeyEvent) -> KeyResult {
    let mods = Modifiers::from(&key);

    // `@` in an empty spot starts a file completion session anchored where
    // the `@` lands. Mid-word `@` (emails, handles) stays plain text.
    if key.code == KeyCode::Char('@') && !mods.ctrl && !mods.alt {
        let anchor = editor.buffer.cursor_offset();
        let opens = editor
            .buffer
            .char_before_cursor()
            .is_none_or(char::is_whitespace);
        editor.buffer.input(key);
        if opens {
            return (
                vec![],
                vec![],
                Some(OverlayRequest::FileCompletion { anchor }),
            );
        }
        return (vec![], vec![], None);
    }

    editor.buffer.input(key);
    (vec![], vec![], None)
}

// =============================================================================
// Draft submission logic
// =============================================================================

/// Handles draft submission.
fn submit_draft(editor: &mut EditorState, ctx: &mut EditorContext<'_>) -> KeyResult {
    let text = editor.buffer.text();

    // A trailing backslash continues the message on the next line instead
    // of sending.
    if text.ends_with('\\') {
        editor.buffer.move_to_end();
        editor.buffer.delete_prev_char();
        editor.buffer.insert_newline();
        return (vec![], vec![], None);
    }

    let trimmed = text.trim();

    if trimmed == "exit" || trimmed == "quit" {
        editor.reset();
        return (vec![], vec![], Some(OverlayRequest::QuitConfirm));
    }

    if trimmed.is_empty() {
        return (vec![], vec![], None);
    }

    let message = trimmed.to_string();
    let attachments = editor.take_attachments();
    editor.reset();

    let attachment_names = attachments.iter().map(|a| a.file_name.clone()).collect();
    let task = ctx.task_seq.next_id();

    (
        vec![UiEffect::SendMessage {
            task,
            text: message.clone(),
            attachments,
        }],
        vec![StateMutation::Transcript(TranscriptMutation::AppendCell(
            TranscriptCell::user(message, attachment_names),
        ))],
        None,
    )
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use crossterm::event::{KeyEventKind, KeyEventState};
    use quill_core::attachment::Attachment;

    use super::*;
    use crate::common::TaskId;

    fn make_key(code: KeyCode) -> KeyEvent {
        KeyEvent {
            code,
            modifiers: CrosstermKeyModifiers::NONE,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        }
    }

    fn ctrl_key(c: char) -> KeyEvent {
        KeyEvent {
            code: KeyCode::Char(c),
            modifiers: CrosstermKeyModifiers::CONTROL,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        }
    }

    fn attachment(name: &str) -> Attachment {
        Attachment {
            file_path: PathBuf::from(format!("/tmp/{name}")),
            file_name: name.to_string(),
            mime_type: "image/png".to_string(),
            content: vec![0xff],
        }
    }

    struct Harness {
        editor: EditorState,
        root: PathBuf,
        attachments: AttachmentsConfig,
        task_seq: TaskSeq,
    }

    impl Harness {
        fn new() -> Self {
            Self {
                editor: EditorState::default(),
                root: PathBuf::from("."),
                attachments: AttachmentsConfig::default(),
                task_seq: TaskSeq::default(),
            }
        }

        fn key(&mut self, key: KeyEvent) -> KeyResult {
            let mut ctx = EditorContext {
                agent_busy: false,
                root: &self.root,
                attachments: &self.attachments,
                task_seq: &mut self.task_seq,
            };
            handle_main_key(&mut self.editor, &mut ctx, key)
        }

        fn key_busy(&mut self, key: KeyEvent) -> KeyResult {
            let mut ctx = EditorContext {
                agent_busy: true,
                root: &self.root,
                attachments: &self.attachments,
                task_seq: &mut self.task_seq,
            };
            handle_main_key(&mut self.editor, &mut ctx, key)
        }

        fn type_str(&mut self, text: &str) {
            for c in text.chars() {
                self.key(make_key(KeyCode::Char(c)));
            }
        }
    }

    // ---- palette and completion triggers ----

    #[test]
    fn slash_on_empty_draft_opens_palette_without_inserting() {
        let mut h = Harness::new();
        let (_, _, request) = h.key(make_key(KeyCode::Char('/')));
        assert!(matches!(request, Some(OverlayRequest::CommandPalette)));
        assert!(h.editor.buffer.is_empty());
    }

    #[test]
    fn slash_in_nonempty_draft_is_plain_text() {
        let mut h = Harness::new();
        h.type_str("a");
        let (_, _, request) = h.key(make_key(KeyCode::Char('/')));
        assert!(request.is_none());
        assert_eq!(h.editor.buffer.text(), "a/");
    }

    #[test]
    fn at_sign_on_empty_draft_opens_completion_at_offset_zero() {
        let mut h = Harness::new();
        let (_, _, request) = h.key(make_key(KeyCode::Char('@')));
        assert!(matches!(
            request,
            Some(OverlayRequest::FileCompletion { anchor: 0 })
        ));
        assert_eq!(h.editor.buffer.text(), "@");
    }

    #[test]
    fn at_sign_after_whitespace_opens_completion_at_its_offset() {
        let mut h = Harness::new();
        h.type_str("look at ");
        let (_, _, request) = h.key(make_key(KeyCode::Char('@')));
        assert!(matches!(
            request,
            Some(OverlayRequest::FileCompletion { anchor: 8 })
        ));
        assert_eq!(h.editor.buffer.text(), "look at @");
    }

    #[test]
    fn at_sign_mid_word_stays_plain_text() {
        let mut h = Harness::new();
        h.type_str("user");
        let (_, _, request) = h.key(make_key(KeyCode::Char('@')));
        assert!(request.is_none());
        assert_eq!(h.editor.buffer.text(), "user@");
    }

    #[test]
    fn at_sign_at_start_of_second_line_opens_completion() {
        let mut h = Harness::new();
        h.type_str("hi");
        h.key(ctrl_key('j'));
        let (_, _, request) = h.key(make_key(KeyCode::Char('@')));
        assert!(matches!(
            request,
            Some(OverlayRequest::FileCompletion { anchor: 3 })
        ));
    }

    // ---- delete mode ----

    #[test]
    fn delete_mode_digit_zero_removes_first_attachment() {
        let mut h = Harness::new();
        h.editor.add_attachment(attachment("a.png"));
        h.editor.add_attachment(attachment("b.png"));

        h.key(ctrl_key('r'));
        assert!(h.editor.delete_mode);

        h.key(make_key(KeyCode::Char('0')));
        assert!(!h.editor.delete_mode);
        let names: Vec<&str> = h
            .editor
            .attachments
            .iter()
            .map(|a| a.file_name.as_str())
            .collect();
        assert_eq!(names, ["b.png"]);
        assert!(h.editor.buffer.is_empty());
    }

    #[test]
    fn delete_mode_digit_removes_exact_index() {
        let mut h = Harness::new();
        for name in ["a.png", "b.png", "c.png", "d.png"] {
            h.editor.add_attachment(attachment(name));
        }

        h.key(ctrl_key('r'));
        h.key(make_key(KeyCode::Char('2')));

        let names: Vec<&str> = h
            .editor
            .attachments
            .iter()
            .map(|a| a.file_name.as_str())
            .collect();
        assert_eq!(names, ["a.png", "b.png", "d.png"]);
    }

    #[test]
    fn delete_mode_out_of_range_digit_is_a_consumed_noop() {
        let mut h = Harness::new();
        h.editor.add_attachment(attachment("only.png"));

        h.key(ctrl_key('r'));
        h.key(make_key(KeyCode::Char('2')));

        assert!(!h.editor.delete_mode);
        assert_eq!(h.editor.attachments.len(), 1);
        // the digit never reaches the draft
        assert!(h.editor.buffer.is_empty());
    }

    #[test]
    fn delete_mode_r_removes_all_attachments() {
        let mut h = Harness::new();
        h.editor.add_attachment(attachment("a.png"));
        h.editor.add_attachment(attachment("b.png"));

        h.key(ctrl_key('r'));
        h.key(make_key(KeyCode::Char('r')));

        assert!(!h.editor.delete_mode);
        assert!(h.editor.attachments.is_empty());
        assert!(h.editor.buffer.is_empty());
    }

    #[test]
    fn delete_mode_escape_only_clears_the_flag() {
        let mut h = Harness::new();
        h.editor.add_attachment(attachment("a.png"));

        h.key(ctrl_key('r'));
        h.key(make_key(KeyCode::Esc));

        assert!(!h.editor.delete_mode);
        assert_eq!(h.editor.attachments.len(), 1);
    }

    #[test]
    fn delete_mode_leaves_other_keys_alone() {
        let mut h = Harness::new();
        h.key(ctrl_key('r'));
        h.key(make_key(KeyCode::Char('x')));
        // non-digit keys edit the draft as usual; the mode stays armed
        assert_eq!(h.editor.buffer.text(), "x");
        assert!(h.editor.delete_mode);
    }

    // ---- external editor ----

    #[test]
    fn external_editor_carries_current_draft() {
        let mut h = Harness::new();
        h.type_str("wip");
        let (effects, _, _) = h.key(ctrl_key('o'));
        assert!(matches!(
            &effects[0],
            UiEffect::OpenExternalEditor { text } if text == "wip"
        ));
    }

    #[test]
    fn external_editor_warns_when_agent_is_busy() {
        let mut h = Harness::new();
        h.type_str("wip");
        let (effects, mutations, _) = h.key_busy(ctrl_key('o'));
        assert!(effects.is_empty());
        assert!(
            mutations
                .iter()
                .any(|m| matches!(m, StateMutation::Notice(_)))
        );
        assert_eq!(h.editor.buffer.text(), "wip");
    }

    // ---- submission ----

    #[test]
    fn enter_sends_trimmed_text_and_detaches_attachments() {
        let mut h = Harness::new();
        h.type_str("  hello there  ");
        h.editor.add_attachment(attachment("shot.png"));

        let (effects, mutations, _) = h.key(make_key(KeyCode::Enter));

        assert!(matches!(
            &effects[0],
            UiEffect::SendMessage { text, attachments, .. }
                if text == "hello there" && attachments.len() == 1
        ));
        assert!(mutations.iter().any(|m| matches!(
            m,
            StateMutation::Transcript(TranscriptMutation::AppendCell(_))
        )));
        assert!(h.editor.buffer.is_empty());
        assert!(h.editor.attachments.is_empty());
    }

    #[test]
    fn enter_on_empty_draft_is_a_noop() {
        let mut h = Harness::new();
        let (effects, mutations, request) = h.key(make_key(KeyCode::Enter));
        assert!(effects.is_empty());
        assert!(mutations.is_empty());
        assert!(request.is_none());
    }

    #[test]
    fn enter_on_whitespace_draft_is_a_noop() {
        let mut h = Harness::new();
        h.type_str("   ");
        let (effects, _, _) = h.key(make_key(KeyCode::Enter));
        assert!(effects.is_empty());
    }

    #[test]
    fn trailing_backslash_continues_line_instead_of_sending() {
        let mut h = Harness::new();
        h.type_str("first line\\");

        let (effects, _, _) = h.key(make_key(KeyCode::Enter));

        assert!(effects.is_empty());
        assert_eq!(h.editor.buffer.text(), "first line\n");

        h.type_str("second");
        let (effects, _, _) = h.key(make_key(KeyCode::Enter));
        assert!(matches!(
            &effects[0],
            UiEffect::SendMessage { text, .. } if text == "first line\nsecond"
        ));
    }

    #[test]
    fn exit_keyword_opens_quit_dialog_without_sending() {
        let mut h = Harness::new();
        h.type_str("exit");

        let (effects, _, request) = h.key(make_key(KeyCode::Enter));

        assert!(effects.is_empty());
        assert!(matches!(request, Some(OverlayRequest::QuitConfirm)));
        assert!(h.editor.buffer.is_empty());
    }

    #[test]
    fn quit_keyword_with_whitespace_also_opens_quit_dialog() {
        let mut h = Harness::new();
        h.type_str("  quit  ");
        let (_, _, request) = h.key(make_key(KeyCode::Enter));
        assert!(matches!(request, Some(OverlayRequest::QuitConfirm)));
    }

    #[test]
    fn ctrl_c_clears_draft_then_asks_to_quit() {
        let mut h = Harness::new();
        h.type_str("draft");
        h.editor.add_attachment(attachment("a.png"));

        let (_, _, request) = h.key(ctrl_key('c'));
        assert!(request.is_none());
        assert!(h.editor.buffer.is_empty());
        assert!(h.editor.attachments.is_empty());

        let (_, _, request) = h.key(ctrl_key('c'));
        assert!(matches!(request, Some(OverlayRequest::QuitConfirm)));
    }

    #[test]
    fn send_effects_get_distinct_task_ids() {
        let mut h = Harness::new();
        h.type_str("one");
        let (first, _, _) = h.key(make_key(KeyCode::Enter));
        h.type_str("two");
        let (second, _, _) = h.key(make_key(KeyCode::Enter));

        let (UiEffect::SendMessage { task: a, .. }, UiEffect::SendMessage { task: b, .. }) =
            (&first[0], &second[0])
        else {
            panic!("expected send effects");
        };
        assert_ne!(a, b);
    }

    // ---- paste ----

    #[test]
    fn paste_with_allowed_extension_starts_attachment_load() {
        let mut h = Harness::new();
        let mut ctx = EditorContext {
            agent_busy: false,
            root: &h.root,
            attachments: &h.attachments,
            task_seq: &mut h.task_seq,
        };

        let effects = handle_paste(&mut h.editor, &mut ctx, "/tmp/photo.png");

        assert!(matches!(
            &effects[0],
            UiEffect::LoadAttachment { task: TaskId(0), path, .. }
                if path == &PathBuf::from("/tmp/photo.png")
        ));
        assert!(h.editor.buffer.is_empty());
    }

    #[test]
    fn paste_with_escaped_spaces_normalizes_the_path() {
        let mut h = Harness::new();
        let mut ctx = EditorContext {
            agent_busy: false,
            root: &h.root,
            attachments: &h.attachments,
            task_seq: &mut h.task_seq,
        };

        let effects = handle_paste(&mut h.editor, &mut ctx, "/tmp/my\\ photo.png");

        assert!(matches!(
            &effects[0],
            UiEffect::LoadAttachment { path, .. }
                if path == &PathBuf::from("/tmp/my photo.png")
        ));
    }

    #[test]
    fn paste_with_disallowed_extension_inserts_literal_text() {
        let mut h = Harness::new();
        let mut ctx = EditorContext {
            agent_busy: false,
            root: &h.root,
            attachments: &h.attachments,
            task_seq: &mut h.task_seq,
        };

        let effects = handle_paste(&mut h.editor, &mut ctx, "/tmp/notes.txt");

        assert!(effects.is_empty());
        assert_eq!(h.editor.buffer.text(), "/tmp/notes.txt");
    }

    #[test]
    fn paste_of_plain_prose_inserts_literal_text() {
        let mut h = Harness::new();
        let mut ctx = EditorContext {
            agent_busy: false,
            root: &h.root,
            attachments: &h.attachments,
            task_seq: &mut h.task_seq,
        };

        let effects = handle_paste(&mut h.editor, &mut ctx, "just some words");

        assert!(effects.is_empty());
        assert_eq!(h.editor.buffer.text(), "just some words");
    }

    #[test]
    fn paste_normalizes_crlf_line_endings() {
        let mut h = Harness::new();
        insert_literal_paste(&mut h.editor, "one\r\ntwo");
        assert_eq!(h.editor.buffer.text(), "one\ntwo");
    }

    // ---- routed keys while completion is open ----

    #[test]
    fn routed_ctrl_j_inserts_newline() {
        let mut editor = EditorState::default();
        editor.buffer.insert_str("@src");
        route_completion_editing(&mut editor, ctrl_key('j'));
        assert_eq!(editor.buffer.text(), "@src\n");
    }

    #[test]
    fn routed_backspace_edits_the_draft() {
        let mut editor = EditorState::default();
        editor.buffer.insert_str("@src");
        route_completion_editing(&mut editor, make_key(KeyCode::Backspace));
        assert_eq!(editor.buffer.text(), "@sr");
    }
}
