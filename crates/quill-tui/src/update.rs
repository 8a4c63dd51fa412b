//! TUI reducer (update function).
//!
//! All state mutations happen here. The runtime calls `update(app, event)`
//! and executes the returned effects.
//!
//! This is the single source of truth for how events modify state.

use std::path::PathBuf;

use crossterm::event::{Event, KeyEvent, KeyEventKind};

use crate::common::TaskKind;
use crate::effects::UiEffect;
use crate::events::{RejectedPaste, UiEvent};
use crate::features::editor::{self, EditorContext};
use crate::features::transcript::TranscriptCell;
use crate::mutations::StateMutation;
use crate::overlays::{self, FileCompletionState, Overlay};
use crate::state::{AppState, TuiState};

/// The main reducer function.
///
/// Takes the current state and an event, mutates state, and returns effects
/// for the runtime to execute.
pub fn update(app: &mut AppState, event: UiEvent) -> Vec<UiEffect> {
    match event {
        UiEvent::Tick => {
            app.tui.spinner_frame = app.tui.spinner_frame.wrapping_add(1);
            app.tui.expire_notice();
            vec![]
        }
        UiEvent::Terminal(term_event) => handle_terminal_event(app, term_event),
        UiEvent::TaskStarted { kind, started } => {
            app.tui.tasks.state_mut(kind).on_started(&started);
            vec![]
        }
        UiEvent::TaskCompleted { kind, completed } => {
            // Results from superseded tasks (a newer id took over the slot)
            // are dropped; the live one recurses through the reducer.
            let ok = app.tui.tasks.state_mut(kind).finish_if_active(completed.id);
            if ok {
                update(app, *completed.result)
            } else {
                vec![]
            }
        }
        UiEvent::FilesListed { result } => handle_files_listed(app, result),
        UiEvent::FilePicked { result } => handle_file_picked(&mut app.tui, result),
        UiEvent::EditorFinished { result } => handle_editor_finished(&mut app.tui, result),
        UiEvent::AgentReplied { text } => {
            app.tui.transcript.push_cell(TranscriptCell::agent(text));
            vec![]
        }
    }
}

// ============================================================================
// Async result handlers
// ============================================================================

fn handle_files_listed(app: &mut AppState, result: Result<Vec<PathBuf>, String>) -> Vec<UiEffect> {
    match result {
        Ok(files) => overlays::handle_files_listed(&mut app.overlay, files),
        Err(error) => {
            if matches!(app.overlay, Some(Overlay::FileCompletion(_))) {
                app.overlay = None;
            }
            app.tui
                .set_notice(format!("Failed to list files: {error}"));
        }
    }
    vec![]
}

fn handle_file_picked(
    tui: &mut TuiState,
    result: Result<quill_core::attachment::Attachment, RejectedPaste>,
) -> Vec<UiEffect> {
    match result {
        Ok(attachment) => {
            let name = attachment.file_name.clone();
            if tui.editor.add_attachment(attachment) {
                tui.set_notice(format!("Attached {name}."));
            } else {
                tui.set_notice(format!(
                    "Cannot attach more than {} files.",
                    editor::MAX_ATTACHMENTS
                ));
            }
        }
        Err(rejected) => {
            // The paste never was a loadable file; fall back to treating it
            // as ordinary draft text.
            editor::insert_literal_paste(&mut tui.editor, &rejected.text);
            tui.set_notice(format!("Not attached: {}", rejected.reason));
        }
    }
    vec![]
}

fn handle_editor_finished(
    tui: &mut TuiState,
    result: Result<Option<String>, String>,
) -> Vec<UiEffect> {
    match result {
        Ok(Some(text)) => {
            if text.trim().is_empty() {
                tui.set_notice("Message is empty.");
            } else {
                tui.editor.buffer.set_text(&text);
                tui.editor.buffer.move_to_end();
            }
        }
        // Editor exited nonzero: treated as cancel, draft untouched.
        Ok(None) => {}
        Err(error) => tui.set_notice(format!("Editor failed: {error}")),
    }
    vec![]
}

// ============================================================================
// Terminal event handlers
// ============================================================================

fn handle_terminal_event(app: &mut AppState, event: Event) -> Vec<UiEffect> {
    match event {
        Event::Key(key) if key.kind != KeyEventKind::Release => handle_key(app, key),
        Event::Paste(text) => handle_paste(app, &text),
        _ => vec![],
    }
}

fn handle_key(app: &mut AppState, key: KeyEvent) -> Vec<UiEffect> {
    // Editing keys keep flowing into the draft while the completion popup is
    // open; afterwards the session re-derives its query from the token at
    // the cursor and may close itself.
    if let Some(Overlay::FileCompletion(completion)) = app.overlay.as_mut()
        && FileCompletionState::should_route_input_key(key)
    {
        editor::route_completion_editing(&mut app.tui.editor, key);
        if completion.update_from_editor(&app.tui.editor) {
            app.overlay = None;
            return vec![close_listing_effect()];
        }
        return vec![];
    }

    if let Some(mut update) = overlays::handle_overlay_key(&app.tui, &mut app.overlay, key) {
        apply_mutations(&mut app.tui, std::mem::take(&mut update.mutations));
        return apply_overlay_update(app, update);
    }

    // No overlay active: the editor owns the key.
    let tui = &mut app.tui;
    let agent_busy = tui.is_agent_busy();
    let mut ctx = EditorContext {
        agent_busy,
        root: &tui.root,
        attachments: &tui.config.attachments,
        task_seq: &mut tui.task_seq,
    };
    let (effects, mutations, overlay_request) =
        editor::handle_main_key(&mut tui.editor, &mut ctx, key);
    apply_mutations(tui, mutations);

    if let Some(request) = overlay_request
        && app.overlay.is_none()
    {
        let mut overlay_effects = open_overlay_request(app, request);
        overlay_effects.extend(effects);
        return overlay_effects;
    }

    effects
}

fn handle_paste(app: &mut AppState, text: &str) -> Vec<UiEffect> {
    match app.overlay.as_mut() {
        // Pasting into an open completion session edits the query like
        // typing would.
        Some(Overlay::FileCompletion(completion)) => {
            editor::insert_literal_paste(&mut app.tui.editor, text);
            if completion.update_from_editor(&app.tui.editor) {
                app.overlay = None;
                return vec![close_listing_effect()];
            }
            vec![]
        }
        Some(_) => vec![],
        None => {
            let tui = &mut app.tui;
            let mut ctx = EditorContext {
                agent_busy: tui.tasks.agent_turn.is_running(),
                root: &tui.root,
                attachments: &tui.config.attachments,
                task_seq: &mut tui.task_seq,
            };
            editor::handle_paste(&mut tui.editor, &mut ctx, text)
        }
    }
}

// ============================================================================
// StateMutation dispatcher
// ============================================================================

fn apply_mutations(tui: &mut TuiState, mutations: Vec<StateMutation>) {
    for mutation in mutations {
        match mutation {
            StateMutation::Editor(mutation) => tui.editor.apply(mutation),
            StateMutation::Transcript(mutation) => tui.transcript.apply(mutation),
            StateMutation::Notice(text) => tui.set_notice(text),
        }
    }
}

// ============================================================================
// Overlay transitions
// ============================================================================

/// Cancels the file listing backing a completion session that is going away.
fn close_listing_effect() -> UiEffect {
    UiEffect::CancelTask {
        kind: TaskKind::FileListing,
        token: None,
    }
}

fn apply_overlay_update(app: &mut AppState, update: overlays::OverlayUpdate) -> Vec<UiEffect> {
    let mut effects = update.effects;
    match update.transition {
        overlays::OverlayTransition::Stay => {}
        overlays::OverlayTransition::Close => {
            if matches!(app.overlay, Some(Overlay::FileCompletion(_))) {
                effects.push(close_listing_effect());
            }
            app.overlay = None;
        }
        overlays::OverlayTransition::Open(request) => {
            if matches!(app.overlay, Some(Overlay::FileCompletion(_))) {
                effects.push(close_listing_effect());
            }
            effects.extend(open_overlay_request(app, request));
        }
    }
    effects
}

fn open_overlay_request(app: &mut AppState, request: overlays::OverlayRequest) -> Vec<UiEffect> {
    match request {
        overlays::OverlayRequest::CommandPalette => {
            let (state, effects) = overlays::CommandPaletteState::open();
            app.overlay = Some(Overlay::CommandPalette(state));
            effects
        }
        overlays::OverlayRequest::FileCompletion { anchor } => {
            let task = app.tui.task_seq.next_id();
            let (state, effects) = FileCompletionState::open(anchor, task);
            app.overlay = Some(Overlay::FileCompletion(state));
            effects
        }
        overlays::OverlayRequest::QuitConfirm => {
            let (state, effects) = overlays::QuitConfirmState::open();
            app.overlay = Some(Overlay::QuitConfirm(state));
            effects
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use crossterm::event::{KeyCode, KeyEventState, KeyModifiers};
    use quill_core::attachment::{Attachment, AttachmentError};
    use quill_core::config::Config;

    use super::*;
    use crate::common::{TaskCompleted, TaskId, TaskKind, TaskStarted};

    fn app() -> AppState {
        AppState::new(Config::default(), PathBuf::from("."))
    }

    fn key(code: KeyCode) -> UiEvent {
        UiEvent::Terminal(Event::Key(KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        }))
    }

    fn ctrl(c: char) -> UiEvent {
        UiEvent::Terminal(Event::Key(KeyEvent {
            code: KeyCode::Char(c),
            modifiers: KeyModifiers::CONTROL,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        }))
    }

    fn type_str(app: &mut AppState, text: &str) {
        for c in text.chars() {
            update(app, key(KeyCode::Char(c)));
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

    // ---- completion session lifecycle through the reducer ----

    #[test]
    fn at_sign_opens_completion_and_requests_listing() {
        let mut app = app();
        let effects = update(&mut app, key(KeyCode::Char('@')));

        assert!(matches!(app.overlay, Some(Overlay::FileCompletion(_))));
        assert!(matches!(effects[0], UiEffect::ListFiles { .. }));
    }

    #[test]
    fn typing_without_trigger_never_opens_completion() {
        let mut app = app();
        type_str(&mut app, "plain text, no trigger here");
        assert!(app.overlay.is_none());
    }

    #[test]
    fn files_listed_fills_the_open_session() {
        let mut app = app();
        update(&mut app, key(KeyCode::Char('@')));

        update(
            &mut app,
            UiEvent::FilesListed {
                result: Ok(vec![PathBuf::from("src/lib.rs")]),
            },
        );

        let Some(Overlay::FileCompletion(completion)) = &app.overlay else {
            panic!("completion should be open");
        };
        assert_eq!(completion.files, vec![PathBuf::from("src/lib.rs")]);
    }

    #[test]
    fn listing_failure_closes_the_session_with_a_notice() {
        let mut app = app();
        update(&mut app, key(KeyCode::Char('@')));

        update(
            &mut app,
            UiEvent::FilesListed {
                result: Err("walk failed".to_string()),
            },
        );

        assert!(app.overlay.is_none());
        assert!(app.tui.notice.is_some());
    }

    #[test]
    fn typed_query_routes_into_draft_and_filters() {
        let mut app = app();
        update(&mut app, key(KeyCode::Char('@')));
        update(
            &mut app,
            UiEvent::FilesListed {
                result: Ok(vec![PathBuf::from("src/main.rs"), PathBuf::from("src/lib.rs")]),
            },
        );

        type_str(&mut app, "lib");

        assert_eq!(app.tui.editor.buffer.text(), "@lib");
        let Some(Overlay::FileCompletion(completion)) = &app.overlay else {
            panic!("completion should be open");
        };
        assert_eq!(completion.query, "lib");
        assert_eq!(completion.filtered.len(), 1);
    }

    #[test]
    fn deleting_the_trigger_closes_and_cancels_the_listing() {
        let mut app = app();
        update(&mut app, key(KeyCode::Char('@')));

        let effects = update(&mut app, key(KeyCode::Backspace));

        assert!(app.overlay.is_none());
        assert!(matches!(
            effects[0],
            UiEffect::CancelTask {
                kind: TaskKind::FileListing,
                ..
            }
        ));
        assert!(app.tui.editor.buffer.is_empty());
    }

    #[test]
    fn enter_splices_selection_and_closes() {
        let mut app = app();
        update(&mut app, key(KeyCode::Char('@')));
        update(
            &mut app,
            UiEvent::FilesListed {
                result: Ok(vec![PathBuf::from("src/main.rs")]),
            },
        );

        update(&mut app, key(KeyCode::Enter));

        assert!(app.overlay.is_none());
        assert_eq!(app.tui.editor.buffer.text(), "src/main.rs");
    }

    #[test]
    fn escape_closes_completion_without_touching_draft() {
        let mut app = app();
        update(&mut app, key(KeyCode::Char('@')));
        let effects = update(&mut app, key(KeyCode::Esc));

        assert!(app.overlay.is_none());
        assert!(effects
            .iter()
            .any(|e| matches!(e, UiEffect::CancelTask { .. })));
        assert_eq!(app.tui.editor.buffer.text(), "@");
    }

    // ---- task lifecycle ----

    #[test]
    fn stale_task_completion_is_dropped() {
        let mut app = app();
        update(
            &mut app,
            UiEvent::TaskStarted {
                kind: TaskKind::FileListing,
                started: TaskStarted {
                    id: TaskId(7),
                    cancel: None,
                },
            },
        );

        // A completion for an id that is not the active one.
        update(
            &mut app,
            UiEvent::TaskCompleted {
                kind: TaskKind::FileListing,
                completed: TaskCompleted {
                    id: TaskId(3),
                    result: Box::new(UiEvent::FilesListed {
                        result: Ok(vec![PathBuf::from("stale.rs")]),
                    }),
                },
            },
        );

        assert!(app.tui.tasks.file_listing.is_running());
    }

    #[test]
    fn active_task_completion_recurses_into_its_event() {
        let mut app = app();
        update(
            &mut app,
            UiEvent::TaskStarted {
                kind: TaskKind::AgentTurn,
                started: TaskStarted {
                    id: TaskId(1),
                    cancel: None,
                },
            },
        );
        assert!(app.tui.is_agent_busy());

        update(
            &mut app,
            UiEvent::TaskCompleted {
                kind: TaskKind::AgentTurn,
                completed: TaskCompleted {
                    id: TaskId(1),
                    result: Box::new(UiEvent::AgentReplied {
                        text: "hello".to_string(),
                    }),
                },
            },
        );

        assert!(!app.tui.is_agent_busy());
        assert_eq!(app.tui.transcript.cells().len(), 1);
    }

    // ---- attachments via async results ----

    #[test]
    fn picked_file_becomes_an_attachment() {
        let mut app = app();
        update(
            &mut app,
            UiEvent::FilePicked {
                result: Ok(attachment("shot.png")),
            },
        );
        assert_eq!(app.tui.editor.attachments.len(), 1);
    }

    #[test]
    fn sixth_attachment_is_rejected_with_notice_and_state_unchanged() {
        let mut app = app();
        for i in 0..5 {
            app.tui.editor.add_attachment(attachment(&format!("{i}.png")));
        }

        update(
            &mut app,
            UiEvent::FilePicked {
                result: Ok(attachment("extra.png")),
            },
        );

        assert_eq!(app.tui.editor.attachments.len(), 5);
        let notice = app.tui.notice.as_ref().expect("warning expected");
        assert!(notice.text.contains("more than 5"));

        // Rejection is idempotent.
        update(
            &mut app,
            UiEvent::FilePicked {
                result: Ok(attachment("extra.png")),
            },
        );
        assert_eq!(app.tui.editor.attachments.len(), 5);
    }

    #[test]
    fn rejected_paste_falls_back_to_literal_text() {
        let mut app = app();
        update(
            &mut app,
            UiEvent::FilePicked {
                result: Err(RejectedPaste {
                    text: "/tmp/gone.png".to_string(),
                    reason: AttachmentError::Io("no such file".to_string()),
                }),
            },
        );

        assert_eq!(app.tui.editor.buffer.text(), "/tmp/gone.png");
        assert!(app.tui.editor.attachments.is_empty());
        assert!(app.tui.notice.is_some());
    }

    // ---- external editor round trip ----

    #[test]
    fn editor_result_replaces_the_draft() {
        let mut app = app();
        type_str(&mut app, "old");

        update(
            &mut app,
            UiEvent::EditorFinished {
                result: Ok(Some("edited draft".to_string())),
            },
        );

        assert_eq!(app.tui.editor.buffer.text(), "edited draft");
        assert_eq!(
            app.tui.editor.buffer.cursor_offset(),
            "edited draft".len()
        );
    }

    #[test]
    fn empty_editor_result_warns_and_keeps_draft() {
        let mut app = app();
        type_str(&mut app, "keep me");

        update(
            &mut app,
            UiEvent::EditorFinished {
                result: Ok(Some("  \n ".to_string())),
            },
        );

        assert_eq!(app.tui.editor.buffer.text(), "keep me");
        assert!(app.tui.notice.as_ref().unwrap().text.contains("empty"));
    }

    #[test]
    fn cancelled_editor_is_a_silent_noop() {
        let mut app = app();
        type_str(&mut app, "keep me");

        update(&mut app, UiEvent::EditorFinished { result: Ok(None) });

        assert_eq!(app.tui.editor.buffer.text(), "keep me");
        assert!(app.tui.notice.is_none());
    }

    // ---- send paths ----

    #[test]
    fn sending_a_message_emits_effect_and_busy_gate_arms_on_start() {
        let mut app = app();
        type_str(&mut app, "hello");
        let effects = update(&mut app, key(KeyCode::Enter));

        assert!(matches!(
            &effects[0],
            UiEffect::SendMessage { text, .. } if text == "hello"
        ));
        assert!(app.tui.editor.buffer.is_empty());
        assert_eq!(app.tui.transcript.cells().len(), 1);
    }

    #[test]
    fn exit_keyword_opens_quit_dialog_and_sends_nothing() {
        let mut app = app();
        type_str(&mut app, "exit");
        let effects = update(&mut app, key(KeyCode::Enter));

        assert!(effects.is_empty());
        assert!(matches!(app.overlay, Some(Overlay::QuitConfirm(_))));
        assert!(app.tui.editor.buffer.is_empty());
    }

    #[test]
    fn quit_confirm_yes_emits_quit() {
        let mut app = app();
        type_str(&mut app, "quit");
        update(&mut app, key(KeyCode::Enter));

        let effects = update(&mut app, key(KeyCode::Char('y')));
        assert!(matches!(effects[0], UiEffect::Quit));
        assert!(app.overlay.is_none());
    }

    #[test]
    fn busy_gate_blocks_external_editor_through_reducer() {
        let mut app = app();
        update(
            &mut app,
            UiEvent::TaskStarted {
                kind: TaskKind::AgentTurn,
                started: TaskStarted {
                    id: TaskId(0),
                    cancel: None,
                },
            },
        );

        let effects = update(&mut app, ctrl('o'));
        assert!(effects.is_empty());
        assert!(app.tui.notice.as_ref().unwrap().text.contains("busy"));
    }

    // ---- paste through the reducer ----

    #[test]
    fn pasting_disallowed_extension_inserts_literal_text() {
        let mut app = app();
        let effects = update(
            &mut app,
            UiEvent::Terminal(Event::Paste("/tmp/notes.txt".to_string())),
        );

        assert!(effects.is_empty());
        assert_eq!(app.tui.editor.buffer.text(), "/tmp/notes.txt");
    }

    #[test]
    fn pasting_allowed_extension_starts_a_load() {
        let mut app = app();
        let effects = update(
            &mut app,
            UiEvent::Terminal(Event::Paste("/tmp/photo.png".to_string())),
        );

        assert!(matches!(effects[0], UiEffect::LoadAttachment { .. }));
        assert!(app.tui.editor.buffer.is_empty());
    }

    #[test]
    fn pasting_into_open_completion_extends_the_query() {
        let mut app = app();
        update(&mut app, key(KeyCode::Char('@')));
        update(
            &mut app,
            UiEvent::FilesListed {
                result: Ok(vec![PathBuf::from("src/lib.rs")]),
            },
        );

        update(&mut app, UiEvent::Terminal(Event::Paste("lib".to_string())));

        let Some(Overlay::FileCompletion(completion)) = &app.overlay else {
            panic!("completion should be open");
        };
        assert_eq!(completion.query, "lib");
    }

    // ---- tick ----

    #[test]
    fn tick_advances_spinner_and_expires_nothing_fresh() {
        let mut app = app();
        app.tui.set_notice("fresh");
        update(&mut app, UiEvent::Tick);
        assert_eq!(app.tui.spinner_frame, 1);
        assert!(app.tui.notice.is_some());
    }
}
