//! Application state composition.
//!
//! Top-level state hierarchy for the TUI:
//!
//! ```text
//! AppState
//! ├── tui: TuiState
//! │   ├── editor: EditorState       (draft text, attachments, delete mode)
//! │   ├── transcript: TranscriptState (sent messages and replies)
//! │   ├── task_seq: TaskSeq         (async task id generator)
//! │   ├── tasks: Tasks              (task lifecycle state)
//! │   └── notice: Option<Notice>    (transient status warning)
//! └── overlay: Option<Overlay>      (modal overlays)
//! ```
//!
//! State is split between `TuiState` and `Option<Overlay>` so overlay
//! handlers can take `&mut self` and read `&TuiState` without borrow
//! conflicts.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use quill_core::config::Config;

use crate::common::{TaskSeq, Tasks};
use crate::features::editor::EditorState;
use crate::features::transcript::TranscriptState;
use crate::overlays::Overlay;
use crate::theme::Theme;

/// How long a notice stays visible in the status area.
const NOTICE_TTL: Duration = Duration::from_secs(4);

/// Combined application state for the TUI.
pub struct AppState {
    pub tui: TuiState,
    pub overlay: Option<Overlay>,
}

impl AppState {
    pub fn new(config: Config, root: PathBuf) -> Self {
        Self {
            tui: TuiState::new(config, root),
            overlay: None,
        }
    }
}

/// A transient warning shown in the status area.
///
/// All recoverable failures (attachment rejections, editor errors, the busy
/// gate) surface here and expire on their own; none of them ends the
/// session.
#[derive(Debug)]
pub struct Notice {
    pub text: String,
    shown_at: Instant,
}

impl Notice {
    fn new(text: String) -> Self {
        Self {
            text,
            shown_at: Instant::now(),
        }
    }

    pub fn is_expired(&self) -> bool {
        self.shown_at.elapsed() >= NOTICE_TTL
    }
}

/// TUI application state (non-overlay).
pub struct TuiState {
    /// Flag indicating the app should quit.
    pub should_quit: bool,
    /// Message editor state (draft, attachments, delete mode).
    pub editor: EditorState,
    /// Transcript display state.
    pub transcript: TranscriptState,
    /// Task id sequence for async operations.
    pub task_seq: TaskSeq,
    /// Task lifecycle state for async operations.
    pub tasks: Tasks,
    /// Loaded configuration.
    pub config: Config,
    /// Render colors resolved from config.
    pub theme: Theme,
    /// Project root all relative paths resolve against.
    pub root: PathBuf,
    /// Transient status warning, cleared on tick after its TTL.
    pub notice: Option<Notice>,
    /// Spinner animation frame counter (status line while busy).
    pub spinner_frame: usize,
}

impl TuiState {
    pub fn new(config: Config, root: PathBuf) -> Self {
        let theme = Theme::from_config(&config);
        Self {
            should_quit: false,
            editor: EditorState::default(),
            transcript: TranscriptState::default(),
            task_seq: TaskSeq::default(),
            tasks: Tasks::default(),
            config,
            theme,
            root,
            notice: None,
            spinner_frame: 0,
        }
    }

    /// True while a sent message is still waiting for its reply.
    pub fn is_agent_busy(&self) -> bool {
        self.tasks.agent_turn.is_running()
    }

    pub fn set_notice(&mut self, text: impl Into<String>) {
        self.notice = Some(Notice::new(text.into()));
    }

    /// Drops the notice once its TTL has passed. Called on tick.
    pub fn expire_notice(&mut self) {
        if self.notice.as_ref().is_some_and(Notice::is_expired) {
            self.notice = None;
        }
    }
}
