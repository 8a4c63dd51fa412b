//! TUI runtime: owns the terminal, runs the event loop, executes effects.
//!
//! This is the boundary where side effects happen. The reducer stays pure
//! and produces effects; this module executes them.
//!
//! ## Inbox pattern
//!
//! Async handlers send `UiEvent`s to `inbox_tx`; the loop drains `inbox_rx`
//! each iteration. Every async task gets a uniform `TaskStarted` /
//! `TaskCompleted` lifecycle so stale results can be dropped by the reducer.

pub mod handlers;

use std::future::Future;
use std::io::{Read, Stdout, Write};
use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{Context, Result, anyhow};
use crossterm::event;
use quill_core::config::Config;
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::common::{TaskCompleted, TaskId, TaskKind, TaskStarted};
use crate::effects::UiEffect;
use crate::events::UiEvent;
use crate::state::AppState;
use crate::{render, terminal, update};

type UiEventSender = mpsc::UnboundedSender<UiEvent>;
type UiEventReceiver = mpsc::UnboundedReceiver<UiEvent>;

/// Tick cadence while something is animating or in flight.
const FRAME_DURATION: Duration = Duration::from_millis(16);

/// Tick cadence when idle; longer timeout saves CPU.
const IDLE_POLL_DURATION: Duration = Duration::from_millis(100);

/// Full-screen TUI runtime.
///
/// Terminal state is restored on drop, panic, and around the external
/// editor.
pub struct TuiRuntime {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    pub state: AppState,
    inbox_tx: UiEventSender,
    inbox_rx: UiEventReceiver,
    last_tick: Instant,
    last_terminal_event: Instant,
}

impl TuiRuntime {
    /// Creates the runtime and takes over the terminal.
    ///
    /// # Errors
    /// Returns an error if the terminal cannot be set up.
    pub fn new(config: Config, root: PathBuf) -> Result<Self> {
        terminal::install_panic_hook();
        let terminal = terminal::setup_terminal().context("Failed to setup terminal")?;

        let state = AppState::new(config, root);
        let (inbox_tx, inbox_rx) = mpsc::unbounded_channel();

        let now = Instant::now();
        Ok(Self {
            terminal,
            state,
            inbox_tx,
            inbox_rx,
            last_tick: now,
            last_terminal_event: now,
        })
    }

    /// Runs the main event loop until the reducer requests quit.
    ///
    /// # Errors
    /// Returns an error if terminal I/O fails.
    pub fn run(&mut self) -> Result<()> {
        terminal::enable_input_features()?;
        let result = self.event_loop();
        let _ = terminal::disable_input_features();
        let _ = terminal::restore_terminal();
        result
    }

    fn event_loop(&mut self) -> Result<()> {
        let mut dirty = true;

        while !self.state.tui.should_quit {
            let events = self.collect_events()?;

            for event in events {
                if matches!(&event, UiEvent::Terminal(_)) {
                    self.last_terminal_event = Instant::now();
                }
                // Tick caps the frame rate; other events batch their render
                // into the next tick.
                if matches!(&event, UiEvent::Tick) {
                    dirty = true;
                }

                let effects = update::update(&mut self.state, event);
                self.execute_effects(effects);
            }

            if dirty {
                self.terminal.draw(|frame| {
                    render::render(&self.state, frame);
                })?;
                dirty = false;
            }
        }

        Ok(())
    }

    // ========================================================================
    // Event collection
    // ========================================================================

    /// Collects pending events: inbox results, terminal input, and the tick.
    fn collect_events(&mut self) -> Result<Vec<UiEvent>> {
        let mut events = Vec::new();

        while let Ok(ev) = self.inbox_rx.try_recv() {
            events.push(ev);
        }

        // Fast polling while tasks run or keys were just pressed keeps the
        // spinner and streaming results smooth; otherwise back off.
        let recent_activity = self.last_terminal_event.elapsed() < IDLE_POLL_DURATION;
        let tick_interval = if self.state.tui.tasks.is_any_running() || recent_activity {
            FRAME_DURATION
        } else {
            IDLE_POLL_DURATION
        };

        let time_until_tick = tick_interval.saturating_sub(self.last_tick.elapsed());
        let poll_duration = if events.is_empty() {
            time_until_tick
        } else {
            Duration::ZERO
        };

        if event::poll(poll_duration)? {
            events.push(UiEvent::Terminal(event::read()?));
            while event::poll(Duration::ZERO)? {
                events.push(UiEvent::Terminal(event::read()?));
            }
        }

        if self.last_tick.elapsed() >= tick_interval {
            events.push(UiEvent::Tick);
            self.last_tick = Instant::now();
        }

        Ok(events)
    }

    // ========================================================================
    // Effect dispatch
    // ========================================================================

    fn execute_effects(&mut self, effects: Vec<UiEffect>) {
        for effect in effects {
            self.execute_effect(effect);
        }
    }

    fn dispatch_event(&mut self, event: UiEvent) {
        let effects = update::update(&mut self.state, event);
        self.execute_effects(effects);
    }

    /// Spawns an async task with a uniform `TaskStarted`/`TaskCompleted`
    /// lifecycle around the handler's result event.
    fn spawn_task<F, Fut>(&self, kind: TaskKind, id: TaskId, cancelable: bool, f: F)
    where
        F: FnOnce(Option<CancellationToken>) -> Fut + Send + 'static,
        Fut: Future<Output = UiEvent> + Send + 'static,
    {
        let tx = self.inbox_tx.clone();
        let cancel = cancelable.then(CancellationToken::new);
        let started = TaskStarted {
            id,
            cancel: cancel.clone(),
        };
        let _ = tx.send(UiEvent::TaskStarted { kind, started });
        tokio::spawn(async move {
            let inner = f(cancel).await;
            let completed = TaskCompleted {
                id,
                result: Box::new(inner),
            };
            let _ = tx.send(UiEvent::TaskCompleted { kind, completed });
        });
    }

    fn execute_effect(&mut self, effect: UiEffect) {
        match effect {
            UiEffect::Quit => {
                self.state.tui.should_quit = true;
            }
            UiEffect::SendMessage {
                task,
                text,
                attachments,
            } => {
                self.spawn_task(TaskKind::AgentTurn, task, false, move |_| {
                    handlers::agent_turn(text, attachments)
                });
            }
            UiEffect::ListFiles { task } => {
                let root = self.state.tui.root.clone();
                self.spawn_task(TaskKind::FileListing, task, true, move |cancel| {
                    handlers::file_listing(root, cancel)
                });
            }
            UiEffect::LoadAttachment { task, path, pasted } => {
                let rules = self.state.tui.config.attachments.clone();
                self.spawn_task(TaskKind::AttachmentLoad, task, false, move |_| {
                    handlers::attachment_load(path, pasted, rules)
                });
            }
            // Runs inline: the editor needs the real terminal, so the loop
            // intentionally waits for it.
            UiEffect::OpenExternalEditor { text } => {
                let result = self
                    .open_external_editor(&text)
                    .map_err(|e| format!("{e:#}"));
                if let Err(error) = &result {
                    tracing::warn!(%error, "external editor failed");
                }
                self.dispatch_event(UiEvent::EditorFinished { result });
            }
            UiEffect::CancelTask { kind, token } => {
                let token = token.or_else(|| self.state.tui.tasks.state_mut(kind).cancel.clone());
                if let Some(cancel) = token {
                    cancel.cancel();
                }
            }
        }
    }

    // ========================================================================
    // External editor
    // ========================================================================

    /// Suspends the TUI, edits the draft in the external editor, and reads
    /// the result back. `Ok(None)` means the editor exited nonzero (cancel).
    ///
    /// The draft goes through a named temp file that is removed when this
    /// function returns.
    fn open_external_editor(&mut self, text: &str) -> Result<Option<String>> {
        let editor = self
            .state
            .tui
            .config
            .editor
            .clone()
            .or_else(|| std::env::var("VISUAL").ok())
            .or_else(|| std::env::var("EDITOR").ok())
            .unwrap_or_else(|| "vi".to_string());

        let mut temp_file = tempfile::Builder::new()
            .prefix("quill-draft-")
            .suffix(".md")
            .tempfile()
            .context("create draft temp file")?;
        temp_file
            .write_all(text.as_bytes())
            .context("write draft to temp file")?;
        temp_file.flush().context("flush draft temp file")?;

        // Hand the terminal to the editor, take it back afterwards no
        // matter how the editor exited.
        let _ = terminal::disable_input_features();
        terminal::restore_terminal()?;

        let mut parts = editor.split_whitespace();
        let program = parts.next().unwrap_or("vi");
        let status = std::process::Command::new(program)
            .args(parts)
            .arg(temp_file.path())
            .status();

        self.terminal = terminal::setup_terminal()?;
        terminal::enable_input_features()?;
        self.terminal.clear()?;

        match status {
            Ok(exit) if exit.success() => {
                let mut content = String::new();
                std::fs::File::open(temp_file.path())
                    .and_then(|mut f| f.read_to_string(&mut content))
                    .context("read edited draft")?;
                Ok(Some(content))
            }
            Ok(_) => Ok(None),
            Err(e) => Err(anyhow!("failed to run editor '{editor}': {e}")),
        }
    }
}

impl Drop for TuiRuntime {
    fn drop(&mut self) {
        let _ = terminal::restore_terminal();
    }
}
