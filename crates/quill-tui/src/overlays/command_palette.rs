#![allow(clippy::cast_possible_truncation)]

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::Frame;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{List, ListItem, ListState, Paragraph};

use super::{OverlayRequest, OverlayUpdate};
use crate::common::commands::{COMMANDS, Command};
use crate::effects::UiEffect;
use crate::mutations::{EditorMutation, StateMutation, TranscriptMutation};
use crate::state::TuiState;
use crate::theme::Theme;

#[derive(Debug, Clone)]
pub struct CommandPaletteState {
    pub filter: String,
    pub selected: usize,
}

impl CommandPaletteState {
    pub fn open() -> (Self, Vec<UiEffect>) {
        (
            Self {
                filter: String::new(),
                selected: 0,
            },
            vec![],
        )
    }

    pub fn render(&self, frame: &mut Frame, area: Rect, input_y: u16, theme: &Theme) {
        render_command_palette(frame, self, area, input_y, theme);
    }

    pub fn handle_key(&mut self, tui: &TuiState, key: KeyEvent) -> OverlayUpdate {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

        match key.code {
            KeyCode::Esc => OverlayUpdate::close(),
            KeyCode::Char('c') if ctrl => OverlayUpdate::close(),
            KeyCode::Up => {
                let count = self.filtered_commands().len();
                if count > 0 && self.selected > 0 {
                    self.selected -= 1;
                }
                OverlayUpdate::stay()
            }
            KeyCode::Down => {
                let count = self.filtered_commands().len();
                if count > 0 && self.selected < count - 1 {
                    self.selected += 1;
                }
                OverlayUpdate::stay()
            }
            KeyCode::Enter | KeyCode::Tab => {
                if let Some(cmd_name) = self.selected_command_name() {
                    let (open_overlay, effects, mutations) = execute_command(tui, cmd_name);
                    let update = match open_overlay {
                        Some(request) => OverlayUpdate::open(request),
                        None => OverlayUpdate::close(),
                    };
                    update.with_ui_effects(effects).with_mutations(mutations)
                } else {
                    OverlayUpdate::close()
                }
            }
            KeyCode::Backspace => {
                self.filter.pop();
                self.clamp_selection();
                OverlayUpdate::stay()
            }
            KeyCode::Char(c) if !ctrl => {
                self.filter.push(c);
                self.clamp_selection();
                OverlayUpdate::stay()
            }
            _ => OverlayUpdate::stay(),
        }
    }

    pub fn filtered_commands(&self) -> Vec<&'static Command> {
        if self.filter.is_empty() {
            COMMANDS.iter().collect()
        } else {
            COMMANDS
                .iter()
                .filter(|cmd| cmd.matches(&self.filter))
                .collect()
        }
    }

    pub fn clamp_selection(&mut self) {
        let count = self.filtered_commands().len();
        if count == 0 {
            self.selected = 0;
        } else {
            self.selected = self.selected.min(count - 1);
        }
    }

    fn selected_command_name(&self) -> Option<&'static str> {
        let filtered = self.filtered_commands();
        filtered.get(self.selected).map(|cmd| cmd.name)
    }
}

fn execute_command(
    tui: &TuiState,
    cmd_name: &str,
) -> (Option<OverlayRequest>, Vec<UiEffect>, Vec<StateMutation>) {
    match cmd_name {
        "clear" => (
            None,
            vec![],
            vec![
                StateMutation::Transcript(TranscriptMutation::Clear),
                StateMutation::Editor(EditorMutation::Reset),
                StateMutation::Notice("Conversation cleared.".to_string()),
            ],
        ),
        "editor" => {
            if tui.is_agent_busy() {
                (
                    None,
                    vec![],
                    vec![StateMutation::Notice(
                        "Agent is busy, wait for the reply to finish.".to_string(),
                    )],
                )
            } else {
                (
                    None,
                    vec![UiEffect::OpenExternalEditor {
                        text: tui.editor.buffer.text(),
                    }],
                    vec![],
                )
            }
        }
        "quit" => (Some(OverlayRequest::QuitConfirm), vec![], vec![]),
        _ => (None, vec![], vec![]),
    }
}

pub fn render_command_palette(
    frame: &mut Frame,
    palette: &CommandPaletteState,
    area: Rect,
    input_top_y: u16,
    theme: &Theme,
) {
    use super::render_utils::{
        InputHint, InputLine, OverlayConfig, render_input_line, render_overlay, render_separator,
    };

    let commands = palette.filtered_commands();

    let max_width = area.width.saturating_sub(4);
    let palette_width = max_width.clamp(20, 60);
    // +1 for description line
    let palette_height = (commands.len() as u16 + 7).max(8);

    let hints = [
        InputHint::new("↑↓", "navigate"),
        InputHint::new("Enter", "select"),
        InputHint::new("Esc", "cancel"),
    ];
    let layout = render_overlay(
        frame,
        area,
        input_top_y,
        theme,
        &OverlayConfig {
            title: "Commands",
            border_color: theme.accent,
            width: palette_width,
            height: palette_height,
            hints: &hints,
        },
    );

    let filter_area = Rect::new(layout.body.x, layout.body.y, layout.body.width, 1);
    render_input_line(
        frame,
        filter_area,
        &InputLine {
            value: &palette.filter,
            prompt: "> ",
            prompt_color: theme.dim,
            text_color: theme.accent,
            cursor_color: theme.accent,
        },
    );

    render_separator(frame, layout.body, theme, 1);

    // -1 for description line
    let list_height = layout.body.height.saturating_sub(4);
    let list_area = Rect::new(
        layout.body.x,
        layout.body.y + 2,
        layout.body.width,
        list_height,
    );

    let items: Vec<ListItem> = if commands.is_empty() {
        vec![ListItem::new(Line::from(Span::styled(
            "  No matching commands",
            Style::default().fg(theme.dim),
        )))]
    } else {
        let max_name_len = commands.iter().map(|c| c.name.len()).max().unwrap_or(0);

        commands
            .iter()
            .enumerate()
            .map(|(idx, cmd)| {
                let is_selected = idx == palette.selected;
                let name_style = if is_selected {
                    Style::default()
                        .fg(Color::White)
                        .add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(theme.dim)
                };

                let mut spans = vec![Span::styled(
                    format!("{:<width$}", cmd.name, width = max_name_len),
                    name_style,
                )];

                // Aliases column (dimmed, right side)
                if !cmd.aliases.is_empty() {
                    let aliases = cmd.aliases.join(", ");
                    let available = list_area.width.saturating_sub(4) as usize;
                    let padding = available.saturating_sub(max_name_len + aliases.len());

                    spans.push(Span::styled(
                        format!("{:>width$}", aliases, width = padding + aliases.len()),
                        Style::default().fg(theme.dim).add_modifier(Modifier::DIM),
                    ));
                }

                ListItem::new(Line::from(spans))
            })
            .collect()
    };

    let list = List::new(items)
        .highlight_style(Style::default().bg(theme.accent))
        .highlight_symbol("▶ ");

    let mut list_state = ListState::default();
    if !commands.is_empty() {
        list_state.select(Some(palette.selected));
    }
    frame.render_stateful_widget(list, list_area, &mut list_state);

    render_separator(frame, layout.body, theme, 2 + list_height);

    // Selected command description (centered)
    let description = commands
        .get(palette.selected)
        .map_or("", |cmd| cmd.description);
    let desc_area = Rect::new(
        layout.body.x,
        layout.body.y + 3 + list_height,
        layout.body.width,
        1,
    );
    let desc_paragraph = Paragraph::new(Line::from(Span::styled(
        description,
        Style::default().fg(theme.dim),
    )))
    .alignment(Alignment::Center);
    frame.render_widget(desc_paragraph, desc_area);
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use crossterm::event::{KeyEventKind, KeyEventState};
    use quill_core::config::Config;

    use super::*;
    use crate::overlays::OverlayTransition;

    fn make_tui() -> TuiState {
        TuiState::new(Config::default(), PathBuf::from("."))
    }

    fn make_key_event(code: KeyCode) -> KeyEvent {
        KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        }
    }

    #[test]
    fn empty_filter_lists_every_command() {
        let (state, effects) = CommandPaletteState::open();
        assert!(effects.is_empty());
        assert_eq!(state.filtered_commands().len(), COMMANDS.len());
    }

    #[test]
    fn filter_matches_names_and_aliases() {
        let (mut state, _) = CommandPaletteState::open();
        state.filter = "ed".to_string();
        let names: Vec<&str> = state.filtered_commands().iter().map(|c| c.name).collect();
        assert_eq!(names, vec!["editor"]);

        state.filter = "exit".to_string();
        let names: Vec<&str> = state.filtered_commands().iter().map(|c| c.name).collect();
        assert_eq!(names, vec!["quit"]);
    }

    #[test]
    fn narrowing_filter_clamps_selection() {
        let (mut state, _) = CommandPaletteState::open();
        state.selected = COMMANDS.len() - 1;
        state.filter = "clear".to_string();
        state.clamp_selection();
        assert_eq!(state.selected, 0);
    }

    #[test]
    fn clear_resets_transcript_and_draft() {
        let tui = make_tui();
        let (overlay, effects, mutations) = execute_command(&tui, "clear");
        assert!(overlay.is_none());
        assert!(effects.is_empty());
        assert!(mutations.iter().any(|m| matches!(
            m,
            StateMutation::Transcript(TranscriptMutation::Clear)
        )));
        assert!(
            mutations
                .iter()
                .any(|m| matches!(m, StateMutation::Editor(EditorMutation::Reset)))
        );
    }

    #[test]
    fn editor_command_carries_draft_text() {
        let mut tui = make_tui();
        tui.editor.buffer.insert_str("draft in progress");

        let (_, effects, mutations) = execute_command(&tui, "editor");
        assert!(mutations.is_empty());
        assert!(matches!(
            &effects[0],
            UiEffect::OpenExternalEditor { text } if text == "draft in progress"
        ));
    }

    #[test]
    fn editor_command_warns_while_agent_is_busy() {
        let mut tui = make_tui();
        tui.tasks.agent_turn.active = Some(crate::common::TaskId(1));

        let (overlay, effects, mutations) = execute_command(&tui, "editor");
        assert!(overlay.is_none());
        assert!(effects.is_empty());
        assert!(
            mutations
                .iter()
                .any(|m| matches!(m, StateMutation::Notice(_)))
        );
    }

    #[test]
    fn quit_command_opens_confirmation() {
        let tui = make_tui();
        let (overlay, effects, _) = execute_command(&tui, "quit");
        assert!(matches!(overlay, Some(OverlayRequest::QuitConfirm)));
        assert!(effects.is_empty());
    }

    #[test]
    fn enter_executes_selected_command() {
        let tui = make_tui();
        let (mut state, _) = CommandPaletteState::open();
        state.filter = "quit".to_string();
        state.clamp_selection();

        let update = state.handle_key(&tui, make_key_event(KeyCode::Enter));
        assert!(matches!(
            update.transition,
            OverlayTransition::Open(OverlayRequest::QuitConfirm)
        ));
    }

    #[test]
    fn esc_closes_without_effects() {
        let tui = make_tui();
        let (mut state, _) = CommandPaletteState::open();
        let update = state.handle_key(&tui, make_key_event(KeyCode::Esc));
        assert!(matches!(update.transition, OverlayTransition::Close));
        assert!(update.effects.is_empty());
        assert!(update.mutations.is_empty());
    }
}
