//! Render colors, resolved once from config at startup.
//!
//! Render functions read the theme from `AppState` instead of consulting any
//! global, so tests can construct state with a known palette.

use quill_core::config::Config;
use ratatui::style::Color;

/// Colors used by the render functions.
#[derive(Debug, Clone, Copy)]
pub struct Theme {
    /// Accent for prompts, selection, and user messages.
    pub accent: Color,
    /// De-emphasized chrome: hints, borders, separators.
    pub dim: Color,
    /// Transient warnings in the status area.
    pub warning: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            accent: Color::Cyan,
            dim: Color::DarkGray,
            warning: Color::Yellow,
        }
    }
}

impl Theme {
    /// Builds the theme from config, falling back to defaults for a missing
    /// or unparseable accent. Accepts ratatui color names and hex values.
    pub fn from_config(config: &Config) -> Self {
        let mut theme = Self::default();
        if let Some(accent) = config.accent.as_deref()
            && let Ok(color) = accent.parse::<Color>()
        {
            theme.accent = color;
        }
        theme
    }
}
