//! Command definitions for the command palette.

/// Definition of a command.
#[derive(Debug, Clone)]
pub struct Command {
    /// Primary name (e.g., "clear") - without the leading slash.
    pub name: &'static str,
    /// Aliases (e.g., ["new"]) - without leading slashes.
    pub aliases: &'static [&'static str],
    /// Short description shown in palette.
    pub description: &'static str,
}

impl Command {
    /// Returns true if this command matches the given filter (case-insensitive).
    /// Matches against name and all aliases.
    pub fn matches(&self, filter: &str) -> bool {
        let filter_lower = filter.to_lowercase();
        self.name.to_lowercase().contains(&filter_lower)
            || self
                .aliases
                .iter()
                .any(|a| a.to_lowercase().contains(&filter_lower))
    }
}

/// Available commands.
pub const COMMANDS: &[Command] = &[
    Command {
        name: "clear",
        aliases: &["new"],
        description: "Clear the conversation and the draft",
    },
    Command {
        name: "editor",
        aliases: &["edit"],
        description: "Edit the draft in your external editor",
    },
    Command {
        name: "quit",
        aliases: &["q", "exit"],
        description: "Exit Quill",
    },
];
