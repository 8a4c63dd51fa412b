//! Full-screen terminal composer for quill.

pub mod common;
pub mod effects;
pub mod events;
pub mod features;
pub mod mutations;
pub mod overlays;
pub mod render;
pub mod runtime;
pub mod state;
pub mod terminal;
pub mod theme;
pub mod update;

use std::io::{IsTerminal, stderr};
use std::path::PathBuf;

use anyhow::Result;
use quill_core::config::Config;
pub use runtime::TuiRuntime;

/// Runs the interactive composer until the user quits.
///
/// # Errors
/// Returns an error when stderr is not a terminal or terminal setup fails.
pub fn run_interactive_chat(config: &Config, root: PathBuf) -> Result<()> {
    if !stderr().is_terminal() {
        anyhow::bail!("quill needs a terminal to render its interface.");
    }

    let mut runtime = TuiRuntime::new(config.clone(), root)?;
    runtime.run()?;

    eprintln!("Goodbye!");
    Ok(())
}
