//! CLI entry and dispatch.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use quill_core::{config, logging};

#[derive(Parser)]
#[command(name = "quill")]
#[command(version)]
#[command(about = "Terminal chat composer")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Root directory file completions and relative paths resolve against
    /// (default: current directory)
    #[arg(long, default_value = ".")]
    root: String,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Manage the configuration file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(clap::Subcommand)]
enum ConfigAction {
    /// Print the config file path
    Path,
    /// Create a default config file
    Init,
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Config { action }) => match action {
            ConfigAction::Path => {
                println!("{}", config::paths::config_path().display());
                Ok(())
            }
            ConfigAction::Init => {
                let config_path = config::paths::config_path();
                config::Config::init(&config_path)
                    .with_context(|| format!("init config at {}", config_path.display()))?;
                println!("Created config at {}", config_path.display());
                Ok(())
            }
        },
        None => chat(&cli.root),
    }
}

fn chat(root: &str) -> Result<()> {
    let config = config::Config::load().context("load config")?;

    // Held for the whole session; dropping it stops the log writer.
    let _log_guard = logging::init().context("init logging")?;

    let root_path = PathBuf::from(root)
        .canonicalize()
        .with_context(|| format!("resolve root directory '{root}'"))?;

    tracing::info!(root = %root_path.display(), "starting chat");

    let runtime = tokio::runtime::Runtime::new().context("start tokio runtime")?;
    runtime.block_on(async { quill_tui::run_interactive_chat(&config, root_path) })
}
