//! File-based tracing setup.
//!
//! The TUI owns the terminal, so logs must never hit stdout/stderr. All
//! tracing output goes to `QUILL_HOME/logs/quill-tui.log` through a
//! non-blocking appender. Filtering follows `RUST_LOG` when set.

use std::fs::OpenOptions;

use anyhow::{Context, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

use crate::config::paths;

const LOG_FILE: &str = "quill-tui.log";
const DEFAULT_FILTER: &str = "quill=info,quill_core=info,quill_tui=info";

/// Initializes file logging and returns the appender guard.
///
/// The guard must stay alive for the lifetime of the process; dropping it
/// stops the background writer and loses buffered lines.
///
/// # Errors
/// Returns an error if the log directory or file cannot be created.
pub fn init() -> Result<WorkerGuard> {
    let log_dir = paths::logs_dir();
    std::fs::create_dir_all(&log_dir)
        .with_context(|| format!("Failed to create log directory {}", log_dir.display()))?;

    let mut opts = OpenOptions::new();
    opts.create(true).append(true);

    // Log files may capture pasted paths; keep them private.
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        opts.mode(0o600);
    }

    let log_path = log_dir.join(LOG_FILE);
    let log_file = opts
        .open(&log_path)
        .with_context(|| format!("Failed to open log file {}", log_path.display()))?;

    let (writer, guard) = tracing_appender::non_blocking(log_file);

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(writer)
        .with_target(false)
        .with_filter(env_filter);

    // try_init: tests may initialize more than once.
    let _ = tracing_subscriber::registry().with(file_layer).try_init();

    Ok(guard)
}
