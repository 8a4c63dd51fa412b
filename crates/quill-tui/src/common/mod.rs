//! Shared helpers for the TUI (task lifecycle, palette commands, text
//! utilities).

pub mod commands;
mod task;
mod text;

pub use task::{TaskCompleted, TaskId, TaskKind, TaskSeq, TaskStarted, TaskState, Tasks};
pub use text::{truncate_start_with_ellipsis, truncate_with_ellipsis};
