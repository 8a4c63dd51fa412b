//! Project file listing for the `@` completion popover.

use std::path::{Path, PathBuf};

use tokio_util::sync::CancellationToken;

/// Most entries a listing returns; keeps the popover and the walk bounded.
pub const MAX_RESULTS: usize = 25;

const MAX_DEPTH: usize = 15;

/// Walks `root` and returns relative file paths, sorted lexicographically
/// and capped at [`MAX_RESULTS`].
///
/// Respects .gitignore and the other standard filters. Checks `cancel`
/// between entries so an abandoned completion session stops the walk.
pub fn list_project_files(root: &Path, cancel: &CancellationToken) -> Vec<PathBuf> {
    use ignore::WalkBuilder;

    let mut files = Vec::new();

    let walker = WalkBuilder::new(root)
        .standard_filters(true)
        .max_depth(Some(MAX_DEPTH))
        .build();

    for entry in walker.flatten() {
        if cancel.is_cancelled() {
            break;
        }

        if !entry.file_type().is_some_and(|ft| ft.is_file()) {
            continue;
        }

        if let Ok(rel_path) = entry.path().strip_prefix(root) {
            if rel_path.as_os_str().is_empty() {
                continue;
            }

            files.push(rel_path.to_path_buf());
        }
    }

    files.sort();
    files.truncate(MAX_RESULTS);
    tracing::debug!(count = files.len(), root = %root.display(), "project files listed");
    files
}
