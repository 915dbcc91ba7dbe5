//! File counter used to size progress and detect an empty source.

use std::path::Path;
use tracing::debug;
use walkdir::WalkDir;

use super::walk::{EntryKind, classify, is_skipped, unsupported_entry};
use crate::errors::SafeSortError;

/// Number of regular files anywhere under `folder`, skip-listed names excluded.
///
/// Returns 0 when `folder` is missing or not a directory. Unreadable entries
/// inside an existing tree are reported as `Count` errors; symlinks and
/// special files are rejected as `InvalidPath`, before any copy is made.
pub fn count_files(folder: &Path) -> Result<u64, SafeSortError> {
    if !folder.is_dir() {
        return Ok(0);
    }

    let mut n = 0u64;
    for entry in WalkDir::new(folder).min_depth(1) {
        let entry = entry.map_err(|e| SafeSortError::Count {
            path: e
                .path()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| folder.to_path_buf()),
            message: e.to_string(),
        })?;
        match classify(&entry) {
            EntryKind::File if !is_skipped(entry.path()) => n += 1,
            EntryKind::Other => return Err(unsupported_entry(entry.path())),
            _ => {}
        }
    }
    debug!(folder = %folder.display(), files = n, "counted files");
    Ok(n)
}
