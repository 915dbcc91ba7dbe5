//! Shared tree-walk rules: which entries count as files, which are skipped.

use std::path::Path;
use walkdir::DirEntry;

use crate::errors::SafeSortError;

/// OS-generated metadata files never backed up, staged, or counted.
/// Matched case-sensitively on the base name.
pub const SKIP_LIST: &[&str] = &["desktop.ini", "Thumbs.db"];

/// True if `path`'s base name is on the skip list.
pub fn is_skipped(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| SKIP_LIST.contains(&n))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum EntryKind {
    Dir,
    File,
    /// Symlinks (dangling or not), sockets, fifos, devices.
    Other,
}

/// Classify a walk entry without following symlinks.
pub(crate) fn classify(entry: &DirEntry) -> EntryKind {
    let ft = entry.file_type();
    if entry.path_is_symlink() || ft.is_symlink() {
        EntryKind::Other
    } else if ft.is_dir() {
        EntryKind::Dir
    } else if ft.is_file() {
        EntryKind::File
    } else {
        EntryKind::Other
    }
}

/// Error for an entry that a backup could not reproduce.
pub(crate) fn unsupported_entry(path: &Path) -> SafeSortError {
    SafeSortError::InvalidPath {
        path: path.to_path_buf(),
        reason: "symbolic links and special files are not supported".into(),
    }
}
