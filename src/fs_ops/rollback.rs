//! Restore an original folder from its backup after a failed apply.
//! The backup is copied, never moved, so it survives the restoration.

use std::fs;
use std::path::Path;
use tracing::{error, info};

use super::apply::clear_folder_contents;
use super::helpers::copy_error;
use super::stage::copy_tree;
use crate::errors::SafeSortError;

/// Clear `original` and copy every entry of `backup` back into it.
///
/// A single pass: any failure is returned as-is and no retry is attempted.
pub fn rollback_from_backup(original: &Path, backup: &Path) -> Result<(), SafeSortError> {
    if !original.is_dir() {
        return Err(SafeSortError::InvalidOriginal(original.to_path_buf()));
    }
    if !backup.exists() {
        error!(backup = %backup.display(), "Backup missing; original cannot be restored");
        return Err(SafeSortError::BackupMissing(backup.to_path_buf()));
    }

    clear_folder_contents(original)?;

    let entries = fs::read_dir(backup).map_err(copy_error(backup, original))?;
    let mut restored = 0usize;
    for entry in entries {
        let entry = entry.map_err(copy_error(backup, original))?;
        let src = entry.path();
        let dst = original.join(entry.file_name());
        copy_tree(&src, &dst)?;
        restored += 1;
    }

    info!(original = %original.display(), backup = %backup.display(), entries = restored, "Rollback complete");
    Ok(())
}
