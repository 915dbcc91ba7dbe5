//! Swap the organized staging tree into the original folder.
//!
//! Order matters: this is only invoked once a complete backup exists, so the
//! destructive clear step always has a newer, verified source to draw from.

use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use super::helpers::{clear_error, describe_io_error, is_cross_device, move_error};
use super::naming::{timestamp_now, unique_quarantine_path};
use super::stage::{copy_tree, remove_path};
use crate::errors::SafeSortError;

/// Default quarantine location for staging directories that could not be removed.
pub fn default_quarantine_dir() -> PathBuf {
    std::env::temp_dir().join("safe_sort_quarantine")
}

/// Outcome of a successful apply.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApplyReport {
    /// Number of top-level entries moved into the original folder.
    pub moved: usize,
    /// Where leftover staging content ended up when it could not be deleted.
    pub quarantined: Option<PathBuf>,
    /// Warning surfaced for the leftover, if any.
    pub warning: Option<String>,
}

impl ApplyReport {
    pub fn is_clean(&self) -> bool {
        self.quarantined.is_none()
    }
}

/// Replaces the contents of an original folder with a staging folder.
pub trait Apply: Send + Sync {
    fn apply(&self, original: &Path, staging: &Path) -> Result<ApplyReport, SafeSortError>;
}

/// Filesystem applier: clear, move entries, remove or quarantine staging.
#[derive(Debug, Clone)]
pub struct FsApplier {
    quarantine_dir: PathBuf,
}

impl Default for FsApplier {
    fn default() -> Self {
        Self {
            quarantine_dir: default_quarantine_dir(),
        }
    }
}

impl FsApplier {
    pub fn new(quarantine_dir: impl Into<PathBuf>) -> Self {
        Self {
            quarantine_dir: quarantine_dir.into(),
        }
    }

    pub fn quarantine_dir(&self) -> &Path {
        &self.quarantine_dir
    }
}

impl Apply for FsApplier {
    fn apply(&self, original: &Path, staging: &Path) -> Result<ApplyReport, SafeSortError> {
        apply_to_original(original, staging, &self.quarantine_dir)
    }
}

/// Delete every direct child of `folder`: files and links unlinked, directories
/// removed recursively. The folder itself stays.
pub fn clear_folder_contents(folder: &Path) -> Result<(), SafeSortError> {
    if !folder.is_dir() {
        return Err(SafeSortError::InvalidPath {
            path: folder.to_path_buf(),
            reason: "target must be an existing directory".into(),
        });
    }
    let entries = fs::read_dir(folder).map_err(clear_error("read directory", folder))?;
    for entry in entries {
        let entry = entry.map_err(clear_error("read directory entry", folder))?;
        let path = entry.path();
        remove_path(&path).map_err(clear_error("remove", &path))?;
        debug!(path = %path.display(), "removed");
    }
    Ok(())
}

/// Move `src` to `dst`: rename, or copy+remove when crossing filesystems.
pub(crate) fn move_entry(src: &Path, dst: &Path) -> Result<(), SafeSortError> {
    match fs::rename(src, dst) {
        Ok(()) => Ok(()),
        Err(e) if is_cross_device(&e) => {
            debug!(src = %src.display(), dest = %dst.display(), "cross-device rename; copying instead");
            copy_tree(src, dst).map_err(|err| match err {
                SafeSortError::Copy { source, .. } => move_error(src, dst)(source),
                other => other,
            })?;
            remove_path(src).map_err(move_error(src, dst))
        }
        Err(e) => Err(move_error(src, dst)(e)),
    }
}

/// Clear `original`, move every top-level staging entry into it, then remove
/// `staging`. A staging directory that cannot be removed is relocated into
/// `quarantine_dir` and reported; that never fails the apply.
pub fn apply_to_original(
    original: &Path,
    staging: &Path,
    quarantine_dir: &Path,
) -> Result<ApplyReport, SafeSortError> {
    if !original.is_dir() || !staging.is_dir() {
        return Err(SafeSortError::InvalidFolders {
            original: original.to_path_buf(),
            staging: staging.to_path_buf(),
        });
    }

    clear_folder_contents(original)?;
    info!(original = %original.display(), "Cleared original folder");

    let mut report = ApplyReport::default();
    let entries = fs::read_dir(staging).map_err(move_error(staging, original))?;
    for entry in entries {
        let entry = entry.map_err(move_error(staging, original))?;
        let src = entry.path();
        let dst = original.join(entry.file_name());
        move_entry(&src, &dst)?;
        report.moved += 1;
    }
    info!(original = %original.display(), moved = report.moved, "Moved staging entries into original");

    if let Err(e) = fs::remove_dir_all(staging) {
        let reason = describe_io_error("remove staging", staging, &e);
        let (location, warning) = quarantine(staging, quarantine_dir, &reason);
        warn!(staging = %staging.display(), location = %location.display(), "{warning}");
        report.quarantined = Some(location);
        report.warning = Some(warning);
    }

    Ok(report)
}

/// Relocate a leftover staging directory. Returns where it ended up and a
/// user-facing warning.
fn quarantine(staging: &Path, quarantine_dir: &Path, reason: &str) -> (PathBuf, String) {
    let target = unique_quarantine_path(quarantine_dir, staging, &timestamp_now());
    let moved = fs::create_dir_all(quarantine_dir)
        .and_then(|()| fs::rename(staging, &target))
        .or_else(|e| {
            if is_cross_device(&e) {
                copy_tree(staging, &target)
                    .map_err(|err| std::io::Error::other(err.to_string()))?;
                fs::remove_dir_all(staging)
            } else {
                Err(e)
            }
        });
    quarantine_report(staging, &target, reason, moved)
}

/// Warning for a quarantine attempt. Whenever `staging` still exists the
/// leftover is reported there, even if a copy reached `target`.
fn quarantine_report(
    staging: &Path,
    target: &Path,
    reason: &str,
    moved: std::io::Result<()>,
) -> (PathBuf, String) {
    match moved {
        Ok(()) if !staging.exists() => (
            target.to_path_buf(),
            format!(
                "Staging folder could not be removed ({reason}); moved to quarantine at {}",
                target.display()
            ),
        ),
        Ok(()) => (
            staging.to_path_buf(),
            format!(
                "Staging folder could not be removed ({reason}); left at {}",
                staging.display()
            ),
        ),
        Err(e) => {
            let copied = if target.exists() {
                format!(", a copy is at {}", target.display())
            } else {
                String::new()
            };
            (
                staging.to_path_buf(),
                format!(
                    "Staging folder could not be removed ({reason}) nor quarantined ({e}){copied}; left at {}",
                    staging.display()
                ),
            )
        }
    }
}
