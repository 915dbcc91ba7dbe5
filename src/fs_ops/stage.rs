//! Backup and staging copies.
//!
//! Both stagers share one copy loop: walk the source, skip OS metadata files,
//! mirror directories, copy files with their timestamps, report progress and
//! poll the cancellation token before every file. They differ only in how the
//! destination is named and whether a stale destination is replaced.

use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use super::helpers::{clear_error, copy_error, describe_io_error};
use super::metadata::preserve_times;
use super::naming::{source_name, staging_path, timestamp_now, unique_backup_path};
use super::walk::{EntryKind, classify, is_skipped, unsupported_entry};
use crate::cancel::CancellationToken;
use crate::errors::SafeSortError;
use crate::progress::{Phase, ProgressEvent, ProgressSink};

/// Result of a step that may stop early on cancellation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Flow<T> {
    Completed(T),
    Cancelled { phase: Phase },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageKind {
    /// Timestamped, unique, kept after the run.
    Backup,
    /// Fixed name, rebuilt from scratch every run.
    Working,
}

impl StageKind {
    pub fn phase(self) -> Phase {
        match self {
            StageKind::Backup => Phase::Backup,
            StageKind::Working => Phase::Staging,
        }
    }
}

/// Copies a source tree under `root`; see `StageKind` for naming rules.
#[derive(Debug, Clone)]
pub struct Stager {
    kind: StageKind,
    root: PathBuf,
    timestamp: Option<String>,
}

impl Stager {
    pub fn backup(root: impl Into<PathBuf>) -> Self {
        Self {
            kind: StageKind::Backup,
            root: root.into(),
            timestamp: None,
        }
    }

    pub fn working(root: impl Into<PathBuf>) -> Self {
        Self {
            kind: StageKind::Working,
            root: root.into(),
            timestamp: None,
        }
    }

    /// Pin the backup timestamp instead of reading the clock.
    pub fn with_timestamp(mut self, stamp: impl Into<String>) -> Self {
        self.timestamp = Some(stamp.into());
        self
    }

    pub fn kind(&self) -> StageKind {
        self.kind
    }

    /// Validate `source`, ensure the root exists and pick the destination path.
    ///
    /// Nothing is created at the destination itself. For a working stager a
    /// stale directory of the same name is deleted here.
    pub fn prepare_destination(&self, source: &Path) -> Result<PathBuf, SafeSortError> {
        if !source.is_dir() {
            return Err(SafeSortError::InvalidSource(source.to_path_buf()));
        }
        let name = source_name(source)?;

        fs::create_dir_all(&self.root).map_err(|e| SafeSortError::InvalidPath {
            path: self.root.clone(),
            reason: describe_io_error("create root", &self.root, &e),
        })?;

        match self.kind {
            StageKind::Backup => {
                let stamp = self.timestamp.clone().unwrap_or_else(timestamp_now);
                Ok(unique_backup_path(&self.root, &name, &stamp))
            }
            StageKind::Working => {
                let dest = staging_path(&self.root, &name);
                if dest.exists() {
                    info!(path = %dest.display(), "Removing stale staging directory");
                    remove_path(&dest).map_err(clear_error("remove stale staging", &dest))?;
                }
                Ok(dest)
            }
        }
    }

    /// Copy `source` into `dest` (which must not exist yet, or be empty).
    ///
    /// Returns the number of files copied. On cancellation or error the
    /// partial destination is left for the caller to discard.
    pub fn populate(
        &self,
        source: &Path,
        dest: &Path,
        total: u64,
        cancel: &CancellationToken,
        progress: &dyn ProgressSink,
    ) -> Result<Flow<u64>, SafeSortError> {
        let phase = self.kind.phase();
        fs::create_dir_all(dest).map_err(copy_error(source, dest))?;

        let mut processed = 0u64;
        for entry in WalkDir::new(source).min_depth(1) {
            let entry = entry.map_err(|e| {
                let path = e.path().unwrap_or(source).to_path_buf();
                let io = e
                    .into_io_error()
                    .unwrap_or_else(|| std::io::Error::other("filesystem loop detected"));
                copy_error(&path, dest)(io)
            })?;
            let path = entry.path();
            let rel = path.strip_prefix(source).map_err(|_| SafeSortError::InvalidPath {
                path: path.to_path_buf(),
                reason: format!("not under source {}", source.display()),
            })?;
            let target = dest.join(rel);

            match classify(&entry) {
                EntryKind::Dir => {
                    fs::create_dir_all(&target).map_err(copy_error(path, &target))?;
                }
                EntryKind::File => {
                    if cancel.is_set() {
                        info!(%phase, processed, total, "Cancellation observed");
                        return Ok(Flow::Cancelled { phase });
                    }
                    if is_skipped(path) {
                        debug!(path = %path.display(), "skip-listed file not copied");
                        continue;
                    }
                    copy_file(path, &target)?;
                    processed += 1;
                    progress.on_progress(ProgressEvent::new(processed, total, phase));
                }
                EntryKind::Other => {
                    warn!(path = %path.display(), "Refusing to copy symlink or special file");
                    return Err(unsupported_entry(path));
                }
            }
        }

        info!(%phase, src = %source.display(), dest = %dest.display(), files = processed, "Copy complete");
        Ok(Flow::Completed(processed))
    }

    /// `prepare_destination` followed by `populate`.
    pub fn stage(
        &self,
        source: &Path,
        total: u64,
        cancel: &CancellationToken,
        progress: &dyn ProgressSink,
    ) -> Result<Flow<PathBuf>, SafeSortError> {
        let dest = self.prepare_destination(source)?;
        Ok(match self.populate(source, &dest, total, cancel, progress)? {
            Flow::Completed(_) => Flow::Completed(dest),
            Flow::Cancelled { phase } => Flow::Cancelled { phase },
        })
    }
}

/// Back up `source` into a timestamped directory under `backup_root`.
pub fn create_backup(
    source: &Path,
    backup_root: &Path,
    total: u64,
    cancel: &CancellationToken,
    progress: &dyn ProgressSink,
) -> Result<Flow<PathBuf>, SafeSortError> {
    Stager::backup(backup_root).stage(source, total, cancel, progress)
}

/// Copy `source` into `<staging_root>/<name>_staging`, replacing a stale copy.
pub fn create_staging_copy(
    source: &Path,
    staging_root: &Path,
    total: u64,
    cancel: &CancellationToken,
    progress: &dyn ProgressSink,
) -> Result<Flow<PathBuf>, SafeSortError> {
    Stager::working(staging_root).stage(source, total, cancel, progress)
}

/// Copy a single file, creating parents on demand and keeping its timestamps.
pub(crate) fn copy_file(src: &Path, dst: &Path) -> Result<(), SafeSortError> {
    if let Some(parent) = dst.parent() {
        fs::create_dir_all(parent).map_err(copy_error(src, parent))?;
    }
    fs::copy(src, dst).map_err(copy_error(src, dst))?;
    let meta = fs::metadata(src).map_err(copy_error(src, dst))?;
    preserve_times(dst, &meta);
    Ok(())
}

/// Recursively copy `src` (file or directory) to `dst` with no skip rules.
/// Symlinks and special files inside `src` are an error.
pub(crate) fn copy_tree(src: &Path, dst: &Path) -> Result<(), SafeSortError> {
    let meta = fs::metadata(src).map_err(copy_error(src, dst))?;
    if !meta.is_dir() {
        return copy_file(src, dst);
    }
    fs::create_dir_all(dst).map_err(copy_error(src, dst))?;
    for entry in WalkDir::new(src).min_depth(1) {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(src).to_path_buf();
            let io = e
                .into_io_error()
                .unwrap_or_else(|| std::io::Error::other("filesystem loop detected"));
            copy_error(&path, dst)(io)
        })?;
        let path = entry.path();
        let Ok(rel) = path.strip_prefix(src) else {
            continue;
        };
        let target = dst.join(rel);
        match classify(&entry) {
            EntryKind::Dir => fs::create_dir_all(&target).map_err(copy_error(path, &target))?,
            EntryKind::File => copy_file(path, &target)?,
            EntryKind::Other => return Err(unsupported_entry(path)),
        }
    }
    Ok(())
}

/// Remove a file, symlink or directory tree without following links.
pub(crate) fn remove_path(path: &Path) -> std::io::Result<()> {
    let meta = fs::symlink_metadata(path)?;
    if meta.is_dir() {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    }
}
