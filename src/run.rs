//! Run orchestrator.
//! Drives count → backup → staging → organize → apply (→ rollback) through a
//! fixed state sequence and turns every outcome into exactly one `RunResult`.
//!
//! Ownership: only this module decides when backup/staging directories are
//! discarded, and only the applier and rollback touch the original folder.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

use crate::cancel::CancellationToken;
use crate::errors::SafeSortError;
use crate::fs_ops::{
    Apply, FsApplier, Flow, Stager, count_files, describe_io_error, remove_path,
    rollback_from_backup,
};
use crate::organize::{CategoryOrganizer, OrganizeOutcome, Organizer, verify_organized};
use crate::progress::{NoProgress, Phase, ProgressEvent, ProgressSink};

/// Externally observed outcome of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    /// Source holds no files; nothing was created.
    Empty,
    /// Backup and staging are in place (end of `prepare`).
    Ready,
    Cancelled,
    Success,
    /// Organizing or applying failed; see `RunResult::rollback`.
    Failed,
    /// Paths, counting, backup or staging failed before `Ready`.
    SetupFailed,
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RunStatus::Empty => "EMPTY",
            RunStatus::Ready => "READY",
            RunStatus::Cancelled => "CANCELLED",
            RunStatus::Success => "SUCCESS",
            RunStatus::Failed => "FAILED",
            RunStatus::SetupFailed => "SETUP_FAILED",
        };
        f.write_str(s)
    }
}

/// Orchestrator states, in pipeline order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Init,
    Counting,
    Empty,
    BackingUp,
    Staging,
    Organizing,
    Applying,
    RollingBack,
    Success,
    Cancelled,
    Failed,
    SetupFailed,
}

impl RunState {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            RunState::Empty
                | RunState::Success
                | RunState::Cancelled
                | RunState::Failed
                | RunState::SetupFailed
        )
    }
}

/// Where a cancellation was observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Checkpoint {
    Backup,
    Staging,
    Organize,
    PreApply,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RollbackOutcome {
    /// Original restored from the backup.
    Restored,
    /// Restoration failed; the original may be empty or partial.
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunResult {
    pub status: RunStatus,
    pub source_files: Option<u64>,
    pub backup_folder: Option<PathBuf>,
    pub staging_folder: Option<PathBuf>,
    /// Set when staging could not be removed after a successful apply.
    pub quarantined: Option<PathBuf>,
    pub rollback: Option<RollbackOutcome>,
    pub cancelled_at: Option<Checkpoint>,
    pub error: Option<String>,
}

impl RunResult {
    pub(crate) fn new(status: RunStatus) -> Self {
        Self {
            status,
            source_files: None,
            backup_folder: None,
            staging_folder: None,
            quarantined: None,
            rollback: None,
            cancelled_at: None,
            error: None,
        }
    }

    /// Success with nothing left behind in quarantine.
    pub fn is_clean_success(&self) -> bool {
        self.status == RunStatus::Success && self.quarantined.is_none()
    }
}

/// Backup and staging produced by a successful preparation.
#[derive(Debug)]
struct Prepared {
    source: PathBuf,
    source_files: u64,
    backup: PathBuf,
    staging: PathBuf,
}

pub struct Orchestrator {
    backup_root: PathBuf,
    staging_root: Option<PathBuf>,
    timestamp: Option<String>,
    organizer: Box<dyn Organizer>,
    applier: Box<dyn Apply>,
    progress: Box<dyn ProgressSink>,
    state: RunState,
    transitions: Vec<RunState>,
}

impl fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Orchestrator")
            .field("backup_root", &self.backup_root)
            .field("staging_root", &self.staging_root)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl Orchestrator {
    /// Orchestrator with the category organizer, the filesystem applier
    /// (default quarantine) and no progress reporting. Staging lives next to
    /// the backups unless `staging_root` is set.
    pub fn new(backup_root: impl Into<PathBuf>) -> Self {
        Self {
            backup_root: backup_root.into(),
            staging_root: None,
            timestamp: None,
            organizer: Box::new(CategoryOrganizer),
            applier: Box::new(FsApplier::default()),
            progress: Box::new(NoProgress),
            state: RunState::Init,
            transitions: Vec::new(),
        }
    }

    pub fn staging_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.staging_root = Some(root.into());
        self
    }

    pub fn quarantine_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.applier = Box::new(FsApplier::new(dir));
        self
    }

    pub fn organizer(mut self, organizer: impl Organizer + 'static) -> Self {
        self.organizer = Box::new(organizer);
        self
    }

    pub fn applier(mut self, applier: impl Apply + 'static) -> Self {
        self.applier = Box::new(applier);
        self
    }

    pub fn progress(mut self, sink: impl ProgressSink + 'static) -> Self {
        self.progress = Box::new(sink);
        self
    }

    /// Pin the backup timestamp (otherwise the local clock is used).
    pub fn timestamp(mut self, stamp: impl Into<String>) -> Self {
        self.timestamp = Some(stamp.into());
        self
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    /// States entered during the most recent run, in order.
    pub fn transitions(&self) -> &[RunState] {
        &self.transitions
    }

    fn enter(&mut self, next: RunState) {
        debug!(from = ?self.state, to = ?next, "state transition");
        self.state = next;
        self.transitions.push(next);
    }

    fn begin(&mut self, cancel: &CancellationToken) {
        cancel.reset();
        self.state = RunState::Init;
        self.transitions.clear();
        self.transitions.push(RunState::Init);
    }

    /// Count, back up and stage `source`, stopping at `Ready`.
    ///
    /// On `Ready` the backup and staging directories are left in place and
    /// owned by the caller.
    pub fn prepare(&mut self, source: &Path, cancel: &CancellationToken) -> RunResult {
        self.begin(cancel);
        match self.prepare_inner(source, cancel) {
            Ok(p) => {
                let mut r = RunResult::new(RunStatus::Ready);
                r.source_files = Some(p.source_files);
                r.backup_folder = Some(p.backup);
                r.staging_folder = Some(p.staging);
                r
            }
            Err(r) => r,
        }
    }

    /// Full pipeline. Always returns exactly one terminal result.
    pub fn run(&mut self, source: &Path, cancel: &CancellationToken) -> RunResult {
        self.begin(cancel);
        info!(source = %source.display(), backup_root = %self.backup_root.display(), "Run started");

        let prepared = match self.prepare_inner(source, cancel) {
            Ok(p) => p,
            Err(r) => return r,
        };
        let result = self.organize_and_apply(prepared, cancel);
        info!(status = %result.status, "Run finished");
        result
    }

    fn prepare_inner(
        &mut self,
        source: &Path,
        cancel: &CancellationToken,
    ) -> Result<Prepared, RunResult> {
        let staging_root = self
            .staging_root
            .clone()
            .unwrap_or_else(|| self.backup_root.clone());

        let source = match self.check_paths(source, &staging_root) {
            Ok(s) => s,
            Err(e) => return Err(self.setup_failed(e, None, &[])),
        };

        self.enter(RunState::Counting);
        let total = match count_files(&source) {
            Ok(n) => n,
            Err(e) => return Err(self.setup_failed(e, None, &[])),
        };
        if total == 0 {
            self.enter(RunState::Empty);
            info!(source = %source.display(), "Nothing to work on; source folder is empty");
            let mut r = RunResult::new(RunStatus::Empty);
            r.source_files = Some(0);
            return Err(r);
        }

        self.enter(RunState::BackingUp);
        let mut backup_stager = Stager::backup(&self.backup_root);
        if let Some(stamp) = &self.timestamp {
            backup_stager = backup_stager.with_timestamp(stamp.clone());
        }
        let backup = match backup_stager.prepare_destination(&source) {
            Ok(p) => p,
            Err(e) => return Err(self.setup_failed(e, Some(total), &[])),
        };
        match backup_stager.populate(&source, &backup, total, cancel, self.progress.as_ref()) {
            Ok(Flow::Completed(_)) => {}
            Ok(Flow::Cancelled { .. }) => {
                return Err(self.cancelled(Checkpoint::Backup, Some(total), &[&backup]));
            }
            Err(e) => return Err(self.setup_failed(e, Some(total), &[&backup])),
        }

        self.enter(RunState::Staging);
        let working = Stager::working(&staging_root);
        let staging = match working.prepare_destination(&source) {
            Ok(p) => p,
            Err(e) => return Err(self.setup_failed(e, Some(total), &[&backup])),
        };
        match working.populate(&source, &staging, total, cancel, self.progress.as_ref()) {
            Ok(Flow::Completed(_)) => {}
            Ok(Flow::Cancelled { .. }) => {
                return Err(self.cancelled(
                    Checkpoint::Staging,
                    Some(total),
                    &[&staging, &backup],
                ));
            }
            Err(e) => return Err(self.setup_failed(e, Some(total), &[&staging, &backup])),
        }

        info!(
            source_files = total,
            backup = %backup.display(),
            staging = %staging.display(),
            "Backup and staging ready"
        );
        Ok(Prepared {
            source,
            source_files: total,
            backup,
            staging,
        })
    }

    fn organize_and_apply(&mut self, p: Prepared, cancel: &CancellationToken) -> RunResult {
        self.enter(RunState::Organizing);
        // The organizer's answer is authoritative; a cancellation it reports
        // returns here and is not polled again below.
        match self.organizer.organize(&p.staging, cancel) {
            Ok(OrganizeOutcome::Cancelled) => {
                return self.cancelled(
                    Checkpoint::Organize,
                    Some(p.source_files),
                    &[&p.staging, &p.backup],
                );
            }
            Ok(OrganizeOutcome::Normal) => {
                if let Err(e) = verify_organized(&p.staging) {
                    return self.organize_failed(e, &p);
                }
            }
            Err(e) => return self.organize_failed(e, &p),
        }
        info!(staging = %p.staging.display(), "Staging organized successfully");

        if cancel.is_set() {
            return self.cancelled(
                Checkpoint::PreApply,
                Some(p.source_files),
                &[&p.staging, &p.backup],
            );
        }

        self.enter(RunState::Applying);
        self.progress
            .on_progress(ProgressEvent::new(0, p.source_files, Phase::ApplyStart));

        let mut result = RunResult::new(RunStatus::Success);
        result.source_files = Some(p.source_files);
        result.backup_folder = Some(p.backup.clone());
        result.staging_folder = Some(p.staging.clone());

        match self.applier.apply(&p.source, &p.staging) {
            Ok(report) => {
                if let Some(w) = &report.warning {
                    self.progress.on_warning(w);
                }
                result.quarantined = report.quarantined;
                self.enter(RunState::Success);
                info!(original = %p.source.display(), backup = %p.backup.display(), "Apply complete");
                result
            }
            Err(e) => {
                error!(code = e.code(), kind = e.kind(), error = %e, "Apply failed; rolling back");
                self.enter(RunState::RollingBack);
                let outcome = match rollback_from_backup(&p.source, &p.backup) {
                    Ok(()) => RollbackOutcome::Restored,
                    Err(rb) => {
                        error!(
                            code = rb.code(),
                            kind = rb.kind(),
                            error = %rb,
                            original = %p.source.display(),
                            backup = %p.backup.display(),
                            "ROLLBACK FAILED; original folder may be incomplete, restore manually from the backup"
                        );
                        RollbackOutcome::Failed(rb.to_string())
                    }
                };
                self.discard(&p.staging);
                self.enter(RunState::Failed);
                result.status = RunStatus::Failed;
                result.staging_folder = None;
                result.rollback = Some(outcome);
                result.error = Some(e.to_string());
                result
            }
        }
    }

    /// Source must be an existing directory; backup and staging roots must
    /// lie outside it. Returns the resolved source path.
    fn check_paths(&self, source: &Path, staging_root: &Path) -> Result<PathBuf, SafeSortError> {
        if !source.is_dir() {
            return Err(SafeSortError::InvalidSource(source.to_path_buf()));
        }
        let given = std::path::absolute(source).unwrap_or_else(|_| source.to_path_buf());
        let source = dunce::canonicalize(source).map_err(|e| SafeSortError::InvalidPath {
            path: source.to_path_buf(),
            reason: describe_io_error("resolve source", source, &e),
        })?;
        let roots = [
            ("backup root", self.backup_root.as_path()),
            ("staging root", staging_root),
        ];
        for (label, root) in roots {
            let resolved = resolve(root);
            if resolved.starts_with(&source) || resolved.starts_with(&given) {
                return Err(SafeSortError::InvalidPath {
                    path: root.to_path_buf(),
                    reason: format!(
                        "{label} must not be inside the source folder {}",
                        source.display()
                    ),
                });
            }
        }
        Ok(source)
    }

    fn setup_failed(
        &mut self,
        e: SafeSortError,
        source_files: Option<u64>,
        discard: &[&Path],
    ) -> RunResult {
        error!(code = e.code(), kind = e.kind(), error = %e, "Setup failed");
        for p in discard {
            self.discard(p);
        }
        self.enter(RunState::SetupFailed);
        let mut r = RunResult::new(RunStatus::SetupFailed);
        r.source_files = source_files;
        r.error = Some(e.to_string());
        r
    }

    fn cancelled(
        &mut self,
        at: Checkpoint,
        source_files: Option<u64>,
        discard: &[&Path],
    ) -> RunResult {
        info!(checkpoint = ?at, "Operation cancelled by the user");
        for p in discard {
            self.discard(p);
        }
        self.enter(RunState::Cancelled);
        let mut r = RunResult::new(RunStatus::Cancelled);
        r.source_files = source_files;
        r.cancelled_at = Some(at);
        r
    }

    /// Organizer misbehaved: no apply, staging discarded, backup kept.
    fn organize_failed(&mut self, e: SafeSortError, p: &Prepared) -> RunResult {
        error!(code = e.code(), kind = e.kind(), error = %e, "Organizing failed; original left untouched");
        self.discard(&p.staging);
        self.enter(RunState::Failed);
        let mut r = RunResult::new(RunStatus::Failed);
        r.source_files = Some(p.source_files);
        r.backup_folder = Some(p.backup.clone());
        r.error = Some(e.to_string());
        r
    }

    /// Best-effort removal of a run-owned directory.
    fn discard(&self, path: &Path) {
        if fs::symlink_metadata(path).is_err() {
            return;
        }
        match remove_path(path) {
            Ok(()) => debug!(path = %path.display(), "discarded"),
            Err(e) => warn!(path = %path.display(), error = %e, "Failed to discard directory"),
        }
    }
}

/// Canonical form of `p`, or its absolute form when it does not exist yet.
fn resolve(p: &Path) -> PathBuf {
    dunce::canonicalize(p)
        .or_else(|_| std::path::absolute(p))
        .unwrap_or_else(|_| p.to_path_buf())
}

/// One-shot run with default collaborators and a fresh token.
pub fn run(
    source: &Path,
    backup_root: &Path,
    progress: Option<Box<dyn ProgressSink>>,
) -> RunResult {
    let mut orch = Orchestrator::new(backup_root);
    if let Some(sink) = progress {
        orch.progress = sink;
    }
    orch.run(source, &CancellationToken::new())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_fs::prelude::*;

    #[test]
    fn empty_source_creates_nothing() {
        let td = assert_fs::TempDir::new().unwrap();
        td.child("src/Thumbs.db").write_str("t").unwrap();
        td.child("src/nested").create_dir_all().unwrap();
        let bk = td.path().join("bk");

        let mut orch = Orchestrator::new(&bk);
        let r = orch.run(&td.path().join("src"), &CancellationToken::new());
        assert_eq!(r.status, RunStatus::Empty);
        assert_eq!(r.source_files, Some(0));
        assert!(!bk.exists());
        assert_eq!(
            orch.transitions(),
            &[RunState::Init, RunState::Counting, RunState::Empty]
        );
    }

    #[test]
    fn missing_source_is_setup_failure() {
        let td = assert_fs::TempDir::new().unwrap();
        let mut orch = Orchestrator::new(td.path().join("bk"));
        let r = orch.run(&td.path().join("missing"), &CancellationToken::new());
        assert_eq!(r.status, RunStatus::SetupFailed);
        assert!(r.error.unwrap().contains("not valid"));
        assert!(orch.state().is_terminal());
    }

    #[test]
    fn backup_root_inside_source_is_rejected() {
        let td = assert_fs::TempDir::new().unwrap();
        td.child("src/a.txt").write_str("a").unwrap();
        let src = td.path().join("src");
        let mut orch = Orchestrator::new(src.join("backups"));
        let r = orch.run(&src, &CancellationToken::new());
        assert_eq!(r.status, RunStatus::SetupFailed);
        assert!(!src.join("backups").exists());
    }

    #[test]
    fn prepare_stops_at_ready() {
        let td = assert_fs::TempDir::new().unwrap();
        td.child("src/a.txt").write_str("a").unwrap();
        let mut orch = Orchestrator::new(td.path().join("bk")).timestamp("2021-02-03_04-05-06");
        let r = orch.prepare(&td.path().join("src"), &CancellationToken::new());
        assert_eq!(r.status, RunStatus::Ready);
        assert_eq!(r.source_files, Some(1));
        let backup = r.backup_folder.unwrap();
        assert_eq!(backup.file_name().unwrap(), "src_backup_2021-02-03_04-05-06");
        assert!(backup.join("a.txt").is_file());
        assert!(r.staging_folder.unwrap().join("a.txt").is_file());
        assert_eq!(orch.state(), RunState::Staging);
    }

    #[test]
    fn status_display_uses_wire_names() {
        assert_eq!(RunStatus::SetupFailed.to_string(), "SETUP_FAILED");
        assert_eq!(RunStatus::Ready.to_string(), "READY");
    }
}
