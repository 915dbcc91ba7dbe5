//! A misbehaving organizer fails the run before the original is touched.

use assert_fs::prelude::*;
use safe_sort::{
    CancellationToken, Orchestrator, OrganizeOutcome, Organizer, RunResult, RunState, RunStatus,
    SafeSortError,
};
use std::fs;
use std::path::Path;

struct Broken;

impl Organizer for Broken {
    fn organize(
        &self,
        staging: &Path,
        _: &CancellationToken,
    ) -> Result<OrganizeOutcome, SafeSortError> {
        Err(SafeSortError::Organize {
            staging: staging.to_path_buf(),
            message: "rules file unreadable".into(),
        })
    }
}

/// Claims success without creating any category folder.
struct DoesNothing;

impl Organizer for DoesNothing {
    fn organize(&self, _: &Path, _: &CancellationToken) -> Result<OrganizeOutcome, SafeSortError> {
        Ok(OrganizeOutcome::Normal)
    }
}

/// Deletes everything it was given.
struct Shredder;

impl Organizer for Shredder {
    fn organize(
        &self,
        staging: &Path,
        _: &CancellationToken,
    ) -> Result<OrganizeOutcome, SafeSortError> {
        for e in fs::read_dir(staging).unwrap().flatten() {
            fs::remove_file(e.path()).unwrap();
        }
        fs::create_dir(staging.join("Images")).unwrap();
        Ok(OrganizeOutcome::Normal)
    }
}

fn run_with(org: impl Organizer + 'static) -> (assert_fs::TempDir, RunResult, Vec<RunState>) {
    let td = assert_fs::TempDir::new().unwrap();
    td.child("src/a.jpg").write_str("a").unwrap();
    td.child("src/b.txt").write_str("b").unwrap();
    let mut orch = Orchestrator::new(td.path().join("backups")).organizer(org);
    let result = orch.run(&td.path().join("src"), &CancellationToken::new());
    let transitions = orch.transitions().to_vec();
    (td, result, transitions)
}

fn assert_untouched(td: &assert_fs::TempDir) {
    assert_eq!(fs::read_to_string(td.path().join("src/a.jpg")).unwrap(), "a");
    assert_eq!(fs::read_to_string(td.path().join("src/b.txt")).unwrap(), "b");
}

#[test]
fn organizer_error_fails_without_rollback() {
    let (td, result, transitions) = run_with(Broken);
    assert_eq!(result.status, RunStatus::Failed);
    assert!(result.rollback.is_none());
    assert!(result.error.unwrap().contains("rules file unreadable"));
    assert!(!transitions.contains(&RunState::Applying));
    assert!(result.backup_folder.unwrap().is_dir());
    assert!(!td.path().join("backups/src_staging").exists());
    assert_untouched(&td);
}

#[test]
fn flat_staging_is_an_invariant_violation() {
    let (td, result, _) = run_with(DoesNothing);
    assert_eq!(result.status, RunStatus::Failed);
    assert!(result.error.unwrap().contains("invalid state"));
    assert_untouched(&td);
}

#[test]
fn emptied_staging_is_an_invariant_violation() {
    let (td, result, _) = run_with(Shredder);
    assert_eq!(result.status, RunStatus::Failed);
    assert!(result.error.unwrap().contains("empty"));
    assert_untouched(&td);
}
