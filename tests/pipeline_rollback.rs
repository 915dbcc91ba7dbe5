//! A failing apply restores the original from the backup.

use assert_fs::prelude::*;
use safe_sort::{
    Apply, ApplyReport, CancellationToken, Orchestrator, RollbackOutcome, RunState, RunStatus,
    SafeSortError,
};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Clears part of the original, drops a stray file, then fails.
struct HalfApply;

impl Apply for HalfApply {
    fn apply(&self, original: &Path, staging: &Path) -> Result<ApplyReport, SafeSortError> {
        fs::remove_file(original.join("a.jpg")).unwrap();
        fs::write(original.join("half-moved.tmp"), "junk").unwrap();
        Err(SafeSortError::Move {
            from: staging.to_path_buf(),
            to: original.to_path_buf(),
            message: "disk went away".into(),
            source: io::Error::other("simulated"),
        })
    }
}

/// Deletes every backup under its root, then fails, so rollback cannot succeed.
struct ApplyEatsBackups(PathBuf);

impl Apply for ApplyEatsBackups {
    fn apply(&self, original: &Path, _staging: &Path) -> Result<ApplyReport, SafeSortError> {
        for e in fs::read_dir(&self.0).unwrap().flatten() {
            if e.file_name().to_string_lossy().contains("_backup_") {
                fs::remove_dir_all(e.path()).unwrap();
            }
        }
        Err(SafeSortError::Clear {
            path: original.to_path_buf(),
            message: "simulated".into(),
            source: io::Error::other("simulated"),
        })
    }
}

fn fixture() -> assert_fs::TempDir {
    let td = assert_fs::TempDir::new().unwrap();
    td.child("src/a.jpg").write_str("image").unwrap();
    td.child("src/b.txt").write_str("text").unwrap();
    td.child("src/keep/c.doc").write_str("doc").unwrap();
    td
}

#[test]
fn failed_apply_is_rolled_back() {
    let td = fixture();
    let source = td.path().join("src");
    let mut orch = Orchestrator::new(td.path().join("backups")).applier(HalfApply);
    let result = orch.run(&source, &CancellationToken::new());

    assert_eq!(result.status, RunStatus::Failed);
    assert_eq!(result.rollback, Some(RollbackOutcome::Restored));
    assert!(result.error.as_deref().unwrap().contains("disk went away"));
    assert!(orch.transitions().contains(&RunState::RollingBack));
    assert_eq!(orch.state(), RunState::Failed);

    assert_eq!(fs::read_to_string(source.join("a.jpg")).unwrap(), "image");
    assert_eq!(fs::read_to_string(source.join("b.txt")).unwrap(), "text");
    assert_eq!(fs::read_to_string(source.join("keep/c.doc")).unwrap(), "doc");
    assert!(!source.join("half-moved.tmp").exists());

    assert!(result.backup_folder.unwrap().is_dir(), "backup is kept");
    assert_eq!(result.staging_folder, None, "discarded staging is not reported");
    assert!(!td.path().join("backups/src_staging").exists());
}

#[test]
fn rollback_failure_is_reported() {
    let td = fixture();
    let backups = td.path().join("backups");
    let result = Orchestrator::new(&backups)
        .applier(ApplyEatsBackups(backups.clone()))
        .run(&td.path().join("src"), &CancellationToken::new());

    assert_eq!(result.status, RunStatus::Failed);
    match result.rollback {
        Some(RollbackOutcome::Failed(msg)) => assert!(msg.contains("Backup does not exist")),
        other => panic!("expected failed rollback, got {other:?}"),
    }
}
