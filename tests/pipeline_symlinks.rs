//! Links and special files in the source stop the run before anything is
//! copied, so the original can never be cleared with part of it unbacked.
#![cfg(unix)]

use assert_fs::prelude::*;
use safe_sort::{CancellationToken, Orchestrator, RunStatus};
use std::fs;
use std::os::unix::fs::symlink;
use std::path::Path;

fn run(source: &Path, backups: &Path) -> safe_sort::RunResult {
    Orchestrator::new(backups).run(source, &CancellationToken::new())
}

fn assert_no_backup(backups: &Path) {
    let n = fs::read_dir(backups).map(|rd| rd.count()).unwrap_or(0);
    assert_eq!(n, 0, "nothing may be created under the backup root");
}

#[test]
fn directory_link_fails_setup_and_keeps_original() {
    let td = assert_fs::TempDir::new().unwrap();
    td.child("src/a.jpg").write_str("a").unwrap();
    td.child("outside/keep.txt").write_str("k").unwrap();
    let link = td.path().join("src/linkdir");
    symlink(td.path().join("outside"), &link).unwrap();
    let backups = td.path().join("backups");

    let result = run(&td.path().join("src"), &backups);

    assert_eq!(result.status, RunStatus::SetupFailed);
    assert!(result.error.unwrap().contains("linkdir"));
    assert!(fs::symlink_metadata(&link).unwrap().file_type().is_symlink());
    assert!(td.path().join("src/a.jpg").is_file());
    assert!(td.path().join("outside/keep.txt").is_file());
    assert_no_backup(&backups);
}

#[test]
fn file_and_dangling_links_fail_setup() {
    for target in ["a.jpg", "missing.bin"] {
        let td = assert_fs::TempDir::new().unwrap();
        td.child("src/a.jpg").write_str("a").unwrap();
        let link = td.path().join("src/sub/alias");
        fs::create_dir_all(link.parent().unwrap()).unwrap();
        symlink(td.path().join("src").join(target), &link).unwrap();
        let backups = td.path().join("backups");

        let result = run(&td.path().join("src"), &backups);

        assert_eq!(result.status, RunStatus::SetupFailed, "link to {target}");
        assert!(fs::symlink_metadata(&link).is_ok());
        assert_no_backup(&backups);
    }
}
