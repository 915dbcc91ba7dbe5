//! Deterministic names for backup, staging and quarantine directories.

use chrono::Local;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use crate::errors::SafeSortError;

/// Second-resolution local timestamp used in backup names.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d_%H-%M-%S";

pub fn timestamp_now() -> String {
    Local::now().format(TIMESTAMP_FORMAT).to_string()
}

/// Base name of `source`, or `InvalidSource` for paths like `/` or `..`.
pub fn source_name(source: &Path) -> Result<OsString, SafeSortError> {
    source
        .file_name()
        .map(|n| n.to_os_string())
        .ok_or_else(|| SafeSortError::InvalidSource(source.to_path_buf()))
}

/// `<root>/<name>_backup_<stamp>`, then `...(1)`, `...(2)` until the path is free.
pub fn unique_backup_path(root: &Path, name: &OsString, stamp: &str) -> PathBuf {
    let mut base = name.clone();
    base.push(format!("_backup_{stamp}"));
    first_free(root, &base)
}

/// `<root>/<name>_staging`; a run has exactly one.
pub fn staging_path(root: &Path, name: &OsString) -> PathBuf {
    let mut n = name.clone();
    n.push("_staging");
    root.join(n)
}

/// `<quarantine>/<staging name>_<stamp>` with the same counter suffix rule.
pub fn unique_quarantine_path(quarantine: &Path, staging: &Path, stamp: &str) -> PathBuf {
    let mut base = staging
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| OsString::from("staging"));
    base.push(format!("_{stamp}"));
    first_free(quarantine, &base)
}

fn first_free(root: &Path, base: &OsString) -> PathBuf {
    let candidate = root.join(base);
    if !candidate.exists() {
        return candidate;
    }
    let mut counter = 1u32;
    loop {
        let mut alt = base.clone();
        alt.push(format!("({counter})"));
        let p = root.join(alt);
        if !p.exists() {
            return p;
        }
        counter += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn timestamp_has_second_resolution_shape() {
        let s = timestamp_now();
        assert_eq!(s.len(), "2024-01-02_03-04-05".len());
        assert_eq!(s.as_bytes()[10], b'_');
    }

    #[test]
    fn backup_path_appends_counter_on_collision() {
        let td = tempdir().unwrap();
        let name = OsString::from("Downloads");
        let stamp = "2024-01-02_03-04-05";

        let first = unique_backup_path(td.path(), &name, stamp);
        assert_eq!(
            first.file_name().unwrap(),
            "Downloads_backup_2024-01-02_03-04-05"
        );
        fs::create_dir(&first).unwrap();

        let second = unique_backup_path(td.path(), &name, stamp);
        assert_eq!(
            second.file_name().unwrap(),
            "Downloads_backup_2024-01-02_03-04-05(1)"
        );
        fs::create_dir(&second).unwrap();

        let third = unique_backup_path(td.path(), &name, stamp);
        assert_eq!(
            third.file_name().unwrap(),
            "Downloads_backup_2024-01-02_03-04-05(2)"
        );
    }

    #[test]
    fn staging_path_has_no_timestamp() {
        let p = staging_path(Path::new("/r"), &OsString::from("src"));
        assert_eq!(p, PathBuf::from("/r/src_staging"));
    }

    #[test]
    fn source_name_rejects_root() {
        assert!(source_name(Path::new("/")).is_err());
        assert_eq!(source_name(Path::new("/a/b")).unwrap(), "b");
    }
}
