//! Extension-based organizer: top-level files go into `<Category>/`.

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use super::category::Category;
use super::{OrganizeOutcome, Organizer};
use crate::cancel::CancellationToken;
use crate::errors::SafeSortError;
use crate::fs_ops::move_entry;

/// Groups the top-level files of a folder by `Category`. Existing
/// subdirectories are left untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct CategoryOrganizer;

impl Organizer for CategoryOrganizer {
    fn organize(
        &self,
        staging: &Path,
        cancel: &CancellationToken,
    ) -> Result<OrganizeOutcome, SafeSortError> {
        if !staging.is_dir() {
            return Err(SafeSortError::InvalidPath {
                path: staging.to_path_buf(),
                reason: "provided path is not a valid folder".into(),
            });
        }

        let files: Vec<PathBuf> = fs::read_dir(staging)
            .map_err(|e| SafeSortError::Organize {
                staging: staging.to_path_buf(),
                message: e.to_string(),
            })?
            .filter_map(Result::ok)
            .filter(|e| e.file_type().is_ok_and(|t| t.is_file()))
            .map(|e| e.path())
            .collect();

        let mut moved = 0usize;
        for file in files {
            if cancel.is_set() {
                info!(moved, "Organizing cancelled");
                return Ok(OrganizeOutcome::Cancelled);
            }
            let category = Category::for_path(&file);
            let folder = staging.join(category.dir_name());
            if let Err(e) = fs::create_dir_all(&folder) {
                warn!(folder = %folder.display(), error = %e, "Could not create category folder; file left in place");
                continue;
            }
            let Some(name) = file.file_name() else {
                continue;
            };
            let dest = unique_destination(&folder.join(name));
            match move_entry(&file, &dest) {
                Ok(()) => {
                    debug!(file = %file.display(), dest = %dest.display(), %category, "organized");
                    moved += 1;
                }
                Err(e) => {
                    warn!(file = %file.display(), error = %e, "Skipped file that could not be moved");
                }
            }
        }

        info!(staging = %staging.display(), moved, "Organized staging folder");
        Ok(OrganizeOutcome::Normal)
    }
}

/// First free path among `name.ext`, `name(1).ext`, `name(2).ext`, ….
/// Preserves non-UTF8 names.
pub fn unique_destination(candidate: &Path) -> PathBuf {
    if !candidate.exists() {
        return candidate.to_path_buf();
    }
    let stem = candidate
        .file_stem()
        .map(|s| s.to_owned())
        .unwrap_or_else(|| OsString::from("file"));
    let ext = candidate.extension().map(|e| e.to_owned());

    let mut counter = 1u32;
    loop {
        let mut name = stem.clone();
        name.push(format!("({counter})"));
        if let Some(ref e) = ext {
            name.push(".");
            name.push(e);
        }
        let alt = candidate.with_file_name(name);
        if !alt.exists() {
            return alt;
        }
        counter += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_fs::prelude::*;

    #[test]
    fn groups_files_by_extension() {
        let td = assert_fs::TempDir::new().unwrap();
        td.child("a.jpg").write_str("a").unwrap();
        td.child("b.txt").write_str("b").unwrap();
        td.child("notes.doc").write_str("n").unwrap();
        td.child("blob").write_str("?").unwrap();
        td.child("keep/inner.jpg").write_str("k").unwrap();

        let out = CategoryOrganizer
            .organize(td.path(), &CancellationToken::new())
            .unwrap();
        assert_eq!(out, OrganizeOutcome::Normal);
        assert!(td.path().join("Images/a.jpg").is_file());
        assert!(td.path().join("Documents/b.txt").is_file());
        assert!(td.path().join("Documents/notes.doc").is_file());
        assert!(td.path().join("Others/blob").is_file());
        assert!(td.path().join("keep/inner.jpg").is_file());
        assert!(!td.path().join("a.jpg").exists());
    }

    #[test]
    fn collision_gets_counter_suffix() {
        let td = assert_fs::TempDir::new().unwrap();
        td.child("Images/a.jpg").write_str("existing").unwrap();
        td.child("a.jpg").write_str("new").unwrap();

        CategoryOrganizer
            .organize(td.path(), &CancellationToken::new())
            .unwrap();
        assert_eq!(
            fs::read_to_string(td.path().join("Images/a.jpg")).unwrap(),
            "existing"
        );
        assert_eq!(
            fs::read_to_string(td.path().join("Images/a(1).jpg")).unwrap(),
            "new"
        );
    }

    #[test]
    fn cancelled_token_stops_before_moving() {
        let td = assert_fs::TempDir::new().unwrap();
        td.child("a.jpg").write_str("a").unwrap();
        let token = CancellationToken::new();
        token.request();
        let out = CategoryOrganizer.organize(td.path(), &token).unwrap();
        assert_eq!(out, OrganizeOutcome::Cancelled);
        assert!(td.path().join("a.jpg").is_file());
    }

    #[test]
    fn unique_destination_without_extension() {
        let td = assert_fs::TempDir::new().unwrap();
        td.child("README").write_str("r").unwrap();
        let p = unique_destination(&td.path().join("README"));
        assert_eq!(p.file_name().unwrap(), "README(1)");
    }
}
