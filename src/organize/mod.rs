//! Organizers mutate a staging directory in place.
//!
//! The pipeline only relies on the `Organizer` trait; `CategoryOrganizer` is
//! the stock extension-based implementation.

mod by_category;
mod category;

pub use by_category::{CategoryOrganizer, unique_destination};
pub use category::Category;

use std::fs;
use std::path::Path;
use walkdir::WalkDir;

use crate::cancel::CancellationToken;
use crate::errors::SafeSortError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrganizeOutcome {
    Normal,
    Cancelled,
}

pub trait Organizer: Send + Sync {
    /// Reorganize `staging` in place. May poll `cancel` and stop early.
    fn organize(
        &self,
        staging: &Path,
        cancel: &CancellationToken,
    ) -> Result<OrganizeOutcome, SafeSortError>;
}

/// Postconditions after a non-cancelled organize: staging still holds at least
/// one file, and at least one subdirectory exists.
pub fn verify_organized(staging: &Path) -> Result<(), SafeSortError> {
    let violation = |reason: &str| SafeSortError::OrganizeInvariantViolation {
        staging: staging.to_path_buf(),
        reason: reason.to_string(),
    };

    let has_file = WalkDir::new(staging)
        .min_depth(1)
        .into_iter()
        .filter_map(Result::ok)
        .any(|e| e.file_type().is_file());
    if !has_file {
        return Err(violation("staging folder is empty after organizing"));
    }

    let has_subdir = fs::read_dir(staging)
        .map_err(|e| violation(&e.to_string()))?
        .filter_map(Result::ok)
        .any(|e| e.file_type().is_ok_and(|t| t.is_dir()));
    if !has_subdir {
        return Err(violation("no category folders were created"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_fs::prelude::*;

    #[test]
    fn empty_staging_violates() {
        let td = assert_fs::TempDir::new().unwrap();
        td.child("Images").create_dir_all().unwrap();
        let err = verify_organized(td.path()).unwrap_err();
        assert!(err.to_string().contains("empty"));
    }

    #[test]
    fn flat_staging_violates() {
        let td = assert_fs::TempDir::new().unwrap();
        td.child("a.jpg").write_str("a").unwrap();
        let err = verify_organized(td.path()).unwrap_err();
        assert!(err.to_string().contains("category folders"));
    }

    #[test]
    fn organized_staging_passes() {
        let td = assert_fs::TempDir::new().unwrap();
        td.child("Images/a.jpg").write_str("a").unwrap();
        verify_organized(td.path()).unwrap();
    }
}
