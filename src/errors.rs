//! Typed error definitions for safe_sort.
//! Provides a small set of well-known failure modes for better logs and tests.
//!
//! Cancellation is not an error; it travels as `Flow::Cancelled` or
//! `OrganizeOutcome::Cancelled`.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SafeSortError {
    #[error("Invalid path {path}: {reason}")]
    InvalidPath { path: PathBuf, reason: String },

    #[error("Source folder is not valid: {0}")]
    InvalidSource(PathBuf),

    #[error("Original or staging folder does not exist: original={original}, staging={staging}")]
    InvalidFolders { original: PathBuf, staging: PathBuf },

    #[error("Original must be a valid directory: {0}")]
    InvalidOriginal(PathBuf),

    #[error("Failed to count files under {path}: {message}")]
    Count { path: PathBuf, message: String },

    #[error("Copy failed {from} -> {to}: {message}")]
    Copy {
        from: PathBuf,
        to: PathBuf,
        message: String,
        #[source]
        source: io::Error,
    },

    #[error("Failed to clear {path}: {message}")]
    Clear {
        path: PathBuf,
        message: String,
        #[source]
        source: io::Error,
    },

    #[error("Move failed {from} -> {to}: {message}")]
    Move {
        from: PathBuf,
        to: PathBuf,
        message: String,
        #[source]
        source: io::Error,
    },

    #[error("Organizer left staging in an invalid state ({staging}): {reason}")]
    OrganizeInvariantViolation { staging: PathBuf, reason: String },

    #[error("Organizer failed on {staging}: {message}")]
    Organize { staging: PathBuf, message: String },

    #[error("Backup does not exist, cannot roll back: {0}")]
    BackupMissing(PathBuf),
}

impl SafeSortError {
    /// Stable numeric code for structured logs and scripting.
    pub fn code(&self) -> u16 {
        match self {
            SafeSortError::InvalidPath { .. } => 10,
            SafeSortError::InvalidSource(_) => 11,
            SafeSortError::InvalidFolders { .. } => 12,
            SafeSortError::InvalidOriginal(_) => 13,
            SafeSortError::Count { .. } => 20,
            SafeSortError::Copy { .. } => 21,
            SafeSortError::Clear { .. } => 22,
            SafeSortError::Move { .. } => 23,
            SafeSortError::OrganizeInvariantViolation { .. } => 30,
            SafeSortError::Organize { .. } => 31,
            SafeSortError::BackupMissing(_) => 40,
        }
    }

    /// Short machine-friendly label used as the `kind` log field.
    pub fn kind(&self) -> &'static str {
        match self {
            SafeSortError::InvalidPath { .. } => "invalid_path",
            SafeSortError::InvalidSource(_) => "invalid_source",
            SafeSortError::InvalidFolders { .. } => "invalid_folders",
            SafeSortError::InvalidOriginal(_) => "invalid_original",
            SafeSortError::Count { .. } => "count_error",
            SafeSortError::Copy { .. } => "copy_error",
            SafeSortError::Clear { .. } => "clear_error",
            SafeSortError::Move { .. } => "move_error",
            SafeSortError::OrganizeInvariantViolation { .. } => "organize_invariant_violation",
            SafeSortError::Organize { .. } => "organize_error",
            SafeSortError::BackupMissing(_) => "backup_missing",
        }
    }

    /// True for precondition failures that were detected before any side effect.
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            SafeSortError::InvalidPath { .. }
                | SafeSortError::InvalidSource(_)
                | SafeSortError::InvalidFolders { .. }
                | SafeSortError::InvalidOriginal(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_distinct() {
        let errs = [
            SafeSortError::InvalidSource(PathBuf::from("a")),
            SafeSortError::InvalidOriginal(PathBuf::from("a")),
            SafeSortError::BackupMissing(PathBuf::from("a")),
            SafeSortError::Count {
                path: PathBuf::from("a"),
                message: "x".into(),
            },
        ];
        let mut codes: Vec<u16> = errs.iter().map(SafeSortError::code).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), errs.len());
    }

    #[test]
    fn backup_missing_message_mentions_path() {
        let e = SafeSortError::BackupMissing(PathBuf::from("/tmp/bk"));
        assert!(e.to_string().contains("/tmp/bk"));
        assert_eq!(e.kind(), "backup_missing");
        assert!(!e.is_precondition());
    }
}
