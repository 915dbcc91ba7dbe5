//! Core library for `safe_sort`.
//!
//! Reorganizes a folder transactionally: the source is backed up, a working
//! copy is organized, and the result is swapped into the original. A failed
//! swap is rolled back from the backup; cancellation before the swap leaves
//! the original untouched.
//!
//! Entry points:
//! - [`Orchestrator`] drives one run synchronously on the calling thread.
//! - [`spawn_run`] runs it on a worker thread and streams [`RunEvent`]s.
//! - [`run`] is a one-call convenience with the default collaborators.

pub mod cancel;
pub mod cli;
pub mod config;
pub mod errors;
pub mod fs_ops;
pub mod organize;
pub mod output;
pub mod platform;
pub mod progress;
pub mod run;
pub mod worker;

pub use cancel::CancellationToken;
pub use config::{
    Config, LogLevel, default_config_path, default_log_path, path_has_symlink_ancestor,
};
pub use errors::SafeSortError;
pub use fs_ops::{
    Apply, ApplyReport, Flow, FsApplier, SKIP_LIST, Stager, apply_to_original,
    clear_folder_contents, count_files, create_backup, create_staging_copy,
    default_quarantine_dir, rollback_from_backup,
};
pub use organize::{Category, CategoryOrganizer, OrganizeOutcome, Organizer, verify_organized};
pub use progress::{ChannelProgress, NoProgress, Phase, ProgressEvent, ProgressSink, RunEvent};
pub use run::{
    Checkpoint, Orchestrator, RollbackOutcome, RunResult, RunState, RunStatus, run,
};
pub use worker::{RunHandle, spawn_run};

/// Glob import for embedders: `use safe_sort::prelude::*;`.
pub mod prelude {
    pub use crate::{
        CancellationToken, CategoryOrganizer, Orchestrator, OrganizeOutcome, Organizer,
        ProgressEvent, ProgressSink, RunEvent, RunResult, RunStatus, SafeSortError, spawn_run,
    };
}
