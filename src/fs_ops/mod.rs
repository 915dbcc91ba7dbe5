//! Filesystem operations: counting, staging copies, apply and rollback.

mod apply;
mod count;
mod helpers;
mod metadata;
pub mod naming;
mod rollback;
mod stage;
mod walk;

pub use apply::{
    Apply, ApplyReport, FsApplier, apply_to_original, clear_folder_contents,
    default_quarantine_dir,
};
pub use count::count_files;
pub use rollback::rollback_from_backup;
pub use stage::{Flow, StageKind, Stager, create_backup, create_staging_copy};
pub use walk::{SKIP_LIST, is_skipped};

pub(crate) use apply::move_entry;
pub(crate) use helpers::describe_io_error;
pub(crate) use stage::remove_path;
