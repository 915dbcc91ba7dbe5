//! Configuration: types, default paths, XML loading and validation.

pub mod paths;
pub mod types;
mod validate;
pub mod xml;

pub use paths::{
    CONFIG_ENV, default_backup_root, default_config_path, default_log_path,
    path_has_symlink_ancestor,
};
pub use types::{Config, LogLevel};
pub use xml::{LoadResult, create_template_config, load_config_from_xml_path, load_or_init};

/// Directory name used under the platform config and data dirs.
pub const APP_DIR: &str = "safe_sort";
