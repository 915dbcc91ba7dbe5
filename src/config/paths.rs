//! Default path helpers and symlink checks.

use dirs::{config_dir, data_dir};
use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use super::APP_DIR;

/// Overrides the config file location when set.
pub const CONFIG_ENV: &str = "SAFE_SORT_CONFIG";

fn home_fallback(parts: &[&str]) -> PathBuf {
    let mut p = env::var_os("HOME").map(PathBuf::from).unwrap_or_else(|| PathBuf::from("."));
    p.extend(parts);
    p
}

/// `$SAFE_SORT_CONFIG` if set (a directory gets `config.xml` appended, a
/// relative path is taken from the current directory), otherwise the
/// OS-appropriate config dir.
pub fn default_config_path() -> io::Result<PathBuf> {
    if let Some(raw) = env::var_os(CONFIG_ENV) {
        let mut p = PathBuf::from(raw);
        if p.as_os_str().is_empty() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("{CONFIG_ENV} is set but empty"),
            ));
        }
        if p.is_relative() {
            p = env::current_dir()?.join(p);
        }
        if p.is_dir() {
            p.push("config.xml");
        }
        return Ok(p);
    }
    Ok(match config_dir() {
        Some(base) => base.join(APP_DIR).join("config.xml"),
        None => home_fallback(&[".config", APP_DIR, "config.xml"]),
    })
}

/// OS-appropriate default log file (data dir). The directory is not created.
pub fn default_log_path() -> Option<PathBuf> {
    match data_dir() {
        Some(base) => Some(base.join(APP_DIR).join("safe_sort.log")),
        None => env::var_os("HOME").map(|_| {
            home_fallback(&[".local", "share", APP_DIR, "safe_sort.log"])
        }),
    }
}

/// Parent of timestamped backups when nothing else is configured.
pub fn default_backup_root() -> PathBuf {
    match data_dir() {
        Some(base) => base.join(APP_DIR).join("backups"),
        None => home_fallback(&[".local", "share", APP_DIR, "backups"]),
    }
}

/// True if any existing ancestor of `path` is a symlink.
pub fn path_has_symlink_ancestor(path: &Path) -> io::Result<bool> {
    let mut p = path.parent();
    while let Some(anc) = p {
        if anc.exists() && fs::symlink_metadata(anc)?.file_type().is_symlink() {
            return Ok(true);
        }
        p = anc.parent();
    }
    Ok(false)
}
