//! Core configuration types.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use super::paths;
use crate::fs_ops::default_quarantine_dir;

/// Program-defined verbosity levels exposed to users/config.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogLevel {
    /// Only errors
    Quiet,
    #[default]
    Normal,
    /// Per-phase detail
    Info,
    /// Debug/trace
    Debug,
}

impl LogLevel {
    /// Case-insensitive, accepts a few common aliases.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "quiet" | "error" | "none" => Some(LogLevel::Quiet),
            "normal" => Some(LogLevel::Normal),
            "info" | "verbose" | "detailed" => Some(LogLevel::Info),
            "debug" | "trace" => Some(LogLevel::Debug),
            _ => None,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LogLevel::Quiet => "quiet",
            LogLevel::Normal => "normal",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
        };
        f.write_str(s)
    }
}

impl FromStr for LogLevel {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("invalid log level: '{s}'"))
    }
}

/// Runtime configuration for one sort run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Parent directory for timestamped backups
    pub backup_root: PathBuf,
    /// Parent directory for the working copy; `None` means `backup_root`
    pub staging_root: Option<PathBuf>,
    /// Where an undeletable staging folder is moved after a successful apply
    pub quarantine_dir: PathBuf,
    pub log_level: LogLevel,
    pub log_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backup_root: paths::default_backup_root(),
            staging_root: None,
            quarantine_dir: default_quarantine_dir(),
            log_level: LogLevel::Normal,
            log_file: paths::default_log_path(),
        }
    }
}

impl Config {
    /// Staging root actually used by a run.
    pub fn effective_staging_root(&self) -> &PathBuf {
        self.staging_root.as_ref().unwrap_or(&self.backup_root)
    }
}
