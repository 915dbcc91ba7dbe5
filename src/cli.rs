//! CLI definition and parsing.
//!
//! `--debug` is a shorthand for `--log-level debug`; CLI values override the
//! config file.

use clap::{Parser, ValueHint};
use std::path::PathBuf;

use crate::config::types::{Config, LogLevel};

/// Back up, organize by file type and swap a folder in place, with rollback.
#[derive(Parser, Debug, Clone)]
#[command(
    author,
    version,
    about = "Sort a folder by file type with a backup and automatic rollback"
)]
pub struct Args {
    /// Folder to reorganize.
    #[arg(value_name = "SOURCE", value_hint = ValueHint::DirPath, required_unless_present = "print_config")]
    pub source: Option<PathBuf>,

    /// Parent directory for timestamped backups.
    #[arg(long, value_hint = ValueHint::DirPath)]
    pub backup_root: Option<PathBuf>,

    /// Parent directory for the working copy (defaults to the backup root).
    #[arg(long, value_hint = ValueHint::DirPath)]
    pub staging_root: Option<PathBuf>,

    /// Where an undeletable working copy is moved after a successful run.
    #[arg(long, value_hint = ValueHint::DirPath)]
    pub quarantine_dir: Option<PathBuf>,

    #[arg(
        short = 'd',
        long,
        help = "Enable debug logging (shorthand for --log-level debug)"
    )]
    pub debug: bool,

    #[arg(long, value_parser = clap::value_parser!(LogLevel), help = "Set log level: quiet, normal, info, debug")]
    pub log_level: Option<LogLevel>,

    /// Also write logs to this file.
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub log_file: Option<PathBuf>,

    #[arg(long, help = "Emit logs in structured JSON")]
    pub json: bool,

    #[arg(long, help = "Print the config file location used by safe_sort and exit")]
    pub print_config: bool,
}

impl Args {
    /// Precedence: --debug > --log-level > None (use config).
    pub fn effective_log_level(&self) -> Option<LogLevel> {
        if self.debug {
            return Some(LogLevel::Debug);
        }
        self.log_level
    }

    /// Apply CLI overrides to a loaded Config in place. Unset flags are no-ops.
    pub fn apply_overrides(&self, cfg: &mut Config) {
        if let Some(p) = &self.backup_root {
            cfg.backup_root = p.clone();
        }
        if let Some(p) = &self.staging_root {
            cfg.staging_root = Some(p.clone());
        }
        if let Some(p) = &self.quarantine_dir {
            cfg.quarantine_dir = p.clone();
        }
        if let Some(level) = self.effective_log_level() {
            cfg.log_level = level;
        }
        if let Some(p) = &self.log_file {
            cfg.log_file = Some(p.clone());
        }
    }
}

pub fn parse() -> Args {
    Args::parse()
}
