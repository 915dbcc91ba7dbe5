//! XML configuration support.
//! - Loads settings from config.xml (quick_xml + serde).
//! - Creates a commented template when the default file is missing.
//!
//! Unknown elements are a hard error so typos surface instead of being ignored.

use anyhow::{Context, Result, bail};
use quick_xml::de::from_str as from_xml_str;
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::paths::{
    CONFIG_ENV, default_backup_root, default_config_path, default_log_path,
    path_has_symlink_ancestor,
};
use super::types::{Config, LogLevel};
use crate::platform::{set_dir_mode_0700, set_file_mode_0600, write_config_secure_new_0600};

#[derive(Debug, Deserialize)]
#[serde(rename = "config")]
#[serde(deny_unknown_fields)]
struct XmlConfig {
    backup_root: Option<String>,
    staging_root: Option<String>,
    quarantine_dir: Option<String>,
    log_level: Option<String>,
    log_file: Option<String>,
}

/// What `load_or_init` found at the resolved config path.
#[derive(Debug)]
pub enum LoadResult {
    Loaded(Config, PathBuf),
    /// The default file was missing; a template was written and defaults apply.
    CreatedTemplate(PathBuf),
    /// No file and no template (explicit `$SAFE_SORT_CONFIG` path that does not exist).
    Missing(PathBuf),
}

fn non_empty(s: Option<String>) -> Option<String> {
    s.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn xml_to_config(parsed: XmlConfig) -> Result<Config> {
    let mut cfg = Config::default();
    if let Some(s) = non_empty(parsed.backup_root) {
        cfg.backup_root = PathBuf::from(s);
    }
    cfg.staging_root = non_empty(parsed.staging_root).map(PathBuf::from);
    if let Some(s) = non_empty(parsed.quarantine_dir) {
        cfg.quarantine_dir = PathBuf::from(s);
    }
    if let Some(s) = non_empty(parsed.log_level) {
        cfg.log_level = s
            .parse::<LogLevel>()
            .map_err(anyhow::Error::msg)
            .context("config <log_level>")?;
    }
    if let Some(s) = non_empty(parsed.log_file) {
        cfg.log_file = Some(PathBuf::from(s));
    }
    Ok(cfg)
}

/// Load a Config from a specific XML file. Missing elements take defaults.
pub fn load_config_from_xml_path(path: &Path) -> Result<Config> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("read config xml '{}'", path.display()))?;
    let parsed: XmlConfig = from_xml_str(&contents)
        .with_context(|| format!("parse config xml '{}'", path.display()))?;
    debug!(path = %path.display(), "Parsed config xml");
    xml_to_config(parsed)
}

/// Resolve the config path, load it, or write a template when the default
/// location is empty.
pub fn load_or_init() -> Result<LoadResult> {
    let env_set = env::var_os(CONFIG_ENV).is_some();
    let path = default_config_path().context("resolve config path")?;

    if path.exists() {
        let cfg = load_config_from_xml_path(&path)?;
        return Ok(LoadResult::Loaded(cfg, path));
    }
    if env_set {
        return Ok(LoadResult::Missing(path));
    }
    create_template_config(&path)?;
    Ok(LoadResult::CreatedTemplate(path))
}

/// Write a commented template config (0600 on Unix). Refuses symlinked
/// ancestors.
pub fn create_template_config(path: &Path) -> Result<()> {
    if path_has_symlink_ancestor(path)? {
        bail!(
            "Refusing to create config: ancestor of {} is a symlink",
            path.display()
        );
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("create config dir '{}'", parent.display()))?;
        let _ = set_dir_mode_0700(parent);
    }

    let log = default_log_path()
        .map(|p| p.display().to_string())
        .unwrap_or_default();
    let content = format!(
        "<!--\n  safe_sort configuration (XML)\n\n    backup_root     -> parent directory for timestamped backups\n    staging_root    -> parent directory for the working copy (empty = backup_root)\n    quarantine_dir  -> where an undeletable working copy is moved after success\n    log_level       -> quiet | normal | info | debug\n    log_file        -> path to log file (optional)\n\n  CLI flags override these values.\n-->\n<config>\n  <backup_root>{}</backup_root>\n  <staging_root></staging_root>\n  <quarantine_dir>{}</quarantine_dir>\n  <log_level>normal</log_level>\n  <log_file>{}</log_file>\n</config>\n",
        default_backup_root().display(),
        crate::fs_ops::default_quarantine_dir().display(),
        log,
    );

    write_config_secure_new_0600(path, content.as_bytes())?;
    let _ = set_file_mode_0600(path);
    info!(path = %path.display(), "Created template config");
    Ok(())
}
