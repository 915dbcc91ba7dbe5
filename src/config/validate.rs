//! Pre-flight checks run by the binary before a run starts.
//! The orchestrator repeats the structural checks; these add readability,
//! writability and readable messages.

use anyhow::{Context, Result, bail};
use std::fs;
use std::path::Path;
use tracing::{debug, error, info};

use super::types::Config;

impl Config {
    /// Source must be a readable directory; backup and staging roots are
    /// created if missing, must be writable, and must not live inside the source.
    pub fn validate_for(&self, source: &Path) -> Result<()> {
        ensure_dir_exists_and_is_dir(source, "source")?;
        ensure_readable(source, "source")?;

        let src_real = dunce::canonicalize(source)
            .with_context(|| format!("resolve source '{}'", source.display()))?;

        let staging_root = self.effective_staging_root();
        for (name, root) in [
            ("backup_root", &self.backup_root),
            ("staging_root", staging_root),
        ] {
            // Checked before creation so nothing is made inside the source.
            let abs = std::path::absolute(root)
                .with_context(|| format!("resolve {name} '{}'", root.display()))?;
            let real = dunce::canonicalize(&abs).unwrap_or(abs);
            if real.starts_with(&src_real) {
                error!(%name, root = %real.display(), source = %src_real.display(), "root inside source");
                bail!(
                    "{name} '{}' must not be inside source '{}'",
                    real.display(),
                    src_real.display()
                );
            }
            ensure_dir_is_or_create(root, name)?;
            ensure_writable(root, name)?;
        }

        info!(
            source = %src_real.display(),
            backup_root = %self.backup_root.display(),
            staging_root = %staging_root.display(),
            quarantine_dir = %self.quarantine_dir.display(),
            "Config validated"
        );
        Ok(())
    }
}

fn ensure_dir_exists_and_is_dir(path: &Path, name: &str) -> Result<()> {
    if !path.exists() {
        error!("{name} does not exist: {}", path.display());
        bail!("{name} does not exist: {}", path.display());
    }
    if !path.is_dir() {
        error!("{name} is not a directory: {}", path.display());
        bail!("{name} is not a directory: {}", path.display());
    }
    Ok(())
}

fn ensure_readable(path: &Path, name: &str) -> Result<()> {
    fs::read_dir(path).with_context(|| {
        format!("Cannot read {name} directory '{}'; check permissions", path.display())
    })?;
    debug!("{name} readable: {}", path.display());
    Ok(())
}

fn ensure_dir_is_or_create(path: &Path, name: &str) -> Result<()> {
    if path.exists() {
        if !path.is_dir() {
            error!("{name} exists but isn't a directory: {}", path.display());
            bail!("{name} exists but isn't a directory: {}", path.display());
        }
    } else {
        fs::create_dir_all(path)
            .with_context(|| format!("Failed to create {name} directory '{}'", path.display()))?;
        info!("Created {name} directory: {}", path.display());
    }
    Ok(())
}

/// Non-destructive probe: create and remove a uniquely named file.
fn ensure_writable(path: &Path, name: &str) -> Result<()> {
    let probe = path.join(format!(".safe_sort_probe_{}.tmp", std::process::id()));
    fs::OpenOptions::new()
        .create_new(true)
        .write(true)
        .open(&probe)
        .with_context(|| format!("Cannot write to {name} '{}'; check permissions", path.display()))?;
    let _ = fs::remove_file(&probe);
    debug!("{name} writable: {}", path.display());
    Ok(())
}
