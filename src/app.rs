//! Application flow.
//! Loads and merges config, initializes logging, installs the Ctrl-C handler,
//! runs the pipeline on a worker thread and maps the outcome to an exit code.

use anyhow::{Context, Result};
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::{debug, error, info, warn};

use safe_sort::cli::Args;
use safe_sort::config::{CONFIG_ENV, LoadResult, load_or_init};
use safe_sort::output as out;
use safe_sort::{
    CancellationToken, Config, Orchestrator, RollbackOutcome, RunEvent, RunResult, RunStatus,
    default_config_path, spawn_run,
};

use crate::logging::init_tracing;

pub const EXIT_OK: u8 = 0;
pub const EXIT_FAILED: u8 = 1;
pub const EXIT_SETUP: u8 = 2;
pub const EXIT_CANCELLED: u8 = 130;

pub fn exit_code(status: RunStatus) -> u8 {
    match status {
        RunStatus::Success | RunStatus::Empty | RunStatus::Ready => EXIT_OK,
        RunStatus::Failed => EXIT_FAILED,
        RunStatus::SetupFailed => EXIT_SETUP,
        RunStatus::Cancelled => EXIT_CANCELLED,
    }
}

fn print_config_location() {
    if let Some(p) = std::env::var_os(CONFIG_ENV) {
        out::print_info(&format!(
            "Using {CONFIG_ENV} (explicit):\n  {}",
            Path::new(&p).display()
        ));
        return;
    }
    match default_config_path() {
        Ok(p) => {
            out::print_info(&format!("Default safe_sort config path:\n  {}", p.display()));
            if p.exists() {
                out::print_info("A config file already exists at that location.");
            } else {
                out::print_info(
                    "No config file exists there yet. Run a sort once to create a template.",
                );
            }
        }
        Err(e) => out::print_error(&format!("Could not determine a config path: {e}")),
    }
}

/// Config file values, then CLI overrides.
fn load_config(args: &Args) -> Result<Config> {
    let mut cfg = match load_or_init()? {
        LoadResult::Loaded(cfg, _) => cfg,
        LoadResult::CreatedTemplate(path) => {
            out::print_success(&format!(
                "A template safe_sort config was written to: {}",
                path.display()
            ));
            Config::default()
        }
        LoadResult::Missing(path) => {
            out::print_warn(&format!(
                "{CONFIG_ENV} points to a missing file ({}); using defaults.",
                path.display()
            ));
            Config::default()
        }
    };
    args.apply_overrides(&mut cfg);
    Ok(cfg)
}

fn report(result: &RunResult) {
    match result.status {
        RunStatus::Success => {
            out::print_success(&format!(
                "Sorted {} file(s).",
                result.source_files.unwrap_or_default()
            ));
            if let Some(b) = &result.backup_folder {
                out::print_user(&format!("Backup: {}", b.display()));
            }
            if let Some(q) = &result.quarantined {
                out::print_warn(&format!(
                    "Working copy could not be removed; left at {}",
                    q.display()
                ));
            }
        }
        RunStatus::Empty | RunStatus::Ready => out::print_info("Nothing to sort; the folder has no files."),
        RunStatus::Cancelled => {
            let at = result
                .cancelled_at
                .map(|c| format!(" during {c:?}"))
                .unwrap_or_default();
            out::print_warn(&format!("Cancelled{at}; the folder was not modified."));
        }
        RunStatus::Failed => {
            out::print_error(result.error.as_deref().unwrap_or("sort failed"));
            match &result.rollback {
                Some(RollbackOutcome::Restored) => {
                    out::print_info("The folder was restored from the backup.")
                }
                Some(RollbackOutcome::Failed(e)) => out::print_error(&format!(
                    "Rollback failed: {e}. Restore manually from the backup."
                )),
                None => out::print_info("The folder was not modified."),
            }
            if let Some(b) = &result.backup_folder {
                out::print_user(&format!("Backup: {}", b.display()));
            }
        }
        RunStatus::SetupFailed => {
            out::print_error(result.error.as_deref().unwrap_or("setup failed"));
        }
    }
}

/// An interrupt that lands before the worker starts would be cleared by the
/// run's token reset, so it is honored here instead.
fn cancelled_before_start(token: &CancellationToken) -> bool {
    if !token.is_set() {
        return false;
    }
    info!("Interrupted before the run started; nothing was modified");
    out::print_warn("Cancelled before starting; the folder was not modified.");
    true
}

/// Run the CLI application; returns the process exit code.
pub fn run(args: Args) -> Result<u8> {
    if args.print_config {
        print_config_location();
        return Ok(EXIT_OK);
    }
    let source = args
        .source
        .clone()
        .context("missing SOURCE folder")?;

    let cfg = load_config(&args)?;

    let guard_opt = init_tracing(cfg.log_level, cfg.log_file.as_deref(), args.json)
        .inspect_err(|e| out::print_error(&format!("Failed to initialize logging: {e}")))?;

    let token = CancellationToken::new();
    // Dropping the guard on interrupt flushes the file appender.
    let guard_slot = Arc::new(Mutex::new(guard_opt));
    {
        let guard_slot = Arc::clone(&guard_slot);
        let token = token.clone();
        ctrlc::set_handler(move || {
            token.request();
            out::print_warn("Received interrupt; cancelling...");
            if let Ok(mut g) = guard_slot.lock() {
                let _ = g.take();
            }
        })
        .expect("failed to install signal handler");
    }

    debug!(?args, "Starting safe_sort");

    if let Err(e) = cfg.validate_for(&source) {
        error!(error = %format!("{e:#}"), "Config validation failed");
        out::print_error(&format!("{e:#}"));
        return Ok(EXIT_SETUP);
    }

    let orchestrator = Orchestrator::new(&cfg.backup_root)
        .staging_root(cfg.effective_staging_root())
        .quarantine_dir(&cfg.quarantine_dir);
    if cancelled_before_start(&token) {
        return Ok(EXIT_CANCELLED);
    }
    let handle = spawn_run(orchestrator, &source, token);

    let mut progress_open = false;
    for event in handle.events().iter() {
        match event {
            RunEvent::Progress(ev) => {
                out::print_progress(&ev);
                progress_open = true;
            }
            RunEvent::Warning(msg) => {
                if std::mem::take(&mut progress_open) {
                    out::finish_progress();
                }
                warn!(%msg, "Run warning");
                out::print_warn(&msg);
            }
            RunEvent::Finished(_) => break,
        }
    }
    if progress_open {
        out::finish_progress();
    }

    let result = handle.join();
    info!(status = %result.status, source = %source.display(), "Run finished");
    report(&result);

    if let Ok(mut g) = guard_slot.lock() {
        let _ = g.take();
    }
    Ok(exit_code(result.status))
}
