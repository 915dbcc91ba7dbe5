use clap::Parser;
use safe_sort::cli::Args;
use safe_sort::config::types::{Config, LogLevel};
use std::path::PathBuf;

#[test]
fn source_is_positional() {
    let args = Args::parse_from(["safe_sort", "/data/inbox"]);
    assert_eq!(args.source, Some(PathBuf::from("/data/inbox")));
    assert!(!args.json);
}

#[test]
fn source_required_unless_print_config() {
    assert!(Args::try_parse_from(["safe_sort"]).is_err());
    let args = Args::try_parse_from(["safe_sort", "--print-config"]).unwrap();
    assert!(args.print_config);
    assert!(args.source.is_none());
}

#[test]
fn effective_log_level_precedence() {
    let args = Args::parse_from(["safe_sort", "--debug", "--log-level", "quiet", "x"]);
    assert_eq!(args.effective_log_level(), Some(LogLevel::Debug));

    let args = Args::parse_from(["safe_sort", "--log-level", "info", "x"]);
    assert_eq!(args.effective_log_level(), Some(LogLevel::Info));

    let args = Args::parse_from(["safe_sort", "x"]);
    assert_eq!(args.effective_log_level(), None);
}

#[test]
fn invalid_log_level_is_rejected() {
    assert!(Args::try_parse_from(["safe_sort", "--log-level", "loud", "x"]).is_err());
}

#[test]
fn apply_overrides_sets_paths_and_level() {
    let args = Args::parse_from([
        "safe_sort",
        "--backup-root",
        "/b",
        "--staging-root",
        "/s",
        "--quarantine-dir",
        "/q",
        "--log-file",
        "/l.log",
        "-d",
        "/src",
    ]);
    let mut cfg = Config::default();
    args.apply_overrides(&mut cfg);
    assert_eq!(cfg.backup_root, PathBuf::from("/b"));
    assert_eq!(cfg.staging_root, Some(PathBuf::from("/s")));
    assert_eq!(cfg.quarantine_dir, PathBuf::from("/q"));
    assert_eq!(cfg.log_file, Some(PathBuf::from("/l.log")));
    assert_eq!(cfg.log_level, LogLevel::Debug);
}

#[test]
fn unset_flags_keep_config_values() {
    let args = Args::parse_from(["safe_sort", "/src"]);
    let mut cfg = Config {
        backup_root: PathBuf::from("/from-xml"),
        log_level: LogLevel::Quiet,
        ..Config::default()
    };
    args.apply_overrides(&mut cfg);
    assert_eq!(cfg.backup_root, PathBuf::from("/from-xml"));
    assert_eq!(cfg.log_level, LogLevel::Quiet);
}
