//! Consistent user-facing lines. Colors only when stdout is a TTY.

use owo_colors::OwoColorize;
use std::io::Write;

use crate::progress::ProgressEvent;

fn is_tty() -> bool {
    atty::is(atty::Stream::Stdout)
}

pub fn print_info(msg: &str) {
    if is_tty() {
        println!("{} {}", "info:".cyan().bold(), msg);
    } else {
        println!("info: {msg}");
    }
}

pub fn print_warn(msg: &str) {
    if is_tty() {
        eprintln!("{} {}", "warn:".yellow().bold(), msg);
    } else {
        eprintln!("warn: {msg}");
    }
}

pub fn print_error(msg: &str) {
    if is_tty() {
        eprintln!("{} {}", "error:".red().bold(), msg);
    } else {
        eprintln!("error: {msg}");
    }
}

pub fn print_success(msg: &str) {
    if is_tty() {
        println!("{} {}", "ok:".green().bold(), msg);
    } else {
        println!("ok: {msg}");
    }
}

/// Plain line, no prefix. For output users may script against.
pub fn print_user(msg: &str) {
    println!("{msg}");
}

/// `Backup  42% (21/50)`
pub fn format_progress(ev: &ProgressEvent) -> String {
    format!(
        "{:<8}{:>3}% ({}/{})",
        ev.phase.to_string(),
        ev.percent(),
        ev.processed,
        ev.total
    )
}

/// Redraw the progress line on stderr. Only when stderr is a TTY, so
/// redirected output stays free of carriage returns.
pub fn print_progress(ev: &ProgressEvent) {
    if !atty::is(atty::Stream::Stderr) {
        return;
    }
    let mut err = std::io::stderr().lock();
    let _ = write!(err, "\r{}", format_progress(ev).dimmed());
    let _ = err.flush();
}

/// Terminate an in-place progress line before normal output resumes.
pub fn finish_progress() {
    if atty::is(atty::Stream::Stderr) {
        eprintln!();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::Phase;

    #[test]
    fn progress_line_layout() {
        let line = format_progress(&ProgressEvent::new(21, 50, Phase::Backup));
        assert!(line.starts_with("Backup"));
        assert!(line.contains("42%"));
        assert!(line.ends_with("(21/50)"));
    }
}
