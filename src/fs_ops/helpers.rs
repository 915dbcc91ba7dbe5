//! I/O helper utilities.
//!
//! Enrich io::Error with the failing operation, the path and a platform-aware
//! hint, then wrap it into the matching `SafeSortError` variant.
//!
//! Usage:
//!   fs::copy(src, dst).map_err(copy_error(src, dst))?;
//!   fs::remove_file(p).map_err(clear_error("remove file", p))?;

use std::io;
use std::path::Path;

use crate::errors::SafeSortError;

/// Format a human-friendly message with op/path plus platform-aware hints.
pub(crate) fn describe_io_error(op: &str, path: &Path, e: &io::Error) -> String {
    let mut msg = format!("{} '{}': {}", op, path.display(), e);

    if let Some(code) = e.raw_os_error() {
        #[cfg(unix)]
        {
            match code {
                libc::EACCES | libc::EPERM => {
                    msg.push_str("; permission denied, check ownership and write permissions");
                }
                libc::EXDEV => {
                    msg.push_str("; cross-filesystem, rename not possible");
                }
                libc::EBUSY => {
                    msg.push_str("; resource busy, another process holds it");
                }
                libc::ENOENT => {
                    msg.push_str("; path not found, it may have been removed externally");
                }
                libc::ENOSPC => {
                    msg.push_str("; insufficient space on device");
                }
                libc::EROFS => {
                    msg.push_str("; read-only filesystem");
                }
                libc::ENAMETOOLONG => {
                    msg.push_str("; filename or path too long");
                }
                libc::ENOTEMPTY => {
                    msg.push_str("; directory not empty");
                }
                _ => {}
            }
        }
        #[cfg(windows)]
        {
            match code {
                5 => msg.push_str("; access denied, check permissions"), // ERROR_ACCESS_DENIED
                17 => msg.push_str("; not same device, rename not possible"), // ERROR_NOT_SAME_DEVICE
                32 => msg.push_str("; sharing violation, file is in use"), // ERROR_SHARING_VIOLATION
                2 | 3 => msg.push_str("; path not found"),
                112 => msg.push_str("; insufficient disk space"), // ERROR_DISK_FULL
                206 => msg.push_str("; filename or path too long"), // ERROR_FILENAME_EXCED_RANGE
                _ => {}
            }
        }
        msg.push_str(&format!(" [os code: {}]", code));
    } else {
        match e.kind() {
            io::ErrorKind::PermissionDenied => {
                msg.push_str("; permission denied, check ownership and write permissions");
            }
            io::ErrorKind::NotFound => {
                msg.push_str("; path not found");
            }
            _ => {}
        }
    }

    msg
}

/// Detect EXDEV / ERROR_NOT_SAME_DEVICE; std has no stable ErrorKind for it.
pub(crate) fn is_cross_device(e: &io::Error) -> bool {
    match e.raw_os_error() {
        #[cfg(unix)]
        Some(code) => code == libc::EXDEV,
        #[cfg(windows)]
        Some(code) => code == 17,
        #[cfg(not(any(unix, windows)))]
        Some(_) => false,
        None => false,
    }
}

/// `.map_err` adapter producing `SafeSortError::Copy`.
pub(crate) fn copy_error<'a>(
    from: &'a Path,
    to: &'a Path,
) -> impl FnOnce(io::Error) -> SafeSortError + 'a {
    move |e: io::Error| SafeSortError::Copy {
        from: from.to_path_buf(),
        to: to.to_path_buf(),
        message: describe_io_error("copy", from, &e),
        source: e,
    }
}

/// `.map_err` adapter producing `SafeSortError::Clear`.
pub(crate) fn clear_error<'a>(
    op: &'a str,
    path: &'a Path,
) -> impl FnOnce(io::Error) -> SafeSortError + 'a {
    move |e: io::Error| SafeSortError::Clear {
        path: path.to_path_buf(),
        message: describe_io_error(op, path, &e),
        source: e,
    }
}

/// `.map_err` adapter producing `SafeSortError::Move`.
pub(crate) fn move_error<'a>(
    from: &'a Path,
    to: &'a Path,
) -> impl FnOnce(io::Error) -> SafeSortError + 'a {
    move |e: io::Error| SafeSortError::Move {
        from: from.to_path_buf(),
        to: to.to_path_buf(),
        message: describe_io_error("move", from, &e),
        source: e,
    }
}
