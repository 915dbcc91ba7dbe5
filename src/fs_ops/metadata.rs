//! Timestamp preservation for copied files.
//! - Copies atime/mtime from source to destination so a backup is a faithful
//!   point-in-time replica.
//! - Best-effort: failures to set times are logged and ignored.

use filetime::{FileTime, set_file_times};
use std::fs;
use std::path::Path;
use tracing::{trace, warn};

/// Preserve timestamps on `dest` using already-fetched `src_meta`.
pub(crate) fn preserve_times(dest: &Path, src_meta: &fs::Metadata) {
    #[cfg(unix)]
    let (at, mt) = {
        use std::os::unix::fs::MetadataExt;
        (
            Some(FileTime::from_unix_time(src_meta.atime(), src_meta.atime_nsec() as u32)),
            Some(FileTime::from_unix_time(src_meta.mtime(), src_meta.mtime_nsec() as u32)),
        )
    };
    #[cfg(not(unix))]
    let (at, mt) = (
        src_meta.accessed().ok().map(FileTime::from_system_time),
        src_meta.modified().ok().map(FileTime::from_system_time),
    );

    let mt = match mt {
        Some(m) => m,
        None => return,
    };
    let at = at.unwrap_or(mt);
    if let Err(e) = set_file_times(dest, at, mt) {
        warn!(path = %dest.display(), error = %e, "failed to set atime/mtime on destination");
    } else {
        trace!(path = %dest.display(), "set atime/mtime on destination");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use filetime::set_file_mtime;
    use tempfile::tempdir;

    #[test]
    fn mtime_is_copied() {
        let td = tempdir().unwrap();
        let src = td.path().join("src.txt");
        let dst = td.path().join("dst.txt");
        fs::write(&src, "x").unwrap();
        fs::write(&dst, "x").unwrap();
        let old = FileTime::from_unix_time(1_000_000_000, 0);
        set_file_mtime(&src, old).unwrap();

        let meta = fs::metadata(&src).unwrap();
        preserve_times(&dst, &meta);

        let got = FileTime::from_last_modification_time(&fs::metadata(&dst).unwrap());
        assert_eq!(got.unix_seconds(), old.unix_seconds());
    }
}
