//! File helpers for the edit prompt: a scoped temp file that is always
//! removed, and the two ways of committing new bytes to the original.

use std::fs::{self, OpenOptions, Permissions};
use std::io::{self, Write};
use std::path::Path;

use tempfile::{Builder, NamedTempFile};
use tracing::{trace, warn};

/// Create a temp file holding `contents`, run `f` on its path, then delete it.
///
/// The file lives in the OS temp dir and is named `<prefix>XXXXXX<suffix>`.
/// Deletion happens on every path out of `f`; if `f` failed its error wins
/// over a cleanup error. `E` absorbs the I/O errors of creation and cleanup.
pub fn with_temp_file<T, E, F>(
    prefix: &str,
    suffix: &str,
    contents: &[u8],
    f: F,
) -> Result<T, E>
where
    F: FnOnce(&Path) -> Result<T, E>,
    E: From<io::Error>,
{
    let tmp = create_populated(prefix, suffix, contents)?;
    trace!(path = %tmp.path().display(), "temp file created");

    let result = f(tmp.path());

    match (result, close(tmp)) {
        (Ok(v), Ok(())) => Ok(v),
        (Ok(_), Err(e)) => Err(e.into()),
        (Err(e), cleanup) => {
            if let Err(ce) = cleanup {
                warn!(error = %ce, "temp file cleanup failed after error");
            }
            Err(e)
        }
    }
}

fn create_populated(prefix: &str, suffix: &str, contents: &[u8]) -> io::Result<NamedTempFile> {
    let mut tmp = Builder::new()
        .prefix(prefix)
        .suffix(suffix)
        .tempfile()?;

    tmp.write_all(contents)?;
    tmp.as_file().sync_all()?;
    Ok(tmp)
}

fn close(tmp: NamedTempFile) -> io::Result<()> {
    let path = tmp.path().to_path_buf();
    match tmp.close() {
        Ok(()) => Ok(()),
        // Some editors save by rename-and-replace; the path may already be gone
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            trace!(path = %path.display(), "temp file already removed");
            Ok(())
        }
        Err(e) => Err(e),
    }
}

/// Truncate and rewrite `path` in place, then reapply `perms`.
///
/// Keeps the inode (hard links, ownership, symlink targets). A failure part
/// way through leaves the file partially written.
pub fn write_in_place(path: &Path, data: &[u8], perms: &Permissions) -> io::Result<()> {
    let mut file = OpenOptions::new()
        .write(true)
        .truncate(true)
        .open(path)?;

    file.write_all(data)?;
    file.sync_all()?;
    drop(file);

    fs::set_permissions(path, perms.clone())
}

/// Write `data` to a sibling temp file with `perms` and rename it over `path`.
pub fn write_atomic(path: &Path, data: &[u8], perms: &Permissions) -> io::Result<()> {
    // Prefer same-dir tempfile; fall back to OS temp on EPERM/ENOENT
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };

    let tmp = match NamedTempFile::new_in(dir) {
        Ok(t) => t,
        Err(_) => NamedTempFile::new()?,
    };

    let mut file = tmp.as_file();
    file.write_all(data)?;
    file.sync_all()?;

    fs::set_permissions(tmp.path(), perms.clone())?;

    match tmp.persist(path) {
        Ok(_) => {}
        Err(e) => {
            // Different filesystem? Copy over and reapply the mode
            fs::copy(e.file.path(), path)?;
            fs::set_permissions(path, perms.clone())?;
        }
    }

    // The rename is only durable once the directory entry is synced
    if let Err(e) = sync_dir(dir) {
        trace!(dir = %dir.display(), error = %e, "directory sync skipped");
    }
    Ok(())
}

/// fsync a directory so renames inside it survive a crash (no-op off Unix)
fn sync_dir(dir: &Path) -> io::Result<()> {
    #[cfg(unix)]
    fs::File::open(dir)?.sync_all()?;
    #[cfg(not(unix))]
    let _ = dir;
    Ok(())
}
