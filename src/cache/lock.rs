use std::ffi::OsString;
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write as _};
use std::path::{Path, PathBuf};

use crate::foundation::error::{ReelError, ReelResult};

/// Marker path guarding `path`: the same path with `.lock` appended.
pub fn lock_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".lock");
    PathBuf::from(name)
}

/// Take the exclusive warm-up lock for `path`.
///
/// The marker is created with create-new semantics, so of several concurrent callers exactly
/// one succeeds. A marker left behind by a crashed process is not removed automatically;
/// the returned [`ReelError::AlreadyLocked`] names it so an operator can.
pub fn acquire(path: &Path) -> ReelResult<LockGuard> {
    if path.file_name().is_none() {
        return Err(ReelError::validation(format!(
            "cannot lock '{}': path has no file name",
            path.display()
        )));
    }
    let marker = lock_path(path);
    let mut file = match OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&marker)
    {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::AlreadyExists => {
            return Err(ReelError::AlreadyLocked { marker });
        }
        Err(e) => return Err(e.into()),
    };

    let guard = LockGuard {
        marker,
        released: false,
    };
    // The pid is informational; failing to write it does not invalidate the lock.
    if let Err(e) = writeln!(file, "{}", std::process::id()) {
        tracing::debug!(
            error = %e,
            marker = %guard.marker.display(),
            "could not record pid in lock marker"
        );
    }
    tracing::debug!(marker = %guard.marker.display(), "lock acquired");
    Ok(guard)
}

/// Held warm-up lock. Dropping the guard releases it on a best-effort basis.
#[derive(Debug)]
#[must_use = "the lock is released when the guard is dropped"]
pub struct LockGuard {
    marker: PathBuf,
    released: bool,
}

impl LockGuard {
    /// Path of the marker file.
    pub fn marker(&self) -> &Path {
        &self.marker
    }

    /// Release the lock, reporting failures. A marker that is already gone counts as released.
    pub fn release(mut self) -> ReelResult<()> {
        self.released = true;
        release_marker(&self.marker)
    }
}

impl Drop for LockGuard {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        if let Err(e) = release_marker(&self.marker) {
            tracing::warn!(error = %e, marker = %self.marker.display(), "failed to release lock");
        }
    }
}

fn release_marker(marker: &Path) -> ReelResult<()> {
    match fs::remove_file(marker) {
        Ok(()) => {
            tracing::debug!(marker = %marker.display(), "lock released");
            Ok(())
        }
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/cache/lock.rs"]
mod tests;
