//! Single-instance guard for streaming sessions.

use anyhow::{Context, Result};
use fs2::FileExt;
use std::fs::{self, File, OpenOptions};
use std::path::Path;

pub const LOCK_FILENAME: &str = "stream.lock";

/// Exclusive lock held for the lifetime of a streaming session.
///
/// The lock file is left in place on drop. Unlinking a file another process
/// is waiting on would let a third process lock a fresh inode at the same
/// path.
#[derive(Debug)]
pub struct StreamLock {
    _file: File,
}

impl StreamLock {
    /// Acquire `<dir>/stream.lock` without blocking.
    pub fn acquire(dir: &Path) -> Result<Self> {
        fs::create_dir_all(dir)
            .with_context(|| format!("creating lock directory '{}'", dir.display()))?;

        let path = dir.join(LOCK_FILENAME);
        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .truncate(false)
            .open(&path)
            .with_context(|| format!("Failed to create lock file: {}", path.display()))?;

        if file.try_lock_exclusive().is_err() {
            drop(file);
            return Err(anyhow::anyhow!(
                "Another stream is already running (lock held: {})",
                path.display()
            ));
        }

        tracing::trace!("acquired {}", path.display());
        Ok(Self { _file: file })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_second_acquire_fails_until_release() {
        let temp = TempDir::new().unwrap();

        let first = StreamLock::acquire(temp.path()).unwrap();
        assert!(temp.path().join(LOCK_FILENAME).is_file());
        assert!(StreamLock::acquire(temp.path()).is_err());

        drop(first);
        assert!(StreamLock::acquire(temp.path()).is_ok());
    }
}
