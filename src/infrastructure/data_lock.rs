use crate::error::Result;
use fs4::fs_std::FileExt;
use std::fs::{File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

/// Exclusive advisory lock over one data directory's catalog and ledger.
///
/// The JSON stores load their files once and later overwrite them wholesale, so two
/// processes writing the same files must not overlap. A writer takes this lock before
/// opening the stores and keeps it until its last write; the OS releases it when the
/// guard is dropped or the process exits.
#[derive(Debug)]
pub struct DataDirLock {
    path: PathBuf,
    _file: File,
}

impl DataDirLock {
    /// Blocks until the lock file at `path` is exclusively held, creating it if needed.
    pub async fn acquire(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let lock_path = path.clone();
        let file = tokio::task::spawn_blocking(move || lock_exclusive(&lock_path))
            .await
            .map_err(io::Error::other)??;
        tracing::debug!(path = %path.display(), "Data directory locked");
        Ok(Self { path, _file: file })
    }
}

impl Drop for DataDirLock {
    fn drop(&mut self) {
        tracing::debug!(path = %self.path.display(), "Data directory unlocked");
    }
}

fn lock_exclusive(path: &Path) -> io::Result<File> {
    let file = OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .truncate(false)
        .open(path)?;
    file.lock_exclusive()?;
    Ok(file)
}
