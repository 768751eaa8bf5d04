//! Exclusive lock files with commit-or-rollback semantics
//!
//! Updating a file such as `.git/index` goes through `<file>.lock`:
//!
//! 1. The lock file is created exclusively. If it already exists, another
//!    process is updating the same file and the caller must give up.
//! 2. The new content is written into the lock file.
//! 3. `commit` atomically renames the lock file over the original.
//!
//! Dropping a lock that was never committed removes the lock file and leaves the
//! original untouched.

use anyhow::Context;
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

const LOCK_SUFFIX: &str = "lock";

#[derive(Debug)]
pub struct Lockfile {
    /// File being replaced on commit
    file_path: Box<Path>,
    /// `<file>.lock`
    lock_path: Box<Path>,
    /// Open handle while the lock is held
    lock: Option<File>,
}

impl Lockfile {
    /// Take the lock for `file_path`, failing if somebody else holds it
    pub fn hold_for_update(file_path: &Path) -> anyhow::Result<Self> {
        let lock_path = Self::lock_path_for(file_path);

        let lock = OpenOptions::new()
            .read(true)
            .write(true)
            .create_new(true)
            .open(&lock_path)
            .map_err(|err| match err.kind() {
                std::io::ErrorKind::AlreadyExists => anyhow::anyhow!(
                    "Unable to create '{}': File exists.\n\n\
                    Another process seems to be running in this repository. \
                    If it has finished, remove the file manually to continue.",
                    lock_path.display()
                ),
                _ => anyhow::Error::new(err)
                    .context(format!("Unable to create '{}'", lock_path.display())),
            })?;

        tracing::debug!(lock = %lock_path.display(), "acquired lock");

        Ok(Lockfile {
            file_path: file_path.into(),
            lock_path: lock_path.into_boxed_path(),
            lock: Some(lock),
        })
    }

    pub fn lock_path_for(file_path: &Path) -> PathBuf {
        let mut lock_path = file_path.as_os_str().to_owned();
        lock_path.push(".");
        lock_path.push(LOCK_SUFFIX);
        PathBuf::from(lock_path)
    }

    pub fn lock_path(&self) -> &Path {
        &self.lock_path
    }

    pub fn is_held(&self) -> bool {
        self.lock.is_some()
    }

    /// Handle to the lock file, truncated by the caller as needed
    pub fn file_mut(&mut self) -> anyhow::Result<&mut File> {
        self.lock
            .as_mut()
            .ok_or_else(|| anyhow::anyhow!("Lock on '{}' was lost", self.file_path.display()))
    }

    /// Replace the original file with the lock file's content
    pub fn commit(mut self) -> anyhow::Result<()> {
        let lock = self
            .lock
            .take()
            .ok_or_else(|| anyhow::anyhow!("Lock on '{}' was lost", self.file_path.display()))?;
        lock.sync_all()
            .with_context(|| format!("Unable to flush '{}'", self.lock_path.display()))?;
        drop(lock);

        if let Err(err) = std::fs::rename(&self.lock_path, &self.file_path) {
            let _ = std::fs::remove_file(&self.lock_path);
            return Err(anyhow::Error::new(err).context(format!(
                "Unable to rename '{}' to '{}'",
                self.lock_path.display(),
                self.file_path.display()
            )));
        }

        tracing::debug!(file = %self.file_path.display(), "committed lock");
        Ok(())
    }

    /// Release the lock without touching the original file
    pub fn rollback(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if self.lock.take().is_some() {
            let _ = std::fs::remove_file(&self.lock_path);
            tracing::debug!(lock = %self.lock_path.display(), "released lock");
        }
    }
}

impl Drop for Lockfile {
    fn drop(&mut self) {
        self.release();
    }
}
