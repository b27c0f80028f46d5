//! # Store Lock
//!
//! Exclusive `fs2` lock on the store directory, held for the lifetime of a
//! read-write handle. Released on drop.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use fs2::FileExt;

use crate::domain::KVStoreError;

pub struct StoreLock {
    file: File,
    path: PathBuf,
    pid: u32,
}

impl StoreLock {
    const LOCK_FILE: &'static str = "LOCK";

    /// Take the lock without waiting. Fails with `AlreadyLocked` when another
    /// handle holds it.
    pub fn acquire(dir: &Path) -> Result<Self, KVStoreError> {
        let path = dir.join(Self::LOCK_FILE);
        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .truncate(false)
            .open(&path)
            .map_err(|e| KVStoreError::io("create lock file", e))?;

        if file.try_lock_exclusive().is_err() {
            return Err(KVStoreError::AlreadyLocked {
                pid: Self::read_existing_pid(&path),
                path,
            });
        }

        let pid = std::process::id();
        file.set_len(0)
            .map_err(|e| KVStoreError::io("truncate lock file", e))?;
        let mut locked = file;
        writeln!(locked, "{}", pid).map_err(|e| KVStoreError::io("write lock pid", e))?;

        Ok(Self {
            file: locked,
            path,
            pid,
        })
    }

    pub fn pid(&self) -> u32 {
        self.pid
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_existing_pid(path: &Path) -> Option<u32> {
        std::fs::read_to_string(path)
            .ok()
            .and_then(|s| s.trim().parse().ok())
    }
}

impl Drop for StoreLock {
    fn drop(&mut self) {
        #[allow(clippy::incompatible_msrv)]
        let _ = FileExt::unlock(&self.file);
        let _ = std::fs::remove_file(&self.path);
    }
}
