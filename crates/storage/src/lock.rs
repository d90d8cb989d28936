// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Advisory lock guarding a checkpoint file.
//!
//! Two engine processes writing the same checkpoint would silently clobber
//! each other's saves. The lock is a `.lock` sibling of the checkpoint file
//! held with an exclusive flock for the life of the run; a second engine
//! targeting the same path fails fast instead.

use fs2::FileExt;
use std::fs::File;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors from lock acquisition
#[derive(Debug, Error)]
pub enum LockError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("checkpoint {0} is locked by another process")]
    AlreadyLocked(PathBuf),
}

/// Exclusive advisory lock on a checkpoint file.
///
/// Released on drop. The `.lock` file itself is left behind; only the flock
/// matters.
#[derive(Debug)]
pub struct CheckpointLock {
    // NOTE(lifetime): Held to maintain exclusive file lock; released on drop
    #[allow(dead_code)]
    file: File,
    path: PathBuf,
}

impl CheckpointLock {
    /// Try to take the exclusive lock for the given checkpoint path.
    pub fn acquire(checkpoint_path: &Path) -> Result<Self, LockError> {
        let path = lock_path(checkpoint_path);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = File::create(&path)?;
        file.try_lock_exclusive().map_err(|e| {
            if e.kind() == std::io::ErrorKind::WouldBlock {
                LockError::AlreadyLocked(checkpoint_path.to_path_buf())
            } else {
                LockError::Io(e)
            }
        })?;

        Ok(Self { file, path })
    }

    /// Path of the lock file on disk.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Build the lock-file path for a checkpoint: `<checkpoint>.lock`.
fn lock_path(checkpoint_path: &Path) -> PathBuf {
    let mut name = checkpoint_path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| "checkpoint".into());
    name.push(".lock");
    checkpoint_path.with_file_name(name)
}

#[cfg(test)]
#[path = "lock_tests.rs"]
mod tests;
