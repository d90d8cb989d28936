// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Checkpoint load/save with crash-safe write semantics.
//!
//! A save writes the serialized checkpoint to a sibling `.tmp` file, fsyncs
//! it, then renames it over the target. An observer therefore sees either
//! the pre-write file or the complete post-write file, never partial JSON.
//!
//! A missing file loads as `None` (fresh job). An unparsable file is an
//! error: the checkpoint is the job's only durable state, so the run must
//! abort rather than overwrite it.

use drover_core::Checkpoint;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::Path;
use thiserror::Error;

/// Errors from checkpoint persistence
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Load the checkpoint if it exists.
pub fn load(path: &Path) -> Result<Option<Checkpoint>, StoreError> {
    if !path.exists() {
        return Ok(None);
    }

    let file = File::open(path)?;
    let reader = BufReader::new(file);
    let checkpoint = serde_json::from_reader(reader)?;
    Ok(Some(checkpoint))
}

/// Save the checkpoint atomically (write to `.tmp`, fsync, rename).
pub fn save(path: &Path, checkpoint: &Checkpoint) -> Result<(), StoreError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let tmp_path = path.with_extension("tmp");

    // Write to temp file and sync
    {
        let file = File::create(&tmp_path)?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer(&mut writer, checkpoint)?;
        let file = writer.into_inner().map_err(|e| e.into_error())?;
        file.sync_all()?;
    }

    // Atomic rename
    fs::rename(&tmp_path, path)?;

    Ok(())
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
