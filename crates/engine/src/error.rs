// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for the engine.
//!
//! These are the fatal infrastructure failures: anything here aborts the
//! run. Worker failures never surface as errors; they are classified into
//! outcomes and recorded on the item.

use drover_storage::{LockError, StoreError};
use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort an engine run
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("failed to read input {path}: {source}")]
    InputRead {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse input {path}: {source}")]
    InputParse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("input must be a JSON array")]
    InputNotArray,
    #[error("checkpoint error: {0}")]
    Store(#[from] StoreError),
    #[error("lock error: {0}")]
    Lock(#[from] LockError),
}
