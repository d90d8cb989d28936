// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Input ingest and checkpoint resume.
//!
//! A run either resumes an existing checkpoint verbatim (the input is not
//! re-read, so `jobId` and `startTime` stay stable) or ingests the input
//! JSON array into a fresh checkpoint.

use crate::error::EngineError;
use drover_core::{Checkpoint, Clock, InputSource, RunConfig};
use serde_json::Value;
use std::fs;

/// Load the existing checkpoint, or initialize one from the input.
pub fn load_or_init(config: &RunConfig, clock: &impl Clock) -> Result<Checkpoint, EngineError> {
    if let Some(checkpoint) = drover_storage::load(&config.checkpoint_path)? {
        tracing::debug!(
            job_id = %checkpoint.job_id,
            items = checkpoint.items.len(),
            "resuming checkpoint"
        );
        return Ok(checkpoint);
    }

    let input = read_input(&config.input)?;
    Ok(Checkpoint::new(input, clock))
}

/// Read the configured input source as a JSON array.
fn read_input(source: &InputSource) -> Result<Vec<Value>, EngineError> {
    let value = match source {
        InputSource::Data(items) => return Ok(items.clone()),
        InputSource::Path(path) => {
            let text = fs::read_to_string(path).map_err(|source| EngineError::InputRead {
                path: path.clone(),
                source,
            })?;
            serde_json::from_str::<Value>(&text).map_err(|source| EngineError::InputParse {
                path: path.clone(),
                source,
            })?
        }
    };

    match value {
        Value::Array(items) => Ok(items),
        _ => Err(EngineError::InputNotArray),
    }
}

#[cfg(test)]
#[path = "ingest_tests.rs"]
mod tests;
