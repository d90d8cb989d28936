// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Run configuration.

use serde_json::Value;
use std::path::PathBuf;
use std::time::Duration;

/// Where the input items come from: a JSON-array file, or inline values.
#[derive(Debug, Clone)]
pub enum InputSource {
    Path(PathBuf),
    Data(Vec<Value>),
}

impl InputSource {
    pub fn path(path: impl Into<PathBuf>) -> Self {
        InputSource::Path(path.into())
    }

    pub fn data(items: Vec<Value>) -> Self {
        InputSource::Data(items)
    }
}

/// Read-only configuration for one engine run.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Input items; only consulted when no checkpoint exists yet
    pub input: InputSource,
    /// Durable state file; logs are rooted beside it
    pub checkpoint_path: PathBuf,
    /// Maximum in-flight worker invocations
    pub concurrency: usize,
    /// Total invocations an item gets before it is terminally failed
    pub max_retries: u32,
    /// Per-item wall-clock budget; `None` means unbounded
    pub item_timeout: Option<Duration>,
}

impl RunConfig {
    pub fn builder(input: InputSource, checkpoint_path: impl Into<PathBuf>) -> RunConfigBuilder {
        RunConfigBuilder {
            input,
            checkpoint_path: checkpoint_path.into(),
            concurrency: 1,
            max_retries: 3,
            item_timeout: None,
        }
    }
}

/// Builder with the defaults of the reference configuration
/// (`concurrency=1`, `max_retries=3`, no timeout).
pub struct RunConfigBuilder {
    input: InputSource,
    checkpoint_path: PathBuf,
    concurrency: usize,
    max_retries: u32,
    item_timeout: Option<Duration>,
}

impl RunConfigBuilder {
    /// Concurrency is clamped to at least 1.
    pub fn concurrency(mut self, n: usize) -> Self {
        self.concurrency = n.max(1);
        self
    }

    pub fn max_retries(mut self, n: u32) -> Self {
        self.max_retries = n;
        self
    }

    /// A zero timeout means no timeout.
    pub fn item_timeout(mut self, timeout: Duration) -> Self {
        self.item_timeout = (!timeout.is_zero()).then_some(timeout);
        self
    }

    pub fn item_timeout_ms(self, ms: u64) -> Self {
        self.item_timeout(Duration::from_millis(ms))
    }

    pub fn build(self) -> RunConfig {
        RunConfig {
            input: self.input,
            checkpoint_path: self.checkpoint_path,
            concurrency: self.concurrency,
            max_retries: self.max_retries,
            item_timeout: self.item_timeout,
        }
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
