// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Worker contract: the seam between the engine and user code.
//!
//! The engine treats the worker as an opaque async function from an item's
//! payload to a result value. The only error the engine interprets is the
//! suspension sentinel; everything else is stringified and recorded on the
//! item. Workers must be idempotent: a crash-restart can re-dispatch an
//! item whose previous invocation already had side effects.

use crate::item::ItemId;
use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;
use std::future::Future;
use std::sync::Arc;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

/// Error raised by a worker body.
#[derive(Debug, Error)]
pub enum WorkerError {
    /// Sentinel: delegate this item to an external agent.
    ///
    /// The payload describes what the worker needs, conventionally a list
    /// of chat-style messages. Raising this does not consume retry budget.
    #[error("awaiting external agent")]
    Suspend(Value),
    /// Any other failure; recorded verbatim as the item's last error.
    #[error("{0}")]
    Message(String),
}

impl WorkerError {
    /// Suspend the item with a prompt payload for the external agent.
    pub fn suspend(prompt: impl Into<Value>) -> Self {
        WorkerError::Suspend(prompt.into())
    }

    pub fn message(msg: impl Into<String>) -> Self {
        WorkerError::Message(msg.into())
    }
}

impl From<String> for WorkerError {
    fn from(msg: String) -> Self {
        WorkerError::Message(msg)
    }
}

impl From<&str> for WorkerError {
    fn from(msg: &str) -> Self {
        WorkerError::Message(msg.to_string())
    }
}

impl From<serde_json::Error> for WorkerError {
    fn from(err: serde_json::Error) -> Self {
        WorkerError::Message(err.to_string())
    }
}

impl From<std::io::Error> for WorkerError {
    fn from(err: std::io::Error) -> Self {
        WorkerError::Message(err.to_string())
    }
}

/// Destination for worker log lines, implemented by the engine's job logger.
pub trait LogSink: Send + Sync {
    /// Append one line attributed to the given item.
    fn append(&self, item_id: &ItemId, line: &str);
}

/// Sink that discards everything; for tests and logger-less embedding.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl LogSink for NullSink {
    fn append(&self, _item_id: &ItemId, _line: &str) {}
}

/// Per-invocation context handed to the worker.
///
/// `log()` writes through to the engine log immediately and buffers the line
/// for the item's own durable `logs`; the driver drains the buffer before
/// the next checkpoint flush, so the buffer is never mutated concurrently
/// with a save.
#[derive(Clone)]
pub struct WorkerContext {
    item_id: ItemId,
    cancel: CancellationToken,
    lines: Arc<Mutex<Vec<String>>>,
    sink: Arc<dyn LogSink>,
}

impl WorkerContext {
    pub fn new(item_id: ItemId, cancel: CancellationToken, sink: Arc<dyn LogSink>) -> Self {
        Self {
            item_id,
            cancel,
            lines: Arc::new(Mutex::new(Vec::new())),
            sink,
        }
    }

    pub fn item_id(&self) -> &ItemId {
        &self.item_id
    }

    /// Log a line: mirrored to the engine log now, persisted on the item at
    /// the next flush.
    pub fn log(&self, message: impl Into<String>) {
        let message = message.into();
        self.sink.append(&self.item_id, &message);
        self.lines.lock().push(message);
    }

    /// True once the engine has asked this invocation to stop (timeout or
    /// shutdown). In-flight I/O should check this at natural boundaries.
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Resolve when the engine asks this invocation to stop.
    pub async fn cancelled(&self) {
        self.cancel.cancelled().await
    }

    /// Take the buffered log lines (driver side).
    pub fn drain_logs(&self) -> Vec<String> {
        std::mem::take(&mut *self.lines.lock())
    }
}

/// User-supplied per-item worker.
#[async_trait]
pub trait Worker: Send + Sync + 'static {
    /// Process one item's payload to a result value.
    async fn run(&self, data: Value, ctx: WorkerContext) -> Result<Value, WorkerError>;
}

/// Plain async functions and closures are workers.
#[async_trait]
impl<F, Fut> Worker for F
where
    F: Fn(Value, WorkerContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Value, WorkerError>> + Send + 'static,
{
    async fn run(&self, data: Value, ctx: WorkerContext) -> Result<Value, WorkerError> {
        self(data, ctx).await
    }
}

#[cfg(test)]
#[path = "worker_tests.rs"]
mod tests;
