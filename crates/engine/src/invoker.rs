// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Single-invocation wrapper: timeout, cancellation, classification.
//!
//! The invoker binds one item's payload to the worker, races it against the
//! configured timeout, and classifies the result into an [`Outcome`]. It
//! never touches the item or the checkpoint; the driver applies the
//! transition.

use drover_core::{Outcome, Worker, WorkerContext};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Run the worker on one payload and classify the result.
///
/// When the timeout elapses first, the worker future is dropped and the
/// invocation's cancellation token fires so that any detached work it
/// started (blocking I/O, subprocesses) can stop cooperatively; such work
/// may continue until it observes the token.
pub async fn invoke<W: Worker>(
    worker: Arc<W>,
    data: Value,
    ctx: WorkerContext,
    cancel: CancellationToken,
    timeout: Option<Duration>,
) -> Outcome {
    let fut = worker.run(data, ctx);

    let result = match timeout {
        Some(limit) => match tokio::time::timeout(limit, fut).await {
            Ok(result) => result,
            Err(_) => {
                cancel.cancel();
                return Outcome::Fail(format!(
                    "Operation timed out after {}ms",
                    limit.as_millis()
                ));
            }
        },
        None => fut.await,
    };

    Outcome::from_worker(result)
}

#[cfg(test)]
#[path = "invoker_tests.rs"]
mod tests;
