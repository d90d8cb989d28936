// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Dispatch loop: eligibility, bounded concurrency, durable transitions.
//!
//! The driver owns the in-memory checkpoint exclusively. Worker bodies run
//! concurrently (at most `concurrency` at a time), but every checkpoint
//! mutation (entering `processing`, applying an outcome, draining worker
//! log buffers) happens on the driver and is flushed to disk before the
//! next dispatch decision. Killing the process at any point loses only the
//! in-flight invocations; everything flushed stays flushed.
//!
//! Dispatch is FIFO over the items eligible at run start. Completion order
//! is whatever the workers make it.

use crate::error::EngineError;
use crate::invoker;
use crate::job_logger::JobLogger;
use crate::{ingest, pending_requests};
use drover_core::{
    Checkpoint, Clock, LogSink, Outcome, RunConfig, SystemClock, Worker, WorkerContext,
};
use drover_storage::CheckpointLock;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

/// Final counters of a run, as also written to the summary log line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub job_id: drover_core::JobId,
    /// Items with status `completed`
    pub completed: usize,
    /// Items terminally failed (retry budget exhausted)
    pub failed: usize,
    /// Items waiting on an external agent
    pub awaiting: usize,
    /// True when a shutdown signal cut the run short
    pub interrupted: bool,
}

/// Batch execution engine for one checkpointed job.
pub struct Engine<W: Worker, C: Clock = SystemClock> {
    config: RunConfig,
    worker: Arc<W>,
    clock: C,
}

impl<W: Worker> Engine<W, SystemClock> {
    pub fn new(config: RunConfig, worker: W) -> Self {
        Self::with_clock(config, worker, SystemClock)
    }
}

impl<W: Worker, C: Clock> Engine<W, C> {
    /// Create an engine with an explicit clock (for deterministic job ids).
    pub fn with_clock(config: RunConfig, worker: W, clock: C) -> Self {
        Self {
            config,
            worker: Arc::new(worker),
            clock,
        }
    }

    /// Run every eligible item to a terminal-for-this-run state.
    ///
    /// Returns `Err` only for infrastructure failures (input, checkpoint
    /// I/O, lock contention). Worker failures are recorded on their items
    /// and show up in the report instead.
    pub async fn run(&self) -> Result<RunReport, EngineError> {
        self.run_with_shutdown(CancellationToken::new()).await
    }

    /// Like [`run`](Self::run), but stops dispatching when `shutdown` fires.
    ///
    /// In-flight invocations observe the cancellation through their worker
    /// context and are awaited; their outcomes are applied and flushed
    /// before the partial report is returned.
    pub async fn run_with_shutdown(
        &self,
        shutdown: CancellationToken,
    ) -> Result<RunReport, EngineError> {
        let _lock = CheckpointLock::acquire(&self.config.checkpoint_path)?;
        let max_retries = self.config.max_retries;

        let mut checkpoint = ingest::load_or_init(&self.config, &self.clock)?;
        let logger = Arc::new(JobLogger::new(
            &self.config.checkpoint_path,
            &checkpoint.job_id,
        ));

        // Make the (possibly fresh) state durable before dispatching anything.
        drover_storage::save(&self.config.checkpoint_path, &checkpoint)?;

        let eligible = checkpoint.eligible_indices(max_retries);
        logger.info(&format!(
            "run started: {} of {} item(s) eligible",
            eligible.len(),
            checkpoint.items.len()
        ));

        let mut queue = eligible.into_iter();
        let mut inflight: JoinSet<(usize, Outcome)> = JoinSet::new();
        let mut contexts: HashMap<usize, WorkerContext> = HashMap::new();
        let mut interrupted = false;

        loop {
            if !interrupted {
                while inflight.len() < self.config.concurrency {
                    let Some(idx) = queue.next() else { break };
                    self.dispatch(
                        idx,
                        &mut checkpoint,
                        &mut contexts,
                        &mut inflight,
                        &logger,
                        &shutdown,
                    )?;
                }
            }

            if inflight.is_empty() {
                break;
            }

            tokio::select! {
                joined = inflight.join_next() => {
                    match joined {
                        Some(Ok((idx, outcome))) => {
                            self.apply(idx, outcome, &mut checkpoint, &mut contexts, &logger)?;
                        }
                        Some(Err(e)) => {
                            // only reachable if the wrapper task itself dies
                            tracing::error!(error = %e, "invocation task lost");
                        }
                        None => break,
                    }
                }
                _ = shutdown.cancelled(), if !interrupted => {
                    interrupted = true;
                    logger.error("shutdown requested; waiting for in-flight items");
                }
            }
        }

        if interrupted {
            self.flush(&mut checkpoint, &contexts)?;
        }

        let report = RunReport {
            job_id: checkpoint.job_id.clone(),
            completed: checkpoint.completed_count,
            failed: checkpoint.failed_count,
            awaiting: checkpoint.awaiting_count(),
            interrupted,
        };

        logger.info(&format!(
            "run finished: {} completed, {} failed, {} awaiting agent",
            report.completed, report.failed, report.awaiting
        ));
        if report.awaiting > 0 {
            logger.info(&format!(
                "{} pending agent request(s); fulfill and re-run to continue",
                report.awaiting
            ));
            for request in pending_requests(&checkpoint) {
                logger.info_args(
                    &format!("[{}] pending agent request", request.item_id),
                    std::slice::from_ref(&request.prompt),
                );
            }
        }

        Ok(report)
    }

    /// Transition an item into `processing` (flushing) and spawn its
    /// invocation.
    fn dispatch(
        &self,
        idx: usize,
        checkpoint: &mut Checkpoint,
        contexts: &mut HashMap<usize, WorkerContext>,
        inflight: &mut JoinSet<(usize, Outcome)>,
        logger: &Arc<JobLogger>,
        shutdown: &CancellationToken,
    ) -> Result<(), EngineError> {
        checkpoint.begin_attempt(idx, self.config.max_retries);
        self.flush(checkpoint, contexts)?;

        let item = &checkpoint.items[idx];
        logger.info(&format!("[{}] attempt {} started", item.id, item.attempts));

        let cancel = shutdown.child_token();
        let ctx = WorkerContext::new(
            item.id.clone(),
            cancel.clone(),
            logger.clone() as Arc<dyn LogSink>,
        );
        contexts.insert(idx, ctx.clone());

        let worker = Arc::clone(&self.worker);
        let data = item.data.clone();
        let timeout = self.config.item_timeout;

        inflight.spawn(async move {
            // inner spawn contains worker panics as a join error
            let handle = tokio::spawn(invoker::invoke(worker, data, ctx, cancel, timeout));
            let outcome = match handle.await {
                Ok(outcome) => outcome,
                Err(e) if e.is_panic() => Outcome::Fail(format!("worker panicked: {}", e)),
                Err(e) => Outcome::Fail(format!("worker task cancelled: {}", e)),
            };
            (idx, outcome)
        });

        Ok(())
    }

    /// Apply a completed invocation's outcome and flush.
    fn apply(
        &self,
        idx: usize,
        outcome: Outcome,
        checkpoint: &mut Checkpoint,
        contexts: &mut HashMap<usize, WorkerContext>,
        logger: &Arc<JobLogger>,
    ) -> Result<(), EngineError> {
        if let Some(ctx) = contexts.remove(&idx) {
            checkpoint.items[idx].append_logs(ctx.drain_logs());
        }

        let id = checkpoint.items[idx].id.clone();
        tracing::debug!(item = %id, outcome = outcome.name(), "applying outcome");
        match &outcome {
            Outcome::Success(_) => logger.info(&format!("[{}] completed", id)),
            Outcome::Suspend(_) => logger.info(&format!("[{}] awaiting agent", id)),
            Outcome::Fail(message) => logger.error(&format!("[{}] failed: {}", id, message)),
        }

        checkpoint.apply_outcome(idx, outcome, self.config.max_retries);
        self.flush(checkpoint, contexts)
    }

    /// Drain live worker log buffers into their items, then save.
    fn flush(
        &self,
        checkpoint: &mut Checkpoint,
        contexts: &HashMap<usize, WorkerContext>,
    ) -> Result<(), EngineError> {
        for (idx, ctx) in contexts {
            let lines = ctx.drain_logs();
            if !lines.is_empty() {
                checkpoint.items[*idx].append_logs(lines);
            }
        }
        drover_storage::save(&self.config.checkpoint_path, checkpoint)?;
        Ok(())
    }
}

/// Token that fires on the first SIGINT, for use with
/// [`Engine::run_with_shutdown`]. The signal is trapped so the run can
/// flush once and return instead of dying mid-write.
pub fn shutdown_on_ctrl_c() -> CancellationToken {
    let token = CancellationToken::new();
    let trigger = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            trigger.cancel();
        }
    });
    token
}

#[cfg(test)]
#[path = "driver_tests.rs"]
mod tests;
