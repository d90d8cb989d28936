// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! drover-engine: bounded-concurrency execution engine
//!
//! Drives every eligible item of a checkpointed job through a user-supplied
//! [`Worker`](drover_core::Worker), with per-item timeouts, a bounded retry
//! budget across runs, and a durable checkpoint flush after every state
//! transition. Killing the process at any point loses at most the in-flight
//! invocations; the next run resumes from the last flushed state.
//!
//! ```no_run
//! use drover_core::{InputSource, RunConfig, WorkerContext, WorkerError};
//! use drover_engine::Engine;
//! use serde_json::{json, Value};
//!
//! # async fn demo() -> Result<(), drover_engine::EngineError> {
//! let config = RunConfig::builder(
//!     InputSource::data(vec![json!({"x": 1}), json!({"x": 2})]),
//!     "state/checkpoint.json",
//! )
//! .concurrency(2)
//! .build();
//!
//! let worker = |data: Value, ctx: WorkerContext| async move {
//!     ctx.log("working");
//!     Ok::<_, WorkerError>(json!(data["x"].as_i64().unwrap_or(0) * 10))
//! };
//!
//! let report = Engine::new(config, worker).run().await?;
//! println!("{} completed", report.completed);
//! # Ok(())
//! # }
//! ```

mod bridge;
mod driver;
mod error;
mod ingest;
mod invoker;
mod job_logger;
mod time_fmt;

pub use bridge::{fulfill, pending_requests, reprocess, BridgeError, PendingRequest};
pub use driver::{shutdown_on_ctrl_c, Engine, RunReport};
pub use error::EngineError;
pub use ingest::load_or_init;
pub use invoker::invoke;
pub use job_logger::JobLogger;
