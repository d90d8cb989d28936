// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Item model and per-item status lifecycle.
//!
//! An item is one element of the input sequence plus its execution metadata.
//! Status moves through a small state machine; every transition has an entry
//! action that keeps the persisted fields consistent:
//!
//! ```text
//! pending ──────────────► processing ──► completed
//!                           │  ▲  │
//!                           │  │  └────► awaiting_agent
//!                           ▼  │
//!                         failed (re-eligible while attempts < budget)
//! ```
//!
//! Suspension is deliberately attempt-neutral: entering `awaiting_agent`
//! rolls the attempt counter back by one, so delegating to an external agent
//! never burns retry budget.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

crate::define_id! {
    /// Identifier for an item: `item-<ordinal>` from its input position.
    pub struct ItemId;
}

crate::define_id! {
    /// Identifier for a whole job run: `job-<epoch-millis>` at first creation.
    pub struct JobId;
}

/// Status of an item through its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemStatus {
    /// Never dispatched (or reset by a supervisor)
    Pending,
    /// Dispatched to a worker; a crash can strand an item here
    Processing,
    /// Worker returned a value
    Completed,
    /// Worker errored or timed out
    Failed,
    /// Worker delegated the item to an external agent
    AwaitingAgent,
}

impl fmt::Display for ItemStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItemStatus::Pending => write!(f, "pending"),
            ItemStatus::Processing => write!(f, "processing"),
            ItemStatus::Completed => write!(f, "completed"),
            ItemStatus::Failed => write!(f, "failed"),
            ItemStatus::AwaitingAgent => write!(f, "awaiting_agent"),
        }
    }
}

/// One unit of work: opaque payload plus execution metadata.
///
/// Serializes to the checkpoint wire format (camelCase keys). Fields written
/// by newer versions or by an external supervisor are preserved verbatim in
/// `extra` and round-trip untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub id: ItemId,
    /// Opaque payload, preserved verbatim across restarts
    pub data: Value,
    pub status: ItemStatus,
    /// Completed or errored worker invocations (suspensions don't count)
    #[serde(default)]
    pub attempts: u32,
    /// Message from the most recent non-suspension failure
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
    /// Prompt payload supplied by the worker when it suspended
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pending_prompt: Option<Value>,
    /// Result value, set on successful completion
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<Value>,
    /// Worker-context log lines, appended in order; survives restarts
    #[serde(default)]
    pub logs: Vec<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Item {
    /// Create a fresh item from its 0-based input position.
    pub fn new(ordinal: usize, data: Value) -> Self {
        Self {
            id: ItemId::new(format!("item-{}", ordinal)),
            data,
            status: ItemStatus::Pending,
            attempts: 0,
            last_error: None,
            pending_prompt: None,
            output: None,
            logs: Vec::new(),
            extra: Map::new(),
        }
    }

    /// Enter `processing` and count the attempt.
    ///
    /// Valid from `pending`, from `failed` while under budget, and from a
    /// `processing` left behind by a crash (the interrupted attempt already
    /// counted; re-dispatch counts again and workers must be idempotent).
    pub fn begin_attempt(&mut self) {
        self.status = ItemStatus::Processing;
        self.attempts += 1;
    }

    /// Enter `completed` with the worker's result value.
    pub fn complete(&mut self, output: Value) {
        self.status = ItemStatus::Completed;
        self.output = Some(output);
        self.pending_prompt = None;
    }

    /// Enter `failed` with a human-readable message.
    pub fn fail(&mut self, message: impl Into<String>) {
        self.status = ItemStatus::Failed;
        self.last_error = Some(message.into());
    }

    /// Enter `awaiting_agent` with the prompt payload the worker supplied.
    ///
    /// Rolls the attempt counter back by one: a suspension is not an attempt.
    pub fn suspend(&mut self, prompt: Value) {
        self.status = ItemStatus::AwaitingAgent;
        self.pending_prompt = Some(prompt);
        self.attempts = self.attempts.saturating_sub(1);
    }

    /// Whether this item is done for the current run.
    ///
    /// `completed` and `awaiting_agent` are always terminal; `failed` is
    /// terminal once the retry budget is exhausted.
    pub fn is_terminal(&self, max_retries: u32) -> bool {
        match self.status {
            ItemStatus::Completed | ItemStatus::AwaitingAgent => true,
            ItemStatus::Failed => self.attempts >= max_retries,
            ItemStatus::Pending | ItemStatus::Processing => false,
        }
    }

    /// Whether a run should dispatch this item.
    pub fn is_eligible(&self, max_retries: u32) -> bool {
        !self.is_terminal(max_retries)
    }

    /// Terminally failed: `failed` with the retry budget exhausted.
    pub fn is_dead(&self, max_retries: u32) -> bool {
        self.status == ItemStatus::Failed && self.attempts >= max_retries
    }

    /// Append worker-context log lines in order.
    pub fn append_logs(&mut self, lines: impl IntoIterator<Item = String>) {
        self.logs.extend(lines);
    }
}

#[cfg(test)]
#[path = "item_tests.rs"]
mod tests;
