// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Whole-job checkpoint aggregate.
//!
//! The checkpoint owns every item plus the aggregate counters the summary
//! and the surrounding supervisor read. Counters are recomputed from the
//! items after every transition, so they cannot drift from the item statuses
//! no matter how many times a transition is re-applied after a crash.

use crate::clock::Clock;
use crate::item::{Item, ItemId, JobId};
use crate::outcome::Outcome;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Durable snapshot of an entire job's state.
///
/// Serializes to the checkpoint wire format (camelCase keys). Unknown
/// top-level fields are preserved in `extra` and round-trip untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Checkpoint {
    pub job_id: JobId,
    /// When the job was first created; stable across all later saves
    pub start_time: DateTime<Utc>,
    /// Items in original input order; never removed
    pub items: Vec<Item>,
    #[serde(default)]
    pub completed_count: usize,
    #[serde(default)]
    pub failed_count: usize,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Checkpoint {
    /// Initialize a fresh checkpoint from the input sequence.
    ///
    /// Element `i` of the input becomes `item-<i>`; the job id is derived
    /// from the clock (`job-<epoch-millis>`).
    pub fn new(input: Vec<Value>, clock: &impl Clock) -> Self {
        let epoch_ms = clock.epoch_ms();
        Self {
            job_id: JobId::new(format!("job-{}", epoch_ms)),
            start_time: DateTime::from_timestamp_millis(epoch_ms as i64).unwrap_or_default(),
            items: input.into_iter().enumerate().map(|(i, d)| Item::new(i, d)).collect(),
            completed_count: 0,
            failed_count: 0,
            extra: Map::new(),
        }
    }

    /// Look up an item by id.
    pub fn item(&self, id: &str) -> Option<&Item> {
        self.items.iter().find(|i| i.id == *id)
    }

    /// Look up an item by id, mutably.
    pub fn item_mut(&mut self, id: &str) -> Option<&mut Item> {
        self.items.iter_mut().find(|i| i.id == *id)
    }

    /// Indices of items a run should dispatch, in input order.
    pub fn eligible_indices(&self, max_retries: u32) -> Vec<usize> {
        self.items
            .iter()
            .enumerate()
            .filter(|(_, item)| item.is_eligible(max_retries))
            .map(|(i, _)| i)
            .collect()
    }

    /// Count of items currently awaiting an external agent.
    pub fn awaiting_count(&self) -> usize {
        self.items
            .iter()
            .filter(|i| i.status == crate::item::ItemStatus::AwaitingAgent)
            .count()
    }

    /// Transition item `idx` into `processing`, counting the attempt.
    pub fn begin_attempt(&mut self, idx: usize, max_retries: u32) {
        self.items[idx].begin_attempt();
        self.recount(max_retries);
    }

    /// Apply an invocation outcome to item `idx` via its entry action.
    pub fn apply_outcome(&mut self, idx: usize, outcome: Outcome, max_retries: u32) {
        let item = &mut self.items[idx];
        match outcome {
            Outcome::Success(value) => item.complete(value),
            Outcome::Suspend(prompt) => item.suspend(prompt),
            Outcome::Fail(message) => item.fail(message),
        }
        self.recount(max_retries);
    }

    /// Recompute the aggregate counters from the item statuses.
    ///
    /// `completed_count` counts `completed` items; `failed_count` counts
    /// items that are terminally failed (budget exhausted). Recomputing is
    /// idempotent, which matters when a transition is re-applied after a
    /// crash-restart.
    pub fn recount(&mut self, max_retries: u32) {
        self.completed_count = self
            .items
            .iter()
            .filter(|i| i.status == crate::item::ItemStatus::Completed)
            .count();
        self.failed_count = self.items.iter().filter(|i| i.is_dead(max_retries)).count();
    }

    /// Ids and prompts of items awaiting an external agent.
    pub fn pending_prompts(&self) -> Vec<(&ItemId, &Value)> {
        self.items
            .iter()
            .filter_map(|i| match (&i.status, &i.pending_prompt) {
                (crate::item::ItemStatus::AwaitingAgent, Some(p)) => Some((&i.id, p)),
                _ => None,
            })
            .collect()
    }
}

#[cfg(test)]
#[path = "checkpoint_tests.rs"]
mod tests;
