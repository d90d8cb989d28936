// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Out-of-band fulfillment of suspended items.
//!
//! The engine never answers an item's pending prompt itself. Between runs, a
//! supervising agent loads the checkpoint, reads the pending requests, and
//! either injects a finished output or rewrites the item's payload for
//! reprocessing. The next run's eligibility pass picks the change up.

use drover_core::{Checkpoint, ItemId, ItemStatus};
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

/// Errors from supervisor-side fulfillment
#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("item not found: {0}")]
    UnknownItem(String),
    #[error("item {0} is not awaiting an agent")]
    NotAwaiting(String),
}

/// One suspended item's request, as handed to the supervisor.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PendingRequest {
    pub item_id: ItemId,
    /// Prompt payload the worker supplied, conventionally a message list
    pub prompt: Value,
}

/// All items currently awaiting an external agent, in input order.
pub fn pending_requests(checkpoint: &Checkpoint) -> Vec<PendingRequest> {
    checkpoint
        .pending_prompts()
        .into_iter()
        .map(|(id, prompt)| PendingRequest {
            item_id: id.clone(),
            prompt: prompt.clone(),
        })
        .collect()
}

/// Complete a suspended item with a supervisor-produced output.
pub fn fulfill(
    checkpoint: &mut Checkpoint,
    item_id: &str,
    output: Value,
    max_retries: u32,
) -> Result<(), BridgeError> {
    let item = awaiting_item(checkpoint, item_id)?;
    item.complete(output);
    checkpoint.recount(max_retries);
    Ok(())
}

/// Send a suspended item back through the worker, optionally with a
/// rewritten payload. The pending prompt is consumed.
pub fn reprocess(
    checkpoint: &mut Checkpoint,
    item_id: &str,
    new_data: Option<Value>,
    max_retries: u32,
) -> Result<(), BridgeError> {
    let item = awaiting_item(checkpoint, item_id)?;
    if let Some(data) = new_data {
        item.data = data;
    }
    item.status = ItemStatus::Pending;
    item.pending_prompt = None;
    checkpoint.recount(max_retries);
    Ok(())
}

fn awaiting_item<'a>(
    checkpoint: &'a mut Checkpoint,
    item_id: &str,
) -> Result<&'a mut drover_core::Item, BridgeError> {
    let item = checkpoint
        .item_mut(item_id)
        .ok_or_else(|| BridgeError::UnknownItem(item_id.to_string()))?;
    if item.status != ItemStatus::AwaitingAgent {
        return Err(BridgeError::NotAwaiting(item_id.to_string()));
    }
    Ok(item)
}

#[cfg(test)]
#[path = "bridge_tests.rs"]
mod tests;
