// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::clock::FakeClock;
use crate::item::ItemStatus;
use crate::outcome::Outcome;
use serde_json::json;

fn fresh(input: Vec<serde_json::Value>) -> Checkpoint {
    Checkpoint::new(input, &FakeClock::at(1_700_000_000_000))
}

#[test]
fn new_checkpoint_from_input() {
    let cp = fresh(vec![json!({"x": 1}), json!({"x": 2})]);

    assert_eq!(cp.job_id, "job-1700000000000");
    assert_eq!(cp.items.len(), 2);
    assert_eq!(cp.items[0].id, "item-0");
    assert_eq!(cp.items[1].id, "item-1");
    assert_eq!(cp.items[1].data, json!({"x": 2}));
    assert_eq!(cp.completed_count, 0);
    assert_eq!(cp.failed_count, 0);
}

#[test]
fn start_time_derives_from_clock() {
    let cp = fresh(vec![]);
    assert_eq!(cp.start_time.timestamp_millis(), 1_700_000_000_000);
}

#[test]
fn item_lookup_by_id() {
    let mut cp = fresh(vec![json!(1), json!(2)]);
    assert_eq!(cp.item("item-1").unwrap().data, json!(2));
    assert!(cp.item("item-9").is_none());

    cp.item_mut("item-0").unwrap().fail("boom");
    assert_eq!(cp.items[0].status, ItemStatus::Failed);
}

#[test]
fn eligibility_skips_terminal_items() {
    let max_retries = 3;
    let mut cp = fresh(vec![json!(0), json!(1), json!(2), json!(3), json!(4)]);

    // item-0 completed
    cp.begin_attempt(0, max_retries);
    cp.apply_outcome(0, Outcome::Success(json!(0)), max_retries);
    // item-1 awaiting agent
    cp.begin_attempt(1, max_retries);
    cp.apply_outcome(1, Outcome::Suspend(json!("p")), max_retries);
    // item-2 terminally failed
    cp.items[2].attempts = 3;
    cp.items[2].fail("dead");
    cp.recount(max_retries);
    // item-3 failed under budget
    cp.begin_attempt(3, max_retries);
    cp.apply_outcome(3, Outcome::Fail("boom".into()), max_retries);
    // item-4 stranded in processing by a crash
    cp.items[4].begin_attempt();

    assert_eq!(cp.eligible_indices(max_retries), vec![3, 4]);
}

#[test]
fn counters_match_statuses_after_every_transition() {
    let max_retries = 2;
    let mut cp = fresh(vec![json!(1), json!(2), json!(3)]);

    cp.begin_attempt(0, max_retries);
    cp.apply_outcome(0, Outcome::Success(json!(10)), max_retries);
    assert_eq!((cp.completed_count, cp.failed_count), (1, 0));

    cp.begin_attempt(1, max_retries);
    cp.apply_outcome(1, Outcome::Fail("boom".into()), max_retries);
    assert_eq!((cp.completed_count, cp.failed_count), (1, 0), "under budget");

    cp.begin_attempt(1, max_retries);
    cp.apply_outcome(1, Outcome::Fail("boom".into()), max_retries);
    assert_eq!((cp.completed_count, cp.failed_count), (1, 1), "budget spent");

    cp.begin_attempt(2, max_retries);
    cp.apply_outcome(2, Outcome::Suspend(json!("p")), max_retries);
    assert_eq!((cp.completed_count, cp.failed_count), (1, 1));
    assert_eq!(cp.awaiting_count(), 1);
}

#[test]
fn recount_is_idempotent() {
    let max_retries = 1;
    let mut cp = fresh(vec![json!(1)]);
    cp.begin_attempt(0, max_retries);
    cp.apply_outcome(0, Outcome::Fail("boom".into()), max_retries);

    let (c, f) = (cp.completed_count, cp.failed_count);
    cp.recount(max_retries);
    cp.recount(max_retries);
    assert_eq!((cp.completed_count, cp.failed_count), (c, f));
}

#[test]
fn suspension_does_not_spend_budget() {
    let max_retries = 3;
    let mut cp = fresh(vec![json!({"q": "hi"})]);

    cp.begin_attempt(0, max_retries);
    cp.apply_outcome(
        0,
        Outcome::Suspend(json!([{"role": "user", "content": "hi"}])),
        max_retries,
    );

    assert_eq!(cp.items[0].attempts, 0);
    assert_eq!(cp.items[0].status, ItemStatus::AwaitingAgent);
}

#[test]
fn pending_prompts_lists_awaiting_items() {
    let max_retries = 3;
    let mut cp = fresh(vec![json!(1), json!(2)]);

    cp.begin_attempt(0, max_retries);
    cp.apply_outcome(0, Outcome::Suspend(json!("need help")), max_retries);
    cp.begin_attempt(1, max_retries);
    cp.apply_outcome(1, Outcome::Success(json!(20)), max_retries);

    let prompts = cp.pending_prompts();
    assert_eq!(prompts.len(), 1);
    assert_eq!(prompts[0].0.as_str(), "item-0");
    assert_eq!(prompts[0].1, &json!("need help"));
}

#[test]
fn wire_format_field_names() {
    let cp = fresh(vec![json!(1)]);
    let value = serde_json::to_value(&cp).unwrap();

    assert!(value.get("jobId").is_some());
    assert!(value.get("startTime").is_some());
    assert!(value.get("items").is_some());
    assert_eq!(value["completedCount"], 0);
    assert_eq!(value["failedCount"], 0);
}

#[test]
fn unknown_top_level_fields_round_trip() {
    let raw = json!({
        "jobId": "job-1",
        "startTime": "2026-01-30T08:14:09Z",
        "items": [],
        "completedCount": 0,
        "failedCount": 0,
        "supervisorNote": "resume after review"
    });

    let cp: Checkpoint = serde_json::from_value(raw.clone()).unwrap();
    assert_eq!(cp.extra["supervisorNote"], "resume after review");

    let back = serde_json::to_value(&cp).unwrap();
    assert_eq!(back, raw);
}
