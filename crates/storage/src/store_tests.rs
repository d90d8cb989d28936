// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use drover_core::{Checkpoint, FakeClock, Outcome};
use serde_json::json;
use tempfile::tempdir;

fn sample_checkpoint() -> Checkpoint {
    let mut cp = Checkpoint::new(
        vec![json!({"x": 1}), json!({"x": 2})],
        &FakeClock::at(1_700_000_000_000),
    );
    cp.begin_attempt(0, 3);
    cp.apply_outcome(0, Outcome::Success(json!(10)), 3);
    cp.items[0].append_logs(["fetched".to_string(), "parsed".to_string()]);
    cp
}

#[test]
fn missing_file_loads_as_none() {
    let dir = tempdir().unwrap();
    let loaded = load(&dir.path().join("checkpoint.json")).unwrap();
    assert!(loaded.is_none());
}

#[test]
fn save_then_load_round_trips() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("checkpoint.json");
    let cp = sample_checkpoint();

    save(&path, &cp).unwrap();
    let loaded = load(&path).unwrap().unwrap();

    assert_eq!(loaded, cp);
    assert_eq!(loaded.items[0].logs, vec!["fetched", "parsed"]);
}

#[test]
fn save_creates_parent_directories() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("state/nested/checkpoint.json");

    save(&path, &sample_checkpoint()).unwrap();
    assert!(path.exists());
}

#[test]
fn save_leaves_no_tmp_file_behind() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("checkpoint.json");

    save(&path, &sample_checkpoint()).unwrap();
    assert!(!path.with_extension("tmp").exists());
}

#[test]
fn repeated_saves_overwrite() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("checkpoint.json");
    let mut cp = sample_checkpoint();

    save(&path, &cp).unwrap();
    cp.begin_attempt(1, 3);
    cp.apply_outcome(1, Outcome::Fail("boom".into()), 3);
    save(&path, &cp).unwrap();

    let loaded = load(&path).unwrap().unwrap();
    assert_eq!(loaded.items[1].last_error.as_deref(), Some("boom"));
}

#[test]
fn corrupt_file_is_an_error_not_a_reset() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("checkpoint.json");
    std::fs::write(&path, "{ not json").unwrap();

    let err = load(&path).unwrap_err();
    assert!(matches!(err, StoreError::Json(_)));
    // the broken file is left in place for inspection
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "{ not json");
}

#[test]
fn unknown_fields_survive_the_disk_round_trip() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("checkpoint.json");
    let raw = json!({
        "jobId": "job-1",
        "startTime": "2026-01-30T08:14:09Z",
        "items": [{
            "id": "item-0",
            "data": null,
            "status": "pending",
            "attempts": 0,
            "logs": [],
            "priority": "high"
        }],
        "completedCount": 0,
        "failedCount": 0,
        "schemaHint": 2
    });
    std::fs::write(&path, serde_json::to_string(&raw).unwrap()).unwrap();

    let cp = load(&path).unwrap().unwrap();
    save(&path, &cp).unwrap();

    let reread: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(reread, raw);
}
