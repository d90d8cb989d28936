// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::item::ItemId;
use parking_lot::Mutex;
use serde_json::json;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

#[derive(Default)]
struct RecordingSink {
    lines: Mutex<Vec<(String, String)>>,
}

impl LogSink for RecordingSink {
    fn append(&self, item_id: &ItemId, line: &str) {
        self.lines
            .lock()
            .push((item_id.to_string(), line.to_string()));
    }
}

fn ctx_with_sink() -> (WorkerContext, Arc<RecordingSink>) {
    let sink = Arc::new(RecordingSink::default());
    let ctx = WorkerContext::new(
        ItemId::new("item-0"),
        CancellationToken::new(),
        sink.clone(),
    );
    (ctx, sink)
}

#[test]
fn log_writes_through_and_buffers() {
    let (ctx, sink) = ctx_with_sink();

    ctx.log("fetching page 1");
    ctx.log("fetching page 2");

    let mirrored = sink.lines.lock().clone();
    assert_eq!(
        mirrored,
        vec![
            ("item-0".to_string(), "fetching page 1".to_string()),
            ("item-0".to_string(), "fetching page 2".to_string()),
        ]
    );

    assert_eq!(ctx.drain_logs(), vec!["fetching page 1", "fetching page 2"]);
    assert!(ctx.drain_logs().is_empty(), "drain takes the buffer");
}

#[test]
fn clones_share_the_buffer() {
    let (ctx, _sink) = ctx_with_sink();
    let clone = ctx.clone();

    clone.log("from the worker side");
    assert_eq!(ctx.drain_logs(), vec!["from the worker side"]);
}

#[test]
fn cancellation_is_observable() {
    let token = CancellationToken::new();
    let ctx = WorkerContext::new(ItemId::new("item-0"), token.clone(), Arc::new(NullSink));

    assert!(!ctx.is_cancelled());
    token.cancel();
    assert!(ctx.is_cancelled());
}

#[tokio::test]
async fn cancelled_future_resolves_on_cancel() {
    let token = CancellationToken::new();
    let ctx = WorkerContext::new(ItemId::new("item-0"), token.clone(), Arc::new(NullSink));

    token.cancel();
    ctx.cancelled().await;
}

#[test]
fn suspend_error_keeps_payload() {
    let prompt = json!([{"role": "user", "content": "hi"}]);
    match WorkerError::suspend(prompt.clone()) {
        WorkerError::Suspend(p) => assert_eq!(p, prompt),
        other => panic!("expected suspend, got {:?}", other),
    }
}

#[test]
fn message_conversions() {
    assert_eq!(
        WorkerError::from("boom").to_string(),
        "boom",
        "&str conversion"
    );
    assert_eq!(WorkerError::from("x".to_string()).to_string(), "x");

    let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing input");
    assert_eq!(WorkerError::from(io).to_string(), "missing input");
}

#[tokio::test]
async fn closures_are_workers() {
    let worker = |data: serde_json::Value, _ctx: WorkerContext| async move {
        Ok::<_, WorkerError>(json!(data["x"].as_i64().unwrap_or(0) * 10))
    };

    let (ctx, _sink) = ctx_with_sink();
    let out = worker.run(json!({"x": 3}), ctx).await.unwrap();
    assert_eq!(out, json!(30));
}
