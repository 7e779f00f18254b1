// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use forge3d_core::{BridgeState, HistoryId};
use std::time::Duration;

fn history_id() -> HistoryId {
    HistoryId::new()
}

#[tokio::test]
async fn emit_is_observed_by_subscriber() {
    let hub = TelemetryHub::with_defaults();
    let mut sub = hub.subscribe(TelemetryCategory::Scheduler);
    hub.emit(TelemetryEvent::SchedulerQueued { history_id: history_id() });
    let event = sub.recv().await.expect("event");
    assert_eq!(event.category(), TelemetryCategory::Scheduler);
}

#[tokio::test]
async fn subscribe_all_receives_every_category() {
    let hub = TelemetryHub::with_defaults();
    let mut sub = hub.subscribe_all();
    hub.emit(TelemetryEvent::BridgeSpawn { pid: 123 });
    hub.emit(TelemetryEvent::Llm { payload: serde_json::json!({}) });
    let first = sub.recv().await.expect("event");
    let second = sub.recv().await.expect("event");
    assert_eq!(first.category(), TelemetryCategory::Bridge);
    assert_eq!(second.category(), TelemetryCategory::Llm);
}

#[tokio::test]
async fn a_subscription_to_one_category_does_not_see_another() {
    let hub = TelemetryHub::with_defaults();
    let mut sub = hub.subscribe(TelemetryCategory::Bridge);
    hub.emit(TelemetryEvent::SchedulerQueued { history_id: history_id() });
    hub.emit(TelemetryEvent::BridgeSpawn { pid: 7 });
    let event = sub.recv().await.expect("event");
    assert_eq!(event.category(), TelemetryCategory::Bridge);
}

#[tokio::test]
async fn ring_buffer_caps_recent_at_configured_size() {
    let hub = TelemetryHub::new(3, 10);
    for _ in 0..5 {
        hub.emit(TelemetryEvent::SchedulerQueued { history_id: history_id() });
    }
    assert_eq!(hub.recent(TelemetryCategory::Scheduler).len(), 3);
}

#[test]
fn emitted_counter_counts_every_emission_regardless_of_ring_capacity() {
    let hub = TelemetryHub::new(2, 10);
    for _ in 0..5 {
        hub.emit(TelemetryEvent::BridgeHealth { state: BridgeState::Running });
    }
    assert_eq!(hub.emitted_count(TelemetryCategory::Bridge), 5);
    assert_eq!(hub.recent(TelemetryCategory::Bridge).len(), 2);
}

#[test]
fn percentiles_reflect_only_latency_carrying_events() {
    let hub = TelemetryHub::with_defaults();
    hub.emit(TelemetryEvent::SchedulerQueued { history_id: history_id() });
    for ms in [10, 20, 30, 40, 50] {
        hub.emit(TelemetryEvent::SchedulerComplete { history_id: history_id(), duration_ms: ms });
    }
    let p = hub.percentiles(TelemetryCategory::Scheduler);
    assert_eq!(p.p50, 30);
}

#[tokio::test]
async fn lagging_subscriber_drops_are_counted_and_recv_continues() {
    let hub = TelemetryHub::new(100, 100);
    let mut sub = hub.subscribe(TelemetryCategory::Scheduler);
    // CHANNEL_CAPACITY is 512; overflow it so the receiver lags.
    for _ in 0..600 {
        hub.emit(TelemetryEvent::SchedulerQueued { history_id: history_id() });
    }
    let event = tokio::time::timeout(Duration::from_secs(1), sub.recv())
        .await
        .expect("recv did not hang")
        .expect("an event survives past the lag");
    assert_eq!(event.category(), TelemetryCategory::Scheduler);
    assert!(hub.dropped_count(TelemetryCategory::Scheduler) > 0);
}

#[test]
fn stats_bundles_emitted_dropped_and_latency() {
    let hub = TelemetryHub::with_defaults();
    hub.emit(TelemetryEvent::SchedulerComplete { history_id: history_id(), duration_ms: 99 });
    let stats = hub.stats(TelemetryCategory::Scheduler);
    assert_eq!(stats.emitted, 1);
    assert_eq!(stats.dropped, 0);
    assert_eq!(stats.latency.p50, 99);
}
