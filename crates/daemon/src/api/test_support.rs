// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared `AppState` wiring for handler tests. Every endpoint module's
//! `_tests.rs` builds its own router over a fresh temp-dir-backed store
//! and asset root rather than sharing process-wide state.

use std::sync::Arc;

use forge3d_assets::AssetStore;
use forge3d_bridge::{BridgeConfig, InferenceBridge};
use forge3d_core::{Clock, GenerationKind, HistoryEntry, HistoryId, HistoryStatus, SystemClock};
use forge3d_scheduler::{Scheduler, SchedulerDeps};
use forge3d_session::SessionRegistry;
use forge3d_store::Store;
use forge3d_telemetry::TelemetryHub;

use crate::app::AppState;

pub async fn test_state() -> (AppState, tempfile::TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let store = Store::open(&dir.path().join("forge3d.sqlite3")).unwrap();
    let assets = AssetStore::open(dir.path().join("assets")).await.unwrap();
    let telemetry = TelemetryHub::with_defaults();
    let bridge = Arc::new(InferenceBridge::new(BridgeConfig::default(), telemetry.clone()));
    let sessions = Arc::new(SessionRegistry::with_default_capacity());
    let clock = SystemClock;
    let scheduler = Scheduler::new(SchedulerDeps {
        store: store.clone(),
        assets: assets.clone(),
        bridge: bridge.clone(),
        telemetry: telemetry.clone(),
        sessions: sessions.clone(),
        clock,
    });
    let state = AppState { store, assets, bridge, telemetry, scheduler, sessions, clock };
    (state, dir)
}

/// Records a `queued` history row directly against the store, bypassing
/// `Scheduler::enqueue` — for handler tests that want a job with no live
/// `Session` yet, the way a freshly-enqueued job looks before it is
/// dequeued.
pub fn seed_queued_history(state: &AppState, kind: GenerationKind) -> HistoryEntry {
    let entry = HistoryEntry {
        id: HistoryId::new(),
        asset_id: None,
        project_id: None,
        kind,
        prompt: Some("a queued job".to_string()),
        status: HistoryStatus::Queued,
        generation_time_seconds: None,
        vram_usage_mb: None,
        error_message: None,
        metadata: serde_json::Value::Null,
        created_at_ms: state.clock.epoch_ms() as i64,
        completed_at_ms: None,
    };
    state.store.record_history(&entry).unwrap();
    entry
}
