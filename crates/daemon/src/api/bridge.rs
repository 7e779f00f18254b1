// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `GET /bridge` — current supervisor state plus the most recent
//! health/crash telemetry event.

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use forge3d_core::{BridgeState, TelemetryCategory, TelemetryEvent};
use serde::{Deserialize, Serialize};

use crate::app::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/bridge", get(status))
}

#[derive(Debug, Serialize, Deserialize)]
struct BridgeStatusDto {
    state: BridgeState,
    worker_port: Option<u16>,
    last_health_event: Option<TelemetryEvent>,
}

async fn status(State(state): State<AppState>) -> Json<BridgeStatusDto> {
    let last_health_event = state
        .telemetry
        .recent(TelemetryCategory::Bridge)
        .into_iter()
        .rev()
        .find(|e| matches!(e, TelemetryEvent::BridgeHealth { .. } | TelemetryEvent::BridgeCrash { .. }));

    Json(BridgeStatusDto {
        state: state.bridge.state(),
        worker_port: state.bridge.worker_port(),
        last_health_event,
    })
}

#[cfg(test)]
#[path = "bridge_tests.rs"]
mod tests;
