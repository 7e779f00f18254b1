// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `GET /stats` — aggregate counters across projects, assets, and history.

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use forge3d_store::Stats;

use crate::api::error::ApiError;
use crate::app::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/stats", get(stats))
}

async fn stats(State(state): State<AppState>) -> Result<Json<Stats>, ApiError> {
    Ok(Json(state.store.get_stats()?))
}

#[cfg(test)]
#[path = "stats_tests.rs"]
mod tests;
