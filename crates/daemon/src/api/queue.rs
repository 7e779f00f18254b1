// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `/queue`, `/queue/pause`, `/queue/resume`, `/queue/{id}`.

use axum::extract::{Path, State};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use forge3d_core::HistoryId;
use forge3d_scheduler::QueueState;

use crate::api::error::ApiError;
use crate::app::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/queue", get(state))
        .route("/queue/pause", post(pause))
        .route("/queue/resume", post(resume))
        .route("/queue/:id", delete(cancel))
}

async fn state(State(state): State<AppState>) -> Result<Json<QueueState>, ApiError> {
    Ok(Json(state.scheduler.queue_state()?))
}

async fn pause(State(state): State<AppState>) -> Json<QueueState> {
    state.scheduler.pause();
    Json(state.scheduler.queue_state().unwrap_or_default())
}

async fn resume(State(state): State<AppState>) -> Json<QueueState> {
    state.scheduler.resume();
    Json(state.scheduler.queue_state().unwrap_or_default())
}

async fn cancel(State(state): State<AppState>, Path(id): Path<String>) -> Result<(), ApiError> {
    let history_id = HistoryId::from_string(&id);
    state.scheduler.cancel(&history_id)?;
    Ok(())
}

#[cfg(test)]
#[path = "queue_tests.rs"]
mod tests;
