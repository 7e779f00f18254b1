// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `GET /status/{id}`, `GET /download/{id}`, `GET /sessions`.

use std::path::Path;

use axum::extract::{Path as PathExtractor, State};
use axum::http::header;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use forge3d_core::{Error, HistoryEntry, HistoryId, HistoryStatus, SessionStateKind};

use crate::api::dto::SessionDto;
use crate::api::error::ApiError;
use crate::app::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/status/:id", get(status))
        .route("/download/:id", get(download))
        .route("/sessions", get(list))
}

/// `/status` and `/download` are addressed by the same `HistoryId` that
/// `POST /generate` returns and `DELETE /queue/{id}` accepts — not the
/// transient `SessionId`, which doesn't exist yet for a still-`queued` job
/// and may already have been evicted from the registry's bounded ring for
/// an old one. Look the live `Session` up first (it has the fine-grained
/// image/mesh stage and progress); fall back to the durable `HistoryEntry`
/// for everything else.
fn find_history(state: &AppState, id: &str) -> Result<HistoryEntry, ApiError> {
    let history_id = HistoryId::from_string(id);
    state
        .store
        .get_history(&history_id)?
        .ok_or_else(|| Error::NotFound(format!("session {id} not found")).into())
}

async fn status(
    State(state): State<AppState>,
    PathExtractor(id): PathExtractor<String>,
) -> Result<Json<SessionDto>, ApiError> {
    let history_id = HistoryId::from_string(&id);
    if let Some(handle) = state.sessions.get_by_history_id(&history_id) {
        return Ok(Json(SessionDto::from(&handle)));
    }
    let history = find_history(&state, &id)?;
    Ok(Json(SessionDto::from(&history)))
}

async fn download(
    State(state): State<AppState>,
    PathExtractor(id): PathExtractor<String>,
) -> Result<impl IntoResponse, ApiError> {
    let history_id = HistoryId::from_string(&id);
    let bytes = if let Some(handle) = state.sessions.get_by_history_id(&history_id) {
        if handle.state_kind() != SessionStateKind::Complete {
            return Err(Error::NotFound(format!("session {id} has no completed result")).into());
        }
        match handle.in_memory_result() {
            Some(bytes) => bytes,
            None => read_persisted_asset(&state, &find_history(&state, &id)?).await?,
        }
    } else {
        let history = find_history(&state, &id)?;
        if history.status != HistoryStatus::Complete {
            return Err(Error::NotFound(format!("session {id} has no completed result")).into());
        }
        read_persisted_asset(&state, &history).await?
    };

    Ok(([(header::CONTENT_TYPE, "application/octet-stream")], bytes))
}

/// Reads the bytes of a completed session's persisted `Asset` back off
/// disk — the only way to serve `/download` once the originating
/// `Session` (which may have held the result only in memory) has been
/// evicted from the registry.
async fn read_persisted_asset(state: &AppState, history: &HistoryEntry) -> Result<bytes::Bytes, ApiError> {
    let asset_id = history
        .asset_id
        .ok_or_else(|| Error::NotFound(format!("session {} has no persisted asset", history.id)))?;
    let asset = state
        .store
        .get_asset(&asset_id)?
        .ok_or_else(|| Error::NotFound(format!("asset {asset_id} not found")))?;
    let data = state.assets.read_path(Path::new(&asset.file_path)).await?;
    Ok(bytes::Bytes::from(data))
}

async fn list(State(state): State<AppState>) -> Json<Vec<SessionDto>> {
    let recent: Vec<SessionDto> = state.sessions.recent().iter().map(SessionDto::from).collect();
    Json(recent)
}

#[cfg(test)]
#[path = "sessions_tests.rs"]
mod tests;
