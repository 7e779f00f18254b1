// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `GET /history` — filtered by `projectId`, `status`, `type`, `limit`.

use axum::extract::{Query, State};
use axum::routing::get;
use axum::{Json, Router};
use forge3d_core::{Error, GenerationKind, HistoryFilter, HistoryStatus, ProjectId};
use serde::Deserialize;

use crate::api::dto::HistoryDto;
use crate::api::error::ApiError;
use crate::app::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/history", get(list))
}

#[derive(Debug, Deserialize)]
struct HistoryQuery {
    #[serde(rename = "projectId")]
    project_id: Option<String>,
    status: Option<String>,
    #[serde(rename = "type")]
    kind: Option<String>,
    limit: Option<u32>,
}

async fn list(
    State(state): State<AppState>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<Vec<HistoryDto>>, ApiError> {
    let status = query
        .status
        .as_deref()
        .map(|s| {
            HistoryStatus::from_str_loose(s).ok_or_else(|| Error::InvalidArgument(format!("unknown status {s:?}")))
        })
        .transpose()?;
    let kind = query
        .kind
        .as_deref()
        .map(|k| {
            GenerationKind::from_str_loose(k).ok_or_else(|| Error::InvalidArgument(format!("unknown type {k:?}")))
        })
        .transpose()?;

    let filter = HistoryFilter {
        project_id: query.project_id.map(ProjectId::from_string),
        status,
        kind,
        limit: query.limit,
    };
    let entries = state.store.list_history(&filter)?;
    Ok(Json(entries.iter().map(HistoryDto::from).collect()))
}

#[cfg(test)]
#[path = "history_tests.rs"]
mod tests;
