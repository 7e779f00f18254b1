// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `POST /generate` — enqueue a generation. JSON body for `image`/`full`
//! kinds, or raw bytes with an `image/*` content type for `mesh`.

use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::http::HeaderMap;
use axum::routing::post;
use axum::{Json, Router};
use forge3d_core::{Error, GenerationKind, ProjectId};
use serde::Deserialize;

use crate::api::dto::HistoryDto;
use crate::api::error::ApiError;
use crate::app::{AppState, MAX_IMAGE_BYTES, MAX_JSON_BYTES};

pub fn router() -> Router<AppState> {
    Router::new().route("/generate", post(generate))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateBody {
    #[serde(rename = "type")]
    kind: String,
    prompt: Option<String>,
    project_id: Option<String>,
    options: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct MeshQuery {
    #[serde(rename = "projectId")]
    project_id: Option<String>,
}

async fn generate(
    State(state): State<AppState>,
    Query(query): Query<MeshQuery>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<(axum::http::StatusCode, Json<HistoryDto>), ApiError> {
    let is_image = headers
        .get(axum::http::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|ct| ct.starts_with("image/"))
        .unwrap_or(false);

    let entry = if is_image {
        if body.len() > MAX_IMAGE_BYTES {
            return Err(Error::PayloadTooLarge(format!(
                "image upload exceeds {MAX_IMAGE_BYTES} bytes"
            ))
            .into());
        }
        let project_id = query.project_id.map(ProjectId::from_string);
        state.scheduler.enqueue(GenerationKind::Mesh, project_id, None, Some(body), None)?
    } else {
        if body.len() > MAX_JSON_BYTES {
            return Err(Error::PayloadTooLarge(format!("JSON body exceeds {MAX_JSON_BYTES} bytes")).into());
        }
        let parsed: GenerateBody = serde_json::from_slice(&body)
            .map_err(|e| Error::InvalidArgument(format!("invalid JSON body: {e}")))?;
        let kind = GenerationKind::from_str_loose(&parsed.kind)
            .ok_or_else(|| Error::InvalidArgument(format!("unknown generation type {:?}", parsed.kind)))?;
        if matches!(kind, GenerationKind::Mesh) {
            return Err(Error::InvalidArgument(
                "mesh generation requires a raw image/* body, not JSON".to_string(),
            )
            .into());
        }
        let project_id = parsed.project_id.map(ProjectId::from_string);
        state.scheduler.enqueue(kind, project_id, parsed.prompt, None, parsed.options)?
    };

    Ok((axum::http::StatusCode::ACCEPTED, Json(HistoryDto::from(&entry))))
}

#[cfg(test)]
#[path = "generate_tests.rs"]
mod tests;
