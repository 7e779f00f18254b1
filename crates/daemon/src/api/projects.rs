// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `/projects` and `/projects/{id}` and `/projects/{id}/assets`.

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use forge3d_core::{Clock, Error, ProjectId};
use serde::Deserialize;

use crate::api::dto::{AssetDto, ProjectDetailDto, ProjectDto};
use crate::api::error::ApiError;
use crate::app::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/projects", get(list).post(create))
        .route("/projects/:id", get(detail).delete(remove))
        .route("/projects/:id/assets", get(assets))
}

#[derive(Debug, Deserialize)]
struct CreateProjectBody {
    name: String,
    #[serde(default)]
    description: String,
}

async fn list(State(state): State<AppState>) -> Result<Json<Vec<ProjectDto>>, ApiError> {
    let projects = state.store.list_projects()?;
    Ok(Json(projects.iter().map(ProjectDto::from).collect()))
}

async fn create(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<(axum::http::StatusCode, Json<ProjectDto>), ApiError> {
    let body: CreateProjectBody =
        serde_json::from_slice(&body).map_err(|e| Error::InvalidArgument(format!("invalid JSON body: {e}")))?;
    if body.name.trim().is_empty() {
        return Err(Error::InvalidArgument("project name must not be empty".to_string()).into());
    }
    let now = state.clock.epoch_ms() as i64;
    let project = state.store.create_project(&body.name, &body.description, now)?;
    Ok((axum::http::StatusCode::CREATED, Json(ProjectDto::from(&project))))
}

async fn detail(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ProjectDetailDto>, ApiError> {
    let project_id = ProjectId::from_string(&id);
    let project = state
        .store
        .get_project(&project_id)?
        .ok_or_else(|| Error::NotFound(format!("project {id} not found")))?;
    let assets = state.store.list_assets(&project_id)?;
    Ok(Json(ProjectDetailDto {
        project: ProjectDto::from(&project),
        assets: assets.iter().map(AssetDto::from).collect(),
    }))
}

async fn remove(State(state): State<AppState>, Path(id): Path<String>) -> Result<(), ApiError> {
    let project_id = ProjectId::from_string(&id);
    state
        .store
        .get_project(&project_id)?
        .ok_or_else(|| Error::NotFound(format!("project {id} not found")))?;
    // Remove files before the row so a crash between the two never orphans
    // asset bytes with no owning project to clean them up later.
    state.assets.remove_project_dir(project_id.as_str()).await?;
    state.store.delete_project(&project_id)?;
    Ok(())
}

async fn assets(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<AssetDto>>, ApiError> {
    let project_id = ProjectId::from_string(&id);
    state
        .store
        .get_project(&project_id)?
        .ok_or_else(|| Error::NotFound(format!("project {id} not found")))?;
    let assets = state.store.list_assets(&project_id)?;
    Ok(Json(assets.iter().map(AssetDto::from).collect()))
}

#[cfg(test)]
#[path = "projects_tests.rs"]
mod tests;
