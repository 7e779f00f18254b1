// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `DELETE /assets/{id}`.

use std::path::Path as FsPath;

use axum::extract::{Path, State};
use axum::routing::delete;
use axum::Router;
use forge3d_core::{AssetId, Error};

use crate::api::error::ApiError;
use crate::app::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/assets/:id", delete(remove))
}

async fn remove(State(state): State<AppState>, Path(id): Path<String>) -> Result<(), ApiError> {
    let asset_id = AssetId::from_string(&id);
    let asset = state
        .store
        .get_asset(&asset_id)?
        .ok_or_else(|| Error::NotFound(format!("asset {id} not found")))?;
    state.assets.delete(FsPath::new(&asset.file_path)).await?;
    if let Some(thumb) = &asset.thumbnail_path {
        state.assets.delete(FsPath::new(thumb)).await?;
    }
    state.store.delete_asset(&asset_id)?;
    Ok(())
}

#[cfg(test)]
#[path = "assets_tests.rs"]
mod tests;
