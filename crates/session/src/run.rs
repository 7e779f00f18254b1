// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Drives one [`GenerationRequest`] to a terminal `SessionState`, updating
//! the shared handle as it goes and persisting the outcome to the Store
//! (and, if the request carries a `project_id`, the AssetStore).

use std::sync::Arc;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use bytes::Bytes;
use forge3d_assets::AssetStore;
use forge3d_bridge::{
    GenerateFullRequest, GenerateImageRequest, GenerateMeshRequest, InferenceBridge,
};
use forge3d_core::{
    Clock, Error, GenerationKind, Progress, SessionState, Stage, TelemetryEvent,
};
use forge3d_store::{HistoryUpdate, Store};
use forge3d_telemetry::TelemetryHub;
use serde_json::Value;
use tokio_util::sync::CancellationToken;

use crate::handle::SessionHandle;
use crate::request::GenerationRequest;

/// Dependencies threaded through one Session's run. Cheap to clone — every
/// field is itself a cheaply-cloneable handle.
#[derive(Clone)]
pub struct SessionDeps<C: Clock> {
    pub bridge: Arc<InferenceBridge>,
    pub store: Store,
    pub assets: AssetStore,
    pub telemetry: TelemetryHub,
    pub clock: C,
}

struct Produced {
    image_bytes: Option<Bytes>,
    mesh_bytes: Option<Bytes>,
    metadata: Value,
}

/// Drive `request` to a terminal state. Never panics on a failed
/// generation — every failure path folds into `SessionState::Failed` plus
/// the corresponding history row update; a Session is write-once per run.
pub async fn run<C: Clock>(handle: Arc<SessionHandle>, request: GenerationRequest, deps: SessionDeps<C>) {
    let start = deps.clock.now();
    let cancel = handle.cancellation_token();

    let result = match &request {
        GenerationRequest::Mesh { image_bytes, options } => {
            handle.set_state(SessionState::GeneratingMesh);
            run_mesh_stage(&handle, &deps, &cancel, image_bytes.clone(), options.clone()).await
        }
        GenerationRequest::Image { prompt, options } => {
            handle.set_state(SessionState::GeneratingImage);
            run_image_stage(&handle, &deps, &cancel, prompt.clone(), options.clone()).await
        }
        GenerationRequest::Full { prompt, options } => {
            handle.set_state(SessionState::GeneratingImage);
            run_full_stage(&handle, &deps, &cancel, prompt.clone(), options.clone()).await
        }
    };

    finalize(&handle, &request, &deps, start, result).await;
}

async fn run_image_stage<C: Clock>(
    handle: &Arc<SessionHandle>,
    deps: &SessionDeps<C>,
    cancel: &CancellationToken,
    prompt: String,
    options: Option<Value>,
) -> Result<Produced, String> {
    emit_progress(handle, deps, Stage::Image, 0);
    if handle.is_cancelled() {
        return Err(handle.cancel_reason());
    }
    let client = deps.bridge.client().map_err(bridge_error_message)?;
    let req = GenerateImageRequest { prompt, options };
    let timeout = deps.bridge.single_stage_timeout();
    let outcome = tokio::select! {
        biased;
        _ = cancel.cancelled() => return Err(handle.cancel_reason()),
        r = client.generate_image(req, timeout) => r,
    };
    emit_progress(handle, deps, Stage::Image, 100);
    let resp = outcome.map_err(bridge_error_message)?;
    let image_bytes = decode_base64(&resp.image_base64);
    Ok(Produced { image_bytes: Some(image_bytes), mesh_bytes: None, metadata: resp.metadata })
}

async fn run_mesh_stage<C: Clock>(
    handle: &Arc<SessionHandle>,
    deps: &SessionDeps<C>,
    cancel: &CancellationToken,
    image_bytes: Bytes,
    options: Option<Value>,
) -> Result<Produced, String> {
    emit_progress(handle, deps, Stage::Mesh, 0);
    if handle.is_cancelled() {
        return Err(handle.cancel_reason());
    }
    let client = deps.bridge.client().map_err(bridge_error_message)?;
    let req = GenerateMeshRequest { image_base64: BASE64.encode(&image_bytes), options };
    let timeout = deps.bridge.single_stage_timeout();
    let outcome = tokio::select! {
        biased;
        _ = cancel.cancelled() => return Err(handle.cancel_reason()),
        r = client.generate_mesh(req, timeout) => r,
    };
    emit_progress(handle, deps, Stage::Mesh, 100);
    let resp = outcome.map_err(bridge_error_message)?;
    let mesh_bytes = decode_base64(&resp.mesh_base64);
    Ok(Produced { image_bytes: None, mesh_bytes: Some(mesh_bytes), metadata: resp.metadata })
}

/// `full` runs as one serialized RPC against the bridge (the glossary's
/// "full pipeline": text -> image -> mesh as one unit), using the longer
/// `full_timeout_s` budget rather than chaining two single-stage calls.
/// Progress still crosses the `generating_image -> generating_mesh`
/// boundary even though the worker reports both results from one call.
async fn run_full_stage<C: Clock>(
    handle: &Arc<SessionHandle>,
    deps: &SessionDeps<C>,
    cancel: &CancellationToken,
    prompt: String,
    options: Option<Value>,
) -> Result<Produced, String> {
    emit_progress(handle, deps, Stage::Image, 0);
    if handle.is_cancelled() {
        return Err(handle.cancel_reason());
    }
    let client = deps.bridge.client().map_err(bridge_error_message)?;
    let req = GenerateFullRequest { prompt, options };
    let timeout = deps.bridge.full_timeout();
    let outcome = tokio::select! {
        biased;
        _ = cancel.cancelled() => return Err(handle.cancel_reason()),
        r = client.generate_full(req, timeout) => r,
    };
    emit_progress(handle, deps, Stage::Image, 100);
    handle.set_state(SessionState::GeneratingMesh);
    emit_progress(handle, deps, Stage::Mesh, 0);
    let resp = outcome.map_err(bridge_error_message)?;
    emit_progress(handle, deps, Stage::Mesh, 100);
    Ok(Produced {
        image_bytes: Some(decode_base64(&resp.image_base64)),
        mesh_bytes: Some(decode_base64(&resp.mesh_base64)),
        metadata: resp.metadata,
    })
}

fn decode_base64(s: &str) -> Bytes {
    BASE64.decode(s).map(Bytes::from).unwrap_or_default()
}

fn bridge_error_message(e: Error) -> String {
    match e {
        Error::BridgeUnavailable(_) => forge3d_core::BRIDGE_CRASH_ERROR_MESSAGE.to_string(),
        Error::Timeout(msg) => msg,
        other => other.to_string(),
    }
}

fn vram_usage_mb(metadata: &Value) -> Option<f64> {
    metadata.get("vram_usage_mb").and_then(|v| v.as_f64())
}

fn emit_progress<C: Clock>(handle: &Arc<SessionHandle>, deps: &SessionDeps<C>, stage: Stage, percent: u8) {
    let progress = Progress { stage, percent };
    handle.set_progress(progress);
    deps.telemetry.emit(TelemetryEvent::SchedulerProgress {
        history_id: *handle.history_id(),
        stage,
        percent,
    });
}

async fn finalize<C: Clock>(
    handle: &Arc<SessionHandle>,
    request: &GenerationRequest,
    deps: &SessionDeps<C>,
    start: std::time::Instant,
    result: Result<Produced, String>,
) {
    let generation_time_seconds = deps.clock.now().saturating_duration_since(start).as_secs_f64();
    let completed_at_ms = deps.clock.epoch_ms() as i64;
    let history_id = *handle.history_id();

    match result {
        Ok(produced) => {
            let vram = vram_usage_mb(&produced.metadata);
            let asset_id = match handle.project_id() {
                Some(project_id) => {
                    match persist_asset(deps, project_id, &history_id, request.kind(), &produced).await {
                        Ok(id) => Some(id),
                        Err(e) => {
                            fail(handle, deps, &history_id, generation_time_seconds, completed_at_ms, e.to_string())
                                .await;
                            return;
                        }
                    }
                }
                None => {
                    let bytes = produced.mesh_bytes.clone().or_else(|| produced.image_bytes.clone());
                    if let Some(bytes) = bytes {
                        handle.store_in_memory_result(bytes);
                    }
                    None
                }
            };

            let update = HistoryUpdate {
                status: Some(forge3d_core::HistoryStatus::Complete),
                asset_id,
                generation_time_seconds: Some(generation_time_seconds),
                vram_usage_mb: vram,
                error_message: None,
                completed_at_ms: Some(completed_at_ms),
            };
            if let Err(e) = deps.store.update_history_status(&history_id, update) {
                tracing::error!(error = %e, %history_id, "failed to record completed history entry");
            }
            handle.set_state(SessionState::Complete);
            deps.telemetry.emit(TelemetryEvent::SchedulerComplete {
                history_id,
                duration_ms: (generation_time_seconds * 1000.0) as u64,
            });
        }
        Err(error) => {
            fail(handle, deps, &history_id, generation_time_seconds, completed_at_ms, error).await;
        }
    }
}

async fn fail<C: Clock>(
    handle: &Arc<SessionHandle>,
    deps: &SessionDeps<C>,
    history_id: &forge3d_core::HistoryId,
    generation_time_seconds: f64,
    completed_at_ms: i64,
    error: String,
) {
    let update = HistoryUpdate {
        status: Some(forge3d_core::HistoryStatus::Failed),
        asset_id: None,
        generation_time_seconds: Some(generation_time_seconds),
        vram_usage_mb: None,
        error_message: Some(error.clone()),
        completed_at_ms: Some(completed_at_ms),
    };
    if let Err(e) = deps.store.update_history_status(history_id, update) {
        tracing::error!(error = %e, %history_id, "failed to record failed history entry");
    }
    handle.set_state(SessionState::Failed { error: error.clone() });
    deps.telemetry.emit(TelemetryEvent::SchedulerFailed { history_id: *history_id, error });
}

/// The mesh is the primary deliverable for `mesh` and `full` jobs; for a
/// `full` job the generated image is kept as the asset's thumbnail. An
/// `image` job's output is the main file with no thumbnail.
async fn persist_asset<C: Clock>(
    deps: &SessionDeps<C>,
    project_id: &forge3d_core::ProjectId,
    history_id: &forge3d_core::HistoryId,
    kind: GenerationKind,
    produced: &Produced,
) -> Result<forge3d_core::AssetId, Error> {
    let (main_bytes, main_ext, thumbnail) = match kind {
        GenerationKind::Image => (produced.image_bytes.clone(), "png", None),
        GenerationKind::Mesh => (produced.mesh_bytes.clone(), "glb", None),
        GenerationKind::Full => (produced.mesh_bytes.clone(), "glb", produced.image_bytes.clone()),
    };
    let main_bytes = main_bytes
        .ok_or_else(|| Error::Fatal(format!("{history_id}: generation completed with no output bytes")))?;

    let name = format!("{history_id}.{main_ext}");
    let written = deps.assets.write(project_id.as_str(), &name, &main_bytes, false).await?;

    let thumbnail_path = if let Some(thumb) = thumbnail {
        let thumb_name = format!("{history_id}.thumb.png");
        let thumb_written = deps.assets.write(project_id.as_str(), &thumb_name, &thumb, false).await?;
        Some(thumb_written.path.to_string_lossy().into_owned())
    } else {
        None
    };

    let asset = deps.store.create_asset(
        project_id,
        &name,
        kind,
        &written.path.to_string_lossy(),
        thumbnail_path.as_deref(),
        written.size,
        produced.metadata.clone(),
        deps.clock.epoch_ms() as i64,
    )?;
    Ok(asset.id)
}

#[cfg(test)]
#[path = "run_tests.rs"]
mod tests;
