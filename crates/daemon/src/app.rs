// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared application state and router assembly for the HTTP API surface.
//! Every handler in [`crate::api`] reaches the rest of the system only
//! through an [`AppState`] clone — no global singletons (see the distilled
//! spec's design note "Singleton global state -> explicit wiring").

use std::sync::Arc;
use std::time::Duration;

use axum::http::{HeaderValue, Method};
use axum::Router;
use forge3d_assets::AssetStore;
use forge3d_bridge::InferenceBridge;
use forge3d_core::SystemClock;
use forge3d_scheduler::Scheduler;
use forge3d_session::SessionRegistry;
use forge3d_store::Store;
use forge3d_telemetry::TelemetryHub;
use tower_http::cors::CorsLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

/// The clock implementation wired through every component at runtime.
/// Tests substitute [`forge3d_core::FakeClock`] by constructing the
/// scheduler/session generics directly rather than through this alias.
pub type SharedClock = SystemClock;

/// Maximum accepted request body, at the transport layer: the larger of
/// the two per-content-type caps (20 MiB image). The tighter 1 MiB JSON
/// cap is enforced in `api::generate` once the content type is known.
pub const MAX_BODY_BYTES: usize = 20 * 1024 * 1024;

/// Maximum JSON body accepted by any endpoint.
pub const MAX_JSON_BYTES: usize = 1024 * 1024;

/// Maximum raw image upload accepted by `POST /generate`.
pub const MAX_IMAGE_BYTES: usize = 20 * 1024 * 1024;

/// Handles shared across every HTTP request. Cheap to clone — every field
/// is itself a cheaply-cloneable handle.
#[derive(Clone)]
pub struct AppState {
    pub store: Store,
    pub assets: AssetStore,
    pub bridge: Arc<InferenceBridge>,
    pub telemetry: TelemetryHub,
    pub scheduler: Arc<Scheduler<SharedClock>>,
    pub sessions: Arc<SessionRegistry>,
    pub clock: SharedClock,
}

/// Build the full router: every endpoint nested under `/api/forge3d`,
/// wrapped with request tracing, a localhost CORS policy, and the
/// transport-level body size cap.
pub fn build_router(state: AppState) -> Router {
    let api = Router::new()
        .merge(crate::api::generate::router())
        .merge(crate::api::sessions::router())
        .merge(crate::api::projects::router())
        .merge(crate::api::assets::router())
        .merge(crate::api::history::router())
        .merge(crate::api::stats::router())
        .merge(crate::api::bridge::router())
        .merge(crate::api::queue::router())
        .merge(crate::api::metrics::router())
        .with_state(state);

    Router::new()
        .nest("/api/forge3d", api)
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(localhost_cors())
        .layer(TraceLayer::new_for_http())
}

/// Localhost-only CORS: the orchestrator is explicitly out of scope for
/// remote network exposure, so the allowed origins are fixed to loopback
/// rather than configurable.
fn localhost_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_origin([
            HeaderValue::from_static("http://localhost"),
            HeaderValue::from_static("http://127.0.0.1"),
        ])
        .max_age(Duration::from_secs(3600))
}
