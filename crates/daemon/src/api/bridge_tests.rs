// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::api::test_support::test_state;
use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use tower::ServiceExt;

#[tokio::test]
async fn reports_stopped_state_before_any_spawn() {
    let (state, _dir) = test_state().await;
    let app = router().with_state(state);
    let request = Request::builder().uri("/bridge").body(Body::empty()).unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let dto: BridgeStatusDto = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(dto.state, forge3d_core::BridgeState::Stopped);
    assert!(dto.worker_port.is_none());
}
