// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::api::test_support::test_state;
use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use tower::ServiceExt;

#[tokio::test]
async fn create_then_list_round_trips() {
    let (state, _dir) = test_state().await;
    let app = router().with_state(state);

    let body = serde_json::json!({"name": "demo", "description": "a demo project"}).to_string();
    let request = Request::builder()
        .method("POST")
        .uri("/projects")
        .header("content-type", "application/json")
        .body(Body::from(body))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let created: ProjectDto = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(created.name, "demo");

    let request = Request::builder().uri("/projects").body(Body::empty()).unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let projects: Vec<ProjectDto> = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(projects.len(), 1);
}

#[tokio::test]
async fn create_with_blank_name_is_rejected() {
    let (state, _dir) = test_state().await;
    let app = router().with_state(state);
    let body = serde_json::json!({"name": "   "}).to_string();
    let request = Request::builder()
        .method("POST")
        .uri("/projects")
        .header("content-type", "application/json")
        .body(Body::from(body))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn create_with_malformed_json_returns_uniform_error_body() {
    let (state, _dir) = test_state().await;
    let app = router().with_state(state);
    let request = Request::builder()
        .method("POST")
        .uri("/projects")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["error"], "invalid_argument");
}

#[tokio::test]
async fn detail_of_unknown_project_is_404() {
    let (state, _dir) = test_state().await;
    let app = router().with_state(state);
    let request = Request::builder().uri("/projects/000000000000").body(Body::empty()).unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn delete_removes_the_project_and_its_asset_directory() {
    let (state, _dir) = test_state().await;
    let now = 0;
    let project = state.store.create_project("demo", "", now).unwrap();
    state.assets.write(project.id.as_str(), "out.png", b"bytes", false).await.unwrap();
    let app = router().with_state(state.clone());

    let request = Request::builder()
        .method("DELETE")
        .uri(format!("/projects/{}", project.id))
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(state.store.get_project(&project.id).unwrap().is_none());
    assert!(!state.assets.root().join(project.id.as_str()).exists());
}
