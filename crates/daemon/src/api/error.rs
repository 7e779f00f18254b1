// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Maps [`forge3d_core::Error`] onto the uniform `{error, message, errorId?}`
//! HTTP body every endpoint shares. 500-class failures get a fresh
//! correlation id logged alongside the `tracing::error!` line so an
//! operator can find the matching log entry from the response alone.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use forge3d_core::{Error, ErrorId};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: &'static str,
    pub message: String,
    #[serde(rename = "errorId", skip_serializing_if = "Option::is_none")]
    pub error_id: Option<String>,
}

/// Wraps a [`forge3d_core::Error`] for use as a handler's `Err` type —
/// `?` on any fallible call inside a handler converts automatically.
pub struct ApiError(pub Error);

impl From<Error> for ApiError {
    fn from(e: Error) -> Self {
        Self(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let err = self.0;
        let status = StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let error_id = if status.is_server_error() {
            let id = ErrorId::new();
            tracing::error!(error_id = %id, error = %err, "request failed with a server error");
            Some(id.to_string())
        } else {
            None
        };
        let body = ErrorBody { error: err.kind_tag(), message: err.to_string(), error_id };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
