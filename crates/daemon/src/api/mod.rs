// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! HTTP handlers. Each sub-module owns one resource and exposes a
//! `router() -> Router<AppState>` that [`crate::app::build_router`] merges
//! under `/api/forge3d`.

pub mod assets;
pub mod bridge;
pub mod dto;
pub mod error;
pub mod generate;
pub mod history;
pub mod metrics;
pub mod projects;
pub mod queue;
pub mod sessions;
pub mod stats;

#[cfg(test)]
pub(crate) mod test_support;

pub use error::ApiError;
