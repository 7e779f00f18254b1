// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! forge3d-telemetry: the in-process event bus (`TelemetryHub`).
//!
//! Subscribers are backed by `tokio::sync::broadcast`: its built-in
//! lagged-receiver signal is the drop-on-backpressure primitive this bus
//! needs, and [`Subscription::recv`] folds every `Lagged` gap into the
//! per-category dropped-event counter so every drop is itself counted,
//! without emitters ever blocking.

mod hub;
mod percentile;
mod ring;

pub use hub::{Stats, Subscription, TelemetryHub};
pub use percentile::Percentiles;
