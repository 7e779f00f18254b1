// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! forge3d-bridge: the `InferenceBridge`. Owns exactly one external
//! GPU inference worker process, forwards typed requests to it, and
//! presents callers a state machine and async RPC surface decoupled from
//! the worker's crash behavior.

mod client;
mod port;
mod supervisor;
mod types;

pub use client::WorkerClient;
pub use supervisor::InferenceBridge;
pub use types::{
    BridgeConfig, GenerateFullRequest, GenerateFullResponse, GenerateImageRequest,
    GenerateImageResponse, GenerateMeshRequest, GenerateMeshResponse,
};
