// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Wire types exchanged with the inference worker process.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Configuration for spawning and supervising the worker process (the
/// `bridge.*` keys of the YAML config).
#[derive(Debug, Clone)]
pub struct BridgeConfig {
    /// Path to the worker binary.
    pub command: String,
    /// Extra arguments passed to the worker on every spawn.
    pub args: Vec<String>,
    /// Candidate listen ports, tried in order on each spawn.
    pub port_range: (u16, u16),
    pub startup_timeout_s: u64,
    pub single_stage_timeout_s: u64,
    pub full_timeout_s: u64,
    pub health_interval_s: u64,
    pub health_failures_to_crash: u32,
    pub restart_budget: u32,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            command: "forge3d-worker".to_string(),
            args: Vec::new(),
            port_range: (8001, 8010),
            startup_timeout_s: 30,
            single_stage_timeout_s: 180,
            full_timeout_s: 360,
            health_interval_s: 10,
            health_failures_to_crash: 3,
            restart_budget: 3,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct GenerateImageRequest {
    pub prompt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<Value>,
}

#[derive(Debug, Clone, Serialize)]
pub struct GenerateMeshRequest {
    /// Base64-encoded image bytes (JSON transport, not multipart).
    pub image_base64: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<Value>,
}

#[derive(Debug, Clone, Serialize)]
pub struct GenerateFullRequest {
    pub prompt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GenerateImageResponse {
    pub image_base64: String,
    #[serde(default)]
    pub metadata: Value,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GenerateMeshResponse {
    pub mesh_base64: String,
    #[serde(default)]
    pub metadata: Value,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GenerateFullResponse {
    pub image_base64: String,
    pub mesh_base64: String,
    #[serde(default)]
    pub metadata: Value,
}
