// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! YAML configuration. A missing config file is not an error — every
//! field defaults to a value that lets the daemon boot and serve requests
//! (the worker binary itself still has to exist on `$PATH`, or exist at
//! the `bridge.command` path given).
//!
//! `FORGE3D_PORT` is the one environment-variable escape hatch; every
//! other runtime knob lives here.

use std::path::{Path, PathBuf};

use forge3d_bridge::BridgeConfig;
use serde::Deserialize;

use crate::error::LifecycleError;

fn default_port() -> u16 {
    4735
}

fn default_asset_root() -> PathBuf {
    PathBuf::from("assets")
}

fn default_store_path() -> PathBuf {
    PathBuf::from("store.db")
}

/// The `bridge.*` config keys — mirrors [`forge3d_bridge::BridgeConfig`]'s
/// own defaults field for field so a missing `bridge:` block in the YAML
/// boots exactly as if it had been spelled out in full.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BridgeSettings {
    pub command: String,
    pub args: Vec<String>,
    pub port_range: (u16, u16),
    pub startup_timeout_s: u64,
    pub single_stage_timeout_s: u64,
    pub full_timeout_s: u64,
    pub health_interval_s: u64,
    pub health_failures_to_crash: u32,
    pub restart_budget: u32,
}

impl Default for BridgeSettings {
    fn default() -> Self {
        let defaults = BridgeConfig::default();
        Self {
            command: defaults.command,
            args: defaults.args,
            port_range: defaults.port_range,
            startup_timeout_s: defaults.startup_timeout_s,
            single_stage_timeout_s: defaults.single_stage_timeout_s,
            full_timeout_s: defaults.full_timeout_s,
            health_interval_s: defaults.health_interval_s,
            health_failures_to_crash: defaults.health_failures_to_crash,
            restart_budget: defaults.restart_budget,
        }
    }
}

impl From<BridgeSettings> for BridgeConfig {
    fn from(s: BridgeSettings) -> Self {
        Self {
            command: s.command,
            args: s.args,
            port_range: s.port_range,
            startup_timeout_s: s.startup_timeout_s,
            single_stage_timeout_s: s.single_stage_timeout_s,
            full_timeout_s: s.full_timeout_s,
            health_interval_s: s.health_interval_s,
            health_failures_to_crash: s.health_failures_to_crash,
            restart_budget: s.restart_budget,
        }
    }
}

/// The `telemetry.*` config keys.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct TelemetrySettings {
    pub ring_size: usize,
    pub latency_window: usize,
}

impl Default for TelemetrySettings {
    fn default() -> Self {
        Self { ring_size: 100, latency_window: 1000 }
    }
}

/// Top-level daemon configuration, loaded from YAML with every field
/// defaulted.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub port: u16,
    pub asset_root: PathBuf,
    pub store_path: PathBuf,
    pub bridge: BridgeSettings,
    pub telemetry: TelemetrySettings,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: default_port(),
            asset_root: default_asset_root(),
            store_path: default_store_path(),
            bridge: BridgeSettings::default(),
            telemetry: TelemetrySettings::default(),
        }
    }
}

impl Config {
    /// Load from `path`; a missing file falls back to `Config::default()`
    /// entirely. `FORGE3D_PORT`, if set, overrides whatever `port` value
    /// was loaded.
    pub fn load(path: &Path) -> Result<Self, LifecycleError> {
        let mut config = match std::fs::read_to_string(path) {
            Ok(text) => serde_yaml::from_str(&text)
                .map_err(|e| LifecycleError::Config(path.to_path_buf(), Box::new(e)))?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Config::default(),
            Err(e) => return Err(LifecycleError::Config(path.to_path_buf(), Box::new(e))),
        };
        if let Some(port) = crate::env::port_override() {
            config.port = port;
        }
        Ok(config)
    }

    /// `asset_root`, resolved against `state_dir` if given as a relative
    /// path (the common case: the default `"assets"`).
    pub fn resolved_asset_root(&self, state_dir: &Path) -> PathBuf {
        if self.asset_root.is_absolute() {
            self.asset_root.clone()
        } else {
            state_dir.join(&self.asset_root)
        }
    }

    /// `store_path`, resolved against `state_dir` if given as a relative
    /// path.
    pub fn resolved_store_path(&self, state_dir: &Path) -> PathBuf {
        if self.store_path.is_absolute() {
            self.store_path.clone()
        } else {
            state_dir.join(&self.store_path)
        }
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
