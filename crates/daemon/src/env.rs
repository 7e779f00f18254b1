// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the daemon crate. Every
//! other runtime knob lives in the YAML config (see [`crate::config`]) —
//! these are the two things that must be known before a config file can
//! even be located.

use std::path::PathBuf;

use crate::error::LifecycleError;

/// Resolve the state directory: `FORGE3D_STATE_DIR` > `XDG_STATE_HOME/forge3d`
/// > `~/.local/state/forge3d`.
pub fn state_dir() -> Result<PathBuf, LifecycleError> {
    if let Ok(dir) = std::env::var("FORGE3D_STATE_DIR") {
        return Ok(PathBuf::from(dir));
    }
    if let Ok(xdg) = std::env::var("XDG_STATE_HOME") {
        return Ok(PathBuf::from(xdg).join("forge3d"));
    }
    let home = std::env::var("HOME").map_err(|_| LifecycleError::NoStateDir)?;
    Ok(PathBuf::from(home).join(".local/state/forge3d"))
}

/// Path to the YAML config file: `FORGE3D_CONFIG` if set, else
/// `<state_dir>/config.yaml` (absent is not an error — [`crate::config::Config::load`]
/// falls back to defaults).
pub fn config_path() -> Result<PathBuf, LifecycleError> {
    if let Ok(path) = std::env::var("FORGE3D_CONFIG") {
        return Ok(PathBuf::from(path));
    }
    Ok(state_dir()?.join("config.yaml"))
}

/// HTTP port override. Takes precedence over the config file's `port` key
/// per the single environment-variable escape hatch.
pub fn port_override() -> Option<u16> {
    std::env::var("FORGE3D_PORT").ok().and_then(|s| s.parse::<u16>().ok())
}
