// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Startup-time failures, distinct from [`forge3d_core::Error`]: these can
//! only happen before the HTTP surface exists, so there is no request to
//! map them onto — `main` logs them, writes a crash report, and exits.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("cannot determine state directory: neither FORGE3D_STATE_DIR, XDG_STATE_HOME, nor HOME is set")]
    NoStateDir,

    #[error("failed to acquire exclusive lock on {0}: {1}")]
    LockFailed(PathBuf, #[source] io::Error),

    #[error("failed to bind HTTP listener on {0}: {1}")]
    BindFailed(String, io::Error),

    #[error("failed to load config from {0}: {1}")]
    Config(PathBuf, #[source] Box<dyn std::error::Error + Send + Sync>),

    #[error(transparent)]
    Io(#[from] io::Error),

    #[error(transparent)]
    Core(#[from] forge3d_core::Error),
}

impl LifecycleError {
    /// Whether this failure is one where another daemon already owns the
    /// state directory — `cleanup_on_failure` must not touch files it
    /// doesn't own in that case.
    pub fn is_lock_conflict(&self) -> bool {
        matches!(self, LifecycleError::LockFailed(..))
    }
}
