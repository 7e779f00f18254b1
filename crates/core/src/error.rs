// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared error taxonomy.
//!
//! One enum, used by every crate in the workspace, so the HTTP layer in
//! `forge3d-daemon` can map any failure to the uniform `{error, message,
//! errorId?}` body without each crate inventing its own error-to-status
//! translation.

use thiserror::Error;

crate::define_id! {
    /// Correlation id attached to a 500-class error's log line and
    /// returned to the caller in the uniform error body's `errorId`
    /// field, so an operator can find the matching log entry without a
    /// stack trace leaving the process.
    pub struct ErrorId;
}

/// The kinds of failure the orchestrator can produce.
///
/// Variant names are the wire `error` tag (see [`Error::kind_tag`]).
#[derive(Debug, Error)]
pub enum Error {
    /// Request failed validation (empty name, unknown enum value, missing
    /// field, body too large for the *non-image* 1 MiB JSON cap).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Addressed entity does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// Request is well-formed but not valid given current state (e.g.
    /// cancelling a job that is already processing and racing completion).
    #[error("conflict: {0}")]
    Conflict(String),

    /// Store write contention persisted past the bounded busy-wait.
    #[error("store busy: {0}")]
    Busy(String),

    /// The inference bridge is not in a state that can serve requests.
    #[error("bridge unavailable: {0}")]
    BridgeUnavailable(String),

    /// Request body exceeded a size cap (1 MiB JSON / 20 MiB image).
    #[error("payload too large: {0}")]
    PayloadTooLarge(String),

    /// A bridge call exceeded its deadline.
    #[error("timeout: {0}")]
    Timeout(String),

    /// AssetStore rejected a path. Indicates a bug in the caller, not a
    /// user error — logged as an error and returned as 500.
    #[error("path violation: {0}")]
    PathViolation(String),

    /// Unrecoverable failure. The process should abort after logging a
    /// crash report.
    #[error("fatal: {0}")]
    Fatal(String),
}

impl Error {
    /// HTTP status code for this error kind.
    pub fn status_code(&self) -> u16 {
        match self {
            Error::InvalidArgument(_) => 400,
            Error::NotFound(_) => 404,
            Error::Conflict(_) => 400,
            Error::Busy(_) => 503,
            Error::BridgeUnavailable(_) => 503,
            Error::PayloadTooLarge(_) => 413,
            Error::Timeout(_) => 504,
            Error::PathViolation(_) => 500,
            Error::Fatal(_) => 500,
        }
    }

    /// The `error` field of the uniform error body.
    pub fn kind_tag(&self) -> &'static str {
        match self {
            Error::InvalidArgument(_) => "invalid_argument",
            Error::NotFound(_) => "not_found",
            Error::Conflict(_) => "conflict",
            Error::Busy(_) => "busy",
            Error::BridgeUnavailable(_) => "bridge_unavailable",
            Error::PayloadTooLarge(_) => "payload_too_large",
            Error::Timeout(_) => "timeout",
            Error::PathViolation(_) => "path_violation",
            Error::Fatal(_) => "fatal",
        }
    }

    /// Whether this error class should abort the host process.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Error::Fatal(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
