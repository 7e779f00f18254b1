// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn complete_and_failed_are_terminal() {
    assert!(SessionState::Complete.is_terminal());
    assert!(SessionState::Failed { error: "x".into() }.is_terminal());
    assert!(!SessionState::Idle.is_terminal());
    assert!(!SessionState::GeneratingImage.is_terminal());
}

#[test]
fn generating_states_are_running() {
    assert!(SessionState::GeneratingImage.is_running());
    assert!(SessionState::GeneratingMesh.is_running());
    assert!(!SessionState::Idle.is_running());
    assert!(!SessionState::Complete.is_running());
}

#[test]
fn kind_strips_error_payload() {
    let failed = SessionState::Failed { error: "cancelled".into() };
    assert_eq!(SessionStateKind::from(&failed), SessionStateKind::Failed);
    assert_eq!(SessionStateKind::Failed.to_string(), "failed");
}
