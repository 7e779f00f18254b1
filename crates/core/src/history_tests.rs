// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

fn base_entry(status: HistoryStatus, completed_at_ms: Option<i64>) -> HistoryEntry {
    HistoryEntry {
        id: HistoryId::new(),
        asset_id: None,
        project_id: None,
        kind: GenerationKind::Image,
        prompt: Some("a red fox".into()),
        status,
        generation_time_seconds: None,
        vram_usage_mb: None,
        error_message: None,
        metadata: serde_json::json!({}),
        created_at_ms: 0,
        completed_at_ms,
    }
}

#[test]
fn oversized_prompt_is_rejected() {
    let prompt = "x".repeat(PROMPT_MAX_BYTES + 1);
    assert!(HistoryEntry::validate_prompt(&prompt).is_err());
}

#[test]
fn completion_timestamp_required_for_terminal_states() {
    assert!(base_entry(HistoryStatus::Complete, Some(1)).completion_timestamp_is_consistent());
    assert!(!base_entry(HistoryStatus::Complete, None).completion_timestamp_is_consistent());
    assert!(!base_entry(HistoryStatus::Failed, None).completion_timestamp_is_consistent());
}

#[test]
fn completion_timestamp_forbidden_for_non_terminal_states() {
    assert!(base_entry(HistoryStatus::Queued, None).completion_timestamp_is_consistent());
    assert!(!base_entry(HistoryStatus::Queued, Some(1)).completion_timestamp_is_consistent());
    assert!(base_entry(HistoryStatus::Processing, None).completion_timestamp_is_consistent());
}
