// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use forge3d_core::{GenerationKind, HistoryId};

use super::*;

fn handle() -> Arc<SessionHandle> {
    SessionHandle::new(HistoryId::new(), None, GenerationKind::Image, 1_000)
}

#[test]
fn insert_and_get_round_trips() {
    let registry = SessionRegistry::new(4);
    let handle = handle();
    registry.insert(handle.clone());
    let fetched = registry.get(handle.id()).unwrap();
    assert_eq!(fetched.id(), handle.id());
}

#[test]
fn get_returns_none_for_unknown_id() {
    let registry = SessionRegistry::new(4);
    assert!(registry.get(&forge3d_core::SessionId::new()).is_none());
}

#[test]
fn get_by_history_id_finds_the_owning_session() {
    let registry = SessionRegistry::new(4);
    let handle = handle();
    registry.insert(handle.clone());
    let fetched = registry.get_by_history_id(handle.history_id()).unwrap();
    assert_eq!(fetched.id(), handle.id());
}

#[test]
fn get_by_history_id_returns_none_for_unknown_id() {
    let registry = SessionRegistry::new(4);
    assert!(registry.get_by_history_id(&HistoryId::new()).is_none());
}

#[test]
fn evicts_oldest_once_capacity_exceeded() {
    let registry = SessionRegistry::new(2);
    let first = handle();
    let second = handle();
    let third = handle();
    registry.insert(first.clone());
    registry.insert(second.clone());
    registry.insert(third.clone());

    assert_eq!(registry.len(), 2);
    assert!(registry.get(first.id()).is_none());
    assert!(registry.get(second.id()).is_some());
    assert!(registry.get(third.id()).is_some());
}

#[test]
fn recent_orders_most_recently_inserted_first() {
    let registry = SessionRegistry::new(10);
    let first = handle();
    let second = handle();
    let third = handle();
    registry.insert(first.clone());
    registry.insert(second.clone());
    registry.insert(third.clone());

    let recent = registry.recent();
    assert_eq!(recent[0].id(), third.id());
    assert_eq!(recent[1].id(), second.id());
    assert_eq!(recent[2].id(), first.id());
}

#[test]
fn recent_caps_at_summary_limit() {
    let registry = SessionRegistry::new(DEFAULT_CAPACITY);
    for _ in 0..(SUMMARY_LIMIT + 10) {
        registry.insert(handle());
    }
    assert_eq!(registry.recent().len(), SUMMARY_LIMIT);
}

#[test]
fn is_empty_reflects_len() {
    let registry = SessionRegistry::new(4);
    assert!(registry.is_empty());
    registry.insert(handle());
    assert!(!registry.is_empty());
}

#[test]
fn with_default_capacity_uses_default_constant() {
    let registry = SessionRegistry::with_default_capacity();
    for _ in 0..(DEFAULT_CAPACITY + 5) {
        registry.insert(handle());
    }
    assert_eq!(registry.len(), DEFAULT_CAPACITY);
}
