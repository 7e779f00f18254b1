// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

async fn open_tmp() -> (AssetStore, tempfile::TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let store = AssetStore::open(dir.path().join("assets")).await.unwrap();
    (store, dir)
}

#[tokio::test]
async fn write_then_read_round_trips_bytes() {
    let (store, _dir) = open_tmp().await;
    let written = store.write("proj1", "out.png", b"hello", false).await.unwrap();
    assert_eq!(written.size, 5);
    assert!(written.path.starts_with(store.root()));
    let bytes = store.read("proj1", "out.png").await.unwrap();
    assert_eq!(bytes, b"hello");
}

#[tokio::test]
async fn write_refuses_to_overwrite_without_opt_in() {
    let (store, _dir) = open_tmp().await;
    store.write("proj1", "out.png", b"first", false).await.unwrap();
    let err = store.write("proj1", "out.png", b"second", false).await.unwrap_err();
    assert!(matches!(err, forge3d_core::Error::Conflict(_)));
    assert_eq!(store.read("proj1", "out.png").await.unwrap(), b"first");
}

#[tokio::test]
async fn write_overwrite_opt_in_replaces_contents() {
    let (store, _dir) = open_tmp().await;
    store.write("proj1", "out.png", b"first", false).await.unwrap();
    store.write("proj1", "out.png", b"second", true).await.unwrap();
    assert_eq!(store.read("proj1", "out.png").await.unwrap(), b"second");
}

#[tokio::test]
async fn write_leaves_no_temp_file_behind() {
    let (store, _dir) = open_tmp().await;
    let written = store.write("proj1", "out.png", b"hello", false).await.unwrap();
    let tmp = written.path.with_extension("png.part");
    assert!(!tmp.exists());
}

#[tokio::test]
async fn write_with_traversal_name_stays_under_root() {
    let (store, _dir) = open_tmp().await;
    let written = store.write("proj1", "../../etc/passwd", b"x", false).await.unwrap();
    assert!(written.path.starts_with(store.root()));
    assert!(written.path.exists());
}

#[tokio::test]
async fn delete_is_idempotent() {
    let (store, _dir) = open_tmp().await;
    let written = store.write("proj1", "out.png", b"hello", false).await.unwrap();
    store.delete(&written.path).await.unwrap();
    assert!(!written.path.exists());
    store.delete(&written.path).await.unwrap();
}

#[tokio::test]
async fn delete_rejects_paths_outside_root() {
    let (store, dir) = open_tmp().await;
    let outside = dir.path().join("outside.txt");
    tokio::fs::write(&outside, b"x").await.unwrap();
    let err = store.delete(&outside).await.unwrap_err();
    assert!(matches!(err, forge3d_core::Error::PathViolation(_)));
}

#[tokio::test]
async fn remove_project_dir_deletes_all_project_assets() {
    let (store, _dir) = open_tmp().await;
    store.write("proj1", "a.png", b"a", false).await.unwrap();
    store.write("proj1", "b.png", b"b", false).await.unwrap();
    store.remove_project_dir("proj1").await.unwrap();
    assert!(store.read("proj1", "a.png").await.is_err());
}

#[tokio::test]
async fn remove_project_dir_is_idempotent() {
    let (store, _dir) = open_tmp().await;
    store.remove_project_dir("never-existed").await.unwrap();
}
