// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Async atomic file I/O wrapper around the pure path-safety rules in
//! `path_safety.rs`. Writes go to `<path>.part`, get fsynced, then get
//! renamed over the target.

use std::path::{Path, PathBuf};

use forge3d_core::Error;
use tokio::io::AsyncWriteExt;

use crate::path_safety::resolve;

/// Result of a successful [`AssetStore::write`].
#[derive(Debug, Clone)]
pub struct WrittenAsset {
    pub path: PathBuf,
    pub size: u64,
}

/// Sandboxed filesystem persistence for generation outputs.
#[derive(Clone)]
pub struct AssetStore {
    root: PathBuf,
}

impl AssetStore {
    /// Create (if absent) and canonicalize the asset root.
    pub async fn open(root: impl Into<PathBuf>) -> Result<Self, Error> {
        let root = root.into();
        tokio::fs::create_dir_all(&root)
            .await
            .map_err(|e| Error::Fatal(format!("asset root {} unwritable: {e}", root.display())))?;
        let root = tokio::fs::canonicalize(&root)
            .await
            .map_err(|e| Error::Fatal(format!("failed to canonicalize asset root: {e}")))?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Validate and resolve the on-disk path for `project_id/name` without
    /// writing anything.
    pub fn resolve_path(&self, project_id: &str, name: &str) -> Result<PathBuf, Error> {
        resolve(&self.root, project_id, name)
    }

    /// Write `bytes` atomically to `project_id/name`: a temp file is
    /// written and fsynced, then renamed into place. Refuses to overwrite an
    /// existing path unless `overwrite` is set.
    pub async fn write(
        &self,
        project_id: &str,
        name: &str,
        bytes: &[u8],
        overwrite: bool,
    ) -> Result<WrittenAsset, Error> {
        let path = self.resolve_path(project_id, name)?;
        if !overwrite && tokio::fs::metadata(&path).await.is_ok() {
            return Err(Error::Conflict(format!("asset path {} already exists", path.display())));
        }

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| Error::Fatal(format!("failed to create asset directory: {e}")))?;
        }

        let tmp_path = path.with_extension(append_part_extension(&path));
        {
            let mut file = tokio::fs::File::create(&tmp_path)
                .await
                .map_err(|e| Error::Fatal(format!("failed to create temp file: {e}")))?;
            file.write_all(bytes)
                .await
                .map_err(|e| Error::Fatal(format!("failed to write temp file: {e}")))?;
            file.sync_all().await.map_err(|e| Error::Fatal(format!("failed to fsync temp file: {e}")))?;
        }

        tokio::fs::rename(&tmp_path, &path).await.map_err(|e| {
            Error::Fatal(format!("failed to rename {} into place: {e}", tmp_path.display()))
        })?;

        Ok(WrittenAsset { path, size: bytes.len() as u64 })
    }

    pub async fn read(&self, project_id: &str, name: &str) -> Result<Vec<u8>, Error> {
        let path = self.resolve_path(project_id, name)?;
        tokio::fs::read(&path)
            .await
            .map_err(|_| Error::NotFound(format!("asset file {} not found", path.display())))
    }

    pub async fn read_path(&self, path: &Path) -> Result<Vec<u8>, Error> {
        if !path.starts_with(&self.root) {
            return Err(Error::PathViolation(format!("{} is outside the asset root", path.display())));
        }
        tokio::fs::read(path)
            .await
            .map_err(|_| Error::NotFound(format!("asset file {} not found", path.display())))
    }

    pub async fn delete(&self, path: &Path) -> Result<(), Error> {
        if !path.starts_with(&self.root) {
            return Err(Error::PathViolation(format!("{} is outside the asset root", path.display())));
        }
        match tokio::fs::remove_file(path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Error::Fatal(format!("failed to delete {}: {e}", path.display()))),
        }
    }

    /// Remove a project's entire asset directory. Callers invoke this
    /// before deleting the project's row so no asset files are orphaned.
    /// Idempotent.
    pub async fn remove_project_dir(&self, project_id: &str) -> Result<(), Error> {
        let safe_project = crate::path_safety::sanitize_component(project_id);
        let dir = self.root.join(&safe_project);
        if !dir.starts_with(&self.root) {
            return Err(Error::PathViolation(format!("{} is outside the asset root", dir.display())));
        }
        match tokio::fs::remove_dir_all(&dir).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Error::Fatal(format!("failed to remove {}: {e}", dir.display()))),
        }
    }
}

/// Build the `<name>.part` sibling path's extension portion for
/// `Path::with_extension`: appends `.part` to whatever extension (if any)
/// the original path already has, so `out.png` becomes `out.png.part`.
fn append_part_extension(path: &Path) -> String {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) => format!("{ext}.part"),
        None => "part".to_string(),
    }
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
