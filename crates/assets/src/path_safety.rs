// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Pure, I/O-free path-safety validation.

use forge3d_core::Error;
use std::path::{Component, Path, PathBuf};

/// Characters that are replaced with `_` during sanitization, plus NUL.
const FORBIDDEN: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

/// Sanitize one logical path component: every forbidden character (and NUL)
/// becomes `_`. Does not reject `.`/`..` — callers must check the sanitized
/// result with [`reject_dot_components`] before using it.
pub fn sanitize_component(raw: &str) -> String {
    raw.chars()
        .map(|c| if c == '\0' || FORBIDDEN.contains(&c) { '_' } else { c })
        .collect()
}

/// Reject a sanitized component that is exactly `.` or `..` (or empty).
fn reject_dot_components(sanitized: &str) -> std::result::Result<(), Error> {
    if sanitized.is_empty() || sanitized == "." || sanitized == ".." {
        return Err(Error::PathViolation(format!(
            "path component {sanitized:?} is not a valid asset name"
        )));
    }
    Ok(())
}

/// Resolve `asset_root/project_component/name_component` to an absolute
/// path, sanitizing both components and verifying the result stays under
/// `asset_root` by prefix-checking the lexically normalized form (the file
/// may not exist yet, so full `canonicalize` isn't available for the leaf —
/// only `asset_root` itself, which the caller has already canonicalized,
/// needs to exist on disk).
pub fn resolve(asset_root: &Path, project_component: &str, name_component: &str) -> std::result::Result<PathBuf, Error> {
    let safe_project = sanitize_component(project_component);
    let safe_name = sanitize_component(name_component);
    reject_dot_components(&safe_project)?;
    reject_dot_components(&safe_name)?;

    let candidate = asset_root.join(&safe_project).join(&safe_name);
    let normalized = normalize_lexically(&candidate);

    if !normalized.starts_with(asset_root) {
        return Err(Error::PathViolation(format!(
            "resolved path {} escapes asset root {}",
            normalized.display(),
            asset_root.display()
        )));
    }
    Ok(normalized)
}

/// Lexically normalize a path: collapse `.` and resolve `..` against
/// preceding components without touching the filesystem. Used because the
/// target file does not exist yet, so `std::fs::canonicalize` cannot run on
/// it directly.
fn normalize_lexically(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::ParentDir => {
                out.pop();
            }
            Component::CurDir => {}
            other => out.push(other.as_os_str()),
        }
    }
    out
}

#[cfg(test)]
#[path = "path_safety_tests.rs"]
mod tests;
