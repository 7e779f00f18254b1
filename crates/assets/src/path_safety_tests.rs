// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::path::Path;

#[test]
fn sanitize_replaces_forbidden_characters() {
    assert_eq!(sanitize_component("a<b>c:d\"e/f\\g|h?i*j"), "a_b_c_d_e_f_g_h_i_j");
}

#[test]
fn sanitize_replaces_nul_byte() {
    assert_eq!(sanitize_component("a\0b"), "a_b");
}

#[test]
fn sanitize_leaves_ordinary_names_untouched() {
    assert_eq!(sanitize_component("render-001.png"), "render-001.png");
}

#[test]
fn traversal_filename_is_sanitized_and_resolves_under_root() {
    let root = Path::new("/var/forge3d/assets");
    let resolved = resolve(root, "proj1", "../../etc/passwd").unwrap();
    assert!(resolved.starts_with(root));
    assert_eq!(resolved, root.join("proj1").join(".._.._etc_passwd"));
}

#[test]
fn traversal_project_name_is_sanitized_and_resolves_under_root() {
    let root = Path::new("/var/forge3d/assets");
    let resolved = resolve(root, "../../etc/passwd", "out.png").unwrap();
    assert!(resolved.starts_with(root));
}

#[yare::parameterized(
    dot_name = { "proj1", "." },
    dotdot_name = { "proj1", ".." },
    dot_project = { ".", "out.png" },
)]
fn bare_dot_component_is_rejected(project: &str, name: &str) {
    let root = Path::new("/var/forge3d/assets");
    assert!(resolve(root, project, name).is_err());
}

#[test]
fn empty_component_is_rejected() {
    let root = Path::new("/var/forge3d/assets");
    assert!(resolve(root, "proj1", "").is_err());
}

#[test]
fn resolved_path_never_escapes_asset_root() {
    let root = Path::new("/var/forge3d/assets");
    // Even pathological inputs that survive sanitization land under root.
    for name in ["..", "../..", "a/../../b", "....//....//etc"] {
        if let Ok(p) = resolve(root, "proj1", name) {
            assert!(p.starts_with(root), "{name:?} escaped to {}", p.display());
        }
    }
}
