//! Integration tests for loading descriptors from disk.
//!
//! Covered scenarios:
//! 1. Several files merge in order, later scalars win
//! 2. `.env` next to the first file feeds interpolation
//! 3. An explicit env file replaces the default one
//! 4. Project name resolution: override, declared name, directory name
//! 5. Failures: no files, unreadable file, bad YAML, missing variable,
//!    ports above 65535

#![allow(clippy::expect_used, clippy::unwrap_used, clippy::panic)]

use std::path::{Path, PathBuf};

use gantry_common::error::GantryError;
use gantry_compose::{LoadOptions, load};

fn write(dir: &Path, name: &str, text: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, text).expect("write fixture");
    path
}

fn options(files: Vec<PathBuf>) -> LoadOptions {
    LoadOptions {
        files,
        ..LoadOptions::default()
    }
}

// ── Merging ──────────────────────────────────────────────────────────

#[test]
fn later_files_override_earlier_ones() {
    let dir = tempfile::tempdir().expect("tempdir");
    let base = write(
        dir.path(),
        "compose.yaml",
        "name: shop\nservices:\n  web:\n    image: nginx\n    tty: true\n  db:\n    image: postgres\n",
    );
    let overlay = write(
        dir.path(),
        "compose.override.yaml",
        "services:\n  web:\n    image: caddy\nvolumes:\n  data:\n",
    );

    let project = load(&options(vec![base, overlay])).expect("load");
    assert_eq!(project.name, "shop");
    assert_eq!(project.services.len(), 2);
    let web = &project.services["web"];
    assert_eq!(web.name, "web");
    assert_eq!(web.image.as_deref(), Some("caddy"));
    assert!(web.tty);
    assert!(project.volumes.contains_key("data"));
}

// ── Interpolation ────────────────────────────────────────────────────

#[test]
fn default_env_file_next_to_first_descriptor() {
    let dir = tempfile::tempdir().expect("tempdir");
    let file = write(
        dir.path(),
        "compose.yaml",
        "services:\n  web:\n    image: nginx:${GANTRY_LOAD_TEST_TAG}\n",
    );
    let _ = write(dir.path(), ".env", "GANTRY_LOAD_TEST_TAG=1.27\n");

    let project = load(&options(vec![file])).expect("load");
    assert_eq!(project.services["web"].image.as_deref(), Some("nginx:1.27"));
}

#[test]
fn explicit_env_file_wins_over_default() {
    let dir = tempfile::tempdir().expect("tempdir");
    let file = write(
        dir.path(),
        "compose.yaml",
        "services:\n  web:\n    image: nginx:${GANTRY_LOAD_TEST_TAG:-latest}\n",
    );
    let _ = write(dir.path(), ".env", "GANTRY_LOAD_TEST_TAG=from-default\n");
    let explicit = write(dir.path(), "prod.env", "GANTRY_LOAD_TEST_TAG=from-explicit\n");

    let project = load(&LoadOptions {
        files: vec![file],
        env_file: Some(explicit),
        project_name: None,
    })
    .expect("load");
    assert_eq!(
        project.services["web"].image.as_deref(),
        Some("nginx:from-explicit")
    );
}

#[test]
fn missing_required_variable_fails() {
    let dir = tempfile::tempdir().expect("tempdir");
    let file = write(
        dir.path(),
        "compose.yaml",
        "services:\n  web:\n    image: ${GANTRY_LOAD_TEST_UNSET:?image required}\n",
    );
    let err = load(&options(vec![file])).expect_err("unset variable");
    assert!(matches!(err, GantryError::Interpolation { .. }), "got: {err}");
    assert!(err.to_string().contains("image required"));
}

// ── Project name ─────────────────────────────────────────────────────

#[test]
fn project_name_override_is_lowercased() {
    let dir = tempfile::tempdir().expect("tempdir");
    let file = write(dir.path(), "compose.yaml", "name: shop\nservices: {}\n");
    let project = load(&LoadOptions {
        files: vec![file],
        env_file: None,
        project_name: Some("Staging".into()),
    })
    .expect("load");
    assert_eq!(project.name, "staging");
}

#[test]
fn project_name_falls_back_to_directory() {
    let dir = tempfile::tempdir().expect("tempdir");
    let nested = dir.path().join("Storefront");
    std::fs::create_dir(&nested).expect("mkdir");
    let file = write(&nested, "compose.yaml", "services:\n  web:\n    image: nginx\n");

    let project = load(&options(vec![file])).expect("load");
    assert_eq!(project.name, "storefront");
}

// ── Failures ─────────────────────────────────────────────────────────

#[test]
fn no_files_is_a_config_error() {
    let err = load(&LoadOptions::default()).expect_err("no files");
    assert!(matches!(err, GantryError::Config { .. }));
}

#[test]
fn unreadable_file_is_an_io_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    let err = load(&options(vec![dir.path().join("missing.yaml")])).expect_err("missing");
    assert!(matches!(err, GantryError::Io { .. }));
}

#[test]
fn invalid_yaml_names_the_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let file = write(dir.path(), "broken.yaml", "services: [unclosed\n");
    let err = load(&options(vec![file.clone()])).expect_err("bad yaml");
    match err {
        GantryError::Descriptor { path, .. } => assert_eq!(path, file),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn out_of_range_ports_are_rejected() {
    let dir = tempfile::tempdir().expect("tempdir");
    let short = write(
        dir.path(),
        "short.yaml",
        "services:\n  web:\n    image: nginx\n    ports:\n      - \"70000\"\n",
    );
    let err = load(&options(vec![short])).expect_err("short syntax above 65535");
    assert!(matches!(err, GantryError::Descriptor { .. }), "got: {err}");

    let long = write(
        dir.path(),
        "long.yaml",
        "services:\n  web:\n    image: nginx\n    ports:\n      - target: 70000\n",
    );
    let err = load(&options(vec![long])).expect_err("long syntax above 65535");
    assert!(matches!(err, GantryError::Descriptor { .. }), "got: {err}");
}
