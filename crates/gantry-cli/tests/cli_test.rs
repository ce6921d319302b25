//! End-to-end tests for the `gantry` binary.
//!
//! Covered scenarios:
//! 1. Without `-f`, usage is printed and the exit code is 0, even next to
//!    a `compose.yaml`
//! 2. Generated source goes to stdout by default
//! 3. Output goes to stdout, or to `-o` with a summary line
//! 4. `-f` files merge in order and `--env-file` feeds interpolation
//! 5. `--main` and `--profile` produce the runnable entry point
//! 6. Load failures exit non-zero with no output file

#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::path::Path;
use std::process::{Command, Output};

fn gantry(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_gantry"))
        .current_dir(dir)
        .args(args)
        .env_remove("GANTRY_API_MODULE")
        .output()
        .expect("run gantry")
}

fn stdout(output: &Output) -> String {
    String::from_utf8(output.stdout.clone()).expect("utf-8 stdout")
}

fn write(dir: &Path, name: &str, text: &str) {
    std::fs::write(dir.join(name), text).expect("write fixture");
}

// ── Usage ────────────────────────────────────────────────────────────

#[test]
fn no_descriptor_prints_usage() {
    let dir = tempfile::tempdir().expect("tempdir");
    let output = gantry(dir.path(), &[]);
    assert!(output.status.success());
    let text = stdout(&output);
    assert!(text.contains("Usage"), "got:\n{text}");
    assert!(text.contains("--file"), "got:\n{text}");
}

#[test]
fn compose_file_in_directory_is_not_read_without_flag() {
    let dir = tempfile::tempdir().expect("tempdir");
    write(dir.path(), "compose.yaml", "services:\n  web:\n    image: nginx\n");

    let output = gantry(dir.path(), &["-o", "deploy.go"]);
    assert!(output.status.success());
    let text = stdout(&output);
    assert!(text.contains("Usage"), "got:\n{text}");
    assert!(!text.contains("package main"), "got:\n{text}");
    assert!(!dir.path().join("deploy.go").exists());
}

// ── Output ───────────────────────────────────────────────────────────

#[test]
fn source_to_stdout() {
    let dir = tempfile::tempdir().expect("tempdir");
    write(
        dir.path(),
        "compose.yaml",
        "name: demo\nservices:\n  web:\n    image: nginx:alpine\n",
    );

    let output = gantry(dir.path(), &["-f", "compose.yaml"]);
    assert!(output.status.success(), "stderr: {:?}", output.stderr);
    let source = stdout(&output);
    assert!(source.starts_with("// Code generated by gantry. DO NOT EDIT.\n\npackage main\n"));
    assert!(source.contains("\"github.com/gantry-dev/gantry-go/gantry\""));
    assert!(source.contains("container.Image(\"nginx:alpine\")"));
    assert!(source.contains("proj.AddService(\"web\", WebContainer)"));
    assert!(!source.contains("func main()"));
}

#[test]
fn output_file_and_summary() {
    let dir = tempfile::tempdir().expect("tempdir");
    write(dir.path(), "compose.yaml", "services:\n  db:\n    image: postgres\n");

    let output = gantry(dir.path(), &["-f", "compose.yaml", "-o", "deploy.go", "--package", "deploy"]);
    assert!(output.status.success());
    assert!(stdout(&output).starts_with("Wrote deploy.go ("));

    let source = std::fs::read_to_string(dir.path().join("deploy.go")).expect("read");
    assert!(source.contains("package deploy\n"));
    assert!(source.contains("func DbContainer() *gantry.Container"));
}

// ── Merging and interpolation ────────────────────────────────────────

#[test]
fn files_merge_and_env_file_interpolates() {
    let dir = tempfile::tempdir().expect("tempdir");
    write(
        dir.path(),
        "base.yaml",
        "name: shop\nservices:\n  web:\n    image: nginx:${TAG}\n    tty: true\n",
    );
    write(dir.path(), "override.yaml", "services:\n  web:\n    hostname: front\n");
    write(dir.path(), "vars.env", "TAG=1.27\n");

    let output = gantry(
        dir.path(),
        &["-f", "base.yaml", "-f", "override.yaml", "--env-file", "vars.env"],
    );
    assert!(output.status.success());
    let source = stdout(&output);
    assert!(source.contains("container.Image(\"nginx:1.27\")"), "got:\n{source}");
    assert!(source.contains("container.Hostname(\"front\")"));
    assert!(source.contains("container.Tty()"));
}

#[test]
fn project_name_flag_overrides_descriptor() {
    let dir = tempfile::tempdir().expect("tempdir");
    write(dir.path(), "compose.yaml", "name: shop\nservices:\n  web:\n    image: nginx\n");

    let output = gantry(dir.path(), &["-f", "compose.yaml", "--project-name", "Staging"]);
    assert!(output.status.success());
    assert!(stdout(&output).contains("gantry.NewProject(\"staging\")"));
}

// ── Entry point ──────────────────────────────────────────────────────

#[test]
fn main_flag_emits_entry_point() {
    let dir = tempfile::tempdir().expect("tempdir");
    write(dir.path(), "compose.yaml", "services:\n  web:\n    image: nginx\n");

    let output = gantry(dir.path(), &["-f", "compose.yaml", "--main", "--profile", "debug"]);
    assert!(output.status.success());
    let source = stdout(&output);
    assert!(source.contains("func main() {"));
    assert!(source.contains("func run() error {"));
    assert!(source.contains("\"os/signal\""));
    assert!(source.contains("gantry.WithProfiles(\"debug\")"), "got:\n{source}");
}

// ── Failures ─────────────────────────────────────────────────────────

#[test]
fn missing_variable_fails_without_output() {
    let dir = tempfile::tempdir().expect("tempdir");
    write(
        dir.path(),
        "compose.yaml",
        "services:\n  web:\n    image: ${GANTRY_TEST_SURELY_UNSET:?image required}\n",
    );

    let output = gantry(dir.path(), &["-f", "compose.yaml", "-o", "deploy.go"]);
    assert!(!output.status.success());
    assert!(!dir.path().join("deploy.go").exists());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("failed to load descriptors"), "got:\n{stderr}");
}

#[test]
fn missing_file_fails() {
    let dir = tempfile::tempdir().expect("tempdir");
    let output = gantry(dir.path(), &["-f", "nope.yaml"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("file not found"));
}
