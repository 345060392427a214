//! Exit status and output streams of the command-line tools.

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use glapi_model::ApiDocument;
use tempfile::tempdir;

fn fixtures_path() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

/// Run a tool from an empty directory so no local `glapi.toml` is picked up.
fn run(binary: &str, fixture: &Path) -> Output {
    let workdir = tempdir().unwrap();
    Command::new(binary)
        .arg(fixture)
        .current_dir(workdir.path())
        .env("RUST_LOG", "debug")
        .output()
        .unwrap()
}

// =============================================================================
// glapi-build-json
// =============================================================================

#[test]
fn test_build_json_success() {
    let output = run(
        env!("CARGO_BIN_EXE_glapi-build-json"),
        &fixtures_path().join("gl_api/gl_API.xml"),
    );
    assert_eq!(output.status.code(), Some(0));

    let stdout = String::from_utf8(output.stdout).unwrap();
    let document = ApiDocument::from_json(&stdout).unwrap();
    assert_eq!(document.categories.len(), 6);
    assert_eq!(document.functions.len(), 9);

    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("built API model"));
}

#[test]
fn test_build_json_conflict_fails() {
    let output = run(
        env!("CARGO_BIN_EXE_glapi-build-json"),
        &fixtures_path().join("invalid_api.xml"),
    );
    assert_eq!(output.status.code(), Some(1));
    assert!(output.stdout.is_empty());

    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("Error:"));
    assert!(stderr.contains("\"FOO\""));
}

// =============================================================================
// glapi-check
// =============================================================================

#[test]
fn test_check_clean_fixture() {
    let output = run(
        env!("CARGO_BIN_EXE_glapi-check"),
        &fixtures_path().join("gl_api/gl_API.xml"),
    );
    assert_eq!(output.status.code(), Some(0));

    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("Found 6 categories"));
    assert!(stdout.contains("No problems found"));
    assert!(!stdout.contains("Error ["));
}

#[test]
fn test_check_reports_violations() {
    let output = run(
        env!("CARGO_BIN_EXE_glapi-check"),
        &fixtures_path().join("invalid_api.xml"),
    );
    assert_eq!(output.status.code(), Some(1));

    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("Error [E001]"));
    assert!(stdout.contains("Error [E007]"));
    assert!(stdout.contains("12 problem(s) found"));
}

#[test]
fn test_check_missing_file() {
    let output = run(
        env!("CARGO_BIN_EXE_glapi-check"),
        &fixtures_path().join("does_not_exist.xml"),
    );
    assert_eq!(output.status.code(), Some(2));

    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("Error:"));
}
