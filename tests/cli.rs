//! CLI integration tests for md2zim.

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

#[test]
fn test_help() {
    cargo_bin_cmd!("md2zim")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Zim wiki markup"));
}

#[test]
fn test_version() {
    cargo_bin_cmd!("md2zim")
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_no_input() {
    cargo_bin_cmd!("md2zim")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage:"));
}

#[test]
fn test_convert_default_output() {
    let temp_dir = TempDir::new().unwrap();
    let input = temp_dir.path().join("notes.md");
    fs::write(&input, "# Notes\n\nSome *text*.\n").unwrap();

    cargo_bin_cmd!("md2zim")
        .arg(input.to_str().unwrap())
        .assert()
        .success();

    let output = temp_dir.path().join("notes_md2zim.txt");
    assert_eq!(
        fs::read_to_string(output).unwrap(),
        "===== Notes =====\n\nSome //text//.\n"
    );
}

#[test]
fn test_convert_explicit_output() {
    let temp_dir = TempDir::new().unwrap();
    let input = temp_dir.path().join("notes.md");
    let output = temp_dir.path().join("Page.txt");
    fs::write(&input, "- a\n- b\n").unwrap();

    cargo_bin_cmd!("md2zim")
        .args([input.to_str().unwrap(), "-o", output.to_str().unwrap()])
        .assert()
        .success();

    assert_eq!(fs::read_to_string(output).unwrap(), "* a\n* b\n");
}

#[test]
fn test_missing_input_fails() {
    let temp_dir = TempDir::new().unwrap();
    let input = temp_dir.path().join("missing.md");

    cargo_bin_cmd!("md2zim")
        .arg(input.to_str().unwrap())
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Input file not found"));
}

#[test]
fn test_no_overwrite_picks_new_name() {
    let temp_dir = TempDir::new().unwrap();
    let input = temp_dir.path().join("notes.md");
    let existing = temp_dir.path().join("notes_md2zim.txt");
    fs::write(&input, "text\n").unwrap();
    fs::write(&existing, "keep me").unwrap();

    cargo_bin_cmd!("md2zim")
        .args(["--no-overwrite", input.to_str().unwrap()])
        .assert()
        .success();

    assert_eq!(fs::read_to_string(&existing).unwrap(), "keep me");
    assert_eq!(
        fs::read_to_string(temp_dir.path().join("notes_md2zim_(1).txt")).unwrap(),
        "text\n"
    );
}

#[test]
fn test_config_suffix_used() {
    let temp_dir = TempDir::new().unwrap();
    let input = temp_dir.path().join("notes.md");
    fs::write(&input, "text\n").unwrap();
    fs::write(
        temp_dir.path().join(".md2zim.toml"),
        "output_suffix = \"_zim\"\n",
    )
    .unwrap();

    cargo_bin_cmd!("md2zim")
        .arg(input.to_str().unwrap())
        .assert()
        .success();

    assert!(temp_dir.path().join("notes_zim.txt").exists());
}

#[test]
fn test_invalid_explicit_config_fails() {
    let temp_dir = TempDir::new().unwrap();
    let input = temp_dir.path().join("notes.md");
    let config = temp_dir.path().join("bad.toml");
    fs::write(&input, "text\n").unwrap();
    fs::write(&config, "max_depth = 0\n").unwrap();

    cargo_bin_cmd!("md2zim")
        .args(["--config", config.to_str().unwrap(), input.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("max_depth"));
}
