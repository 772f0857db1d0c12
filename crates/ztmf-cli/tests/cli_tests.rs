//! Integration tests for the `ztmf` CLI binary.
//!
//! These run the CLI as a subprocess against an address nothing listens on,
//! so they cover argument parsing, offline validation, and error exits.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::fs;
use std::path::Path;
use std::process::Command;

fn ztmf_bin() -> String {
    let path = env!("CARGO_BIN_EXE_ztmf");
    assert!(Path::new(path).exists(), "ztmf binary not found at {path}");
    path.to_owned()
}

/// Run ztmf with args and return (`exit_code`, stdout, stderr).
fn run(args: &[&str]) -> (i32, String, String) {
    let output = Command::new(ztmf_bin())
        .arg("--no-color")
        .args(args)
        .env("ZTMF_URL", "http://127.0.0.1:19999/api/v1")
        .env_remove("ZTMF_TOKEN")
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to execute ztmf");

    let code = output.status.code().unwrap_or(-1);
    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    (code, stdout, stderr)
}

// ── Version & help ───────────────────────────────────────────────────

#[test]
fn test_version_flag() {
    let (code, stdout, _) = run(&["--version"]);
    assert_eq!(code, 0, "ztmf --version should exit 0");
    assert!(stdout.contains("ztmf"), "version output should contain 'ztmf': {stdout}");
}

#[test]
fn test_help_flag() {
    let (code, stdout, _) = run(&["--help"]);
    assert_eq!(code, 0, "ztmf --help should exit 0");
    assert!(stdout.contains("ZTMF CLI"), "help should mention ZTMF CLI");
    for command in ["whoami", "systems", "scores", "datacalls", "questionnaire"] {
        assert!(stdout.contains(command), "help should list '{command}'");
    }
    assert!(stdout.contains("ZTMF_URL"), "help should document ZTMF_URL");
}

#[test]
fn test_subcommand_help() {
    for sub in ["systems", "datacalls"] {
        let (code, stdout, _) = run(&[sub, "--help"]);
        assert_eq!(code, 0, "ztmf {sub} --help should exit 0");
        assert!(stdout.contains("create"), "{sub} help should list 'create': {stdout}");
    }
    let (code, stdout, _) = run(&["systems", "decommission", "--help"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("--date"));
    assert!(stdout.contains("--notes"));
}

#[test]
fn test_missing_subcommand_fails() {
    let (code, _, stderr) = run(&[]);
    assert_ne!(code, 0);
    assert!(stderr.contains("Usage"), "usage should be printed: {stderr}");
}

// ── Offline validation ───────────────────────────────────────────────

#[test]
fn test_create_reports_required_fields() {
    let (code, _, stderr) = run(&["systems", "create", "fismaname=Payments"]);
    assert_ne!(code, 0);
    assert!(stderr.contains("fismaacronym: This field is required"), "{stderr}");
    assert!(stderr.contains("issoemail: This field is required"), "{stderr}");
    assert!(!stderr.contains("fismaname:"), "filled field should pass: {stderr}");
    assert!(stderr.contains("field(s) need attention"), "{stderr}");
}

#[test]
fn test_create_from_file_rejects_bad_email() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("system.json");
    fs::write(
        &path,
        r#"{
            "fismaname": "Payments",
            "fismaacronym": "PAY",
            "fismauid": "uid-1",
            "component": "OIT",
            "datacenterenvironment": "CMSDC",
            "issoemail": "not-an-email",
            "datacallcontact": "contact@example.gov"
        }"#,
    )
    .unwrap();

    let (code, _, stderr) = run(&["systems", "create", "--from", path.to_str().unwrap()]);
    assert_ne!(code, 0);
    assert!(stderr.contains("issoemail: Enter a valid email address"), "{stderr}");
    assert!(!stderr.contains("This field is required"), "{stderr}");
}

#[test]
fn test_create_from_file_rejects_non_object() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("system.json");
    fs::write(&path, "[1, 2, 3]").unwrap();

    let (code, _, stderr) = run(&["systems", "create", "--from", path.to_str().unwrap()]);
    assert_ne!(code, 0);
    assert!(stderr.contains("must contain a JSON object"), "{stderr}");
}

#[test]
fn test_unknown_field_key() {
    let (code, _, stderr) = run(&["systems", "create", "owner=alice"]);
    assert_ne!(code, 0);
    assert!(stderr.contains("unknown field 'owner'"), "{stderr}");
}

#[test]
fn test_malformed_pair() {
    let (code, _, stderr) = run(&["systems", "edit", "3", "fismaname"]);
    assert_ne!(code, 0);
    assert!(stderr.contains("invalid key=value pair"), "{stderr}");
}

#[test]
fn test_decommission_future_date() {
    let (code, _, stderr) = run(&["systems", "decommission", "3", "--date", "2999-01-01", "--yes"]);
    assert_ne!(code, 0);
    assert!(stderr.contains("Date cannot be in the future"), "{stderr}");
}

#[test]
fn test_decommission_bad_date() {
    let (code, _, stderr) = run(&["systems", "decommission", "3", "--date", "31/01/2024"]);
    assert_ne!(code, 0);
    assert!(stderr.contains("Invalid date"), "{stderr}");
}

#[test]
fn test_decommission_notes_too_long() {
    let notes = "x".repeat(501);
    let (code, _, stderr) = run(&[
        "systems",
        "decommission",
        "3",
        "--date",
        "2024-01-31",
        "--notes",
        notes.as_str(),
    ]);
    assert_ne!(code, 0);
    assert!(stderr.contains("maximum is 500"), "{stderr}");
}

#[test]
fn test_datacall_name_format() {
    let (code, _, stderr) = run(&["datacalls", "create", "FY2025-Q1", "--deadline", "2025-03-31"]);
    assert_ne!(code, 0);
    assert!(stderr.contains("Invalid datacall format"), "{stderr}");

    let (code, _, stderr) = run(&["datacalls", "create", "FY25 Q1", "--deadline", "2025-03-31"]);
    assert_ne!(code, 0);
    assert!(stderr.contains("Invalid datacall format"), "{stderr}");
}

#[test]
fn test_datacall_deadline_format() {
    let (code, _, stderr) = run(&["datacalls", "create", "fy2025 q1", "--deadline", "03/31/2025"]);
    assert_ne!(code, 0);
    assert!(stderr.contains("Invalid Deadline"), "{stderr}");
}

// ── Server unreachable ───────────────────────────────────────────────

#[test]
fn test_unreachable_server_fails() {
    for args in [
        &["systems", "list"][..],
        &["scores", "3"][..],
        &["datacalls", "list"][..],
    ] {
        let (code, _, stderr) = run(args);
        assert_ne!(code, 0, "ztmf {args:?} should fail without a server");
        assert!(stderr.contains("Error"), "{stderr}");
    }
}

#[test]
fn test_whoami_without_server_asks_to_log_in() {
    let (code, _, stderr) = run(&["whoami"]);
    assert_ne!(code, 0);
    assert!(stderr.contains("Please log in to continue."), "{stderr}");
}

#[test]
fn test_bad_base_url() {
    let output = Command::new(ztmf_bin())
        .args(["--url", "ftp://example.com", "systems", "list"])
        .env_remove("ZTMF_URL")
        .env_remove("ZTMF_TOKEN")
        .output()
        .expect("failed to execute ztmf");
    assert!(!output.status.success());
}
