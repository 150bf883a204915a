//! Integration tests for the `jsbundle` binary.
//!
//! These tests verify:
//! - JSON output is always valid JSON
//! - `ok` boolean is present
//! - Error codes are SCREAMING_SNAKE_CASE
//! - Watch mode stops on Ctrl-C

use std::io::{BufRead, BufReader};
use std::process::{Command, Stdio};
use tempfile::tempdir;

fn cargo_bin() -> Command {
    let mut cmd = Command::new(env!("CARGO"));
    cmd.args(["run", "-q", "-p", "jsbundle-cli", "--bin", "jsbundle", "--"]);
    cmd
}

fn run_json(args: &[&str], cwd: &std::path::Path) -> (serde_json::Value, bool) {
    let output = cargo_bin()
        .args(args)
        .args(["--json", "--cwd"])
        .arg(cwd)
        .output()
        .expect("Failed to run jsbundle");

    let stdout = String::from_utf8_lossy(&output.stdout);
    let json = serde_json::from_str(&stdout).expect("Output should be valid JSON");
    (json, output.status.success())
}

#[test]
fn test_bundle_json_success() {
    let dir = tempdir().unwrap();
    std::fs::write(dir.path().join("index.js"), "import { a } from './a';\nconsole.log(a);").unwrap();
    std::fs::write(dir.path().join("a.js"), "export const a = 1;").unwrap();

    let (json, success) = run_json(&["bundle"], dir.path());
    assert!(success);
    assert_eq!(json["ok"], true);
    assert_eq!(json["entry"], "index.js");
    assert_eq!(json["modules"], serde_json::json!(["index.js", "a.js"]));
    assert!(json["sizeBytes"].as_u64().unwrap() > 0);
    assert!(json["warnings"].is_array());
    assert!(dir.path().join("build/bundle.js").exists());
}

#[test]
fn test_bundle_json_error_code_is_screaming_snake_case() {
    let dir = tempdir().unwrap();
    std::fs::write(dir.path().join("index.js"), "import './gone';").unwrap();

    let (json, success) = run_json(&["bundle"], dir.path());
    assert!(!success);
    assert_eq!(json["ok"], false);

    let code = json["error"]["code"].as_str().unwrap();
    assert_eq!(code, "FILE_NOT_FOUND");
    assert!(code.chars().all(|c| c.is_ascii_uppercase() || c == '_'));
    assert_eq!(
        json["error"]["message"],
        "Error loading file gone.js:\nCannot find file"
    );
}

#[test]
fn test_init_then_bundle_with_overrides() {
    let dir = tempdir().unwrap();
    std::fs::create_dir(dir.path().join("src")).unwrap();
    std::fs::write(dir.path().join("src/main.js"), "module.exports = 1;").unwrap();

    let (json, success) = run_json(&["init"], dir.path());
    assert!(success);
    assert_eq!(json["created"], true);

    let (json, success) = run_json(
        &["bundle", "--entry", "src/main.js", "--out-dir", "dist"],
        dir.path(),
    );
    assert!(success);
    assert_eq!(json["modules"], serde_json::json!(["src/main.js"]));
    assert!(dir.path().join("dist/bundle.js").exists());
}

#[test]
fn test_check_json_reports_each_file() {
    let dir = tempdir().unwrap();
    std::fs::write(dir.path().join("good.js"), "require('./dep');").unwrap();
    std::fs::write(dir.path().join("bad.js"), "let = ;").unwrap();

    let (json, success) = run_json(&["check", "good.js", "bad.js"], dir.path());
    assert!(!success);
    assert_eq!(json["ok"], false);
    assert_eq!(json["files"][0]["imports"], serde_json::json!(["dep.js"]));
    assert_eq!(json["files"][1]["ok"], false);
}

#[test]
fn test_watch_and_json_conflict() {
    let dir = tempdir().unwrap();
    std::fs::write(dir.path().join("index.js"), "a();").unwrap();

    let output = cargo_bin()
        .args(["bundle", "--watch", "--json", "--cwd"])
        .arg(dir.path())
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(output.stdout.is_empty());
}

#[cfg(unix)]
#[test]
fn test_watch_exits_cleanly_on_interrupt() {
    let dir = tempdir().unwrap();
    std::fs::write(dir.path().join("index.js"), "a();").unwrap();

    let mut child = Command::new(env!("CARGO_BIN_EXE_jsbundle"))
        .args(["bundle", "--watch", "--cwd"])
        .arg(dir.path())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .unwrap();

    let mut lines = BufReader::new(child.stdout.take().unwrap()).lines();
    let first = lines.next().unwrap().unwrap();
    assert!(first.contains("bundle.js"), "unexpected output: {first}");
    std::thread::sleep(std::time::Duration::from_millis(200));

    let killed = Command::new("kill")
        .args(["-INT", &child.id().to_string()])
        .status()
        .unwrap();
    assert!(killed.success());
    assert!(child.wait().unwrap().success());
}
