//! Integration tests for the weft CLI

use std::fs;
use std::path::Path;
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};

fn weft() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_weft"));
    cmd.env_remove("RUST_LOG")
        .env_remove("WEFT_ROOT_DIR")
        .env_remove("WEFT_SRC_DIR")
        .env_remove("WEFT_WWW_DIR")
        .env_remove("WEFT_BUILD_DIR")
        .env_remove("WEFT_TMP_DIR")
        .env_remove("WEFT_BUNDLER")
        .env_remove("WEFT_DEBUG_MODE");
    cmd
}

fn write_bundler_config(dir: &Path, command: &[&str]) -> std::path::PathBuf {
    let path = dir.join("bundler.json");
    let config = bundler_config_json(command);
    fs::write(&path, config).unwrap();
    path
}

// Both sections point at the same command so --aot does not matter here
fn bundler_config_json(command: &[&str]) -> String {
    let command = command
        .iter()
        .map(|part| format!("{part:?}"))
        .collect::<Vec<_>>()
        .join(", ");
    let section = format!(
        r#"{{"entry": "{{{{SRC}}}}/main.ts", "output": {{"path": "{{{{BUILD}}}}", "filename": "main.js"}}, "command": [{command}]}}"#
    );
    format!(r#"{{"dev": {section}, "prod": {section}}}"#)
}

#[test]
fn test_cli_version() {
    let output = weft().arg("--version").output().expect("Failed to execute weft");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("weft"));
}

#[test]
fn test_cli_help() {
    let output = weft().arg("--help").output().expect("Failed to execute weft");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    for task in ["clean", "bundle", "build", "watch"] {
        assert!(stdout.contains(task), "help is missing {task}");
    }
}

#[test]
fn test_cli_invalid_command() {
    let output = weft()
        .arg("invalid-command")
        .output()
        .expect("Failed to execute weft");

    assert!(!output.status.success());
}

#[test]
fn test_clean_creates_build_dir() {
    let root = tempfile::tempdir().unwrap();
    let build = root.path().join("www").join("build");
    fs::create_dir_all(build.join("chunks")).unwrap();
    fs::write(build.join("main.js"), "old").unwrap();

    let output = weft()
        .arg("clean")
        .arg("--rootDir")
        .arg(root.path())
        .output()
        .expect("Failed to execute weft");

    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    assert!(build.is_dir());
    assert_eq!(fs::read_dir(&build).unwrap().count(), 0);
}

#[test]
fn test_bundle_with_stats_from_command() {
    let root = tempfile::tempdir().unwrap();
    let config = write_bundler_config(
        root.path(),
        &["sh", "-c", r#"echo '{"errors":[],"warnings":[],"modules":[]}'"#],
    );

    let output = weft()
        .arg("bundle")
        .arg(format!("--rootDir={}", root.path().display()))
        .arg("-b")
        .arg(&config)
        .output()
        .expect("Failed to execute weft");

    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
}

#[test]
fn test_bundle_failure_exits_non_zero() {
    let root = tempfile::tempdir().unwrap();
    let config = write_bundler_config(
        root.path(),
        &["sh", "-c", r#"echo '{"errors":["main.ts: unexpected token"]}'"#],
    );

    let output = weft()
        .arg("bundle")
        .arg("--rootDir")
        .arg(root.path())
        .arg("--bundler")
        .arg(&config)
        .output()
        .expect("Failed to execute weft");

    assert_eq!(output.status.code(), Some(1));
    let logs = String::from_utf8_lossy(&output.stdout);
    assert_eq!(logs.matches("unexpected token").count(), 1);
}

#[test]
fn test_watch_with_bad_bundler_config_exits() {
    let root = tempfile::tempdir().unwrap();
    fs::create_dir_all(root.path().join("src")).unwrap();
    let config = root.path().join("bad.json");
    fs::write(&config, r#"{"dev": {"entry": "x"}}"#).unwrap();

    let mut child = weft()
        .arg("watch")
        .arg("--rootDir")
        .arg(root.path())
        .arg("-b")
        .arg(&config)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("Failed to execute weft");

    let deadline = Instant::now() + Duration::from_secs(10);
    while child.try_wait().unwrap().is_none() {
        if Instant::now() > deadline {
            child.kill().unwrap();
            panic!("watch kept running with an unusable bundler config");
        }
        std::thread::sleep(Duration::from_millis(50));
    }

    let output = child.wait_with_output().unwrap();
    assert_eq!(output.status.code(), Some(1));
    let logs = String::from_utf8_lossy(&output.stdout);
    assert_eq!(logs.matches("invalid bundler config").count(), 1);
}
