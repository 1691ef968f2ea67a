//! CLI smoke tests: run the binary end to end.

use std::io::Write;
use std::process::{Command, Output, Stdio};

fn cli_bin() -> Command {
    Command::new(env!("CARGO_BIN_EXE_cortex"))
}

fn run_script(args: &[&str], script: &str) -> Output {
    let mut child = cli_bin()
        .args(args)
        .env_remove("RUST_LOG")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("failed to run");
    child
        .stdin
        .take()
        .expect("stdin")
        .write_all(script.as_bytes())
        .expect("write script");
    child.wait_with_output().expect("wait")
}

#[test]
fn help_flag() {
    let output = cli_bin().arg("--help").output().expect("failed to run");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Usage"), "Expected usage info in --help output");
    assert!(stdout.contains("--state-dir"));
}

#[test]
fn version_flag() {
    let output = cli_bin().arg("--version").output().expect("failed to run");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("cortex"), "Expected binary name in --version output");
}

#[test]
fn missing_config_file_is_an_error() {
    let output = cli_bin()
        .arg("--config")
        .arg("/tmp/nonexistent_cortex_config_12345.toml")
        .stdin(Stdio::null())
        .output()
        .expect("failed to run");
    assert!(!output.status.success());
}

#[test]
fn scripted_session_replies_and_saves_state() {
    let dir = tempfile::tempdir().expect("tempdir");
    let state_dir = dir.path().to_str().expect("utf-8 path");
    let output = run_script(
        &["--state-dir", state_dir, "--seed", "7"],
        "hello\nshould I read or sleep?\nlearn about comets\nexit\nignored after exit\n",
    );
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Cortex: "));
    assert!(stdout.contains("[decision] read"));
    assert!(stdout.contains("[learning] noted \"comets\""));
    assert!(!stdout.contains("ignored after exit"));

    assert!(dir.path().join("cognitive_state.json").exists());
    assert!(dir.path().join("emotional_state.json").exists());
}

#[test]
fn no_save_leaves_no_state_behind() {
    let dir = tempfile::tempdir().expect("tempdir");
    let state_dir = dir.path().to_str().expect("utf-8 path");
    let output = run_script(&["--state-dir", state_dir, "--no-save"], "hi there\n");
    assert!(output.status.success());
    assert!(!dir.path().join("cognitive_state.json").exists());
    assert!(!dir.path().join("emotional_state.json").exists());
}
