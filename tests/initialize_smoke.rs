use std::io::Write;
use std::process::{Command, Output, Stdio};
use std::sync::mpsc;
use std::time::Duration;

use serde_json::Value;
use tempfile::NamedTempFile;

const PROCESS_TIMEOUT: Duration = Duration::from_secs(10);

#[test]
fn initialize_smoke() {
    // An empty config file keeps the user's own settings out of the test
    let config = NamedTempFile::new().expect("Failed to create config file");

    let output = run_mdpv(
        &["--config", config.path().to_str().expect("utf-8 path")],
        ":status\n:quit\n",
    );
    assert!(
        output.status.success(),
        "mdpv exited with {:?}\nstderr: {}",
        output.status,
        String::from_utf8_lossy(&output.stderr)
    );

    let stdout = String::from_utf8(output.stdout).expect("stdout should be UTF-8");
    assert!(
        stdout.contains("<h1>Welcome to mdpv</h1>"),
        "Welcome document was not rendered:\n{}",
        stdout
    );

    let status = find_status_line(&stdout).expect("`:status` should print a JSON status line");
    validate_status(&status);
}

#[test]
fn unknown_commands_do_not_stop_the_preview() {
    let config = NamedTempFile::new().expect("Failed to create config file");

    let output = run_mdpv(
        &["--config", config.path().to_str().expect("utf-8 path")],
        ":frobnicate\n:status\n:quit\n",
    );
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).expect("stdout should be UTF-8");
    assert!(find_status_line(&stdout).is_some());

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("unknown command ':frobnicate'"),
        "stderr: {}",
        stderr
    );
}

fn run_mdpv(args: &[&str], input: &str) -> Output {
    let bin_path =
        std::env::var("CARGO_BIN_EXE_mdpv").unwrap_or_else(|_| "target/debug/mdpv".to_string());

    let mut child = Command::new(bin_path)
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .env("RUST_LOG", "warn")
        .spawn()
        .expect("Failed to spawn mdpv");

    {
        let stdin = child
            .stdin
            .as_mut()
            .expect("Child stdin should be available");
        stdin
            .write_all(input.as_bytes())
            .expect("Failed to write controls");
    }
    drop(child.stdin.take());

    let (tx, rx) = mpsc::channel();
    std::thread::spawn(move || {
        let _ = tx.send(child.wait_with_output());
    });

    rx.recv_timeout(PROCESS_TIMEOUT)
        .expect("Timeout waiting for mdpv to exit")
        .expect("Failed to collect mdpv output")
}

fn find_status_line(stdout: &str) -> Option<Value> {
    stdout
        .lines()
        .filter(|line| line.starts_with('{'))
        .find_map(|line| serde_json::from_str::<Value>(line).ok())
}

fn validate_status(status: &Value) {
    assert!(
        status.get("chars").and_then(Value::as_u64).unwrap_or(0) > 0,
        "Status should count the welcome text: {}",
        status
    );
    assert_eq!(status.get("lines").and_then(Value::as_u64), Some(4));
    assert_eq!(
        status.get("live_preview").and_then(Value::as_bool),
        Some(true)
    );
    assert_eq!(status.get("auto_save").and_then(Value::as_bool), Some(true));
    assert_eq!(status.get("unsaved").and_then(Value::as_bool), Some(false));
}
