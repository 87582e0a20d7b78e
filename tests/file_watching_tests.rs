//! Integration tests for forwarding file changes into a session
use std::path::Path;
use std::time::{Duration, Instant};

use markdown_preview::watch::watch_file;
use markdown_preview::{
    ComrakRenderer, EditSession, PreviewRenderer, SessionHandle, SessionSettings, spawn_session,
};
use tokio::fs;

const WATCH_TIMEOUT: Duration = Duration::from_secs(5);
const WATCH_SETTLE: Duration = Duration::from_millis(1500);

fn spawn(initial: &str, live_preview: bool) -> SessionHandle {
    let settings = SessionSettings {
        quiet_period: Duration::from_millis(20),
        render_delay: Duration::from_millis(10),
        live_preview,
        ..SessionSettings::default()
    };
    spawn_session(
        EditSession::new(initial, &settings),
        PreviewRenderer::new(ComrakRenderer::new()),
    )
}

/// Replace the file in one step, the way editors save
async fn replace_file(path: &Path, content: &str) {
    let staging = path.with_extension("md.tmp");
    fs::write(&staging, content)
        .await
        .expect("write staging file");
    fs::rename(&staging, path).await.expect("replace file");
}

async fn wait_for_chars(handle: &SessionHandle, chars: usize) -> bool {
    let start = Instant::now();
    while start.elapsed() < WATCH_TIMEOUT {
        if handle.snapshot().status.chars == chars {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    false
}

#[tokio::test]
async fn test_file_change_reaches_session() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let path = dir.path().join("notes.md");
    fs::write(&path, "start").await.expect("write initial file");

    let handle = spawn("start", true);
    let input = watch_file(&path, "start".to_string(), handle.sender()).expect("watch file");

    replace_file(&path, "# Changed on disk").await;
    assert!(
        wait_for_chars(&handle, 17).await,
        "file change should reach the session"
    );
    assert!(!input.is_finished());

    drop(input);
    let session = handle.shutdown().await.expect("shutdown");
    assert_eq!(session.text(), "# Changed on disk");
}

#[tokio::test]
async fn test_identical_rewrite_is_not_forwarded() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let path = dir.path().join("notes.md");
    fs::write(&path, "start").await.expect("write initial file");

    // The session holds different text, so any forwarded edit would show.
    let handle = spawn("session text", false);
    let input = watch_file(&path, "start".to_string(), handle.sender()).expect("watch file");

    replace_file(&path, "start").await;
    tokio::time::sleep(WATCH_SETTLE).await;
    assert_eq!(handle.snapshot().status.chars, 12);

    // The watcher is live: a real change still gets through.
    replace_file(&path, "next").await;
    assert!(
        wait_for_chars(&handle, 4).await,
        "changed contents should be forwarded"
    );

    drop(input);
    handle.shutdown().await.expect("shutdown");
}
