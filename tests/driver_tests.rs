//! The async driver under a paused tokio clock
use std::sync::Arc;
use std::time::Duration;

use markdown_preview::{
    ComrakRenderer, DisplayState, EditSession, PreviewRenderer, SessionCommand, SessionSettings,
    spawn_session,
};
use tokio::time::sleep;

fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

fn settings(live_preview: bool, auto_save: bool) -> SessionSettings {
    SessionSettings {
        live_preview,
        auto_save,
        ..SessionSettings::default()
    }
}

fn displayed_text(display: &DisplayState) -> Option<String> {
    display.document().map(|doc| doc.plain_text())
}

#[tokio::test(start_paused = true)]
async fn test_rapid_typing_through_driver() {
    let handle = spawn_session(
        EditSession::new("hello", &settings(true, false)),
        PreviewRenderer::new(ComrakRenderer::new()),
    );

    let initial = handle.snapshot();
    assert_eq!(displayed_text(&initial.display).as_deref(), Some("hello"));
    assert_eq!(initial.render_generation.get(), 0);

    for text in ["hello w", "hello wo", "hello wor", "hello worl", "hello world"] {
        handle
            .send(SessionCommand::Input(text.to_string()))
            .expect("send");
        sleep(ms(50)).await;
    }

    // t = 450: the quiet period after the last keystroke has not ended
    sleep(ms(200)).await;
    let snapshot = handle.snapshot();
    assert_eq!(snapshot.status.chars, 5);
    assert!(!snapshot.display.is_pending());

    // t = 550: committed at 500, render in flight
    sleep(ms(100)).await;
    let snapshot = handle.snapshot();
    assert_eq!(snapshot.status.chars, 11);
    assert!(snapshot.status.rendering);
    assert!(snapshot.display.is_pending());

    // t = 650: rendered at 600
    sleep(ms(100)).await;
    let snapshot = handle.snapshot();
    assert_eq!(
        displayed_text(&snapshot.display).as_deref(),
        Some("hello world")
    );
    assert!(snapshot.render_generation.get() > 0);

    let session = handle.shutdown().await.expect("shutdown");
    assert_eq!(session.text(), "hello world");
    assert_eq!(session.checkpoint(), "hello");
}

#[tokio::test(start_paused = true)]
async fn test_manual_update_and_save_through_driver() {
    let handle = spawn_session(
        EditSession::new("prior", &settings(false, false)),
        PreviewRenderer::new(ComrakRenderer::new()),
    );
    let sender = handle.sender();

    sender.input("# Title").expect("send");
    sleep(ms(500)).await;
    let snapshot = handle.snapshot();
    assert_eq!(snapshot.status.chars, 7);
    assert_eq!(displayed_text(&snapshot.display).as_deref(), Some("prior"));

    sender.update_preview().expect("send");
    sleep(ms(50)).await;
    assert!(handle.snapshot().display.is_pending());

    sleep(ms(60)).await;
    let snapshot = handle.snapshot();
    let document = snapshot.display.document().expect("document");
    assert_eq!(document.headings(), vec![(1, "Title".to_string())]);
    assert!(snapshot.status.unsaved);

    sender.save().expect("send");
    sleep(ms(1)).await;
    let snapshot = handle.snapshot();
    assert_eq!(snapshot.checkpoint, "# Title");
    assert!(!snapshot.status.unsaved);

    handle.shutdown().await.expect("shutdown");
}

#[tokio::test(start_paused = true)]
async fn test_autosave_through_driver() {
    let handle = spawn_session(
        EditSession::new("", &settings(true, true)),
        PreviewRenderer::new(ComrakRenderer::new()),
    );

    handle.sender().input("draft").expect("send");
    sleep(ms(350)).await;
    assert_eq!(handle.snapshot().checkpoint, "draft");

    handle.sender().set_auto_save(false).expect("send");
    handle.sender().input("draft 2").expect("send");
    sleep(ms(350)).await;
    assert_eq!(handle.snapshot().checkpoint, "draft");

    handle.shutdown().await.expect("shutdown");
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_cancels_pending_work() {
    let handle = spawn_session(
        EditSession::new("kept", &settings(true, true)),
        PreviewRenderer::new(ComrakRenderer::new()),
    );
    let sender = handle.sender();

    sender.input("never committed").expect("send");
    sleep(ms(10)).await;

    let session = handle.shutdown().await.expect("shutdown");
    assert!(session.is_closed());
    assert_eq!(session.pending_input(), None);
    assert_eq!(session.next_deadline(), None);
    assert_eq!(session.text(), "kept");
    assert_eq!(session.checkpoint(), "kept");

    assert!(sender.is_closed());
    assert!(sender.input("too late").is_err());
}

#[tokio::test(start_paused = true)]
async fn test_render_failure_keeps_previous_document() {
    let renderer = ComrakRenderer::new().with_max_input_bytes(Some(16));
    let handle = spawn_session(
        EditSession::new("short", &settings(true, false)),
        PreviewRenderer::new(renderer),
    );
    let before = handle
        .snapshot()
        .display
        .document()
        .cloned()
        .expect("document");

    handle
        .sender()
        .input("this text is far too long to render")
        .expect("send");
    sleep(ms(500)).await;

    let snapshot = handle.snapshot();
    let after = snapshot.display.document().expect("document");
    assert!(Arc::ptr_eq(&before, after));
    assert_eq!(snapshot.status.chars, 35);

    handle.shutdown().await.expect("shutdown");
}

#[tokio::test(start_paused = true)]
async fn test_subscribers_see_loading_then_document() {
    let handle = spawn_session(
        EditSession::new("", &settings(true, false)),
        PreviewRenderer::new(ComrakRenderer::new()),
    );
    let mut updates = handle.subscribe();

    handle.sender().input("*hi*").expect("send");

    // committed at 300: the render is in flight
    updates.changed().await.expect("changed");
    assert!(updates.borrow_and_update().display.is_pending());

    // rendered at 400
    updates.changed().await.expect("changed");
    let display = updates.borrow_and_update().display.clone();
    assert_eq!(displayed_text(&display).as_deref(), Some("hi"));

    handle.shutdown().await.expect("shutdown");
}
