//! File Input
//!
//! Watches the edited file and forwards its full contents to the session on
//! every modification, one whole-buffer edit per change.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::driver::SessionSender;

#[derive(Debug)]
enum WatcherEvent {
    FileChanged,
    WatcherError(notify::Error),
}

/// A running file watcher; dropping it stops the forwarding
pub struct FileInput {
    _watcher: RecommendedWatcher,
    task: JoinHandle<()>,
}

impl FileInput {
    /// Whether forwarding has stopped, e.g. because the session shut down
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

/// Watch `path` and send its contents to `sender` whenever it changes.
///
/// `current` is the text the session was opened with; a change that leaves
/// the file equal to the last forwarded text is not forwarded again.
pub fn watch_file(path: &Path, current: String, sender: SessionSender) -> Result<FileInput> {
    let path = path.to_path_buf();
    let file_name = path
        .file_name()
        .map(OsString::from)
        .with_context(|| format!("Not a file path: {}", path.display()))?;

    let (tx, rx) = mpsc::unbounded_channel();
    let mut watcher = RecommendedWatcher::new(
        move |res: Result<Event, notify::Error>| match res {
            Ok(event) => {
                if let EventKind::Create(_) | EventKind::Modify(_) = event.kind
                    && event
                        .paths
                        .iter()
                        .any(|p| p.file_name() == Some(file_name.as_os_str()))
                {
                    let _ = tx.send(WatcherEvent::FileChanged);
                }
            }
            Err(e) => {
                let _ = tx.send(WatcherEvent::WatcherError(e));
            }
        },
        Config::default().with_poll_interval(Duration::from_secs(1)),
    )?;

    // Editors commonly save by replacing the file, so watch the directory.
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    watcher
        .watch(&dir, RecursiveMode::NonRecursive)
        .with_context(|| format!("Failed to watch directory: {}", dir.display()))?;
    log::info!("watching {}", path.display());

    let task = tokio::spawn(forward_changes(path, current, rx, sender));

    Ok(FileInput {
        _watcher: watcher,
        task,
    })
}

async fn forward_changes(
    path: PathBuf,
    mut last_sent: String,
    mut events: mpsc::UnboundedReceiver<WatcherEvent>,
    sender: SessionSender,
) {
    while let Some(event) = events.recv().await {
        match event {
            WatcherEvent::FileChanged => {
                let text = match tokio::fs::read_to_string(&path).await {
                    Ok(text) => text,
                    Err(e) => {
                        log::warn!("Failed to read {}: {}", path.display(), e);
                        continue;
                    }
                };
                if text == last_sent {
                    continue;
                }

                log::debug!("{} changed ({} bytes)", path.display(), text.len());
                if sender.input(text.clone()).is_err() {
                    break;
                }
                last_sent = text;
            }
            WatcherEvent::WatcherError(e) => {
                log::error!("File watcher error: {}", e);
            }
        }
    }
}
