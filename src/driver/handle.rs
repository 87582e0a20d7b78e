use anyhow::{Context, Result, anyhow};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

use super::command::{SessionCommand, Snapshot};
use crate::session::EditSession;

/// Cloneable sending side of a running session
#[derive(Debug, Clone)]
pub struct SessionSender {
    commands: mpsc::UnboundedSender<SessionCommand>,
}

impl SessionSender {
    pub(super) fn new(commands: mpsc::UnboundedSender<SessionCommand>) -> Self {
        Self { commands }
    }

    /// Queue a command; fails only once the session has shut down
    pub fn send(&self, command: SessionCommand) -> Result<()> {
        self.commands
            .send(command)
            .map_err(|_| anyhow!("edit session has shut down"))
    }

    pub fn input(&self, text: impl Into<String>) -> Result<()> {
        self.send(SessionCommand::Input(text.into()))
    }

    pub fn set_live_preview(&self, enabled: bool) -> Result<()> {
        self.send(SessionCommand::SetLivePreview(enabled))
    }

    pub fn set_auto_save(&self, enabled: bool) -> Result<()> {
        self.send(SessionCommand::SetAutoSave(enabled))
    }

    pub fn save(&self) -> Result<()> {
        self.send(SessionCommand::Save)
    }

    pub fn update_preview(&self) -> Result<()> {
        self.send(SessionCommand::UpdatePreview)
    }

    pub fn is_closed(&self) -> bool {
        self.commands.is_closed()
    }
}

/// Owner handle for a session spawned with [`super::spawn_session`]
#[derive(Debug)]
pub struct SessionHandle {
    sender: SessionSender,
    snapshots: watch::Receiver<Snapshot>,
    task: JoinHandle<EditSession>,
}

impl SessionHandle {
    pub(super) fn new(
        sender: SessionSender,
        snapshots: watch::Receiver<Snapshot>,
        task: JoinHandle<EditSession>,
    ) -> Self {
        Self {
            sender,
            snapshots,
            task,
        }
    }

    pub fn sender(&self) -> SessionSender {
        self.sender.clone()
    }

    pub fn send(&self, command: SessionCommand) -> Result<()> {
        self.sender.send(command)
    }

    /// Latest published snapshot
    pub fn snapshot(&self) -> Snapshot {
        self.snapshots.borrow().clone()
    }

    /// Receiver notified whenever the snapshot changes
    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.snapshots.clone()
    }

    /// Close the session and wait for its task.
    ///
    /// Pending timers are cancelled; the closed session is returned for
    /// inspection.
    pub async fn shutdown(self) -> Result<EditSession> {
        // The task may already have stopped because every sender was dropped.
        let _ = self.sender.send(SessionCommand::Shutdown);
        self.task.await.context("edit session task failed")
    }
}
