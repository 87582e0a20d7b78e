use std::time::Instant;

use tokio::sync::{mpsc, watch};
use tokio::time;

use super::command::{SessionCommand, Snapshot};
use super::handle::{SessionHandle, SessionSender};
use crate::preview::PreviewRenderer;
use crate::render::Render;
use crate::session::EditSession;

/// Run `session` on its own task.
///
/// The task owns the session and the preview, so every transition happens on
/// one queue: commands and timer expiries are handled strictly one at a time.
pub fn spawn_session<R>(session: EditSession, preview: PreviewRenderer<R>) -> SessionHandle
where
    R: Render + Send + 'static,
{
    let (command_tx, command_rx) = mpsc::unbounded_channel();
    let mut worker = Worker { session, preview };
    let (snapshot_tx, snapshot_rx) = watch::channel(worker.snapshot());

    let task = tokio::spawn(worker.run(command_rx, snapshot_tx));
    SessionHandle::new(SessionSender::new(command_tx), snapshot_rx, task)
}

struct Worker<R> {
    session: EditSession,
    preview: PreviewRenderer<R>,
}

impl<R: Render> Worker<R> {
    async fn run(
        mut self,
        mut commands: mpsc::UnboundedReceiver<SessionCommand>,
        snapshots: watch::Sender<Snapshot>,
    ) -> EditSession {
        loop {
            let deadline = self.session.next_deadline();

            tokio::select! {
                biased;

                _ = sleep_until(deadline) => {
                    self.session.tick(now());
                }
                command = commands.recv() => match command {
                    Some(SessionCommand::Shutdown) | None => break,
                    Some(command) => self.apply(command),
                },
            }

            self.publish(&snapshots);
        }

        // Timers must not outlive the session.
        self.session.close();
        self.publish(&snapshots);
        self.session
    }

    fn apply(&mut self, command: SessionCommand) {
        let now = now();
        // Anything already due happened before this command arrived.
        self.session.tick(now);

        match command {
            SessionCommand::Input(text) => {
                self.session.on_user_input(text, now);
            }
            SessionCommand::SetLivePreview(enabled) => {
                self.session.on_toggle_live_preview(enabled, now);
            }
            SessionCommand::SetAutoSave(enabled) => self.session.on_toggle_auto_save(enabled),
            SessionCommand::Save => self.session.on_manual_save(),
            SessionCommand::UpdatePreview => {
                self.session.on_manual_update_preview(now);
            }
            SessionCommand::Shutdown => {}
        }
    }

    fn snapshot(&mut self) -> Snapshot {
        let display = self
            .preview
            .present(self.session.rendered_content(), self.session.is_loading());

        Snapshot {
            display,
            status: self.session.status(),
            checkpoint: self.session.checkpoint().to_string(),
            render_generation: self.session.rendered_generation(),
        }
    }

    fn publish(&mut self, snapshots: &watch::Sender<Snapshot>) {
        let snapshot = self.snapshot();
        snapshots.send_if_modified(|current| {
            if *current == snapshot {
                return false;
            }
            *current = snapshot;
            true
        });
    }
}

fn now() -> Instant {
    time::Instant::now().into_std()
}

async fn sleep_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => time::sleep_until(time::Instant::from_std(deadline)).await,
        None => std::future::pending().await,
    }
}
