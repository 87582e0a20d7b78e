//! Edit Session
//!
//! Owns the text buffer, both mode toggles and the checkpoint, and routes
//! every user action to the debouncer or the render stage. All timing is
//! driven through explicit instants; see [`EditSession::tick`].

use std::sync::Arc;
use std::time::Instant;

use super::debounce::{Debouncer, Fired};
use super::render_stage::RenderStage;
use super::status::StatusLine;
use super::types::{Generation, InputRoute, Submission, TickOutcome};
use crate::config::{LivePreviewResume, SessionSettings};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum TimerKind {
    Debounce,
    Render,
}

/// The edit-to-render state machine for one editing surface
#[derive(Debug)]
pub struct EditSession {
    text: String,
    checkpoint: String,
    live_preview: bool,
    auto_save: bool,
    resume: LivePreviewResume,
    debouncer: Debouncer<String>,
    render: RenderStage,
    closed: bool,
}

impl EditSession {
    /// Open a session on `initial`.
    ///
    /// The checkpoint and the rendered content both start out equal to the
    /// initial text, and nothing is loading.
    pub fn new(initial: impl Into<String>, settings: &SessionSettings) -> Self {
        let text = initial.into();
        log::info!(
            "session opened ({} bytes, live preview {}, autosave {})",
            text.len(),
            settings.live_preview,
            settings.auto_save
        );

        Self {
            checkpoint: text.clone(),
            render: RenderStage::new(text.as_str(), settings.render_delay),
            debouncer: Debouncer::new(settings.quiet_period),
            text,
            live_preview: settings.live_preview,
            auto_save: settings.auto_save,
            resume: settings.live_preview_resume,
            closed: false,
        }
    }

    /// A full-buffer edit from the user.
    ///
    /// With live preview on, the edit waits out the quiet period before it
    /// reaches the buffer. With live preview off, it is written immediately
    /// and supersedes any edit still held by the debouncer; nothing is
    /// rendered until [`Self::on_manual_update_preview`].
    pub fn on_user_input(&mut self, text: impl Into<String>, now: Instant) -> InputRoute {
        if self.reject_closed("user input") {
            return InputRoute::Dropped;
        }

        let text = text.into();
        if self.live_preview {
            let generation = self.debouncer.schedule(text, now);
            log::trace!("input debounced as generation {}", generation.get());
            InputRoute::Debounced(generation)
        } else {
            if self.debouncer.cancel() {
                log::debug!("direct edit superseded a pending debounced edit");
            }
            self.text = text;
            InputRoute::Direct
        }
    }

    /// Set the live preview toggle.
    ///
    /// A pending debounced edit is neither flushed nor discarded. Switching
    /// from off to on submits the buffer for rendering only under
    /// [`LivePreviewResume::RenderNow`].
    pub fn on_toggle_live_preview(&mut self, enabled: bool, now: Instant) -> Submission {
        if self.reject_closed("live preview toggle") {
            return Submission::Ignored;
        }

        let resumed = enabled && !self.live_preview;
        self.live_preview = enabled;
        log::info!("live preview {}", if enabled { "on" } else { "off" });

        if resumed && self.resume == LivePreviewResume::RenderNow {
            self.render.submit(&self.text, now)
        } else {
            Submission::Ignored
        }
    }

    pub fn on_toggle_auto_save(&mut self, enabled: bool) {
        if self.reject_closed("autosave toggle") {
            return;
        }
        self.auto_save = enabled;
        log::info!("autosave {}", if enabled { "on" } else { "off" });
    }

    /// Checkpoint the current buffer regardless of the autosave toggle
    pub fn on_manual_save(&mut self) {
        if self.reject_closed("save") {
            return;
        }
        self.checkpoint.clone_from(&self.text);
        log::info!("checkpoint saved ({} bytes)", self.checkpoint.len());
    }

    /// Submit the buffer for rendering while live preview is off.
    ///
    /// With live preview on the buffer is already submitted on every commit,
    /// so the request is ignored.
    pub fn on_manual_update_preview(&mut self, now: Instant) -> Submission {
        if self.reject_closed("preview update") || self.live_preview {
            return Submission::Ignored;
        }
        log::debug!("manual preview update requested");
        self.render.submit(&self.text, now)
    }

    /// Fire every timer that is due at `now`, in deadline order.
    ///
    /// Each timer takes effect at its own deadline, so a late tick produces
    /// the same state as a punctual one. On equal deadlines the timer armed
    /// first fires first.
    pub fn tick(&mut self, now: Instant) -> TickOutcome {
        let mut outcome = TickOutcome::default();
        if self.closed {
            return outcome;
        }

        while let Some(kind) = self.due_timer(now) {
            match kind {
                TimerKind::Debounce => {
                    let Some(fired) = self.debouncer.poll(now) else {
                        break;
                    };
                    self.commit_debounced(fired, &mut outcome);
                }
                TimerKind::Render => {
                    if !self.render.poll(now) {
                        break;
                    }
                    outcome.rendered = true;
                }
            }
        }

        outcome
    }

    /// Earliest instant at which [`Self::tick`] has work to do
    pub fn next_deadline(&self) -> Option<Instant> {
        match (self.debouncer.deadline(), self.render.deadline()) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// End the session, cancelling both timers.
    ///
    /// Every later transition is ignored.
    pub fn close(&mut self) {
        if self.closed {
            return;
        }
        let dropped_edit = self.debouncer.cancel();
        let dropped_render = self.render.cancel();
        self.closed = true;
        log::info!(
            "session closed (pending edit dropped: {}, render dropped: {})",
            dropped_edit,
            dropped_render
        );
    }

    fn commit_debounced(&mut self, fired: Fired<String>, outcome: &mut TickOutcome) {
        log::debug!(
            "debounced edit generation {} committed ({} bytes)",
            fired.generation.get(),
            fired.value.len()
        );
        let changed = fired.value != self.text;
        self.text = fired.value;
        outcome.committed = true;

        // Autosave follows the toggle as it stands when the quiet period ends.
        if self.auto_save {
            self.checkpoint.clone_from(&self.text);
            outcome.autosaved = true;
            log::info!("autosaved checkpoint ({} bytes)", self.checkpoint.len());
        }

        // A changed buffer always gets its own loading episode.
        if changed {
            self.render.submit_change(&self.text, fired.at);
        } else {
            self.render.submit(&self.text, fired.at);
        }
    }

    fn due_timer(&self, now: Instant) -> Option<TimerKind> {
        let debounce = self
            .debouncer
            .deadline()
            .zip(self.debouncer.armed_at())
            .map(|(deadline, armed_at)| (deadline, armed_at, TimerKind::Debounce));
        let render = self
            .render
            .deadline()
            .zip(self.render.armed_at())
            .map(|(deadline, armed_at)| (deadline, armed_at, TimerKind::Render));

        [debounce, render]
            .into_iter()
            .flatten()
            .filter(|(deadline, _, _)| *deadline <= now)
            .min()
            .map(|(_, _, kind)| kind)
    }

    fn reject_closed(&self, what: &str) -> bool {
        if self.closed {
            log::warn!("ignoring {} on a closed session", what);
        }
        self.closed
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn checkpoint(&self) -> &str {
        &self.checkpoint
    }

    pub fn live_preview(&self) -> bool {
        self.live_preview
    }

    pub fn auto_save(&self) -> bool {
        self.auto_save
    }

    pub fn rendered_content(&self) -> &Arc<str> {
        self.render.rendered()
    }

    pub fn rendered_generation(&self) -> Generation {
        self.render.rendered_generation()
    }

    pub fn is_loading(&self) -> bool {
        self.render.is_loading()
    }

    /// Edit held by the debouncer, not yet in the buffer
    pub fn pending_input(&self) -> Option<&str> {
        self.debouncer.pending_value().map(String::as_str)
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn status(&self) -> StatusLine {
        StatusLine::describe(
            &self.text,
            &self.checkpoint,
            self.live_preview,
            self.auto_save,
            self.render.is_loading(),
        )
    }
}
