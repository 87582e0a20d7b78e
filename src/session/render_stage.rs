//! Async Render Stage
//!
//! Stands in for an off-thread render pass. A submitted text enters the
//! loading state and becomes the rendered content once the render delay has
//! elapsed. Only one render is ever in flight, so a completion can never
//! overwrite newer content.

use std::sync::Arc;
use std::time::{Duration, Instant};

use super::types::{Generation, Submission};

#[derive(Debug)]
struct InFlight {
    text: Arc<str>,
    generation: Generation,
    armed_at: Instant,
    deadline: Instant,
}

/// Owner of the rendered content and the loading flag
#[derive(Debug)]
pub struct RenderStage {
    delay: Duration,
    generation: Generation,
    rendered: Arc<str>,
    rendered_generation: Generation,
    in_flight: Option<InFlight>,
}

impl RenderStage {
    /// Create a stage whose content is already `initial`, with nothing loading
    pub fn new(initial: impl Into<Arc<str>>, delay: Duration) -> Self {
        Self {
            delay,
            generation: Generation::default(),
            rendered: initial.into(),
            rendered_generation: Generation::default(),
            in_flight: None,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Start rendering `text`, superseding any render in flight.
    ///
    /// Resubmitting the text already in flight keeps the running timer, and
    /// resubmitting the rendered text while idle does nothing.
    pub fn submit(&mut self, text: &str, now: Instant) -> Submission {
        if self.in_flight.is_none() && *self.rendered == *text {
            return Submission::UpToDate;
        }
        self.submit_change(text, now)
    }

    /// Start rendering `text` after it replaced the text buffer.
    ///
    /// Unlike [`Self::submit`] this opens a loading episode even when `text`
    /// equals the rendered content; only the same text in flight is suppressed.
    pub fn submit_change(&mut self, text: &str, now: Instant) -> Submission {
        if let Some(in_flight) = &self.in_flight
            && *in_flight.text == *text
        {
            return Submission::AlreadyInFlight(in_flight.generation);
        }

        self.generation = self.generation.next();
        if let Some(stale) = self.in_flight.take() {
            log::debug!(
                "render: generation {} superseded by {}",
                stale.generation.get(),
                self.generation.get()
            );
        }

        self.in_flight = Some(InFlight {
            text: Arc::from(text),
            generation: self.generation,
            armed_at: now,
            deadline: now + self.delay,
        });
        Submission::Armed(self.generation)
    }

    /// Complete the render in flight if its delay has elapsed by `now`.
    ///
    /// Returns whether the rendered content changed hands.
    pub fn poll(&mut self, now: Instant) -> bool {
        match &self.in_flight {
            Some(in_flight) if in_flight.deadline <= now => {}
            _ => return false,
        }

        let Some(done) = self.in_flight.take() else {
            return false;
        };
        log::debug!(
            "render: generation {} completed ({} bytes)",
            done.generation.get(),
            done.text.len()
        );
        self.rendered = done.text;
        self.rendered_generation = done.generation;
        true
    }

    /// Abandon the render in flight; rendered content is left untouched.
    pub fn cancel(&mut self) -> bool {
        self.in_flight.take().is_some()
    }

    pub fn rendered(&self) -> &Arc<str> {
        &self.rendered
    }

    /// Generation of the render that produced the current content.
    ///
    /// Zero for the initial content.
    pub fn rendered_generation(&self) -> Generation {
        self.rendered_generation
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn in_flight_text(&self) -> Option<&str> {
        self.in_flight.as_ref().map(|f| &*f.text)
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.in_flight.as_ref().map(|f| f.deadline)
    }

    pub(crate) fn armed_at(&self) -> Option<Instant> {
        self.in_flight.as_ref().map(|f| f.armed_at)
    }
}
