/// Identity of one armed timer.
///
/// Every arming takes the next value, so a completion can always be traced
/// back to the request that produced it and stale work compares unequal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Hash)]
pub struct Generation(u64);

impl Generation {
    pub(crate) fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

/// What the render stage did with a submitted text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Submission {
    /// A new render was armed, superseding any render in flight.
    Armed(Generation),
    /// The same text is already in flight; its timer keeps running.
    AlreadyInFlight(Generation),
    /// Nothing in flight and the text is already rendered.
    UpToDate,
    /// The request does not apply in the current mode.
    Ignored,
}

/// How the edit session routed a user edit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputRoute {
    /// Held by the debouncer until the quiet period elapses.
    Debounced(Generation),
    /// Written straight into the text buffer.
    Direct,
    /// The session is closed.
    Dropped,
}

/// Effects produced by one [`crate::session::EditSession::tick`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TickOutcome {
    /// A debounced edit reached the text buffer.
    pub committed: bool,
    /// The checkpoint was refreshed by autosave.
    pub autosaved: bool,
    /// A render completed and replaced the rendered content.
    pub rendered: bool,
}

impl TickOutcome {
    pub fn is_idle(&self) -> bool {
        !(self.committed || self.autosaved || self.rendered)
    }
}
