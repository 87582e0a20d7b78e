//! Debounce Scheduler
//!
//! Coalesces rapid successive values into one delivery after a quiet period.
//! Only one value is ever pending; scheduling replaces it and restarts the
//! quiet period.

use std::time::{Duration, Instant};

use super::types::Generation;

#[derive(Debug)]
struct Pending<T> {
    value: T,
    generation: Generation,
    armed_at: Instant,
    deadline: Instant,
}

/// A value delivered by the debouncer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fired<T> {
    pub value: T,
    pub generation: Generation,
    /// The instant the quiet period ended, which may precede the poll time.
    pub at: Instant,
}

/// Single-slot debouncer driven by explicit instants
#[derive(Debug)]
pub struct Debouncer<T> {
    quiet_period: Duration,
    generation: Generation,
    pending: Option<Pending<T>>,
}

impl<T> Debouncer<T> {
    pub fn new(quiet_period: Duration) -> Self {
        Self {
            quiet_period,
            generation: Generation::default(),
            pending: None,
        }
    }

    pub fn quiet_period(&self) -> Duration {
        self.quiet_period
    }

    /// Arm a delivery of `value` one quiet period after `now`, discarding
    /// whatever was pending.
    pub fn schedule(&mut self, value: T, now: Instant) -> Generation {
        self.generation = self.generation.next();
        if let Some(previous) = self.pending.take() {
            log::trace!(
                "debounce: generation {} superseded by {}",
                previous.generation.get(),
                self.generation.get()
            );
        }

        self.pending = Some(Pending {
            value,
            generation: self.generation,
            armed_at: now,
            deadline: now + self.quiet_period,
        });
        self.generation
    }

    /// Deliver the pending value if its quiet period has elapsed by `now`
    pub fn poll(&mut self, now: Instant) -> Option<Fired<T>> {
        match &self.pending {
            Some(pending) if pending.deadline <= now => {}
            _ => return None,
        }

        self.pending.take().map(|pending| Fired {
            value: pending.value,
            generation: pending.generation,
            at: pending.deadline,
        })
    }

    /// Drop the pending value without delivering it.
    ///
    /// Returns whether anything was pending.
    pub fn cancel(&mut self) -> bool {
        self.pending.take().is_some()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|p| p.deadline)
    }

    pub(crate) fn armed_at(&self) -> Option<Instant> {
        self.pending.as_ref().map(|p| p.armed_at)
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn pending_value(&self) -> Option<&T> {
        self.pending.as_ref().map(|p| &p.value)
    }

    /// Generation of the most recent `schedule` call
    pub fn generation(&self) -> Generation {
        self.generation
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const QUIET: Duration = Duration::from_millis(300);

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_single_call_fires_once_after_quiet_period() {
        let t0 = Instant::now();
        let mut debouncer = Debouncer::new(QUIET);
        assert_eq!(debouncer.quiet_period(), QUIET);

        debouncer.schedule("v", t0);
        assert_eq!(debouncer.poll(t0 + ms(299)), None);

        let fired = debouncer.poll(t0 + ms(300)).expect("fires");
        assert_eq!(fired.value, "v");
        assert_eq!(fired.at, t0 + ms(300));

        assert_eq!(debouncer.poll(t0 + ms(1000)), None);
        assert!(!debouncer.is_pending());
    }

    #[test]
    fn test_rapid_calls_coalesce_to_last_value() {
        let t0 = Instant::now();
        let mut debouncer = Debouncer::new(QUIET);

        for (i, value) in ["h", "he", "hel", "hell", "hello"].into_iter().enumerate() {
            let now = t0 + ms(50 * i as u64);
            assert_eq!(debouncer.poll(now), None);
            debouncer.schedule(value, now);
        }

        assert_eq!(debouncer.poll(t0 + ms(499)), None);
        let fired = debouncer.poll(t0 + ms(500)).expect("fires");
        assert_eq!(fired.value, "hello");
        assert_eq!(fired.generation, debouncer.generation());
    }

    #[test]
    fn test_late_poll_reports_deadline() {
        let t0 = Instant::now();
        let mut debouncer = Debouncer::new(QUIET);

        debouncer.schedule(1, t0);
        let fired = debouncer.poll(t0 + ms(900)).expect("fires");
        assert_eq!(fired.at, t0 + QUIET);
    }

    #[test]
    fn test_cancel_never_delivers() {
        let t0 = Instant::now();
        let mut debouncer = Debouncer::new(QUIET);

        debouncer.schedule(7, t0);
        assert!(debouncer.cancel());
        assert!(!debouncer.cancel());
        assert_eq!(debouncer.deadline(), None);
        assert_eq!(debouncer.poll(t0 + ms(1000)), None);
    }

    #[test]
    fn test_generation_increases_per_schedule() {
        let t0 = Instant::now();
        let mut debouncer = Debouncer::new(QUIET);

        let first = debouncer.schedule('a', t0);
        let second = debouncer.schedule('b', t0);
        assert!(second > first);
        assert_eq!(debouncer.pending_value(), Some(&'b'));
    }
}
