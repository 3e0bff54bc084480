#![forbid(unsafe_code)]

//! Debounced scheduling on a host-driven clock.
//!
//! A [`Debouncer`] holds at most one pending payload. Scheduling again
//! supersedes whatever was pending, so a burst of events collapses into a
//! single delivery once the burst has been quiet for `delay`.
//!
//! Time never advances on its own: callers pass the current monotonic time
//! into every method, and the host arms one timer for [`Debouncer::deadline`].
//!
//! # Usage
//!
//! ```
//! use std::time::Duration;
//! use suggest_core::debounce::Debouncer;
//!
//! let mut d = Debouncer::new();
//! let ms = Duration::from_millis;
//!
//! d.schedule("pa", ms(0), ms(100));
//! d.schedule("par", ms(40), ms(100)); // supersedes "pa"
//!
//! assert_eq!(d.poll(ms(120)), None);
//! assert_eq!(d.poll(ms(140)), Some("par"));
//! assert_eq!(d.poll(ms(500)), None);
//! ```

use std::time::Duration;

/// A single-slot, superseding scheduler.
#[derive(Debug, Clone)]
pub struct Debouncer<T> {
    pending: Option<Pending<T>>,
    superseded: u64,
}

#[derive(Debug, Clone)]
struct Pending<T> {
    payload: T,
    due: Duration,
}

impl<T> Default for Debouncer<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Debouncer<T> {
    /// Create an idle debouncer.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            pending: None,
            superseded: 0,
        }
    }

    /// Schedule `payload` to become due at `now + delay`, replacing any
    /// pending payload.
    pub fn schedule(&mut self, payload: T, now: Duration, delay: Duration) {
        if self.pending.is_some() {
            self.superseded = self.superseded.saturating_add(1);
        }
        let due = now.saturating_add(delay);
        tracing::trace!(due_ms = due.as_millis() as u64, "debounce scheduled");
        self.pending = Some(Pending { payload, due });
    }

    /// Drop the pending payload, if any. Returns whether one was pending.
    pub fn cancel_pending(&mut self) -> bool {
        self.pending.take().is_some()
    }

    /// Take the pending payload if it is due at `now`.
    pub fn poll(&mut self, now: Duration) -> Option<T> {
        match &self.pending {
            Some(p) if p.due <= now => self.pending.take().map(|p| p.payload),
            _ => None,
        }
    }

    /// When the pending payload becomes due.
    #[must_use]
    pub fn deadline(&self) -> Option<Duration> {
        self.pending.as_ref().map(|p| p.due)
    }

    /// Whether a payload is waiting.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// How many scheduled payloads were replaced before they fired.
    #[must_use]
    pub fn superseded_count(&self) -> u64 {
        self.superseded
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn new_debouncer_is_idle() {
        let d: Debouncer<()> = Debouncer::new();
        assert!(!d.is_pending());
        assert_eq!(d.deadline(), None);
    }

    #[test]
    fn fires_once_when_due() {
        let mut d = Debouncer::new();
        d.schedule(1, ms(10), ms(100));
        assert_eq!(d.deadline(), Some(ms(110)));
        assert_eq!(d.poll(ms(109)), None);
        assert_eq!(d.poll(ms(110)), Some(1));
        assert_eq!(d.poll(ms(111)), None);
        assert!(!d.is_pending());
    }

    #[test]
    fn later_schedule_supersedes_and_pushes_deadline() {
        let mut d = Debouncer::new();
        d.schedule("a", ms(0), ms(100));
        d.schedule("b", ms(80), ms(100));
        assert_eq!(d.superseded_count(), 1);
        assert_eq!(d.poll(ms(100)), None);
        assert_eq!(d.poll(ms(180)), Some("b"));
    }

    #[test]
    fn cancel_drops_pending() {
        let mut d = Debouncer::new();
        d.schedule((), ms(0), ms(50));
        assert!(d.cancel_pending());
        assert!(!d.cancel_pending());
        assert_eq!(d.poll(ms(1000)), None);
    }

    #[test]
    fn zero_delay_is_due_immediately() {
        let mut d = Debouncer::new();
        d.schedule(7, ms(5), Duration::ZERO);
        assert_eq!(d.poll(ms(5)), Some(7));
    }

    #[test]
    fn deadline_saturates() {
        let mut d = Debouncer::new();
        d.schedule((), Duration::MAX, ms(1));
        assert_eq!(d.deadline(), Some(Duration::MAX));
    }
}
