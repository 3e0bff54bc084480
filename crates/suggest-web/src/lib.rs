#![forbid(unsafe_code)]

//! Host backends for the suggest autocomplete.
//!
//! Design goals:
//! - **Host-driven I/O**: the embedding environment forwards native events as
//!   canonical [`Event`](suggest_core::event::Event) values and advances time.
//! - **Deterministic time**: [`DeterministicClock`] is moved explicitly, so a
//!   test replays debounce and retry timing exactly.
//! - **One contract, two pages**: [`MemoryPage`] is an in-memory element
//!   arena for tests and headless embedding; on `wasm32`, [`DomHost`] maps
//!   the same [`Host`](suggest_core::host::Host) calls onto `web-sys`.

pub mod memory;

#[cfg(target_arch = "wasm32")]
pub mod dom;

#[cfg(target_arch = "wasm32")]
pub use dom::DomHost;
pub use memory::{Dispatched, ElementSpec, MemoryPage};

use core::time::Duration;

/// Deterministic monotonic clock controlled by the host.
#[derive(Debug, Default, Clone)]
pub struct DeterministicClock {
    now: Duration,
}

impl DeterministicClock {
    /// Create a clock starting at `0`.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            now: Duration::ZERO,
        }
    }

    /// Current monotonic time.
    #[must_use]
    pub const fn now(&self) -> Duration {
        self.now
    }

    /// Set current monotonic time. Moving backwards is ignored.
    pub fn set(&mut self, now: Duration) {
        self.now = self.now.max(now);
    }

    /// Advance by `dt` and return the new time.
    pub fn advance(&mut self, dt: Duration) -> Duration {
        self.now = self.now.saturating_add(dt);
        self.now
    }

    /// Advance by `ms` milliseconds and return the new time.
    pub fn advance_ms(&mut self, ms: u64) -> Duration {
        self.advance(Duration::from_millis(ms))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;

    #[test]
    fn deterministic_clock_advances_monotonically() {
        let mut c = DeterministicClock::new();
        assert_eq!(c.now(), Duration::ZERO);

        assert_eq!(c.advance_ms(10), Duration::from_millis(10));
        c.advance(Duration::from_millis(5));
        assert_eq!(c.now(), Duration::from_millis(15));

        c.set(Duration::from_millis(3));
        assert_eq!(c.now(), Duration::from_millis(15));

        // Saturation: don't panic or wrap.
        c.set(Duration::MAX);
        c.advance(Duration::from_secs(1));
        assert_eq!(c.now(), Duration::MAX);
    }
}
