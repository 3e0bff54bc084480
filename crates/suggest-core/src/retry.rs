#![forbid(unsafe_code)]

//! Bounded exponential backoff.
//!
//! Page content that the component binds to may render after the component
//! is constructed. Initialization is therefore retried a bounded number of
//! times with growing delays before giving up for good.

use std::time::Duration;

/// Retry schedule: `initial_delay * multiplier^n`, capped at `max_delay`,
/// for at most `max_attempts` attempts in total (the first one included).
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Total attempts including the first. Zero behaves like one.
    pub max_attempts: u32,
    /// Delay before the second attempt.
    pub initial_delay: Duration,
    /// Growth factor between consecutive delays. Values below 1 are treated as 1.
    pub multiplier: f64,
    /// Upper bound for any single delay.
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            initial_delay: Duration::from_millis(100),
            multiplier: 2.0,
            max_delay: Duration::from_secs(2),
        }
    }
}

impl RetryPolicy {
    /// A policy that never retries.
    #[must_use]
    pub fn once() -> Self {
        Self {
            max_attempts: 1,
            ..Self::default()
        }
    }

    /// Delay to wait after failed attempt number `attempt` (1-based), or
    /// `None` when the attempt budget is exhausted.
    #[must_use]
    pub fn delay_after(&self, attempt: u32) -> Option<Duration> {
        if attempt == 0 || attempt >= self.max_attempts.max(1) {
            return None;
        }
        let factor = self.multiplier.max(1.0).powi(attempt.saturating_sub(1) as i32);
        let millis = self.initial_delay.as_secs_f64() * 1000.0 * factor;
        let cap = self.max_delay.as_secs_f64() * 1000.0;
        let millis = if millis.is_finite() { millis.min(cap) } else { cap };
        Some(Duration::from_micros((millis * 1000.0).round() as u64))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_schedule_doubles() {
        let p = RetryPolicy::default();
        assert_eq!(p.delay_after(1), Some(Duration::from_millis(100)));
        assert_eq!(p.delay_after(2), Some(Duration::from_millis(200)));
        assert_eq!(p.delay_after(3), Some(Duration::from_millis(400)));
        assert_eq!(p.delay_after(4), Some(Duration::from_millis(800)));
        assert_eq!(p.delay_after(5), None);
    }

    #[test]
    fn delay_is_capped() {
        let p = RetryPolicy {
            max_attempts: 20,
            max_delay: Duration::from_millis(300),
            ..RetryPolicy::default()
        };
        assert_eq!(p.delay_after(10), Some(Duration::from_millis(300)));
    }

    #[test]
    fn once_never_retries() {
        assert_eq!(RetryPolicy::once().delay_after(1), None);
    }

    #[test]
    fn zero_attempts_behaves_like_one() {
        let p = RetryPolicy {
            max_attempts: 0,
            ..RetryPolicy::default()
        };
        assert_eq!(p.delay_after(1), None);
    }

    #[test]
    fn shrinking_multiplier_is_clamped() {
        let p = RetryPolicy {
            multiplier: 0.5,
            ..RetryPolicy::default()
        };
        assert_eq!(p.delay_after(3), Some(Duration::from_millis(100)));
    }
}
