#![forbid(unsafe_code)]

//! Content-change subscription.
//!
//! A [`ContentWatcher`] owns one host mutation subscription and turns the
//! resulting storm of [`Event::Mutation`](crate::event::Event::Mutation)
//! notifications into a single "content settled" signal per quiet period.
//! Lazy-loaded lists append items in bursts; rescanning after every batch
//! would repeat the expensive text scrape for nothing.
//!
//! # Lifecycle
//!
//! 1. [`start`](ContentWatcher::start) subscribes beneath a scope node.
//! 2. The host forwards each mutation to [`notify`](ContentWatcher::notify).
//! 3. [`poll`](ContentWatcher::poll) returns `true` once the burst has been
//!    quiet for the configured delay.
//! 4. [`stop`](ContentWatcher::stop) unsubscribes and drops any pending signal.

use std::time::Duration;

use crate::debounce::Debouncer;
use crate::host::{Host, NodeId, WatchId};

/// Debounced content-mutation subscription.
#[derive(Debug)]
pub struct ContentWatcher {
    delay: Duration,
    watch: Option<WatchId>,
    settle: Debouncer<()>,
    notifications: u64,
}

impl ContentWatcher {
    /// Create a stopped watcher that settles after `delay` of quiet.
    #[must_use]
    pub const fn new(delay: Duration) -> Self {
        Self {
            delay,
            watch: None,
            settle: Debouncer::new(),
            notifications: 0,
        }
    }

    /// Subscribe to mutations beneath `scope` (the whole document for
    /// `None`). Restarts if already active.
    pub fn start(&mut self, host: &mut dyn Host, scope: Option<NodeId>) {
        self.stop(host);
        let watch = host.observe_mutations(scope);
        tracing::debug!(
            scope = ?scope.map(|node| node.0),
            watch = watch.0,
            "content watch started"
        );
        self.watch = Some(watch);
    }

    /// Unsubscribe and discard any pending signal.
    pub fn stop(&mut self, host: &mut dyn Host) {
        if let Some(watch) = self.watch.take() {
            host.unobserve_mutations(watch);
            tracing::debug!(watch = watch.0, "content watch stopped");
        }
        self.settle.cancel_pending();
    }

    /// Record a mutation notification at `now`. Ignored while stopped.
    pub fn notify(&mut self, now: Duration) {
        if self.watch.is_none() {
            return;
        }
        self.notifications = self.notifications.saturating_add(1);
        self.settle.schedule((), now, self.delay);
    }

    /// Whether the content has settled since the last signal.
    pub fn poll(&mut self, now: Duration) -> bool {
        self.settle.poll(now).is_some()
    }

    /// When the pending settle signal fires.
    #[must_use]
    pub fn deadline(&self) -> Option<Duration> {
        self.settle.deadline()
    }

    /// Whether a host subscription is active.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.watch.is_some()
    }

    /// Total notifications received while active.
    #[must_use]
    pub fn notification_count(&self) -> u64 {
        self.notifications
    }
}
