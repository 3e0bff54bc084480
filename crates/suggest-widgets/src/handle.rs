#![forbid(unsafe_code)]

//! Mount-with-retry wrapper around [`Autocomplete`].
//!
//! Pages often render the input or its panel after the script that wires up
//! autocomplete. The handle retries [`Autocomplete::mount`] on the schedule
//! in [`AutocompleteConfig::mount_retry`] and becomes inert once the budget
//! is spent. Operations on a handle that is not active are no-ops.

use std::fmt;
use std::time::Duration;

use suggest_core::event::Event;
use suggest_core::host::Host;
use suggest_core::retry::RetryPolicy;

use crate::autocomplete::{Autocomplete, AutocompleteAction, MountError};
use crate::config::AutocompleteConfig;
use crate::notify::FilterNotifier;

/// Coarse lifecycle status of a handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandleStatus {
    /// Waiting to retry a failed mount.
    Pending,
    /// Mounted and handling events.
    Active,
    /// Gave up mounting.
    Inert,
    /// Destroyed by the caller.
    Destroyed,
}

enum Lifecycle {
    Pending { attempt: u32, retry_at: Duration },
    Active(Box<Autocomplete>),
    Inert(MountError),
    Destroyed,
}

/// An autocomplete that mounts itself once its elements exist.
pub struct AutocompleteHandle {
    config: AutocompleteConfig,
    policy: RetryPolicy,
    state: Lifecycle,
    pending_notifiers: Vec<Box<dyn FilterNotifier>>,
}

impl fmt::Debug for AutocompleteHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AutocompleteHandle")
            .field("input", &self.config.input_id)
            .field("status", &self.status())
            .finish_non_exhaustive()
    }
}

impl AutocompleteHandle {
    /// Attempt the first mount immediately.
    pub fn start(host: &mut dyn Host, config: AutocompleteConfig, now: Duration) -> Self {
        let policy = config.mount_retry.clone();
        let mut handle = Self {
            config,
            policy,
            state: Lifecycle::Destroyed,
            pending_notifiers: Vec::new(),
        };
        handle.attempt(host, 1, now);
        handle
    }

    /// Register a filter notifier. Queued until the mount succeeds.
    #[must_use]
    pub fn with_notifier(mut self, notifier: Box<dyn FilterNotifier>) -> Self {
        self.add_notifier(notifier);
        self
    }

    /// Register a filter notifier. Queued until the mount succeeds.
    pub fn add_notifier(&mut self, notifier: Box<dyn FilterNotifier>) {
        match &mut self.state {
            Lifecycle::Active(autocomplete) => autocomplete.add_notifier(notifier),
            Lifecycle::Pending { .. } => self.pending_notifiers.push(notifier),
            Lifecycle::Inert(_) | Lifecycle::Destroyed => {}
        }
    }

    /// Current lifecycle status.
    #[must_use]
    pub fn status(&self) -> HandleStatus {
        match self.state {
            Lifecycle::Pending { .. } => HandleStatus::Pending,
            Lifecycle::Active(_) => HandleStatus::Active,
            Lifecycle::Inert(_) => HandleStatus::Inert,
            Lifecycle::Destroyed => HandleStatus::Destroyed,
        }
    }

    /// Why the handle gave up mounting.
    #[must_use]
    pub fn inert_reason(&self) -> Option<&MountError> {
        match &self.state {
            Lifecycle::Inert(error) => Some(error),
            _ => None,
        }
    }

    /// The mounted controller, if active.
    #[must_use]
    pub fn autocomplete(&self) -> Option<&Autocomplete> {
        match &self.state {
            Lifecycle::Active(autocomplete) => Some(&**autocomplete),
            _ => None,
        }
    }

    fn active_mut(&mut self) -> Option<&mut Autocomplete> {
        match &mut self.state {
            Lifecycle::Active(autocomplete) => Some(&mut **autocomplete),
            _ => None,
        }
    }

    /// Forward an event to the controller.
    pub fn handle_event(
        &mut self,
        host: &mut dyn Host,
        event: &Event,
        now: Duration,
    ) -> Option<AutocompleteAction> {
        self.active_mut()?.handle_event(host, event, now)
    }

    /// Run due work: a scheduled mount retry, or the controller's debounced
    /// passes.
    pub fn tick(&mut self, host: &mut dyn Host, now: Duration) {
        if let Lifecycle::Pending { attempt, retry_at } = self.state {
            if now >= retry_at {
                self.attempt(host, attempt + 1, now);
            }
            return;
        }
        if let Some(autocomplete) = self.active_mut() {
            autocomplete.tick(host, now);
        }
    }

    /// The earliest time [`tick`](Self::tick) has work to do.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Duration> {
        match &self.state {
            Lifecycle::Pending { retry_at, .. } => Some(*retry_at),
            Lifecycle::Active(autocomplete) => autocomplete.next_deadline(),
            Lifecycle::Inert(_) | Lifecycle::Destroyed => None,
        }
    }

    /// Re-collect terms. Returns whether the term set changed.
    pub fn refresh(&mut self, host: &mut dyn Host) -> bool {
        self.active_mut().is_some_and(|ac| ac.refresh(host))
    }

    /// Current terms; empty unless active.
    #[must_use]
    pub fn terms(&self) -> Vec<String> {
        self.autocomplete()
            .map(Autocomplete::terms)
            .unwrap_or_default()
    }

    /// Add a term. Returns whether the term set changed.
    pub fn add_term(&mut self, host: &mut dyn Host, term: &str) -> bool {
        self.active_mut().is_some_and(|ac| ac.add_term(host, term))
    }

    /// Remove a term. Returns whether the term set changed.
    pub fn remove_term(&mut self, host: &mut dyn Host, term: &str) -> bool {
        self.active_mut().is_some_and(|ac| ac.remove_term(host, term))
    }

    /// Commit a term from outside the list.
    pub fn select_term(&mut self, host: &mut dyn Host, term: &str, restore_focus: bool) {
        if let Some(ac) = self.active_mut() {
            ac.select_term(host, term, restore_focus);
        }
    }

    /// Tear down the controller and cancel any pending retry.
    pub fn destroy(&mut self, host: &mut dyn Host) {
        if let Lifecycle::Active(autocomplete) =
            std::mem::replace(&mut self.state, Lifecycle::Destroyed)
        {
            (*autocomplete).destroy(host);
        }
        self.pending_notifiers.clear();
    }

    fn attempt(&mut self, host: &mut dyn Host, attempt: u32, now: Duration) {
        match Autocomplete::mount(host, self.config.clone()) {
            Ok(mut autocomplete) => {
                for notifier in self.pending_notifiers.drain(..) {
                    autocomplete.add_notifier(notifier);
                }
                if attempt > 1 {
                    tracing::debug!(attempt, "autocomplete mounted after retry");
                }
                self.state = Lifecycle::Active(Box::new(autocomplete));
            }
            Err(error) => match self.policy.delay_after(attempt) {
                Some(delay) => {
                    tracing::warn!(
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        %error,
                        "autocomplete mount failed; retrying"
                    );
                    self.state = Lifecycle::Pending {
                        attempt,
                        retry_at: now + delay,
                    };
                }
                None => {
                    tracing::warn!(attempt, %error, "autocomplete mount failed; giving up");
                    self.pending_notifiers.clear();
                    self.state = Lifecycle::Inert(error);
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use suggest_web::{ElementSpec, MemoryPage};

    fn page_without_wrapper() -> MemoryPage {
        let mut page = MemoryPage::new();
        let root = page.root();
        page.append(root, ElementSpec::new("input").with_id("q"));
        page.append(root, ElementSpec::new("ul").with_id("l"));
        page
    }

    #[test]
    fn mounts_immediately_when_elements_exist() {
        let mut page = page_without_wrapper();
        let root = page.root();
        page.append(root, ElementSpec::new("div").with_id("w"));
        let handle = AutocompleteHandle::start(
            &mut page,
            AutocompleteConfig::new("q", "l", "w"),
            Duration::ZERO,
        );
        assert_eq!(handle.status(), HandleStatus::Active);
        assert_eq!(handle.next_deadline(), None);
    }

    #[test]
    fn retries_until_element_appears() {
        let mut page = page_without_wrapper();
        let mut handle = AutocompleteHandle::start(
            &mut page,
            AutocompleteConfig::new("q", "l", "w"),
            Duration::ZERO,
        );
        assert_eq!(handle.status(), HandleStatus::Pending);
        assert_eq!(handle.next_deadline(), Some(Duration::from_millis(100)));

        handle.tick(&mut page, Duration::from_millis(50));
        assert_eq!(handle.status(), HandleStatus::Pending);

        handle.tick(&mut page, Duration::from_millis(100));
        assert_eq!(handle.next_deadline(), Some(Duration::from_millis(300)));

        let root = page.root();
        page.append(root, ElementSpec::new("div").with_id("w"));
        handle.tick(&mut page, Duration::from_millis(300));
        assert_eq!(handle.status(), HandleStatus::Active);
    }

    #[test]
    fn goes_inert_after_budget() {
        let mut page = page_without_wrapper();
        let mut config = AutocompleteConfig::new("q", "l", "w");
        config.mount_retry = RetryPolicy {
            max_attempts: 2,
            ..RetryPolicy::default()
        };
        let mut handle = AutocompleteHandle::start(&mut page, config, Duration::ZERO);
        handle.tick(&mut page, Duration::from_millis(100));
        assert_eq!(handle.status(), HandleStatus::Inert);
        assert!(matches!(
            handle.inert_reason(),
            Some(MountError::MissingElement { id, .. }) if id == "w"
        ));
        assert_eq!(handle.next_deadline(), None);
        assert!(!handle.add_term(&mut page, "Paris"));
        assert!(handle.terms().is_empty());
    }

    #[test]
    fn destroy_cancels_pending_retry() {
        let mut page = page_without_wrapper();
        let mut handle = AutocompleteHandle::start(
            &mut page,
            AutocompleteConfig::new("q", "l", "w"),
            Duration::ZERO,
        );
        handle.destroy(&mut page);
        assert_eq!(handle.status(), HandleStatus::Destroyed);
        assert_eq!(handle.next_deadline(), None);
    }
}
