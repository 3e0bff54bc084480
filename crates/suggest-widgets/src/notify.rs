#![forbid(unsafe_code)]

//! External filter notification.
//!
//! After a commit the standard `input`/`change`/`keyup` sequence already
//! reaches page scripts. Some filtering libraries additionally need an
//! explicit reload call; [`FilterNotifier`] is the capability the controller
//! invokes for that, injected instead of probed from page globals.

use suggest_core::host::{DomEvent, Host, NodeId};

use crate::config::FilterHookConfig;

/// Called after every value written into the input by the controller.
pub trait FilterNotifier {
    /// `value` was written into `input`.
    fn notify(&mut self, host: &mut dyn Host, input: NodeId, value: &str);
}

/// Calls a named host hook and, when the hook exists, dispatches a custom
/// event carrying the value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HookNotifier {
    hook: String,
    event: Option<String>,
}

impl HookNotifier {
    /// Notifier for hook `hook`, optionally followed by custom event `event`.
    #[must_use]
    pub fn new(hook: impl Into<String>, event: Option<String>) -> Self {
        Self {
            hook: hook.into(),
            event,
        }
    }
}

impl From<&FilterHookConfig> for HookNotifier {
    fn from(config: &FilterHookConfig) -> Self {
        Self::new(config.hook.clone(), config.event.clone())
    }
}

impl FilterNotifier for HookNotifier {
    fn notify(&mut self, host: &mut dyn Host, input: NodeId, value: &str) {
        if !host.call_hook(&self.hook, value) {
            tracing::debug!(hook = %self.hook, "filter hook not present");
            return;
        }
        if let Some(name) = &self.event {
            host.dispatch(
                input,
                &DomEvent::Custom {
                    name: name.clone(),
                    detail: value.to_string(),
                },
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use suggest_web::{ElementSpec, MemoryPage};

    #[test]
    fn missing_hook_is_a_no_op() {
        let mut page = MemoryPage::new();
        let root = page.root();
        let input = page.append(root, ElementSpec::new("input"));
        let mut notifier = HookNotifier::new("reload", Some("filter:change".into()));
        notifier.notify(&mut page, input, "Paris");
        assert!(page.dispatched().is_empty());
    }

    #[test]
    fn present_hook_is_called_and_event_dispatched() {
        let mut page = MemoryPage::new();
        let root = page.root();
        let input = page.append(root, ElementSpec::new("input"));
        page.install_hook("reload");
        let mut notifier = HookNotifier::new("reload", Some("filter:change".into()));
        notifier.notify(&mut page, input, "Paris");
        assert_eq!(page.hook_calls("reload"), Some(&["Paris".to_string()][..]));
        assert_eq!(
            page.dispatched()[0].event,
            DomEvent::Custom {
                name: "filter:change".into(),
                detail: "Paris".into()
            }
        );
    }
}
