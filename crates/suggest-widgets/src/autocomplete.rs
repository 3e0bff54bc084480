#![forbid(unsafe_code)]

//! Autocomplete interaction controller.
//!
//! Binds a text input to a result list, filters the page's terms as the user
//! types and commits the chosen suggestion back into the input.
//!
//! # State Machine
//!
//! ```text
//!            input/focus with >= 1 match
//!   Hidden ─────────────────────────────▶ Visible { active: None }
//!     ▲                                     │  Down/Up/Home/End, hover
//!     │  below minimum, no match, Escape,   ▼
//!     │  Tab, outside pointer, commit     Visible { active: Some(i) }
//!     └─────────────────────────────────────┘
//! ```
//!
//! Every rebuild of the visible list resets `active` to `None`. Navigation is
//! clamped to `[0, len - 1]` without wraparound.
//!
//! # Time
//!
//! Input filtering and content re-collection are debounced. Callers pass the
//! current monotonic time to every entry point, arm a timer for
//! [`Autocomplete::next_deadline`], and call [`Autocomplete::tick`] when it
//! fires.
//!
//! # Invariants
//!
//! 1. `active` is `None` or a valid index into the visible results.
//! 2. The rendered option list is only rebuilt when the visible results
//!    change.
//! 3. The term index is replaced atomically before any later filter pass
//!    reads it.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use suggest_core::content_watch::ContentWatcher;
use suggest_core::debounce::Debouncer;
use suggest_core::event::{Event, KeyCode, KeyEvent, PointerEvent, PointerKind};
use suggest_core::host::{DomEvent, Host, NodeId, OptionView};
use suggest_text::{CacheStats, FilterOutcome, MatchEngine, MatchResult, TermIndex, fold};

use crate::collect::collect_sources;
use crate::config::AutocompleteConfig;
use crate::notify::{FilterNotifier, HookNotifier};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Which required element a configuration id refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementRole {
    /// The text input.
    Input,
    /// The result list container.
    List,
    /// The positioned panel.
    Wrapper,
}

impl fmt::Display for ElementRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Input => "input",
            Self::List => "list",
            Self::Wrapper => "wrapper",
        })
    }
}

/// The page is missing an element the controller needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MountError {
    /// No element with the configured id.
    MissingElement {
        /// What the element is for.
        role: ElementRole,
        /// The id that was looked up.
        id: String,
    },
}

impl fmt::Display for MountError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingElement { role, id } => {
                write!(f, "missing {role} element with id {id:?}")
            }
        }
    }
}

impl std::error::Error for MountError {}

// ---------------------------------------------------------------------------
// Public state types
// ---------------------------------------------------------------------------

/// Dropdown visibility and highlighted row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelectionState {
    /// No list shown.
    #[default]
    Hidden,
    /// List shown; `active` is the highlighted row, if any.
    Visible {
        /// Highlighted row index.
        active: Option<usize>,
    },
}

impl SelectionState {
    /// Whether the list is shown.
    #[must_use]
    pub const fn is_visible(&self) -> bool {
        matches!(self, Self::Visible { .. })
    }

    /// The highlighted row.
    #[must_use]
    pub const fn active(&self) -> Option<usize> {
        match self {
            Self::Visible { active } => *active,
            Self::Hidden => None,
        }
    }
}

/// What an event did, for callers that react (e.g. `preventDefault`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AutocompleteAction {
    /// A suggestion was written into the input.
    Committed(String),
    /// The list was closed without a commit.
    Dismissed,
    /// The highlighted row is now this index.
    Navigated(usize),
    /// The clear control emptied the input.
    Cleared,
}

/// Elements the controller is bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundNodes {
    /// The text input.
    pub input: NodeId,
    /// The result list container.
    pub list: NodeId,
    /// The positioned panel.
    pub wrapper: NodeId,
    /// The clear control.
    pub clear: Option<NodeId>,
    /// The element the panel is positioned against.
    pub anchor: NodeId,
}

// ---------------------------------------------------------------------------
// Controller
// ---------------------------------------------------------------------------

/// A mounted autocomplete instance.
pub struct Autocomplete {
    config: AutocompleteConfig,
    nodes: BoundNodes,
    index: TermIndex,
    engine: MatchEngine,
    state: SelectionState,
    results: Arc<[MatchResult]>,
    options: Vec<NodeId>,
    input_debounce: Debouncer<()>,
    watcher: ContentWatcher,
    notifiers: Vec<Box<dyn FilterNotifier>>,
    added: BTreeSet<String>,
    /// Folded texts.
    removed: BTreeSet<String>,
}

impl fmt::Debug for Autocomplete {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Autocomplete")
            .field("nodes", &self.nodes)
            .field("terms", &self.index.len())
            .field("state", &self.state)
            .field("results", &self.results.len())
            .field("notifiers", &self.notifiers.len())
            .finish_non_exhaustive()
    }
}

fn require(host: &dyn Host, role: ElementRole, id: &str) -> Result<NodeId, MountError> {
    host.element_by_id(id).ok_or_else(|| MountError::MissingElement {
        role,
        id: id.to_string(),
    })
}

fn px(value: f64) -> String {
    // `+ 0.0` turns a negative zero into zero.
    format!("{}px", (value * 100.0).round() / 100.0 + 0.0)
}

impl Autocomplete {
    /// Bind to the page, collect the initial terms and start watching for
    /// content changes.
    ///
    /// Fails without touching the page when a required element is missing.
    pub fn mount(host: &mut dyn Host, config: AutocompleteConfig) -> Result<Self, MountError> {
        let input = require(host, ElementRole::Input, &config.input_id)?;
        let list = require(host, ElementRole::List, &config.list_id)?;
        let wrapper = require(host, ElementRole::Wrapper, &config.wrapper_id)?;
        let clear = config.clear_id.as_deref().and_then(|id| {
            let found = host.element_by_id(id);
            if found.is_none() {
                tracing::debug!(id, "clear control not found");
            }
            found
        });
        let parent = host.parent(input);
        let anchor = config
            .anchor_selector
            .as_ref()
            .and_then(|selector| parent.and_then(|p| host.closest(p, selector)))
            .or(parent)
            .unwrap_or(wrapper);

        let notifiers: Vec<Box<dyn FilterNotifier>> = config
            .filter_hook
            .as_ref()
            .map(|hook| Box::new(HookNotifier::from(hook)) as Box<dyn FilterNotifier>)
            .into_iter()
            .collect();

        let mut this = Self {
            nodes: BoundNodes {
                input,
                list,
                wrapper,
                clear,
                anchor,
            },
            index: TermIndex::new(),
            engine: MatchEngine::new(config.matching),
            state: SelectionState::Hidden,
            results: Vec::new().into(),
            options: Vec::new(),
            input_debounce: Debouncer::new(),
            watcher: ContentWatcher::new(config.mutation_debounce),
            notifiers,
            added: BTreeSet::new(),
            removed: BTreeSet::new(),
            config,
        };

        this.install_aria(host);
        this.set_panel_visible(host, false);
        this.watcher.start(host, None);
        this.refresh(host);
        tracing::debug!(
            input = %this.config.input_id,
            terms = this.index.len(),
            "autocomplete mounted"
        );
        Ok(this)
    }

    /// Register an additional filter notifier.
    pub fn add_notifier(&mut self, notifier: Box<dyn FilterNotifier>) {
        self.notifiers.push(notifier);
    }

    // -- Accessors ----------------------------------------------------------

    /// The configuration in effect.
    #[must_use]
    pub fn config(&self) -> &AutocompleteConfig {
        &self.config
    }

    /// The bound elements.
    #[must_use]
    pub fn nodes(&self) -> &BoundNodes {
        &self.nodes
    }

    /// Visibility and highlighted row.
    #[must_use]
    pub fn state(&self) -> SelectionState {
        self.state
    }

    /// Whether the list is shown.
    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.state.is_visible()
    }

    /// The highlighted row.
    #[must_use]
    pub fn active_index(&self) -> Option<usize> {
        self.state.active()
    }

    /// The visible results (empty while hidden).
    #[must_use]
    pub fn results(&self) -> &[MatchResult] {
        &self.results
    }

    /// Rendered option elements, parallel to [`results`](Self::results).
    #[must_use]
    pub fn option_nodes(&self) -> &[NodeId] {
        &self.options
    }

    /// Current terms in index order.
    #[must_use]
    pub fn terms(&self) -> Vec<String> {
        self.index.texts().map(str::to_string).collect()
    }

    /// The term index.
    #[must_use]
    pub fn index(&self) -> &TermIndex {
        &self.index
    }

    /// Result cache statistics.
    #[must_use]
    pub fn cache_stats(&self) -> CacheStats {
        self.engine.stats()
    }

    /// The earliest time [`tick`](Self::tick) has work to do.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Duration> {
        [self.input_debounce.deadline(), self.watcher.deadline()]
            .into_iter()
            .flatten()
            .min()
    }

    // -- Entry points -------------------------------------------------------

    /// Handle one canonical event.
    pub fn handle_event(
        &mut self,
        host: &mut dyn Host,
        event: &Event,
        now: Duration,
    ) -> Option<AutocompleteAction> {
        match event {
            Event::Input => {
                self.on_input(host, now);
                None
            }
            Event::Focus => {
                self.on_focus(host);
                None
            }
            Event::Key(key) => self.on_key(host, *key),
            Event::Pointer(pointer) => self.on_pointer(host, pointer),
            Event::Mutation => {
                self.watcher.notify(now);
                None
            }
            Event::Resize | Event::Scroll => {
                if self.is_visible() {
                    self.reposition(host);
                }
                None
            }
        }
    }

    /// Run debounced work that is due at `now`.
    pub fn tick(&mut self, host: &mut dyn Host, now: Duration) {
        if self.input_debounce.poll(now).is_some() {
            self.filter_pass(host);
        }
        if self.watcher.poll(now) {
            self.refresh(host);
        }
    }

    /// Re-collect terms from the page.
    ///
    /// Returns whether the term set changed. An unchanged set leaves the
    /// rendered list alone; a changed one re-filters the open list.
    pub fn refresh(&mut self, host: &mut dyn Host) -> bool {
        let (mut texts, visited) = collect_sources(&*host, &self.config.source);
        self.release_sources(host, visited);
        if !self.removed.is_empty() {
            texts.retain(|text| !self.removed.contains(&fold(text.trim())));
        }
        texts.extend(self.added.iter().cloned());
        let changed = self.index.rebuild(texts);
        if changed && self.is_visible() {
            self.filter_pass(host);
        }
        changed
    }

    /// Add a term. It survives later refreshes. Returns whether the term set
    /// changed.
    pub fn add_term(&mut self, host: &mut dyn Host, term: &str) -> bool {
        let term = term.trim();
        if term.is_empty() {
            return false;
        }
        let folded = fold(term);
        self.removed.remove(&folded);
        self.added.retain(|added| fold(added) != folded);
        self.added.insert(term.to_string());
        let changed = self.index.insert(term);
        if changed && self.is_visible() {
            self.filter_pass(host);
        }
        changed
    }

    /// Remove a term in any casing. It stays excluded from later refreshes.
    /// Returns whether the term set changed.
    pub fn remove_term(&mut self, host: &mut dyn Host, term: &str) -> bool {
        let term = term.trim();
        if term.is_empty() {
            return false;
        }
        let folded = fold(term);
        self.added.retain(|added| fold(added) != folded);
        self.removed.insert(folded);
        let changed = self.index.remove(term);
        if changed && self.is_visible() {
            self.filter_pass(host);
        }
        changed
    }

    /// Commit `term` from outside the list (e.g. a map marker click).
    ///
    /// With `restore_focus` false the input is not focused afterwards.
    pub fn select_term(&mut self, host: &mut dyn Host, term: &str, restore_focus: bool) {
        self.write_value(host, term, restore_focus);
    }

    /// Unbind from the page: stop watching, close and empty the list and
    /// remove the accessibility attributes this controller added.
    pub fn destroy(mut self, host: &mut dyn Host) {
        self.watcher.stop(host);
        self.input_debounce.cancel_pending();
        self.hide(host);
        host.render_options(self.nodes.list, &[]);
        let input = self.nodes.input;
        for attr in [
            "role",
            "aria-autocomplete",
            "aria-expanded",
            "aria-controls",
            "aria-activedescendant",
        ] {
            host.remove_attribute(input, attr);
        }
        host.remove_attribute(self.nodes.list, "role");
        host.remove_attribute(self.nodes.list, "aria-live");
        tracing::debug!(input = %self.config.input_id, "autocomplete destroyed");
    }

    // -- Event handlers -----------------------------------------------------

    fn on_input(&mut self, host: &mut dyn Host, now: Duration) {
        let query = host.input_value(self.nodes.input);
        if !self.engine.meets_minimum(&query) {
            self.input_debounce.cancel_pending();
            self.hide(host);
            return;
        }
        if self.config.debounce_delay.is_zero() {
            self.filter_pass(host);
        } else {
            self.input_debounce
                .schedule((), now, self.config.debounce_delay);
        }
    }

    fn on_focus(&mut self, host: &mut dyn Host) {
        let query = host.input_value(self.nodes.input);
        if self.engine.meets_minimum(&query) {
            self.input_debounce.cancel_pending();
            self.filter_pass(host);
        }
    }

    fn on_key(&mut self, host: &mut dyn Host, key: KeyEvent) -> Option<AutocompleteAction> {
        if key.has_command_modifier() {
            return None;
        }
        let SelectionState::Visible { active } = self.state else {
            match key.code {
                KeyCode::Down => {
                    self.input_debounce.cancel_pending();
                    self.filter_pass(host);
                }
                KeyCode::Escape => {
                    self.input_debounce.cancel_pending();
                }
                _ => {}
            }
            return None;
        };
        let last = self.results.len().saturating_sub(1);
        match key.code {
            KeyCode::Down => Some(self.navigate(host, active.map_or(0, |i| (i + 1).min(last)))),
            KeyCode::Up => active.map(|i| self.navigate(host, i.saturating_sub(1))),
            KeyCode::Home => Some(self.navigate(host, 0)),
            KeyCode::End => Some(self.navigate(host, last)),
            KeyCode::Enter => {
                let index = active?;
                self.commit(host, index)
            }
            KeyCode::Escape | KeyCode::Tab => {
                self.input_debounce.cancel_pending();
                self.hide(host);
                Some(AutocompleteAction::Dismissed)
            }
            _ => None,
        }
    }

    fn on_pointer(
        &mut self,
        host: &mut dyn Host,
        pointer: &PointerEvent,
    ) -> Option<AutocompleteAction> {
        let target = pointer.target;
        match pointer.kind {
            PointerKind::Move => {
                let index = self.option_at(host, target)?;
                if self.active_index() == Some(index) {
                    return None;
                }
                Some(self.navigate(host, index))
            }
            PointerKind::Down => self.dismiss_if_outside(host, target),
            PointerKind::Click => {
                if let Some(index) = self.option_at(host, target) {
                    return self.commit(host, index);
                }
                if let (Some(clear), Some(target)) = (self.nodes.clear, target)
                    && host.contains(clear, target)
                {
                    self.clear(host);
                    return Some(AutocompleteAction::Cleared);
                }
                self.dismiss_if_outside(host, target)
            }
        }
    }

    // -- Transitions --------------------------------------------------------

    fn filter_pass(&mut self, host: &mut dyn Host) {
        let query = host.input_value(self.nodes.input);
        match self.engine.filter(&self.index, &query) {
            FilterOutcome::Matches(results) if !results.is_empty() => self.show(host, results),
            _ => self.hide(host),
        }
    }

    fn show(&mut self, host: &mut dyn Host, results: Arc<[MatchResult]>) {
        if self.is_visible() && *self.results == *results {
            self.reposition(host);
            return;
        }

        let views: Vec<OptionView> = results
            .iter()
            .enumerate()
            .map(|(i, result)| OptionView {
                id: self.option_id(i),
                value: result.term().to_string(),
                markup: result.markup(),
            })
            .collect();
        self.options = host.render_options(self.nodes.list, &views);
        if self.options.len() != results.len() {
            tracing::debug!(
                rendered = self.options.len(),
                results = results.len(),
                "host rendered a different number of options"
            );
        }
        for option in &self.options {
            host.set_attribute(*option, "role", "option");
            host.set_attribute(*option, "aria-selected", "false");
        }
        tracing::trace!(results = results.len(), "suggestions rendered");
        self.results = results;
        self.state = SelectionState::Visible { active: None };

        let input = self.nodes.input;
        host.remove_attribute(input, "aria-activedescendant");
        host.set_attribute(input, "aria-expanded", "true");
        self.set_panel_visible(host, true);
        self.reposition(host);
    }

    fn hide(&mut self, host: &mut dyn Host) {
        if !self.is_visible() {
            return;
        }
        self.state = SelectionState::Hidden;
        self.results = Vec::new().into();
        self.options.clear();
        let input = self.nodes.input;
        host.set_attribute(input, "aria-expanded", "false");
        host.remove_attribute(input, "aria-activedescendant");
        self.set_panel_visible(host, false);
    }

    /// Highlight row `index` (clamped to the rendered rows).
    fn navigate(&mut self, host: &mut dyn Host, index: usize) -> AutocompleteAction {
        let index = index.min(self.results.len().saturating_sub(1));
        if let Some(previous) = self.active_index().and_then(|i| self.options.get(i)) {
            host.set_attribute(*previous, "aria-selected", "false");
        }
        if let Some(option) = self.options.get(index) {
            host.set_attribute(*option, "aria-selected", "true");
        }
        host.set_attribute(
            self.nodes.input,
            "aria-activedescendant",
            &self.option_id(index),
        );
        self.state = SelectionState::Visible {
            active: Some(index),
        };
        AutocompleteAction::Navigated(index)
    }

    fn commit(&mut self, host: &mut dyn Host, index: usize) -> Option<AutocompleteAction> {
        let term = self.results.get(index)?.term().to_string();
        self.write_value(host, &term, true);
        Some(AutocompleteAction::Committed(term))
    }

    fn clear(&mut self, host: &mut dyn Host) {
        self.write_value(host, "", true);
    }

    /// Write `value` into the input the way typing would, then close.
    fn write_value(&mut self, host: &mut dyn Host, value: &str, restore_focus: bool) {
        let input = self.nodes.input;
        self.input_debounce.cancel_pending();
        host.set_input_value(input, value);
        self.hide(host);
        for event in DomEvent::typing_sequence() {
            host.dispatch(input, &event);
        }
        for notifier in &mut self.notifiers {
            notifier.notify(host, input, value);
        }
        if restore_focus {
            host.focus(input);
        }
        tracing::debug!(value_len = value.len(), restore_focus, "input value committed");
    }

    fn dismiss_if_outside(
        &mut self,
        host: &mut dyn Host,
        target: Option<NodeId>,
    ) -> Option<AutocompleteAction> {
        if !self.is_visible() || self.is_inside(host, target) {
            return None;
        }
        self.input_debounce.cancel_pending();
        self.hide(host);
        Some(AutocompleteAction::Dismissed)
    }

    // -- Helpers ------------------------------------------------------------

    fn is_inside(&self, host: &dyn Host, target: Option<NodeId>) -> bool {
        let Some(target) = target else {
            return false;
        };
        let BoundNodes {
            input,
            list,
            wrapper,
            clear,
            ..
        } = self.nodes;
        host.contains(input, target)
            || host.contains(list, target)
            || host.contains(wrapper, target)
            || clear.is_some_and(|clear| host.contains(clear, target))
    }

    /// Hand collected source elements back to the host, keeping the ones
    /// this controller is bound to.
    fn release_sources(&self, host: &mut dyn Host, mut visited: Vec<NodeId>) {
        let BoundNodes {
            input,
            list,
            wrapper,
            clear,
            anchor,
        } = self.nodes;
        visited.retain(|node| {
            ![input, list, wrapper, anchor].contains(node)
                && clear != Some(*node)
                && !self.options.contains(node)
        });
        visited.sort_unstable();
        visited.dedup();
        if !visited.is_empty() {
            host.release_nodes(&visited);
        }
    }

    fn option_at(&self, host: &dyn Host, target: Option<NodeId>) -> Option<usize> {
        if !self.is_visible() {
            return None;
        }
        let target = target?;
        self.options
            .iter()
            .position(|option| host.contains(*option, target))
    }

    fn option_id(&self, index: usize) -> String {
        format!("{}-option-{index}", self.config.list_id)
    }

    fn install_aria(&self, host: &mut dyn Host) {
        let input = self.nodes.input;
        host.set_attribute(input, "role", "combobox");
        host.set_attribute(input, "aria-autocomplete", "list");
        host.set_attribute(input, "aria-expanded", "false");
        host.set_attribute(input, "aria-controls", &self.config.list_id);
        host.set_attribute(input, "autocomplete", "off");
        host.set_attribute(self.nodes.list, "role", "listbox");
        host.set_attribute(self.nodes.list, "aria-live", "polite");
    }

    fn set_panel_visible(&self, host: &mut dyn Host, visible: bool) {
        host.set_style(
            self.nodes.wrapper,
            "display",
            if visible { "block" } else { "none" },
        );
    }

    /// Place the panel under the input, relative to the anchor.
    fn reposition(&self, host: &mut dyn Host) {
        let input = host.bounding_rect(self.nodes.input);
        let anchor = host.bounding_rect(self.nodes.anchor);
        let gap = self.config.gap.resolve(&host.viewport());
        let relative = input.relative_to(&anchor);
        let wrapper = self.nodes.wrapper;
        host.set_style(wrapper, "top", &px(relative.bottom() + gap));
        host.set_style(wrapper, "left", &px(relative.x));
        host.set_style(wrapper, "width", &px(input.width));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use suggest_core::geometry::Rect;
    use suggest_web::{ElementSpec, MemoryPage};

    #[test]
    fn px_formatting() {
        assert_eq!(px(4.0), "4px");
        assert_eq!(px(12.345), "12.35px");
        assert_eq!(px(-0.0), "0px");
    }

    #[test]
    fn selection_state_accessors() {
        assert!(!SelectionState::Hidden.is_visible());
        assert_eq!(SelectionState::Hidden.active(), None);
        let visible = SelectionState::Visible { active: Some(2) };
        assert!(visible.is_visible());
        assert_eq!(visible.active(), Some(2));
    }

    #[test]
    fn mount_reports_first_missing_element() {
        let mut page = MemoryPage::new();
        let root = page.root();
        page.append(root, ElementSpec::new("input").with_id("q"));
        let err = Autocomplete::mount(&mut page, AutocompleteConfig::new("q", "l", "w")).unwrap_err();
        assert_eq!(
            err,
            MountError::MissingElement {
                role: ElementRole::List,
                id: "l".into()
            }
        );
        assert_eq!(err.to_string(), "missing list element with id \"l\"");
        // Nothing was written before failing.
        assert_eq!(page.attribute(NodeId(1), "role"), None);
    }

    #[test]
    fn anchor_falls_back_to_parent() {
        let mut page = MemoryPage::new();
        let root = page.root();
        let field = page.append(root, ElementSpec::new("div").with_class("field"));
        let row = page.append(field, ElementSpec::new("div"));
        let input = page.append(row, ElementSpec::new("input").with_id("q"));
        page.append(root, ElementSpec::new("ul").with_id("l"));
        page.append(root, ElementSpec::new("div").with_id("w"));

        let plain = Autocomplete::mount(&mut page, AutocompleteConfig::new("q", "l", "w")).unwrap();
        assert_eq!(plain.nodes().anchor, row);
        assert_eq!(plain.nodes().input, input);

        let mut config = AutocompleteConfig::new("q", "l", "w");
        config.anchor_selector = Some(suggest_core::selector::Selector::class("field"));
        let anchored = Autocomplete::mount(&mut page, config).unwrap();
        assert_eq!(anchored.nodes().anchor, field);
    }

    #[test]
    fn reposition_uses_anchor_and_gap() {
        let mut page = MemoryPage::new();
        let root = page.root();
        let anchor = page.append(
            root,
            ElementSpec::new("div").with_rect(Rect::new(100.0, 50.0, 400.0, 200.0)),
        );
        page.append(
            anchor,
            ElementSpec::new("input")
                .with_id("q")
                .with_rect(Rect::new(120.0, 60.0, 300.0, 30.0)),
        );
        page.append(root, ElementSpec::new("ul").with_id("l"));
        let wrapper = page.append(root, ElementSpec::new("div").with_id("w"));

        let ac = Autocomplete::mount(&mut page, AutocompleteConfig::new("q", "l", "w")).unwrap();
        ac.reposition(&mut page);
        assert_eq!(page.style(wrapper, "top"), Some("44px"));
        assert_eq!(page.style(wrapper, "left"), Some("20px"));
        assert_eq!(page.style(wrapper, "width"), Some("300px"));
    }
}
