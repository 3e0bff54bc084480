#![forbid(unsafe_code)]

//! A deterministic in-memory page.
//!
//! [`MemoryPage`] implements [`Host`] over a small element arena so the
//! autocomplete can be driven headlessly: tests build markup with
//! [`ElementSpec`], feed canonical events, and inspect what the component
//! wrote back (attributes, styles, rendered options, dispatched events,
//! focus, hook calls).
//!
//! Only edits made through the page's own editing methods
//! ([`append`](MemoryPage::append), [`remove`](MemoryPage::remove),
//! [`set_text`](MemoryPage::set_text)) count as content mutations. Writes
//! performed by a component through [`Host`] are not reported back to it.

use std::collections::BTreeMap;

use rustc_hash::FxHashMap;
use suggest_core::geometry::Rect;
use suggest_core::host::{DomEvent, Host, NodeId, OPTION_VALUE_ATTR, OptionView, WatchId};
use suggest_core::selector::{Selector, SelectorTarget};

/// Default viewport size (a common laptop resolution).
const DEFAULT_VIEWPORT: Rect = Rect::new(0.0, 0.0, 1280.0, 800.0);

/// Description of an element to append.
#[derive(Debug, Clone, Default)]
pub struct ElementSpec {
    tag: String,
    attributes: BTreeMap<String, String>,
    text: String,
    value: String,
    rect: Rect,
}

impl ElementSpec {
    /// An element with the given tag name.
    #[must_use]
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_ascii_lowercase(),
            ..Self::default()
        }
    }

    /// Set the `id` attribute.
    #[must_use]
    pub fn with_id(self, id: &str) -> Self {
        self.with_attribute("id", id)
    }

    /// Add a class.
    #[must_use]
    pub fn with_class(mut self, class: &str) -> Self {
        let classes = self.attributes.entry("class".to_string()).or_default();
        if !classes.is_empty() {
            classes.push(' ');
        }
        classes.push_str(class);
        self
    }

    /// Set an attribute.
    #[must_use]
    pub fn with_attribute(mut self, name: &str, value: &str) -> Self {
        self.attributes
            .insert(name.to_ascii_lowercase(), value.to_string());
        self
    }

    /// Set the element's own text.
    #[must_use]
    pub fn with_text(mut self, text: &str) -> Self {
        self.text = text.to_string();
        self
    }

    /// Set the input value.
    #[must_use]
    pub fn with_value(mut self, value: &str) -> Self {
        self.value = value.to_string();
        self
    }

    /// Set the bounding rectangle.
    #[must_use]
    pub fn with_rect(mut self, rect: Rect) -> Self {
        self.rect = rect;
        self
    }
}

/// An event a component dispatched on the page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dispatched {
    /// The node the event was dispatched on.
    pub target: NodeId,
    /// The event.
    pub event: DomEvent,
}

#[derive(Debug, Clone)]
struct Element {
    tag: String,
    attributes: BTreeMap<String, String>,
    style: BTreeMap<String, String>,
    text: String,
    value: String,
    markup: Option<String>,
    rect: Rect,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl Element {
    fn from_spec(spec: ElementSpec, parent: Option<NodeId>) -> Self {
        Self {
            tag: spec.tag,
            attributes: spec.attributes,
            style: BTreeMap::new(),
            text: spec.text,
            value: spec.value,
            markup: None,
            rect: spec.rect,
            parent,
            children: Vec::new(),
        }
    }
}

impl SelectorTarget for Element {
    fn tag_name(&self) -> &str {
        &self.tag
    }

    fn element_id(&self) -> Option<&str> {
        self.attributes.get("id").map(String::as_str)
    }

    fn has_class(&self, class: &str) -> bool {
        self.attributes
            .get("class")
            .is_some_and(|list| list.split_ascii_whitespace().any(|c| c == class))
    }

    fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }
}

/// In-memory [`Host`] implementation.
#[derive(Debug, Clone)]
pub struct MemoryPage {
    nodes: Vec<Element>,
    viewport: Rect,
    focused: Option<NodeId>,
    dispatched: Vec<Dispatched>,
    hooks: FxHashMap<String, Vec<String>>,
    watches: FxHashMap<WatchId, Option<NodeId>>,
    next_watch: u32,
    pending_mutations: Vec<WatchId>,
    renders: u64,
    released: Vec<NodeId>,
}

impl Default for MemoryPage {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryPage {
    /// An empty page with a `<body>` root.
    #[must_use]
    pub fn new() -> Self {
        Self {
            nodes: vec![Element::from_spec(
                ElementSpec::new("body").with_rect(DEFAULT_VIEWPORT),
                None,
            )],
            viewport: DEFAULT_VIEWPORT,
            focused: None,
            dispatched: Vec::new(),
            hooks: FxHashMap::default(),
            watches: FxHashMap::default(),
            next_watch: 0,
            pending_mutations: Vec::new(),
            renders: 0,
            released: Vec::new(),
        }
    }

    /// The `<body>` element.
    #[must_use]
    pub const fn root(&self) -> NodeId {
        NodeId(0)
    }

    // -- Page editing -------------------------------------------------------

    /// Append a new element under `parent`.
    pub fn append(&mut self, parent: NodeId, spec: ElementSpec) -> NodeId {
        let node = self.push_node(parent, spec);
        self.record_mutation(parent);
        node
    }

    /// Detach `node` and its subtree from the page.
    pub fn remove(&mut self, node: NodeId) {
        let Some(parent) = self.get(node).and_then(|el| el.parent) else {
            return;
        };
        self.detach(node);
        self.record_mutation(parent);
    }

    /// Replace an element's own text.
    pub fn set_text(&mut self, node: NodeId, text: &str) {
        if let Some(el) = self.get_mut(node) {
            el.text = text.to_string();
            self.record_mutation(node);
        }
    }

    /// Set an element's bounding rectangle (layout is not simulated).
    pub fn set_rect(&mut self, node: NodeId, rect: Rect) {
        if let Some(el) = self.get_mut(node) {
            el.rect = rect;
        }
    }

    /// Set the viewport rectangle.
    pub fn set_viewport(&mut self, viewport: Rect) {
        self.viewport = viewport;
    }

    /// Make an integration hook available under `name`.
    pub fn install_hook(&mut self, name: &str) {
        self.hooks.entry(name.to_string()).or_default();
    }

    // -- Inspection ---------------------------------------------------------

    /// Children of `node` in order.
    #[must_use]
    pub fn children(&self, node: NodeId) -> &[NodeId] {
        self.get(node).map_or(&[], |el| el.children.as_slice())
    }

    /// An inline style property.
    #[must_use]
    pub fn style(&self, node: NodeId, property: &str) -> Option<&str> {
        self.get(node)
            .and_then(|el| el.style.get(property))
            .map(String::as_str)
    }

    /// Inner markup of a rendered option.
    #[must_use]
    pub fn markup(&self, node: NodeId) -> Option<&str> {
        self.get(node).and_then(|el| el.markup.as_deref())
    }

    /// The element that has focus.
    #[must_use]
    pub fn focused(&self) -> Option<NodeId> {
        self.focused
    }

    /// Every event dispatched so far, oldest first.
    #[must_use]
    pub fn dispatched(&self) -> &[Dispatched] {
        &self.dispatched
    }

    /// Names of events dispatched on `node` itself.
    #[must_use]
    pub fn events_on(&self, node: NodeId) -> Vec<String> {
        self.dispatched
            .iter()
            .filter(|d| d.target == node)
            .map(|d| d.event.name().to_string())
            .collect()
    }

    /// Names of events that bubbled through `node` (dispatched on it or a
    /// descendant).
    #[must_use]
    pub fn events_reaching(&self, node: NodeId) -> Vec<String> {
        self.dispatched
            .iter()
            .filter(|d| self.contains(node, d.target))
            .map(|d| d.event.name().to_string())
            .collect()
    }

    /// Forget recorded events.
    pub fn clear_dispatched(&mut self) {
        self.dispatched.clear();
    }

    /// Arguments passed to hook `name`, or `None` if it is not installed.
    #[must_use]
    pub fn hook_calls(&self, name: &str) -> Option<&[String]> {
        self.hooks.get(name).map(Vec::as_slice)
    }

    /// Number of `render_options` calls.
    #[must_use]
    pub fn render_count(&self) -> u64 {
        self.renders
    }

    /// Number of live mutation subscriptions.
    #[must_use]
    pub fn active_watches(&self) -> usize {
        self.watches.len()
    }

    /// Whether a component has handed `node` back through
    /// [`Host::release_nodes`]. Handles stay valid here; the page owns its
    /// elements.
    #[must_use]
    pub fn was_released(&self, node: NodeId) -> bool {
        self.released.contains(&node)
    }

    /// Drain mutation notifications owed to subscribers, one entry per
    /// notification.
    pub fn take_mutations(&mut self) -> Vec<WatchId> {
        std::mem::take(&mut self.pending_mutations)
    }

    // -- Internals ----------------------------------------------------------

    fn get(&self, node: NodeId) -> Option<&Element> {
        self.nodes.get(node.0 as usize)
    }

    fn get_mut(&mut self, node: NodeId) -> Option<&mut Element> {
        self.nodes.get_mut(node.0 as usize)
    }

    fn push_node(&mut self, parent: NodeId, spec: ElementSpec) -> NodeId {
        let node = NodeId(self.nodes.len() as u32);
        self.nodes.push(Element::from_spec(spec, Some(parent)));
        if let Some(parent) = self.get_mut(parent) {
            parent.children.push(node);
        }
        node
    }

    fn detach(&mut self, node: NodeId) {
        let Some(parent) = self.get_mut(node).and_then(|el| el.parent.take()) else {
            return;
        };
        if let Some(parent) = self.get_mut(parent) {
            parent.children.retain(|child| *child != node);
        }
    }

    fn is_attached(&self, node: NodeId) -> bool {
        self.contains(self.root(), node)
    }

    fn record_mutation(&mut self, node: NodeId) {
        let mut hit: Vec<WatchId> = self
            .watches
            .iter()
            .filter(|(_, scope)| scope.is_none_or(|scope| self.contains(scope, node)))
            .map(|(watch, _)| *watch)
            .collect();
        hit.sort_unstable();
        self.pending_mutations.extend(hit);
    }

    /// Descendants of `scope` in document order, excluding `scope`.
    fn descendants(&self, scope: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(scope).iter().rev().copied().collect();
        while let Some(node) = stack.pop() {
            out.push(node);
            stack.extend(self.children(node).iter().rev().copied());
        }
        out
    }

    fn ancestors(&self, node: NodeId) -> Vec<&Element> {
        let mut out = Vec::new();
        let mut current = self.get(node).and_then(|el| el.parent);
        while let Some(id) = current {
            let Some(el) = self.get(id) else { break };
            out.push(el);
            current = el.parent;
        }
        out
    }

    fn matches(&self, node: NodeId, selector: &Selector) -> bool {
        self.get(node)
            .is_some_and(|el| selector.matches(el, self.ancestors(node)))
    }
}

impl Host for MemoryPage {
    fn element_by_id(&self, id: &str) -> Option<NodeId> {
        let root = self.root();
        std::iter::once(root)
            .chain(self.descendants(root))
            .find(|node| self.get(*node).and_then(|el| el.element_id()) == Some(id))
    }

    fn select_all(&self, scope: Option<NodeId>, selector: &Selector) -> Vec<NodeId> {
        let scope = scope.unwrap_or(self.root());
        if !self.is_attached(scope) {
            return Vec::new();
        }
        self.descendants(scope)
            .into_iter()
            .filter(|node| self.matches(*node, selector))
            .collect()
    }

    fn closest(&self, node: NodeId, selector: &Selector) -> Option<NodeId> {
        let mut current = Some(node);
        while let Some(id) = current {
            if self.matches(id, selector) {
                return Some(id);
            }
            current = self.parent(id);
        }
        None
    }

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.get(node).and_then(|el| el.parent)
    }

    fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.parent(id);
        }
        false
    }

    fn text_content(&self, node: NodeId) -> String {
        let mut out = String::new();
        if let Some(el) = self.get(node) {
            out.push_str(&el.text);
        }
        for child in self.descendants(node) {
            if let Some(el) = self.get(child) {
                out.push_str(&el.text);
            }
        }
        out
    }

    fn attribute(&self, node: NodeId, name: &str) -> Option<String> {
        self.get(node)
            .and_then(|el| el.attributes.get(&name.to_ascii_lowercase()))
            .cloned()
    }

    fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) {
        if let Some(el) = self.get_mut(node) {
            el.attributes
                .insert(name.to_ascii_lowercase(), value.to_string());
        }
    }

    fn remove_attribute(&mut self, node: NodeId, name: &str) {
        if let Some(el) = self.get_mut(node) {
            el.attributes.remove(&name.to_ascii_lowercase());
        }
    }

    fn set_style(&mut self, node: NodeId, property: &str, value: &str) {
        if let Some(el) = self.get_mut(node) {
            el.style.insert(property.to_string(), value.to_string());
        }
    }

    fn input_value(&self, node: NodeId) -> String {
        self.get(node).map(|el| el.value.clone()).unwrap_or_default()
    }

    fn set_input_value(&mut self, node: NodeId, value: &str) {
        if let Some(el) = self.get_mut(node) {
            el.value = value.to_string();
        }
    }

    fn bounding_rect(&self, node: NodeId) -> Rect {
        self.get(node).map(|el| el.rect).unwrap_or_default()
    }

    fn viewport(&self) -> Rect {
        self.viewport
    }

    fn focus(&mut self, node: NodeId) {
        if self.get(node).is_some() {
            self.focused = Some(node);
        }
    }

    fn render_options(&mut self, list: NodeId, options: &[OptionView]) -> Vec<NodeId> {
        for child in self.children(list).to_vec() {
            self.detach(child);
        }
        self.renders += 1;
        options
            .iter()
            .map(|option| {
                let spec = ElementSpec::new("li")
                    .with_id(&option.id)
                    .with_attribute(OPTION_VALUE_ATTR, &option.value)
                    .with_text(&option.value);
                let node = self.push_node(list, spec);
                if let Some(el) = self.get_mut(node) {
                    el.markup = Some(option.markup.clone());
                }
                node
            })
            .collect()
    }

    fn dispatch(&mut self, node: NodeId, event: &DomEvent) {
        self.dispatched.push(Dispatched {
            target: node,
            event: event.clone(),
        });
    }

    fn call_hook(&mut self, name: &str, argument: &str) -> bool {
        match self.hooks.get_mut(name) {
            Some(calls) => {
                calls.push(argument.to_string());
                true
            }
            None => false,
        }
    }

    fn observe_mutations(&mut self, scope: Option<NodeId>) -> WatchId {
        let watch = WatchId(self.next_watch);
        self.next_watch = self.next_watch.wrapping_add(1);
        self.watches.insert(watch, scope);
        watch
    }

    fn unobserve_mutations(&mut self, watch: WatchId) {
        self.watches.remove(&watch);
        self.pending_mutations.retain(|pending| *pending != watch);
    }

    fn release_nodes(&mut self, nodes: &[NodeId]) {
        for node in nodes {
            if !self.released.contains(node) {
                self.released.push(*node);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn page_with_terms() -> (MemoryPage, NodeId) {
        let mut page = MemoryPage::new();
        let root = page.root();
        let section = page.append(root, ElementSpec::new("section").with_id("cities"));
        for name in ["Paris", "Parma"] {
            let item = page.append(section, ElementSpec::new("div").with_class("item"));
            page.append(item, ElementSpec::new("span").with_class("name").with_text(name));
        }
        (page, section)
    }

    #[test]
    fn select_all_in_document_order() {
        let (page, _) = page_with_terms();
        let names = page.select_all(None, &Selector::class("name"));
        let texts: Vec<String> = names.iter().map(|n| page.text_content(*n)).collect();
        assert_eq!(texts, ["Paris", "Parma"]);
    }

    #[test]
    fn select_all_scope_excludes_outside() {
        let (mut page, section) = page_with_terms();
        let root = page.root();
        page.append(root, ElementSpec::new("span").with_class("name").with_text("London"));
        assert_eq!(page.select_all(Some(section), &Selector::class("name")).len(), 2);
        assert_eq!(page.select_all(None, &Selector::class("name")).len(), 3);
    }

    #[test]
    fn descendant_selector() {
        let (page, _) = page_with_terms();
        let selector = Selector::parse("#cities .item span.name").unwrap();
        assert_eq!(page.select_all(None, &selector).len(), 2);
        let miss = Selector::parse("#elsewhere .name").unwrap();
        assert!(page.select_all(None, &miss).is_empty());
    }

    #[test]
    fn text_content_concatenates_subtree() {
        let (page, section) = page_with_terms();
        assert_eq!(page.text_content(section), "ParisParma");
    }

    #[test]
    fn closest_is_inclusive() {
        let (page, section) = page_with_terms();
        let name = page.select_all(None, &Selector::class("name"))[0];
        assert_eq!(page.closest(name, &Selector::class("name")), Some(name));
        assert_eq!(page.closest(name, &Selector::id("cities")), Some(section));
        assert_eq!(page.closest(name, &Selector::id("nope")), None);
    }

    #[test]
    fn removed_nodes_are_unreachable() {
        let (mut page, section) = page_with_terms();
        page.remove(section);
        assert_eq!(page.element_by_id("cities"), None);
        assert!(page.select_all(None, &Selector::class("name")).is_empty());
    }

    #[test]
    fn render_options_replaces_children() {
        let mut page = MemoryPage::new();
        let root = page.root();
        let list = page.append(root, ElementSpec::new("ul").with_id("list"));
        let view = |id: &str, value: &str| OptionView {
            id: id.into(),
            value: value.into(),
            markup: format!("<strong>{value}</strong>"),
        };
        page.render_options(list, &[view("o-0", "Paris"), view("o-1", "Parma")]);
        let nodes = page.render_options(list, &[view("o-0", "Lyon")]);
        assert_eq!(page.children(list), nodes.as_slice());
        assert_eq!(page.attribute(nodes[0], OPTION_VALUE_ATTR).as_deref(), Some("Lyon"));
        assert_eq!(page.markup(nodes[0]), Some("<strong>Lyon</strong>"));
        assert_eq!(page.render_count(), 2);
    }

    #[test]
    fn mutations_reach_only_scoped_watches() {
        let (mut page, section) = page_with_terms();
        let root = page.root();
        let everywhere = page.observe_mutations(None);
        let scoped = page.observe_mutations(Some(section));

        page.append(root, ElementSpec::new("footer"));
        assert_eq!(page.take_mutations(), [everywhere]);

        page.append(section, ElementSpec::new("div"));
        assert_eq!(page.take_mutations(), [everywhere, scoped]);

        page.unobserve_mutations(everywhere);
        page.set_text(section, "x");
        assert_eq!(page.take_mutations(), [scoped]);
        assert_eq!(page.active_watches(), 1);
    }

    #[test]
    fn host_writes_are_not_mutations() {
        let (mut page, section) = page_with_terms();
        page.observe_mutations(None);
        page.set_attribute(section, "aria-live", "polite");
        page.set_style(section, "display", "none");
        assert!(page.take_mutations().is_empty());
        assert_eq!(page.style(section, "display"), Some("none"));
    }

    #[test]
    fn hooks_record_calls_only_when_installed() {
        let mut page = MemoryPage::new();
        assert!(!page.call_hook("reload", "Paris"));
        page.install_hook("reload");
        assert!(page.call_hook("reload", "Paris"));
        assert_eq!(page.hook_calls("reload"), Some(&["Paris".to_string()][..]));
    }

    #[test]
    fn events_bubble_to_ancestors() {
        let mut page = MemoryPage::new();
        let root = page.root();
        let form = page.append(root, ElementSpec::new("form"));
        let input = page.append(form, ElementSpec::new("input"));
        for event in DomEvent::typing_sequence() {
            page.dispatch(input, &event);
        }
        assert_eq!(page.events_on(input), ["input", "change", "keyup"]);
        assert_eq!(page.events_reaching(form), ["input", "change", "keyup"]);
        assert!(page.events_on(form).is_empty());
    }
}
