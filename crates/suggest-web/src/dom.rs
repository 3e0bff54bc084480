#![forbid(unsafe_code)]

//! [`Host`] over the browser DOM.
//!
//! Elements are interned on first sight: a `WeakMap` maps each element to its
//! [`NodeId`] and a slot table keeps the element alive for later calls.
//! Slots are freed when the component hands handles back through
//! [`Host::release_nodes`] and when [`Host::render_options`] replaces a list,
//! then reused for the next element interned. [`DomHost::release`] empties
//! the table on destroy.
//!
//! Event targets are never interned; [`DomHost::known_ancestor`] maps them
//! to the nearest element that already has a handle.
//!
//! Mutation subscriptions share one JS callback supplied at construction;
//! the binding turns each callback invocation into an
//! [`Event::Mutation`](suggest_core::event::Event::Mutation).

use std::cell::RefCell;

use js_sys::{Function, Reflect, WeakMap};
use rustc_hash::FxHashMap;
use suggest_core::geometry::Rect;
use suggest_core::host::{DomEvent, Host, NodeId, OPTION_VALUE_ATTR, OptionView, WatchId};
use suggest_core::selector::Selector;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{
    CustomEvent, CustomEventInit, Document, Element, Event, EventInit, HtmlElement,
    HtmlInputElement, MutationObserver, MutationObserverInit, Node, Window,
};

/// `web-sys` backed [`Host`].
pub struct DomHost {
    window: Window,
    document: Document,
    nodes: RefCell<Slots>,
    ids: WeakMap,
    options: FxHashMap<NodeId, Vec<NodeId>>,
    observers: FxHashMap<WatchId, MutationObserver>,
    next_watch: u32,
    on_mutation: Function,
}

impl std::fmt::Debug for DomHost {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DomHost")
            .field("nodes", &self.nodes.borrow().live())
            .field("observers", &self.observers.len())
            .finish()
    }
}

impl DomHost {
    /// Bind to `window`'s document. Returns `None` when there is no document.
    #[must_use]
    pub fn new(window: Window, on_mutation: Function) -> Option<Self> {
        let document = window.document()?;
        Some(Self {
            window,
            document,
            nodes: RefCell::new(Slots::default()),
            ids: WeakMap::new(),
            options: FxHashMap::default(),
            observers: FxHashMap::default(),
            next_watch: 0,
            on_mutation,
        })
    }

    /// The handle for `element`, interning it if needed.
    pub fn node_for(&self, element: &Element) -> NodeId {
        if let Some(id) = self.ids.get(element).as_f64() {
            return NodeId(id as u32);
        }
        let node = self.nodes.borrow_mut().insert(element.clone());
        self.ids.set(element, &JsValue::from(node.0));
        node
    }

    /// The handle of `node` or its nearest ancestor that already has one.
    #[must_use]
    pub fn known_ancestor(&self, node: &Node) -> Option<NodeId> {
        let mut current = Some(node.clone());
        while let Some(node) = current {
            if let Some(id) = self.ids.get(&node).as_f64() {
                return Some(NodeId(id as u32));
            }
            current = node.parent_node();
        }
        None
    }

    /// The element behind `node`.
    #[must_use]
    pub fn element(&self, node: NodeId) -> Option<Element> {
        self.nodes.borrow().get(node).cloned()
    }

    /// Number of elements currently held.
    #[must_use]
    pub fn live_nodes(&self) -> usize {
        self.nodes.borrow().live()
    }

    /// Disconnect every observer and forget interned elements.
    pub fn release(&mut self) {
        for (_, observer) in self.observers.drain() {
            observer.disconnect();
        }
        *self.nodes.borrow_mut() = Slots::default();
        self.ids = WeakMap::new();
        self.options.clear();
    }

    fn forget(&self, node: NodeId) {
        if let Some(element) = self.nodes.borrow_mut().remove(node) {
            self.ids.delete(&element);
        }
    }

    fn html(&self, node: NodeId) -> Option<HtmlElement> {
        self.element(node)?.dyn_into::<HtmlElement>().ok()
    }

    fn intern_all(&self, list: web_sys::NodeList) -> Vec<NodeId> {
        (0..list.length())
            .filter_map(|i| list.item(i))
            .filter_map(|node| node.dyn_into::<Element>().ok())
            .map(|el| self.node_for(&el))
            .collect()
    }
}

impl Drop for DomHost {
    fn drop(&mut self) {
        for (_, observer) in self.observers.drain() {
            observer.disconnect();
        }
    }
}

impl Host for DomHost {
    fn element_by_id(&self, id: &str) -> Option<NodeId> {
        let element = self.document.get_element_by_id(id)?;
        Some(self.node_for(&element))
    }

    fn select_all(&self, scope: Option<NodeId>, selector: &Selector) -> Vec<NodeId> {
        let css = selector.to_string();
        let result = match scope {
            Some(scope) => match self.element(scope) {
                Some(el) => el.query_selector_all(&css),
                None => return Vec::new(),
            },
            None => self.document.query_selector_all(&css),
        };
        match result {
            Ok(list) => self.intern_all(list),
            Err(err) => {
                tracing::debug!(selector = %css, ?err, "querySelectorAll rejected selector");
                Vec::new()
            }
        }
    }

    fn closest(&self, node: NodeId, selector: &Selector) -> Option<NodeId> {
        let found = self.element(node)?.closest(&selector.to_string()).ok()??;
        Some(self.node_for(&found))
    }

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        let parent = self.element(node)?.parent_element()?;
        Some(self.node_for(&parent))
    }

    fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        let (Some(ancestor), Some(node)) = (self.element(ancestor), self.element(node)) else {
            return false;
        };
        let node: &Node = &node;
        ancestor.contains(Some(node))
    }

    fn text_content(&self, node: NodeId) -> String {
        self.element(node)
            .and_then(|el| el.text_content())
            .unwrap_or_default()
    }

    fn attribute(&self, node: NodeId, name: &str) -> Option<String> {
        self.element(node)?.get_attribute(name)
    }

    fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) {
        let Some(el) = self.element(node) else {
            return;
        };
        if let Err(err) = el.set_attribute(name, value) {
            tracing::trace!(name, ?err, "setAttribute failed");
        }
    }

    fn remove_attribute(&mut self, node: NodeId, name: &str) {
        if let Some(el) = self.element(node) {
            let _ = el.remove_attribute(name);
        }
    }

    fn set_style(&mut self, node: NodeId, property: &str, value: &str) {
        if let Some(el) = self.html(node) {
            let _ = el.style().set_property(property, value);
        }
    }

    fn input_value(&self, node: NodeId) -> String {
        self.element(node)
            .and_then(|el| el.dyn_into::<HtmlInputElement>().ok())
            .map(|input| input.value())
            .unwrap_or_default()
    }

    fn set_input_value(&mut self, node: NodeId, value: &str) {
        if let Some(input) = self
            .element(node)
            .and_then(|el| el.dyn_into::<HtmlInputElement>().ok())
        {
            input.set_value(value);
        }
    }

    fn bounding_rect(&self, node: NodeId) -> Rect {
        self.element(node).map_or(Rect::default(), |el| {
            let r = el.get_bounding_client_rect();
            Rect::new(r.x(), r.y(), r.width(), r.height())
        })
    }

    fn viewport(&self) -> Rect {
        let dim = |v: Result<JsValue, JsValue>| v.ok().and_then(|v| v.as_f64()).unwrap_or(0.0);
        Rect::from_size(dim(self.window.inner_width()), dim(self.window.inner_height()))
    }

    fn focus(&mut self, node: NodeId) {
        if let Some(el) = self.html(node) {
            let _ = el.focus();
        }
    }

    fn render_options(&mut self, list: NodeId, options: &[OptionView]) -> Vec<NodeId> {
        let Some(list_el) = self.element(list) else {
            return Vec::new();
        };
        for stale in self.options.remove(&list).unwrap_or_default() {
            self.forget(stale);
        }
        list_el.set_inner_html("");
        let mut out = Vec::with_capacity(options.len());
        for option in options {
            let Ok(item) = self.document.create_element("li") else {
                continue;
            };
            item.set_id(&option.id);
            let _ = item.set_attribute(OPTION_VALUE_ATTR, &option.value);
            item.set_inner_html(&option.markup);
            if list_el.append_child(&item).is_ok() {
                out.push(self.node_for(&item));
            }
        }
        if !out.is_empty() {
            self.options.insert(list, out.clone());
        }
        out
    }

    fn dispatch(&mut self, node: NodeId, event: &DomEvent) {
        let Some(el) = self.element(node) else {
            return;
        };
        let built: Result<Event, JsValue> = match event {
            DomEvent::Custom { name, detail } => {
                let init = CustomEventInit::new();
                init.set_bubbles(true);
                init.set_detail(&JsValue::from_str(detail));
                CustomEvent::new_with_event_init_dict(name, &init).map(Event::from)
            }
            standard => {
                let init = EventInit::new();
                init.set_bubbles(true);
                Event::new_with_event_init_dict(standard.name(), &init)
            }
        };
        match built {
            Ok(ev) => {
                let _ = el.dispatch_event(&ev);
            }
            Err(err) => tracing::debug!(event = event.name(), ?err, "event construction failed"),
        }
    }

    fn call_hook(&mut self, name: &str, argument: &str) -> bool {
        // Dotted paths resolve from `window`; the last segment's owner is `this`.
        let mut owner: JsValue = self.window.clone().into();
        let mut target = owner.clone();
        for segment in name.split('.') {
            owner = target;
            target = Reflect::get(&owner, &JsValue::from_str(segment)).unwrap_or(JsValue::UNDEFINED);
            if target.is_undefined() || target.is_null() {
                return false;
            }
        }
        let Some(function) = target.dyn_ref::<Function>() else {
            return false;
        };
        if let Err(err) = function.call1(&owner, &JsValue::from_str(argument)) {
            tracing::debug!(hook = name, ?err, "integration hook threw");
        }
        true
    }

    fn observe_mutations(&mut self, scope: Option<NodeId>) -> WatchId {
        let watch = WatchId(self.next_watch);
        self.next_watch = self.next_watch.wrapping_add(1);

        let target: Node = match scope.and_then(|s| self.element(s)) {
            Some(el) => el.into(),
            None => self.document.clone().into(),
        };
        let init = MutationObserverInit::new();
        init.set_child_list(true);
        init.set_subtree(true);
        init.set_character_data(true);

        match MutationObserver::new(&self.on_mutation) {
            Ok(observer) => match observer.observe_with_options(&target, &init) {
                Ok(()) => {
                    self.observers.insert(watch, observer);
                }
                Err(err) => tracing::warn!(?err, "MutationObserver.observe failed"),
            },
            Err(err) => tracing::warn!(?err, "MutationObserver unavailable"),
        }
        watch
    }

    fn unobserve_mutations(&mut self, watch: WatchId) {
        if let Some(observer) = self.observers.remove(&watch) {
            observer.disconnect();
        }
    }

    fn release_nodes(&mut self, nodes: &[NodeId]) {
        for node in nodes {
            self.forget(*node);
        }
        tracing::trace!(
            released = nodes.len(),
            live = self.live_nodes(),
            "element handles released"
        );
    }
}

/// Element table indexed by [`NodeId`], reusing freed slots.
#[derive(Default)]
struct Slots {
    slots: Vec<Option<Element>>,
    free_list: Vec<u32>,
}

impl Slots {
    fn insert(&mut self, element: Element) -> NodeId {
        if let Some(id) = self.free_list.pop() {
            self.slots[id as usize] = Some(element);
            return NodeId(id);
        }
        self.slots.push(Some(element));
        NodeId((self.slots.len() - 1) as u32)
    }

    fn get(&self, node: NodeId) -> Option<&Element> {
        self.slots.get(node.0 as usize)?.as_ref()
    }

    fn remove(&mut self, node: NodeId) -> Option<Element> {
        let element = self.slots.get_mut(node.0 as usize)?.take()?;
        self.free_list.push(node.0);
        Some(element)
    }

    fn live(&self) -> usize {
        self.slots.len() - self.free_list.len()
    }
}
