#![forbid(unsafe_code)]

//! Browser binding.
//!
//! Owns a [`DomHost`] and an [`AutocompleteHandle`], installs document and
//! window listeners that translate DOM events into canonical [`Event`]s, and
//! keeps a single `setTimeout` armed for the handle's earliest deadline.
//!
//! Listeners run synchronously inside DOM dispatch. When the controller
//! itself dispatches `input`/`change`/`keyup` or moves focus, the resulting
//! nested listener calls find the state already borrowed and are dropped,
//! so the controller never observes its own synthetic events.

use std::cell::RefCell;
use std::rc::{Rc, Weak};
use std::time::Duration;

use js_sys::{Array, Function};
use suggest_core::event::{Event, KeyCode, KeyEvent, PointerEvent, PointerKind};
use suggest_core::geometry::Point;
use suggest_core::host::NodeId;
use suggest_web::DomHost;
use suggest_widgets::{AutocompleteAction, AutocompleteConfig, AutocompleteHandle, HandleStatus};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{EventTarget, KeyboardEvent, MouseEvent, Node, Window};
use web_time::Instant;

type Shared = RefCell<Option<Bound>>;

/// Live state behind the JS object.
struct Bound {
    handle: AutocompleteHandle,
    host: DomHost,
    window: Window,
    epoch: Instant,
    timer: Option<i32>,
    tick: Function,
}

impl Bound {
    fn now(&self) -> Duration {
        self.epoch.elapsed()
    }

    fn dispatch(&mut self, event: &Event) -> Option<AutocompleteAction> {
        let now = self.now();
        let action = self.handle.handle_event(&mut self.host, event, now);
        self.rearm();
        action
    }

    fn tick(&mut self) {
        self.timer = None;
        let now = self.now();
        self.handle.tick(&mut self.host, now);
        self.rearm();
    }

    /// Keep exactly one timer armed for the next deadline.
    fn rearm(&mut self) {
        if let Some(id) = self.timer.take() {
            self.window.clear_timeout_with_handle(id);
        }
        let Some(deadline) = self.handle.next_deadline() else {
            return;
        };
        let wait = deadline.saturating_sub(self.now());
        let ms = i32::try_from(wait.as_micros().div_ceil(1000)).unwrap_or(i32::MAX);
        match self
            .window
            .set_timeout_with_callback_and_timeout_and_arguments_0(&self.tick, ms)
        {
            Ok(id) => self.timer = Some(id),
            Err(err) => tracing::warn!(?err, "setTimeout rejected; debounced work stalled"),
        }
    }

    fn cancel_timer(&mut self) {
        if let Some(id) = self.timer.take() {
            self.window.clear_timeout_with_handle(id);
        }
    }

    /// Translate and forward one DOM event.
    fn on_dom_event(&mut self, name: &str, event: &web_sys::Event) {
        let Some(canonical) = self.translate(name, event) else {
            return;
        };
        let action = self.dispatch(&canonical);
        // Tab keeps its default so focus still moves on.
        if let (Some(_), Event::Key(key)) = (action, &canonical)
            && key.code != KeyCode::Tab
        {
            event.prevent_default();
        }
    }

    fn translate(&self, name: &str, event: &web_sys::Event) -> Option<Event> {
        let nodes = *self.handle.autocomplete()?.nodes();
        let on_input = || self.target_node(event, &[nodes.input]) == Some(nodes.input);
        match name {
            "input" if on_input() => Some(Event::Input),
            "focusin" if on_input() => Some(Event::Focus),
            "keydown" if on_input() => {
                let key = event.dyn_ref::<KeyboardEvent>()?;
                Some(Event::Key(KeyEvent::from_dom(
                    &key.key(),
                    key.ctrl_key(),
                    key.alt_key(),
                    key.shift_key(),
                    key.meta_key(),
                )))
            }
            "mousedown" | "click" | "mouseover" => {
                let kind = match name {
                    "mousedown" => PointerKind::Down,
                    "click" => PointerKind::Click,
                    _ => PointerKind::Move,
                };
                let scopes: Vec<NodeId> = [
                    Some(nodes.input),
                    Some(nodes.list),
                    Some(nodes.wrapper),
                    nodes.clear,
                ]
                    .into_iter()
                    .flatten()
                    .collect();
                let mut pointer = PointerEvent::new(kind, self.target_node(event, &scopes));
                if let Some(mouse) = event.dyn_ref::<MouseEvent>() {
                    pointer = pointer.at(Point::new(
                        f64::from(mouse.client_x()),
                        f64::from(mouse.client_y()),
                    ));
                }
                Some(Event::Pointer(pointer))
            }
            "resize" => Some(Event::Resize),
            "scroll" => Some(Event::Scroll),
            _ => None,
        }
    }

    /// The event target as a node, when it lies inside one of `scopes`.
    ///
    /// Targets elsewhere on the page are reported as `None` so arbitrary
    /// page elements are not interned.
    fn target_node(&self, event: &web_sys::Event, scopes: &[NodeId]) -> Option<NodeId> {
        let target = event.target()?;
        let node = target.dyn_ref::<Node>()?;
        let inside = scopes
            .iter()
            .filter_map(|scope| self.host.element(*scope))
            .any(|scope| scope.contains(Some(node)));
        if !inside {
            return None;
        }
        self.host.known_ancestor(node)
    }

    fn teardown(mut self) {
        self.cancel_timer();
        self.handle.destroy(&mut self.host);
        self.host.release();
    }
}

/// Run `f` on the bound state unless it is gone or already borrowed.
fn with_bound<R>(shared: &Shared, f: impl FnOnce(&mut Bound) -> R) -> Option<R> {
    let Ok(mut slot) = shared.try_borrow_mut() else {
        tracing::trace!("nested browser callback dropped");
        return None;
    };
    slot.as_mut().map(f)
}

fn with_weak<R>(weak: &Weak<Shared>, f: impl FnOnce(&mut Bound) -> R) -> Option<R> {
    let shared = weak.upgrade()?;
    with_bound(&shared, f)
}

struct Listener {
    target: EventTarget,
    name: &'static str,
    capture: bool,
    callback: Closure<dyn FnMut(web_sys::Event)>,
}

impl Listener {
    fn install(
        target: EventTarget,
        name: &'static str,
        capture: bool,
        weak: Weak<Shared>,
    ) -> Result<Self, JsValue> {
        let callback = Closure::<dyn FnMut(web_sys::Event)>::new(move |event: web_sys::Event| {
            with_weak(&weak, |bound| bound.on_dom_event(name, &event));
        });
        target.add_event_listener_with_callback_and_bool(
            name,
            callback.as_ref().unchecked_ref(),
            capture,
        )?;
        Ok(Self {
            target,
            name,
            capture,
            callback,
        })
    }

    fn remove(&self) {
        if let Err(err) = self.target.remove_event_listener_with_callback_and_bool(
            self.name,
            self.callback.as_ref().unchecked_ref(),
            self.capture,
        ) {
            tracing::debug!(name = self.name, ?err, "removeEventListener failed");
        }
    }
}

/// Autocomplete bound to the current document.
///
/// ```js
/// const ac = new SuggestAutocomplete({
///   inputId: "city", listId: "city-list", wrapperId: "city-panel",
/// });
/// ac.addTerm("Paris");
/// ac.destroy();
/// ```
#[wasm_bindgen]
pub struct SuggestAutocomplete {
    shared: Rc<Shared>,
    listeners: Vec<Listener>,
    _tick: Closure<dyn FnMut()>,
    _mutation: Closure<dyn FnMut()>,
}

#[wasm_bindgen]
impl SuggestAutocomplete {
    /// Parse `config`, mount (retrying while elements are missing) and start
    /// listening.
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue) -> Result<SuggestAutocomplete, JsValue> {
        let json: String = js_sys::JSON::stringify(&config)?.into();
        let config =
            AutocompleteConfig::from_json(&json).map_err(|err| JsValue::from_str(&err.to_string()))?;
        let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
        let document = window
            .document()
            .ok_or_else(|| JsValue::from_str("no document"))?;

        let shared: Rc<Shared> = Rc::new(RefCell::new(None));

        let weak = Rc::downgrade(&shared);
        let tick = Closure::<dyn FnMut()>::new(move || {
            with_weak(&weak, Bound::tick);
        });
        let weak = Rc::downgrade(&shared);
        let mutation = Closure::<dyn FnMut()>::new(move || {
            with_weak(&weak, |bound| bound.dispatch(&Event::Mutation));
        });

        let on_mutation: Function = mutation.as_ref().unchecked_ref::<Function>().clone();
        let mut host = DomHost::new(window.clone(), on_mutation)
            .ok_or_else(|| JsValue::from_str("no document"))?;
        let epoch = Instant::now();
        let handle = AutocompleteHandle::start(&mut host, config, Duration::ZERO);
        let mut bound = Bound {
            handle,
            host,
            window: window.clone(),
            epoch,
            timer: None,
            tick: tick.as_ref().unchecked_ref::<Function>().clone(),
        };
        bound.rearm();
        *shared.borrow_mut() = Some(bound);

        let mut this = Self {
            shared,
            listeners: Vec::new(),
            _tick: tick,
            _mutation: mutation,
        };
        // On error `this` drops and removes what was installed so far.
        let document: EventTarget = document.into();
        let window: EventTarget = window.into();
        let targets = [
            (&document, "input", false),
            (&document, "focusin", false),
            (&document, "keydown", false),
            (&document, "mousedown", false),
            (&document, "click", false),
            (&document, "mouseover", false),
            (&window, "resize", false),
            (&window, "scroll", true),
        ];
        for (target, name, capture) in targets {
            let listener =
                Listener::install(target.clone(), name, capture, Rc::downgrade(&this.shared))?;
            this.listeners.push(listener);
        }
        Ok(this)
    }

    /// Re-collect terms from the page. Returns whether they changed.
    pub fn refresh(&mut self) -> bool {
        with_bound(&self.shared, |bound| {
            let changed = bound.handle.refresh(&mut bound.host);
            bound.rearm();
            changed
        })
        .unwrap_or(false)
    }

    /// Current terms in display order.
    #[wasm_bindgen(js_name = getTerms)]
    pub fn get_terms(&self) -> Array {
        with_bound(&self.shared, |bound| bound.handle.terms())
            .unwrap_or_default()
            .into_iter()
            .map(JsValue::from)
            .collect()
    }

    /// Add a term that survives later refreshes.
    #[wasm_bindgen(js_name = addTerm)]
    pub fn add_term(&mut self, term: &str) -> bool {
        with_bound(&self.shared, |bound| bound.handle.add_term(&mut bound.host, term))
            .unwrap_or(false)
    }

    /// Remove a term and keep it excluded from later refreshes.
    #[wasm_bindgen(js_name = removeTerm)]
    pub fn remove_term(&mut self, term: &str) -> bool {
        with_bound(&self.shared, |bound| bound.handle.remove_term(&mut bound.host, term))
            .unwrap_or(false)
    }

    /// Commit `term` into the input. Focus moves to the input unless
    /// `restoreFocus` is `false`.
    #[wasm_bindgen(js_name = selectTerm)]
    pub fn select_term(&mut self, term: &str, restore_focus: Option<bool>) {
        with_bound(&self.shared, |bound| {
            bound
                .handle
                .select_term(&mut bound.host, term, restore_focus.unwrap_or(true));
            bound.rearm();
        });
    }

    /// `"pending"`, `"active"`, `"inert"` or `"destroyed"`.
    pub fn status(&self) -> String {
        let status = with_bound(&self.shared, |bound| bound.handle.status())
            .unwrap_or(HandleStatus::Destroyed);
        match status {
            HandleStatus::Pending => "pending",
            HandleStatus::Active => "active",
            HandleStatus::Inert => "inert",
            HandleStatus::Destroyed => "destroyed",
        }
        .to_string()
    }

    /// Remove every listener, observer and timer and unbind from the page.
    pub fn destroy(&mut self) {
        let bound = match self.shared.try_borrow_mut() {
            Ok(mut slot) => slot.take(),
            Err(_) => {
                tracing::warn!("destroy called from inside a callback; ignored");
                return;
            }
        };
        for listener in self.listeners.drain(..) {
            listener.remove();
        }
        if let Some(bound) = bound {
            bound.teardown();
        }
    }
}

impl Drop for SuggestAutocomplete {
    fn drop(&mut self) {
        self.destroy();
    }
}
