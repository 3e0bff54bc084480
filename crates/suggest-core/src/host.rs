#![forbid(unsafe_code)]

//! The host page contract.
//!
//! Components never call browser APIs. Everything they read from or write to
//! the page goes through [`Host`], which the embedding environment
//! implements: a real DOM on `wasm32`, an in-memory page in tests.
//!
//! The trait is object safe; components take `&mut dyn Host` so one compiled
//! controller serves every backend.

use crate::geometry::Rect;
use crate::selector::Selector;

/// Opaque handle to an element owned by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

/// Handle for an active content-mutation subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WatchId(pub u32);

/// Events a component asks the host to dispatch on an element.
///
/// All of them bubble, so listeners on an enclosing form observe them too.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomEvent {
    /// Standard `input` event.
    Input,
    /// Standard `change` event.
    Change,
    /// Standard `keyup` event.
    KeyUp,
    /// A `CustomEvent` with a string detail.
    Custom {
        /// Event type name.
        name: String,
        /// Value exposed as `event.detail`.
        detail: String,
    },
}

impl DomEvent {
    /// The DOM event type name.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Input => "input",
            Self::Change => "change",
            Self::KeyUp => "keyup",
            Self::Custom { name, .. } => name,
        }
    }

    /// The sequence that makes a programmatic value write look like typing.
    #[must_use]
    pub fn typing_sequence() -> [DomEvent; 3] {
        [DomEvent::Input, DomEvent::Change, DomEvent::KeyUp]
    }
}

/// One option row the host should render inside a result list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionView {
    /// Element id, referenced by `aria-activedescendant`.
    pub id: String,
    /// The raw term, exposed as the option's `data-value` attribute.
    pub value: String,
    /// Escaped inner markup with the matched span wrapped in `<strong>`.
    pub markup: String,
}

/// Attribute carrying an option's term value.
pub const OPTION_VALUE_ATTR: &str = "data-value";

/// Everything a component needs from the page.
pub trait Host {
    /// Look up an element by its `id` attribute.
    fn element_by_id(&self, id: &str) -> Option<NodeId>;

    /// All elements matching `selector` in document order, restricted to
    /// descendants of `scope` when given.
    fn select_all(&self, scope: Option<NodeId>, selector: &Selector) -> Vec<NodeId>;

    /// The element itself or its nearest ancestor matching `selector`.
    fn closest(&self, node: NodeId, selector: &Selector) -> Option<NodeId>;

    /// Parent element.
    fn parent(&self, node: NodeId) -> Option<NodeId>;

    /// Whether `node` is `ancestor` or one of its descendants.
    fn contains(&self, ancestor: NodeId, node: NodeId) -> bool;

    /// Concatenated text content (untrimmed).
    fn text_content(&self, node: NodeId) -> String;

    /// Attribute value.
    fn attribute(&self, node: NodeId, name: &str) -> Option<String>;

    /// Set an attribute.
    fn set_attribute(&mut self, node: NodeId, name: &str, value: &str);

    /// Remove an attribute.
    fn remove_attribute(&mut self, node: NodeId, name: &str);

    /// Set an inline style property.
    fn set_style(&mut self, node: NodeId, property: &str, value: &str);

    /// Current value of a text input.
    fn input_value(&self, node: NodeId) -> String;

    /// Overwrite the value of a text input without dispatching events.
    fn set_input_value(&mut self, node: NodeId, value: &str);

    /// Bounding rectangle in viewport coordinates.
    fn bounding_rect(&self, node: NodeId) -> Rect;

    /// The visible viewport.
    fn viewport(&self) -> Rect;

    /// Move keyboard focus.
    fn focus(&mut self, node: NodeId);

    /// Replace the children of `list` with one element per option, returning
    /// the new option handles in order.
    fn render_options(&mut self, list: NodeId, options: &[OptionView]) -> Vec<NodeId>;

    /// Dispatch a bubbling event on `node`.
    fn dispatch(&mut self, node: NodeId, event: &DomEvent);

    /// Invoke an optional integration hook by name. Returns `false` when the
    /// hook is not present on the page.
    fn call_hook(&mut self, name: &str, argument: &str) -> bool;

    /// Start delivering [`Event::Mutation`](crate::event::Event::Mutation)
    /// for changes beneath `scope`, or anywhere in the document for `None`.
    fn observe_mutations(&mut self, scope: Option<NodeId>) -> WatchId;

    /// Stop a subscription started with [`observe_mutations`](Host::observe_mutations).
    fn unobserve_mutations(&mut self, watch: WatchId);

    /// Give back handles the component will not use again.
    ///
    /// Hosts that keep elements alive for their handles may drop them; a
    /// released handle may later be reissued for another element.
    fn release_nodes(&mut self, _nodes: &[NodeId]) {}
}
