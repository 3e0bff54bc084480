#![forbid(unsafe_code)]

//! Canonical input/event types.
//!
//! The host page translates its native events into these values before
//! handing them to a component. All events derive `Clone`, `PartialEq` for
//! use in tests and pattern matching.
//!
//! # Design Notes
//!
//! - `Input` carries no payload: the component reads the current value back
//!   from the host so there is a single source of truth for the query.
//! - Pointer targets are host node handles; `None` means the event hit
//!   nothing the host could resolve (e.g. the document root).
//! - `Modifiers` use bitflags for easy combination.

use bitflags::bitflags;

use crate::geometry::Point;
use crate::host::NodeId;

/// Canonical input event.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// The bound input's value changed (user typing, paste, IME commit).
    Input,

    /// The bound input gained focus.
    Focus,

    /// A keyboard event on the bound input.
    Key(KeyEvent),

    /// A pointer event anywhere in the document.
    Pointer(PointerEvent),

    /// Content beneath an observed scope changed.
    Mutation,

    /// The viewport was resized.
    Resize,

    /// The document or an ancestor of the input scrolled.
    Scroll,
}

/// A keyboard event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    /// The key code that was pressed.
    pub code: KeyCode,

    /// Modifier keys held during the event.
    pub modifiers: Modifiers,
}

impl KeyEvent {
    /// Create a new key event with no modifiers.
    #[must_use]
    pub const fn new(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: Modifiers::NONE,
        }
    }

    /// Create a key event with modifiers.
    #[must_use]
    pub const fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    /// Build a key event from a DOM `KeyboardEvent.key` value and its
    /// modifier flags.
    #[must_use]
    pub fn from_dom(key: &str, ctrl: bool, alt: bool, shift: bool, meta: bool) -> Self {
        let mut modifiers = Modifiers::NONE;
        modifiers.set(Modifiers::CTRL, ctrl);
        modifiers.set(Modifiers::ALT, alt);
        modifiers.set(Modifiers::SHIFT, shift);
        modifiers.set(Modifiers::SUPER, meta);
        Self::new(KeyCode::from_dom_key(key)).with_modifiers(modifiers)
    }

    /// Check if any of Ctrl, Alt or Super is held.
    #[must_use]
    pub const fn has_command_modifier(&self) -> bool {
        self.modifiers
            .intersects(Modifiers::CTRL.union(Modifiers::ALT).union(Modifiers::SUPER))
    }
}

/// Key codes the components care about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    /// A printable character.
    Char(char),
    /// Enter / Return.
    Enter,
    /// Escape.
    Escape,
    /// Tab.
    Tab,
    /// Backspace.
    Backspace,
    /// Up arrow.
    Up,
    /// Down arrow.
    Down,
    /// Home.
    Home,
    /// End.
    End,
    /// Anything else.
    Other,
}

impl KeyCode {
    /// Map a DOM `KeyboardEvent.key` value to a key code.
    ///
    /// Accepts the legacy IE/Edge spellings (`"Up"`, `"Down"`, `"Esc"`).
    #[must_use]
    pub fn from_dom_key(key: &str) -> Self {
        match key {
            "Enter" => Self::Enter,
            "Escape" | "Esc" => Self::Escape,
            "Tab" => Self::Tab,
            "Backspace" => Self::Backspace,
            "ArrowUp" | "Up" => Self::Up,
            "ArrowDown" | "Down" => Self::Down,
            "Home" => Self::Home,
            "End" => Self::End,
            other => {
                let mut chars = other.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Self::Char(c),
                    _ => Self::Other,
                }
            }
        }
    }
}

bitflags! {
    /// Modifier keys that can be held during a key event.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Modifiers: u8 {
        /// No modifiers.
        const NONE  = 0b0000;
        /// Shift key.
        const SHIFT = 0b0001;
        /// Alt / Option key.
        const ALT   = 0b0010;
        /// Control key.
        const CTRL  = 0b0100;
        /// Meta / Command / Windows key.
        const SUPER = 0b1000;
    }
}

/// A pointer event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    /// What happened.
    pub kind: PointerKind,
    /// The node the host hit-tested, if any.
    pub target: Option<NodeId>,
    /// Viewport position in CSS pixels.
    pub position: Point,
}

impl PointerEvent {
    /// Create a pointer event at the origin.
    #[must_use]
    pub const fn new(kind: PointerKind, target: Option<NodeId>) -> Self {
        Self {
            kind,
            target,
            position: Point::ORIGIN,
        }
    }

    /// Set the viewport position (builder).
    #[must_use]
    pub const fn at(mut self, position: Point) -> Self {
        self.position = position;
        self
    }
}

/// Pointer event kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerKind {
    /// Button pressed (`mousedown` / `pointerdown`).
    Down,
    /// Completed click.
    Click,
    /// Pointer moved over a node.
    Move,
}
