#![forbid(unsafe_code)]

//! Suggest public facade crate.
//!
//! Re-exports the types an embedder needs from the internal crates, offers a
//! prelude, an optional thread-local default instance, and on `wasm32` the
//! [`SuggestAutocomplete`] browser binding.
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use suggest::prelude::*;
//!
//! let mut page = MemoryPage::new();
//! let root = page.root();
//! let input = page.append(root, ElementSpec::new("input").with_id("q"));
//! let panel = page.append(root, ElementSpec::new("div").with_id("panel"));
//! page.append(panel, ElementSpec::new("ul").with_id("list"));
//! for city in ["Paris", "Parma", "London"] {
//!     page.append(root, ElementSpec::new("li").with_class("suggest-term").with_text(city));
//! }
//!
//! let config = AutocompleteConfig::from_json(
//!     r#"{ "inputId": "q", "listId": "list", "wrapperId": "panel", "debounceDelayMs": 0 }"#,
//! )?;
//! let mut handle = AutocompleteHandle::start(&mut page, config, Duration::ZERO);
//!
//! page.set_input_value(input, "par");
//! handle.handle_event(&mut page, &Event::Input, Duration::ZERO);
//! let shown: Vec<&str> = handle
//!     .autocomplete()
//!     .map(|ac| ac.results().iter().map(|r| r.term()).collect())
//!     .unwrap_or_default();
//! assert_eq!(shown, ["Paris", "Parma"]);
//! # Ok::<(), suggest::ConfigError>(())
//! ```

pub mod global;

#[cfg(target_arch = "wasm32")]
mod wasm;

#[cfg(target_arch = "wasm32")]
pub use wasm::SuggestAutocomplete;

// --- Core re-exports -------------------------------------------------------

pub use suggest_core::event::{Event, KeyCode, KeyEvent, Modifiers, PointerEvent, PointerKind};
pub use suggest_core::geometry::{Point, Rect};
pub use suggest_core::host::{DomEvent, Host, NodeId, OptionView, WatchId};
pub use suggest_core::retry::RetryPolicy;
pub use suggest_core::selector::{Selector, SelectorError};

// --- Text re-exports -------------------------------------------------------

pub use suggest_text::{CacheStats, MatchOptions, MatchResult, Term, TermIndex};

// --- Widget re-exports -----------------------------------------------------

pub use suggest_widgets::{
    Autocomplete, AutocompleteAction, AutocompleteConfig, AutocompleteHandle, ConfigError,
    FilterHookConfig, FilterNotifier, Gap, HandleStatus, HookNotifier, MountError,
    SelectionState, SourceConfig,
};

// --- Host re-exports -------------------------------------------------------

pub use suggest_web::{DeterministicClock, ElementSpec, MemoryPage};

// --- Prelude --------------------------------------------------------------

pub mod prelude {
    pub use crate::{
        Autocomplete, AutocompleteAction, AutocompleteConfig, AutocompleteHandle, ConfigError,
        DeterministicClock, ElementSpec, Event, HandleStatus, Host, KeyCode, KeyEvent,
        MemoryPage, NodeId, PointerEvent, PointerKind,
    };

    pub use crate::{core, text, web, widgets};
}

pub use suggest_core as core;
pub use suggest_text as text;
pub use suggest_web as web;
pub use suggest_widgets as widgets;
