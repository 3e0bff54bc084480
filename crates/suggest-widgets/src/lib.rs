#![forbid(unsafe_code)]

//! Autocomplete widget for text inputs.
//!
//! [`Autocomplete`] is the interaction controller: it collects terms from the
//! page, filters them as the user types and writes the chosen suggestion back
//! into the input. [`AutocompleteHandle`] wraps it with mount retries for
//! pages that render their elements late.
//!
//! All page access goes through [`suggest_core::host::Host`], so the same
//! controller runs against a browser document or an in-memory page.

pub mod autocomplete;
pub mod collect;
pub mod config;
pub mod handle;
pub mod notify;

pub use autocomplete::{
    Autocomplete, AutocompleteAction, BoundNodes, ElementRole, MountError, SelectionState,
};
pub use collect::collect_terms;
pub use config::{AutocompleteConfig, ConfigError, FilterHookConfig, Gap, SourceConfig};
pub use handle::{AutocompleteHandle, HandleStatus};
pub use notify::{FilterNotifier, HookNotifier};
