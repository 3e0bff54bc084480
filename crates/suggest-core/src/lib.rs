#![forbid(unsafe_code)]

//! Core: canonical events, geometry, the host page contract, and scheduling.
//!
//! Nothing in this crate touches a browser API. The embedding environment
//! implements [`host::Host`], pushes [`event::Event`] values, and advances a
//! monotonic clock explicitly.

pub mod content_watch;
pub mod debounce;
pub mod event;
pub mod geometry;
pub mod host;
pub mod retry;
pub mod selector;
