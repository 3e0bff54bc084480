#![forbid(unsafe_code)]

//! Optional per-thread default instance.
//!
//! Pages with a single search box can park their [`AutocompleteHandle`] here
//! instead of threading it through every callback. Nothing in the crate
//! requires it; explicit handles are the primary API.
//!
//! Access is not reentrant: a closure passed to [`with_default`] that calls
//! back into this module sees no default instance.

use std::cell::RefCell;

use suggest_widgets::AutocompleteHandle;

thread_local! {
    static DEFAULT_INSTANCE: RefCell<Option<AutocompleteHandle>> = const { RefCell::new(None) };
}

/// Install `handle` as this thread's default, returning the previous one.
///
/// Returns `Err(handle)` when called from inside [`with_default`].
pub fn install_default(
    handle: AutocompleteHandle,
) -> Result<Option<AutocompleteHandle>, AutocompleteHandle> {
    DEFAULT_INSTANCE.with(|slot| match slot.try_borrow_mut() {
        Ok(mut slot) => Ok(slot.replace(handle)),
        Err(_) => {
            tracing::debug!("default instance busy; install rejected");
            Err(handle)
        }
    })
}

/// Run `f` against the default instance.
///
/// Returns `None` when no default is installed or the instance is already
/// borrowed further up the stack.
pub fn with_default<R>(f: impl FnOnce(&mut AutocompleteHandle) -> R) -> Option<R> {
    DEFAULT_INSTANCE.with(|slot| {
        let mut slot = slot.try_borrow_mut().ok()?;
        slot.as_mut().map(f)
    })
}

/// Remove and return the default instance.
pub fn take_default() -> Option<AutocompleteHandle> {
    DEFAULT_INSTANCE.with(|slot| slot.try_borrow_mut().ok()?.take())
}

/// Whether a default instance is installed.
#[must_use]
pub fn has_default() -> bool {
    DEFAULT_INSTANCE.with(|slot| slot.try_borrow().is_ok_and(|slot| slot.is_some()))
}
