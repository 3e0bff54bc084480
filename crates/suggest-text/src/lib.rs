#![forbid(unsafe_code)]

//! Text handling for suggestion lists.
//!
//! - [`Term`]: a trimmed, non-empty, case-preserving candidate string.
//! - [`collate`]: locale- and numeric-aware ordering (`"Item 2"` < `"Item 10"`).
//! - [`TermIndex`]: the sorted, deduplicated term set.
//! - [`MatchEngine`]: case-insensitive substring filtering with an LRU result cache.
//! - [`search`] and [`escape`]: span search and markup-safe highlighting.

pub mod collate;
pub mod escape;
pub mod index;
pub mod matcher;
pub mod search;
pub mod term;

pub use collate::CollationKey;
pub use index::TermIndex;
pub use matcher::{CacheStats, FilterOutcome, MatchEngine, MatchOptions, MatchResult};
pub use term::Term;

/// Case-fold a string the way every comparison in this crate does.
///
/// Per-character lowercase mapping, no context-sensitive rules, so a folded
/// query and a folded term can be compared position by position.
#[must_use]
pub fn fold(text: &str) -> String {
    text.chars().flat_map(char::to_lowercase).collect()
}
