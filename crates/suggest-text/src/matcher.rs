#![forbid(unsafe_code)]

//! Query filtering against a [`TermIndex`].
//!
//! Matching is unanchored, case-insensitive substring containment. Results
//! keep the index's collation order (no relevance ranking) and are capped at
//! `max_results` to bound render cost.
//!
//! # Caching
//!
//! Results are cached per case-folded query in an LRU of bounded capacity,
//! so retyping or backspacing over a query does not rescan the index. The
//! cache belongs to one index generation: a rebuilt index clears it before
//! the next lookup.
//!
//! # Example
//!
//! ```
//! use suggest_text::{FilterOutcome, MatchEngine, MatchOptions, TermIndex};
//!
//! let index = TermIndex::from_raw(["Paris", "Parma", "London"]);
//! let mut engine = MatchEngine::new(MatchOptions::default());
//!
//! let FilterOutcome::Matches(results) = engine.filter(&index, "par") else {
//!     panic!("query is long enough");
//! };
//! let terms: Vec<_> = results.iter().map(|r| r.term()).collect();
//! assert_eq!(terms, ["Paris", "Parma"]);
//! assert_eq!(results[0].markup(), "<strong>Par</strong>is");
//!
//! assert!(engine.filter(&index, " ").is_below_minimum());
//! ```

use std::num::NonZeroUsize;
use std::ops::Range;
use std::sync::Arc;

use lru::LruCache;
use unicode_segmentation::UnicodeSegmentation;

use crate::escape::escape_markup;
use crate::index::TermIndex;
use crate::search::find_ignore_case;

/// Default result cap.
pub const DEFAULT_MAX_RESULTS: usize = 50;

/// Default minimum query length in grapheme clusters.
pub const DEFAULT_MIN_QUERY_LEN: usize = 1;

/// Default number of cached queries.
pub const DEFAULT_CACHE_CAPACITY: usize = 100;

/// Filtering options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchOptions {
    /// Maximum results per query. Zero behaves like one.
    pub max_results: usize,
    /// Queries shorter than this (after trimming, in grapheme clusters)
    /// hide the list instead of filtering.
    pub min_query_len: usize,
    /// Cached query count. Zero disables caching.
    pub cache_capacity: usize,
}

impl Default for MatchOptions {
    fn default() -> Self {
        Self {
            max_results: DEFAULT_MAX_RESULTS,
            min_query_len: DEFAULT_MIN_QUERY_LEN,
            cache_capacity: DEFAULT_CACHE_CAPACITY,
        }
    }
}

/// A term with the span of its first case-insensitive query occurrence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchResult {
    term: String,
    span: Range<usize>,
}

impl MatchResult {
    /// The matched term, verbatim.
    #[must_use]
    pub fn term(&self) -> &str {
        &self.term
    }

    /// Byte range of the highlighted substring within [`term`](Self::term).
    #[must_use]
    pub fn span(&self) -> Range<usize> {
        self.span.clone()
    }

    /// The highlighted substring, in the term's own casing.
    #[must_use]
    pub fn matched(&self) -> &str {
        &self.term[self.span.clone()]
    }

    /// Escaped markup with the matched span wrapped in `<strong>`.
    #[must_use]
    pub fn markup(&self) -> String {
        let Range { start, end } = self.span;
        if start == end {
            return escape_markup(&self.term).into_owned();
        }
        format!(
            "{}<strong>{}</strong>{}",
            escape_markup(&self.term[..start]),
            escape_markup(&self.term[start..end]),
            escape_markup(&self.term[end..]),
        )
    }
}

/// Result of a filter pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterOutcome {
    /// The query is shorter than the minimum: hide the list.
    BelowMinimum,
    /// Matching terms in index order (possibly empty).
    Matches(Arc<[MatchResult]>),
}

impl FilterOutcome {
    /// Whether the query was below the minimum length.
    #[must_use]
    pub fn is_below_minimum(&self) -> bool {
        matches!(self, Self::BelowMinimum)
    }

    /// Whether a list should be shown at all.
    #[must_use]
    pub fn has_matches(&self) -> bool {
        matches!(self, Self::Matches(results) if !results.is_empty())
    }

    /// The matches, or an empty slice.
    #[must_use]
    pub fn results(&self) -> &[MatchResult] {
        match self {
            Self::BelowMinimum => &[],
            Self::Matches(results) => results,
        }
    }
}

/// Statistics about cache performance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CacheStats {
    /// Number of cache hits.
    pub hits: u64,
    /// Number of cache misses.
    pub misses: u64,
    /// Current number of entries.
    pub size: usize,
    /// Maximum capacity.
    pub capacity: usize,
}

impl CacheStats {
    /// Calculate hit rate (0.0 to 1.0).
    #[must_use]
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// Filters a [`TermIndex`] and caches results per folded query.
#[derive(Debug)]
pub struct MatchEngine {
    options: MatchOptions,
    cache: Option<LruCache<String, Arc<[MatchResult]>>>,
    cached_generation: u64,
    hits: u64,
    misses: u64,
}

impl MatchEngine {
    /// Create an engine.
    #[must_use]
    pub fn new(options: MatchOptions) -> Self {
        Self {
            options,
            cache: NonZeroUsize::new(options.cache_capacity).map(LruCache::new),
            cached_generation: 0,
            hits: 0,
            misses: 0,
        }
    }

    /// The options in effect.
    #[must_use]
    pub fn options(&self) -> &MatchOptions {
        &self.options
    }

    /// Whether `query` reaches the minimum length.
    #[must_use]
    pub fn meets_minimum(&self, query: &str) -> bool {
        let min = self.options.min_query_len;
        min == 0 || query.trim().graphemes(true).take(min).count() >= min
    }

    /// Filter `index` against `query`.
    pub fn filter(&mut self, index: &TermIndex, query: &str) -> FilterOutcome {
        let query = query.trim();
        if !self.meets_minimum(query) {
            return FilterOutcome::BelowMinimum;
        }

        if index.generation() != self.cached_generation {
            self.invalidate();
            self.cached_generation = index.generation();
        }

        let key = crate::fold(query);
        if let Some(hit) = self.cache.as_mut().and_then(|cache| cache.get(&key)) {
            let hit = Arc::clone(hit);
            self.hits += 1;
            return FilterOutcome::Matches(hit);
        }
        self.misses += 1;

        let limit = self.options.max_results.max(1);
        let mut results = Vec::new();
        for term in index.terms() {
            if !term.folded().contains(key.as_str()) {
                continue;
            }
            if let Some(span) = find_ignore_case(term.as_str(), query) {
                results.push(MatchResult {
                    term: term.as_str().to_string(),
                    span,
                });
                if results.len() == limit {
                    break;
                }
            }
        }
        tracing::trace!(
            query_len = query.len(),
            results = results.len(),
            scanned = index.len(),
            "filter pass"
        );

        let results: Arc<[MatchResult]> = results.into();
        if let Some(cache) = self.cache.as_mut() {
            cache.put(key, Arc::clone(&results));
        }
        FilterOutcome::Matches(results)
    }

    /// Drop every cached result.
    pub fn invalidate(&mut self) {
        if let Some(cache) = self.cache.as_mut() {
            cache.clear();
        }
    }

    /// Cache statistics.
    #[must_use]
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits,
            misses: self.misses,
            size: self.cache.as_ref().map_or(0, LruCache::len),
            capacity: self.cache.as_ref().map_or(0, |c| c.cap().get()),
        }
    }
}

impl Default for MatchEngine {
    fn default() -> Self {
        Self::new(MatchOptions::default())
    }
}
