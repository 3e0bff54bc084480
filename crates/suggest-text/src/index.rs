#![forbid(unsafe_code)]

//! The sorted, deduplicated term set.
//!
//! # Invariants
//!
//! 1. Every term is non-empty after trimming.
//! 2. No two terms fold to the same text. The first casing seen is kept.
//! 3. Terms are in [`CollationKey`](crate::CollationKey) order.
//! 4. `generation` changes if and only if the term set changed.
//!
//! Rebuilds are wholesale: the previous term list is replaced in one step,
//! so a reader never observes a half-built index.

use rustc_hash::FxHashSet;

use crate::term::Term;

/// Sorted, deduplicated collection of [`Term`]s.
#[derive(Debug, Clone, Default)]
pub struct TermIndex {
    terms: Vec<Term>,
    generation: u64,
}

impl TermIndex {
    /// Create an empty index.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an index from raw strings.
    #[must_use]
    pub fn from_raw<I, S>(raw: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut index = Self::new();
        index.rebuild(raw);
        index
    }

    /// Replace the whole term set from raw source strings.
    ///
    /// Blank entries are skipped. Returns `true` when the resulting set
    /// differs from the previous one; otherwise the index is untouched and
    /// its generation is unchanged.
    pub fn rebuild<I, S>(&mut self, raw: I) -> bool
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut seen: FxHashSet<String> = FxHashSet::default();
        let mut terms: Vec<Term> = Vec::new();
        let mut skipped = 0usize;
        for item in raw {
            let Some(term) = Term::new(item.as_ref()) else {
                skipped += 1;
                continue;
            };
            if seen.insert(term.folded().to_string()) {
                terms.push(term);
            }
        }
        terms.sort_by(|a, b| a.collation_key().cmp(b.collation_key()));

        if skipped > 0 {
            tracing::trace!(skipped, "blank term sources skipped");
        }

        if terms == self.terms {
            tracing::trace!(terms = terms.len(), "term index unchanged");
            return false;
        }
        tracing::debug!(
            before = self.terms.len(),
            after = terms.len(),
            "term index rebuilt"
        );
        self.terms = terms;
        self.bump();
        true
    }

    /// Insert one term. Returns `false` if it was blank or already present
    /// in any casing.
    pub fn insert(&mut self, raw: &str) -> bool {
        let Some(term) = Term::new(raw) else {
            return false;
        };
        if self.find_folded(term.folded()).is_some() {
            return false;
        }
        match self.position(&term) {
            Ok(_) => false,
            Err(at) => {
                self.terms.insert(at, term);
                self.bump();
                true
            }
        }
    }

    /// Remove the term matching `raw` (trimmed, any casing). Returns whether
    /// it was present.
    pub fn remove(&mut self, raw: &str) -> bool {
        let Some(at) = Term::new(raw).and_then(|term| self.find_folded(term.folded())) else {
            return false;
        };
        self.terms.remove(at);
        self.bump();
        true
    }

    /// Whether a term matching `raw` (trimmed, any casing) is present.
    #[must_use]
    pub fn contains(&self, raw: &str) -> bool {
        Term::new(raw).is_some_and(|term| self.find_folded(term.folded()).is_some())
    }

    /// Terms in sorted order.
    #[must_use]
    pub fn terms(&self) -> &[Term] {
        &self.terms
    }

    /// Term texts in sorted order.
    pub fn texts(&self) -> impl Iterator<Item = &str> + '_ {
        self.terms.iter().map(Term::as_str)
    }

    /// Number of terms.
    #[must_use]
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    /// Whether the index is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Change counter; consumers compare it to detect stale caches.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    fn position(&self, term: &Term) -> Result<usize, usize> {
        self.terms
            .binary_search_by(|probe| probe.collation_key().cmp(term.collation_key()))
    }

    fn find_folded(&self, folded: &str) -> Option<usize> {
        self.terms.iter().position(|term| term.folded() == folded)
    }

    fn bump(&mut self) {
        self.generation = self.generation.wrapping_add(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(index: &TermIndex) -> Vec<&str> {
        index.texts().collect()
    }

    #[test]
    fn new_index_is_empty() {
        let index = TermIndex::new();
        assert!(index.is_empty());
        assert_eq!(index.generation(), 0);
    }

    #[test]
    fn rebuild_sorts_and_deduplicates() {
        let index = TermIndex::from_raw(["Item 10", " Item 2", "Item 1", "Item 2 ", "", "  "]);
        assert_eq!(texts(&index), ["Item 1", "Item 2", "Item 10"]);
    }

    #[test]
    fn dedup_ignores_case_and_keeps_first_casing() {
        let index = TermIndex::from_raw(["Paris", "paris", "PARIS", "Lyon"]);
        assert_eq!(texts(&index), ["Lyon", "Paris"]);
        let index = TermIndex::from_raw(["paris", "Paris"]);
        assert_eq!(texts(&index), ["paris"]);
    }

    #[test]
    fn casing_change_of_first_seen_term_is_a_change() {
        let mut index = TermIndex::from_raw(["Paris"]);
        assert!(index.rebuild(["PARIS", "Paris"]));
        assert_eq!(texts(&index), ["PARIS"]);
    }

    #[test]
    fn insert_rejects_other_casing() {
        let mut index = TermIndex::from_raw(["Paris"]);
        assert!(!index.insert("paris"));
        assert_eq!(texts(&index), ["Paris"]);
    }

    #[test]
    fn unchanged_rebuild_is_noop() {
        let mut index = TermIndex::from_raw(["Paris", "Parma", "London"]);
        let generation = index.generation();
        assert!(!index.rebuild(["London", "Parma", "Paris", "Paris"]));
        assert_eq!(index.generation(), generation);
    }

    #[test]
    fn changed_rebuild_bumps_generation() {
        let mut index = TermIndex::from_raw(["Paris"]);
        let generation = index.generation();
        assert!(index.rebuild(["Paris", "Lyon"]));
        assert_ne!(index.generation(), generation);
        assert_eq!(texts(&index), ["Lyon", "Paris"]);
    }

    #[test]
    fn rebuild_to_empty() {
        let mut index = TermIndex::from_raw(["Paris"]);
        assert!(index.rebuild(Vec::<String>::new()));
        assert!(index.is_empty());
    }

    #[test]
    fn insert_keeps_order_and_set_semantics() {
        let mut index = TermIndex::from_raw(["Item 1", "Item 10"]);
        assert!(index.insert(" Item 2 "));
        assert!(!index.insert("Item 2"));
        assert!(!index.insert("   "));
        assert_eq!(texts(&index), ["Item 1", "Item 2", "Item 10"]);
    }

    #[test]
    fn remove_by_text() {
        let mut index = TermIndex::from_raw(["Paris", "Parma"]);
        let generation = index.generation();
        assert!(index.remove("Paris"));
        assert!(!index.remove("Paris"));
        assert_eq!(texts(&index), ["Parma"]);
        assert_eq!(index.generation(), generation + 1);
        assert!(index.remove("PARMA"));
        assert!(index.is_empty());
    }

    #[test]
    fn contains_trims() {
        let index = TermIndex::from_raw(["Paris"]);
        assert!(index.contains(" Paris"));
        assert!(index.contains("paris"));
        assert!(!index.contains("Lyon"));
        assert!(!index.contains(""));
    }
}
