#![forbid(unsafe_code)]

//! Candidate suggestion strings.

use std::fmt;

use crate::collate::CollationKey;

/// A trimmed, non-empty candidate string.
///
/// Storage is case-preserving; the folded form and collation key are
/// computed once at construction because every filter pass and every sort
/// reads them.
#[derive(Debug, Clone)]
pub struct Term {
    text: String,
    folded: String,
    key: CollationKey,
}

impl Term {
    /// Build a term from raw source text. Returns `None` when nothing is
    /// left after trimming.
    #[must_use]
    pub fn new(raw: &str) -> Option<Self> {
        let text = raw.trim();
        if text.is_empty() {
            return None;
        }
        Some(Self {
            text: text.to_string(),
            folded: crate::fold(text),
            key: CollationKey::new(text),
        })
    }

    /// The display text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// The case-folded text.
    #[must_use]
    pub fn folded(&self) -> &str {
        &self.folded
    }

    /// The sort key.
    #[must_use]
    pub fn collation_key(&self) -> &CollationKey {
        &self.key
    }
}

impl PartialEq for Term {
    fn eq(&self, other: &Self) -> bool {
        self.text == other.text
    }
}

impl Eq for Term {}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl AsRef<str> for Term {
    fn as_ref(&self) -> &str {
        &self.text
    }
}
