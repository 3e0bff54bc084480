#![forbid(unsafe_code)]

//! Locale- and numeric-aware ordering.
//!
//! Terms are sorted the way a person reads a list, not by code point:
//!
//! - Runs of ASCII digits compare by numeric value: `"Item 2"` < `"Item 10"`.
//! - Letters compare by base character, ignoring case and diacritics at the
//!   first level: `"apple"` < `"Banana"` < `"Ébène"` < `"zèbre"`.
//! - Punctuation and whitespace sort before digits, digits before letters.
//!
//! Ties at the first level are broken by accents (unaccented first), then by
//! case (lowercase first), then by raw text, so the order is total and
//! deterministic.
//!
//! # Key layout
//!
//! ```text
//! primary   : [Unit]   NFKD, combining marks stripped, lowercased, digit runs folded
//! secondary : String   NFD, lowercased (marks kept)
//! tertiary  : String   case-swapped original (so lowercase < uppercase)
//! raw       : String   original text
//! ```

use std::cmp::Ordering;

use smallvec::SmallVec;
use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

/// A run of ASCII digits, compared by numeric value without parsing.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct NumberRun {
    /// Digits with leading zeros removed (`"0"` becomes empty).
    significant: SmallVec<[u8; 8]>,
}

impl Ord for NumberRun {
    fn cmp(&self, other: &Self) -> Ordering {
        self.significant
            .len()
            .cmp(&other.significant.len())
            .then_with(|| self.significant.cmp(&other.significant))
    }
}

impl PartialOrd for NumberRun {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// One primary-level collation element. Variant order is significant.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
enum Unit {
    Punct(char),
    Number(NumberRun),
    Letter(char),
}

/// Precomputed sort key for a string.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CollationKey {
    primary: SmallVec<[Unit; 24]>,
    secondary: String,
    tertiary: String,
    raw: String,
}

impl CollationKey {
    /// Build the key for `text`.
    #[must_use]
    pub fn new(text: &str) -> Self {
        Self {
            primary: primary_units(text),
            secondary: text.nfd().flat_map(char::to_lowercase).collect(),
            tertiary: swap_case(text),
            raw: text.to_string(),
        }
    }

    /// Whether two keys are equal ignoring case and diacritics.
    #[must_use]
    pub fn primary_eq(&self, other: &Self) -> bool {
        self.primary == other.primary
    }
}

/// Compare two strings in collation order.
#[must_use]
pub fn compare(a: &str, b: &str) -> Ordering {
    if a == b {
        return Ordering::Equal;
    }
    CollationKey::new(a).cmp(&CollationKey::new(b))
}

/// Sort strings in place in collation order.
pub fn sort_strings<S: AsRef<str>>(items: &mut [S]) {
    items.sort_by_cached_key(|s| CollationKey::new(s.as_ref()));
}

fn primary_units(text: &str) -> SmallVec<[Unit; 24]> {
    let mut units = SmallVec::new();
    let mut digits: Option<SmallVec<[u8; 8]>> = None;

    let base = text
        .nfkd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase);

    for ch in base {
        if ch.is_ascii_digit() {
            let run = digits.get_or_insert_with(SmallVec::new);
            if !(run.is_empty() && ch == '0') {
                run.push(ch as u8);
            }
            continue;
        }
        if let Some(run) = digits.take() {
            units.push(Unit::Number(NumberRun { significant: run }));
        }
        if ch.is_alphanumeric() {
            units.push(Unit::Letter(ch));
        } else {
            units.push(Unit::Punct(ch));
        }
    }
    if let Some(run) = digits.take() {
        units.push(Unit::Number(NumberRun { significant: run }));
    }
    units
}

fn swap_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        if ch.is_lowercase() {
            out.extend(ch.to_uppercase());
        } else if ch.is_uppercase() {
            out.extend(ch.to_lowercase());
        } else {
            out.push(ch);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sorted(items: &[&str]) -> Vec<String> {
        let mut v: Vec<String> = items.iter().map(|s| (*s).to_string()).collect();
        sort_strings(&mut v);
        v
    }

    #[test]
    fn numeric_runs_compare_by_value() {
        assert_eq!(
            sorted(&["Item 10", "Item 2", "Item 1"]),
            ["Item 1", "Item 2", "Item 10"]
        );
    }

    #[test]
    fn numbers_inside_words() {
        assert_eq!(
            sorted(&["Lot B12", "Lot B3", "Lot A100"]),
            ["Lot A100", "Lot B3", "Lot B12"]
        );
    }

    #[test]
    fn case_insensitive_at_first_level() {
        assert_eq!(
            sorted(&["banana", "Apple", "cherry", "Banana"]),
            ["Apple", "banana", "Banana", "cherry"]
        );
    }

    #[test]
    fn diacritics_sort_with_base_letter() {
        assert_eq!(
            sorted(&["Zug", "Zürich", "Zurich", "Aarau", "Évian"]),
            ["Aarau", "Évian", "Zug", "Zurich", "Zürich"]
        );
    }

    #[test]
    fn punctuation_before_digits_before_letters() {
        assert_eq!(sorted(&["a", "1", "-"]), ["-", "1", "a"]);
    }

    #[test]
    fn leading_zeros_do_not_change_value() {
        assert!(compare("Unit 007", "Unit 7").is_lt());
        assert_eq!(compare("Unit 007", "Unit 8"), Ordering::Less);
        assert!(CollationKey::new("Unit 007").primary_eq(&CollationKey::new("Unit 7")));
    }

    #[test]
    fn prefix_sorts_first() {
        assert_eq!(compare("Item", "Item 1"), Ordering::Less);
        assert_eq!(compare("Par", "Paris"), Ordering::Less);
    }

    #[test]
    fn order_is_total_for_distinct_strings() {
        assert_ne!(compare("résumé", "resume"), Ordering::Equal);
        assert_ne!(compare("Paris", "paris"), Ordering::Equal);
        assert_eq!(compare("Paris", "Paris"), Ordering::Equal);
    }

    #[test]
    fn huge_numbers_do_not_overflow() {
        assert_eq!(
            compare("n 99999999999999999999999", "n 100000000000000000000000"),
            Ordering::Less
        );
    }
}
