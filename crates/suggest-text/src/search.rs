#![forbid(unsafe_code)]

//! Case-insensitive substring search that reports spans in the original text.
//!
//! Lowercasing can change a string's byte length (`'İ'` folds to two
//! chars), so searching a folded copy does not give usable offsets into the
//! display text. [`find_ignore_case`] folds on the fly and only accepts a
//! match that starts and ends on a char boundary of the haystack.

use std::ops::Range;

use smallvec::SmallVec;

/// Byte range of the first case-insensitive occurrence of `needle` in
/// `haystack`.
///
/// An empty needle matches at `0..0`.
#[must_use]
pub fn find_ignore_case(haystack: &str, needle: &str) -> Option<Range<usize>> {
    let folded: SmallVec<[char; 32]> = needle.chars().flat_map(char::to_lowercase).collect();
    if folded.is_empty() {
        return Some(0..0);
    }

    for (start, _) in haystack.char_indices() {
        if let Some(end) = match_at(haystack, start, &folded) {
            return Some(start..end);
        }
    }
    None
}

/// Try to match the folded needle at byte offset `start`; returns the end
/// offset on success.
fn match_at(haystack: &str, start: usize, folded: &[char]) -> Option<usize> {
    let mut pos = 0;
    for (offset, ch) in haystack[start..].char_indices() {
        for lower in ch.to_lowercase() {
            if pos == folded.len() || folded[pos] != lower {
                return None;
            }
            pos += 1;
        }
        if pos == folded.len() {
            return Some(start + offset + ch.len_utf8());
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_first_occurrence_case_insensitively() {
        assert_eq!(find_ignore_case("Paris", "par"), Some(0..3));
        assert_eq!(find_ignore_case("Parma", "PAR"), Some(0..3));
        assert_eq!(find_ignore_case("Saint-Paul", "pa"), Some(6..8));
        assert_eq!(find_ignore_case("banana", "an"), Some(1..3));
    }

    #[test]
    fn no_match() {
        assert_eq!(find_ignore_case("London", "par"), None);
        assert_eq!(find_ignore_case("Pa", "par"), None);
        assert_eq!(find_ignore_case("", "a"), None);
    }

    #[test]
    fn empty_needle_matches_at_start() {
        assert_eq!(find_ignore_case("London", ""), Some(0..0));
    }

    #[test]
    fn offsets_are_into_original_text() {
        let hay = "ÉCOLE Élysée";
        let span = find_ignore_case(hay, "élysée").unwrap();
        assert_eq!(&hay[span], "Élysée");
    }

    #[test]
    fn partial_fold_of_a_char_is_not_a_match() {
        // 'İ' folds to "i\u{307}"; a bare "i" must not split it.
        assert_eq!(find_ignore_case("İ", "i"), None);
        assert_eq!(find_ignore_case("İx", "i\u{307}x"), Some(0..3));
    }
}
