//! Character-level highlighting for a removed/added pair.
//!
//! Only the common prefix and suffix are trimmed; there is no fuzzy or
//! word-level matching.

use crate::domain::InlineSegments;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InlinePair {
    pub old: InlineSegments,
    pub next: InlineSegments,
}

/// Splits both texts into shared prefix, changed middle and shared suffix.
///
/// The suffix search never re-consumes characters already claimed by the prefix,
/// so `before + changed + after` always reconstructs each input.
pub fn diff_pair(old: &str, new: &str) -> InlinePair {
    let prefix: usize = old
        .chars()
        .zip(new.chars())
        .take_while(|(a, b)| a == b)
        .map(|(a, _)| a.len_utf8())
        .sum();

    let old_rest = &old[prefix..];
    let new_rest = &new[prefix..];

    let suffix: usize = old_rest
        .chars()
        .rev()
        .zip(new_rest.chars().rev())
        .take_while(|(a, b)| a == b)
        .map(|(a, _)| a.len_utf8())
        .sum();

    InlinePair {
        old: segments(old, prefix, suffix),
        next: segments(new, prefix, suffix),
    }
}

fn segments(text: &str, prefix: usize, suffix: usize) -> InlineSegments {
    let changed_end = text.len() - suffix;
    InlineSegments {
        before: text[..prefix].to_string(),
        changed: text[prefix..changed_end].to_string(),
        after: text[changed_end..].to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn join(s: &InlineSegments) -> String {
        format!("{}{}{}", s.before, s.changed, s.after)
    }

    #[test]
    fn isolates_changed_literal() {
        let pair = diff_pair("const beta = 2;", "const beta = 3;");
        assert_eq!(pair.old.before, "const beta = ");
        assert_eq!(pair.old.changed, "2");
        assert_eq!(pair.next.changed, "3");
        assert_eq!(pair.old.after, ";");
        assert_eq!(pair.next.after, ";");
    }

    #[test]
    fn empty_inputs_give_empty_segments() {
        assert_eq!(diff_pair("", ""), InlinePair::default());
    }

    #[test]
    fn suffix_does_not_overlap_prefix() {
        // "aa" vs "aaa": prefix takes "aa", nothing left on the old side for the suffix.
        let pair = diff_pair("aa", "aaa");
        assert_eq!(pair.old.before, "aa");
        assert_eq!(pair.old.changed, "");
        assert_eq!(pair.old.after, "");
        assert_eq!(pair.next.changed, "a");
        assert_eq!(join(&pair.old), "aa");
        assert_eq!(join(&pair.next), "aaa");
    }

    #[test]
    fn pure_insertion_in_the_middle() {
        let pair = diff_pair("hello world", "hello brave world");
        assert_eq!(pair.old.changed, "");
        assert_eq!(pair.next.changed, "brave ");
        assert_eq!(pair.next.before, "hello ");
        assert_eq!(pair.next.after, "world");
    }

    #[test]
    fn multibyte_characters_stay_intact() {
        let pair = diff_pair("naïve café", "naïve cafe");
        assert_eq!(pair.old.changed, "é");
        assert_eq!(pair.next.changed, "e");
        assert_eq!(pair.old.before, "naïve caf");
    }

    #[test]
    fn identical_inputs_have_no_change() {
        let pair = diff_pair("same", "same");
        assert_eq!(pair.old.before, "same");
        assert_eq!(pair.old.changed, "");
        assert_eq!(pair.next.after, "");
    }
}
