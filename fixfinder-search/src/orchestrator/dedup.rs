//! Cross-source deduplication by title key.
//!
//! The same fix is often posted to a forum, discussed on a board and filmed,
//! each under a slightly different URL. Results are therefore collapsed by a
//! normalised title key rather than by URL; the first occurrence in traversal
//! order wins.

use std::collections::{BTreeMap, HashSet};

use crate::types::{SourceKind, SourceResult};

/// Words of at most this many characters are ignored in title keys.
const MIN_KEY_WORD_CHARS: usize = 3;
/// Only the first this many significant words form the key.
const MAX_KEY_WORDS: usize = 5;

/// Build the deduplication key of a title.
///
/// Punctuation is stripped, the title is lower-cased, words longer than
/// three characters are kept, the first five are sorted and joined with
/// single spaces. Word order within those five does not matter.
///
/// # Examples
///
/// ```
/// use fixfinder_search::orchestrator::dedup::title_key;
///
/// assert_eq!(
///     title_key("Fix: Dishwasher NOT draining (easy!)"),
///     title_key("dishwasher draining, easy")
/// );
/// ```
pub fn title_key(title: &str) -> String {
    let stripped: String = title
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace())
        .collect();
    let mut words: Vec<String> = stripped
        .to_lowercase()
        .split_whitespace()
        .filter(|word| word.chars().count() > MIN_KEY_WORD_CHARS)
        .take(MAX_KEY_WORDS)
        .map(str::to_string)
        .collect();
    words.sort();
    words.join(" ")
}

/// Remove results whose title key was already seen, across all sources.
///
/// Sources are visited in [`SourceKind`] order (forums, discussions,
/// videos) and items in their given order, so earlier kinds win ties.
/// Titles with an empty key are always kept.
pub fn dedupe_by_title(
    results: BTreeMap<SourceKind, Vec<SourceResult>>,
) -> BTreeMap<SourceKind, Vec<SourceResult>> {
    let mut seen = HashSet::new();
    let mut removed = 0usize;

    let deduped = results
        .into_iter()
        .map(|(kind, items)| {
            let kept: Vec<SourceResult> = items
                .into_iter()
                .filter(|item| {
                    let key = title_key(item.title());
                    let keep = key.is_empty() || seen.insert(key);
                    if !keep {
                        removed += 1;
                    }
                    keep
                })
                .collect();
            (kind, kept)
        })
        .collect();

    if removed > 0 {
        tracing::debug!(removed, "duplicate titles removed");
    }
    deduped
}
