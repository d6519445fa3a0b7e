//! Small text helpers shared by the query optimiser, the adapters' preliminary
//! scoring and the ranker.

use std::collections::HashSet;

/// Lower-cased whitespace tokens with surrounding punctuation trimmed.
///
/// Internal apostrophes survive (`"won't"` stays one token) so that problem
/// indicators can be matched as whole tokens. Tokens that are pure
/// punctuation are dropped.
pub fn tokens(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split_whitespace().filter_map(|raw| {
        let token = raw
            .trim_matches(|c: char| !c.is_alphanumeric())
            .to_lowercase();
        (!token.is_empty()).then_some(token)
    })
}

/// The distinct [`tokens`] of `text`.
pub fn term_set(text: &str) -> HashSet<String> {
    tokens(text).collect()
}

/// Fraction of `query_terms` that also occur among the terms of `text`.
///
/// Returns 0.0 when `query_terms` is empty.
pub fn overlap_fraction(query_terms: &HashSet<String>, text: &str) -> f64 {
    if query_terms.is_empty() {
        return 0.0;
    }
    let text_terms = term_set(text);
    let matched = query_terms
        .iter()
        .filter(|term| text_terms.contains(*term))
        .count();
    matched as f64 / query_terms.len() as f64
}

/// Truncate `text` to at most `max_chars` characters, on a char boundary.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}

/// Clamp a score into `[0, 1]`, mapping NaN to 0.
pub fn clamp_unit(score: f64) -> f64 {
    if score.is_nan() {
        0.0
    } else {
        score.clamp(0.0, 1.0)
    }
}
