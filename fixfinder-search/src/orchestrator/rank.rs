//! Final relevance scoring and ordering.
//!
//! Adapters hand in results with a preliminary relevance computed from
//! their own signals. The ranker blends that with title overlap against the
//! user's original query, adds a transcript boost for videos, and sorts
//! every list.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashSet};

use crate::text;
use crate::types::{SourceKind, SourceResult};

use super::dedup::dedupe_by_title;

/// Weight kept from the adapter's preliminary relevance.
pub const EXISTING_WEIGHT: f64 = 0.6;
/// Weight of query-term overlap with the title.
pub const TITLE_OVERLAP_WEIGHT: f64 = 0.4;
/// Weight of query-term overlap with a video's transcript excerpt.
pub const TRANSCRIPT_BOOST_WEIGHT: f64 = 0.3;

/// Deduplicate across sources, rescore and sort each list.
///
/// Pure: the same input always yields the same output. Sorting is stable,
/// so items with equal scores keep their adapter order.
pub fn rank_and_dedupe(
    results: BTreeMap<SourceKind, Vec<SourceResult>>,
    original_query: &str,
) -> BTreeMap<SourceKind, Vec<SourceResult>> {
    let query_terms = text::term_set(original_query);

    dedupe_by_title(results)
        .into_iter()
        .map(|(kind, mut items)| {
            for item in &mut items {
                let score = final_relevance(item, &query_terms);
                item.set_relevance(score);
            }
            sort_by_relevance(&mut items);
            (kind, items)
        })
        .collect()
}

/// Blend preliminary relevance with title overlap, plus the transcript boost.
pub fn final_relevance(item: &SourceResult, query_terms: &HashSet<String>) -> f64 {
    let existing = text::clamp_unit(item.relevance());
    let mut score = EXISTING_WEIGHT * existing
        + TITLE_OVERLAP_WEIGHT * text::overlap_fraction(query_terms, item.title());

    if let Some(transcript) = item.transcript() {
        score += TRANSCRIPT_BOOST_WEIGHT * text::overlap_fraction(query_terms, transcript);
    }

    text::clamp_unit(score)
}

/// Stable sort, highest relevance first.
pub fn sort_by_relevance(items: &mut [SourceResult]) {
    items.sort_by(|a, b| {
        b.relevance()
            .partial_cmp(&a.relevance())
            .unwrap_or(Ordering::Equal)
    });
}
