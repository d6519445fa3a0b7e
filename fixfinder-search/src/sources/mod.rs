//! Source adapter implementations.
//!
//! Each module provides a struct implementing [`crate::source::SourceAdapter`]
//! for one [`crate::types::SourceKind`]. Page-parsing details are kept behind
//! small `parse_*` functions so they can change with upstream markup without
//! touching the adapter contract.

pub mod discussions;
pub mod forums;
pub mod videos;
pub mod web_search;

pub use discussions::DiscussionSearch;
pub use forums::ForumSearch;
pub use videos::VideoSearch;
pub use web_search::{WebHit, WebSearch};

use std::cmp::Ordering;
use std::collections::HashSet;

use crate::orchestrator::url_normalize::normalize_url;
use crate::types::SourceResult;

/// Drop later items whose normalised URL was already seen.
pub(crate) fn dedupe_by_url<T>(items: Vec<T>, url: impl Fn(&T) -> &str) -> Vec<T> {
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(normalize_url(url(item))))
        .collect()
}

/// Stable-sort by preliminary relevance (descending) and cap at `max_results`.
pub(crate) fn finish(mut results: Vec<SourceResult>, max_results: usize) -> Vec<SourceResult> {
    results.sort_by(|a, b| {
        b.relevance()
            .partial_cmp(&a.relevance())
            .unwrap_or(Ordering::Equal)
    });
    results.truncate(max_results);
    results
}
