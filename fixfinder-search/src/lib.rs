//! # fixfinder-search
//!
//! Deep search for repair help: one query, three kinds of sources, one
//! ranked answer.
//!
//! A question like "dishwasher won't drain" is rewritten into a repair
//! query, sent concurrently to forum and article search, discussion boards
//! and video tutorials, and the results are merged, deduplicated across
//! sources and re-ranked against the original wording.
//!
//! ## Design
//!
//! - Each source kind is served by a [`SourceAdapter`] injected as
//!   `Arc<dyn SourceAdapter>`, so tests can swap in fakes
//! - Every adapter invocation runs under its own timeout; a slow or failing
//!   source contributes an empty list and never fails the request
//! - Adapters own one pooled HTTP client each and keep no per-call state,
//!   so one [`DeepSearch`] serves concurrent requests
//! - Ranking is pure and deterministic: title-key dedup in a fixed source
//!   order, weighted rescoring, stable sort
//!
//! ## Security
//!
//! - No API keys or secrets to leak
//! - No network listeners; this is a library
//! - Query text is logged only at trace level

pub mod config;
pub mod error;
pub mod http;
pub mod orchestrator;
pub mod query;
pub mod source;
pub mod sources;
pub mod text;
pub mod types;

pub use config::{SearchConfig, SourceEndpoints};
pub use error::{Result, SearchError};
pub use orchestrator::{DeepSearch, SourceOutcome};
pub use source::SourceAdapter;
pub use types::{
    ArticleResult, DiscussionResult, SearchQuery, SearchRequest, SearchResults, SourceKind,
    SourceResult, VideoResult,
};

/// Run one deep search with a freshly built engine.
///
/// Convenient for one-off calls. Long-running callers should build a
/// [`DeepSearch`] once and reuse it, so adapters keep their connection
/// pools between requests.
///
/// # Errors
///
/// Returns [`SearchError::Config`] if `config` is invalid and
/// [`SearchError::Validation`] if the request is malformed. Source failures
/// are not errors; they yield empty lists.
///
/// # Examples
///
/// ```no_run
/// # async fn example() -> fixfinder_search::Result<()> {
/// let request = fixfinder_search::SearchRequest {
///     query: "laptop screen cracked".into(),
///     sources: Some(vec!["forums".into(), "videos".into()]),
///     max_results: Some(5),
///     ..Default::default()
/// };
/// let results =
///     fixfinder_search::search(request, &fixfinder_search::SearchConfig::default()).await?;
/// for (kind, items) in &results.results {
///     println!("{kind}: {} results", items.len());
/// }
/// # Ok(())
/// # }
/// ```
pub async fn search(request: SearchRequest, config: &SearchConfig) -> Result<SearchResults> {
    DeepSearch::new(config)?.handle(request).await
}
