//! Deep search orchestration: optimise, fan out under timeouts, rank.
//!
//! Every requested source kind is searched concurrently, each invocation
//! wrapped in its own timeout. A source that times out or fails contributes
//! an empty list; the request as a whole never fails because of a source.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::future::join_all;

use crate::config::SearchConfig;
use crate::error::SearchError;
use crate::query;
use crate::source::SourceAdapter;
use crate::sources::{DiscussionSearch, ForumSearch, VideoSearch};
use crate::types::{SearchQuery, SearchRequest, SearchResults, SourceKind, SourceResult};

use super::rank::rank_and_dedupe;

/// How one adapter invocation ended.
#[derive(Debug)]
pub enum SourceOutcome {
    /// The adapter returned within its time budget.
    Completed(Vec<SourceResult>),
    /// The time budget elapsed; the in-flight request was dropped.
    TimedOut,
    /// The adapter reported an error.
    Failed(SearchError),
}

impl SourceOutcome {
    /// Results to carry forward; empty unless the invocation completed.
    pub fn into_results(self) -> Vec<SourceResult> {
        match self {
            Self::Completed(results) => results,
            Self::TimedOut | Self::Failed(_) => Vec::new(),
        }
    }
}

/// The deep search engine.
///
/// Holds one adapter per source kind. Adapters are shared, so one engine
/// (cheaply cloned) can serve any number of concurrent requests.
#[derive(Clone)]
pub struct DeepSearch {
    adapters: BTreeMap<SourceKind, Arc<dyn SourceAdapter>>,
    source_timeout: Duration,
    default_max_results: usize,
}

impl fmt::Debug for DeepSearch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeepSearch")
            .field("adapters", &self.adapters.keys().collect::<Vec<_>>())
            .field("source_timeout", &self.source_timeout)
            .field("default_max_results", &self.default_max_results)
            .finish()
    }
}

impl DeepSearch {
    /// Build an engine with the production adapter for every source kind.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Config`] if `config` is invalid, or
    /// [`SearchError::Http`] if an adapter's HTTP client cannot be built.
    pub fn new(config: &SearchConfig) -> Result<Self, SearchError> {
        config.validate()?;
        let engine = Self::empty(config.source_timeout())
            .with_default_max_results(config.default_max_results)
            .with_adapter(Arc::new(ForumSearch::new(config)?))
            .with_adapter(Arc::new(DiscussionSearch::new(config)?))
            .with_adapter(Arc::new(VideoSearch::new(config)?));
        tracing::debug!(?engine, "deep search engine ready");
        Ok(engine)
    }

    /// An engine with no adapters. Requested kinds without an adapter are
    /// reported as failed and yield empty lists.
    pub fn empty(source_timeout: Duration) -> Self {
        Self {
            adapters: BTreeMap::new(),
            source_timeout,
            default_max_results: crate::types::DEFAULT_MAX_RESULTS,
        }
    }

    /// Register `adapter` for its [`SourceAdapter::kind`], replacing any
    /// adapter already registered for that kind.
    pub fn with_adapter(mut self, adapter: Arc<dyn SourceAdapter>) -> Self {
        self.adapters.insert(adapter.kind(), adapter);
        self
    }

    /// Limit applied by [`DeepSearch::handle`] when a request sets none.
    pub fn with_default_max_results(mut self, default_max_results: usize) -> Self {
        self.default_max_results = default_max_results;
        self
    }

    pub fn source_timeout(&self) -> Duration {
        self.source_timeout
    }

    pub fn default_max_results(&self) -> usize {
        self.default_max_results
    }

    /// Validate a wire request and execute it.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Validation`] for a blank query or a
    /// non-positive `max_results`; no source is contacted in that case.
    pub async fn handle(&self, request: SearchRequest) -> Result<SearchResults, SearchError> {
        let query = request.into_query(self.default_max_results)?;
        Ok(self.execute(&query).await)
    }

    /// Run a validated query.
    ///
    /// # Pipeline
    ///
    /// 1. Optimise the query text once
    /// 2. Invoke every requested adapter concurrently, each under the
    ///    source timeout
    /// 3. Keep completed lists, log timeouts and failures at warn level
    /// 4. Truncate each list to `max_results`
    /// 5. Deduplicate and rank against the original query text
    /// 6. Wrap in a timed envelope
    pub async fn execute(&self, query: &SearchQuery) -> SearchResults {
        let started = Instant::now();
        let max_results = query.max_results();
        let optimized = query::optimize(query.query(), query.context());

        tracing::debug!(
            sources = ?query.sources(),
            max_results,
            language = query.language(),
            "collecting source results"
        );
        tracing::trace!(query = %optimized, "optimised query");

        let invocations = query
            .sources()
            .iter()
            .map(|kind| self.invoke(*kind, &optimized, max_results));
        let outcomes = join_all(invocations).await;

        let mut collected = BTreeMap::new();
        for (kind, outcome) in outcomes {
            match &outcome {
                SourceOutcome::Completed(results) => {
                    tracing::debug!(source = %kind, count = results.len(), "source completed");
                }
                SourceOutcome::TimedOut => {
                    tracing::warn!(
                        source = %kind,
                        timeout_ms = self.source_timeout.as_millis() as u64,
                        "source timed out"
                    );
                }
                SourceOutcome::Failed(error) => {
                    tracing::warn!(source = %kind, %error, "source failed");
                }
            }
            let mut results = outcome.into_results();
            results.truncate(max_results);
            collected.insert(kind, results);
        }

        tracing::debug!("ranking results");
        let ranked = rank_and_dedupe(collected, query.query());
        let results = SearchResults::new(query.query(), ranked, started.elapsed());

        tracing::debug!(
            total = results.total_results,
            elapsed_ms = results.search_time_ms,
            "deep search done"
        );
        results
    }

    /// Invoke one adapter under the source timeout.
    async fn invoke(
        &self,
        kind: SourceKind,
        query: &str,
        max_results: usize,
    ) -> (SourceKind, SourceOutcome) {
        let Some(adapter) = self.adapters.get(&kind) else {
            let error = SearchError::Config(format!("no adapter registered for {kind}"));
            return (kind, SourceOutcome::Failed(error));
        };

        let outcome =
            match tokio::time::timeout(self.source_timeout, adapter.search(query, max_results))
                .await
            {
                Ok(Ok(results)) => SourceOutcome::Completed(results),
                Ok(Err(error)) => SourceOutcome::Failed(error),
                Err(_elapsed) => SourceOutcome::TimedOut,
            };
        (kind, outcome)
    }
}
