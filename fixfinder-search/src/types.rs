//! Core types: source kinds, the validated query, per-medium results and
//! the response envelope.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::SearchError;

/// `max_results` applied when a request does not name one.
pub const DEFAULT_MAX_RESULTS: usize = 10;

/// Advisory language applied when a request does not name one.
pub const DEFAULT_LANGUAGE: &str = "en";

/// The information categories a deep search can query.
///
/// The derived ordering (forums, discussions, videos) is the fixed traversal
/// order used by the ranker, so first-seen dedup is deterministic.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// Forum threads, Q&A sites and repair articles.
    Forums,
    /// Discussion-board posts.
    Discussions,
    /// Video tutorials.
    Videos,
}

impl SourceKind {
    /// Returns the wire name of this source kind.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Forums => "forums",
            Self::Discussions => "discussions",
            Self::Videos => "videos",
        }
    }

    /// Returns all source kinds in traversal order.
    pub fn all() -> &'static [SourceKind] {
        &[Self::Forums, Self::Discussions, Self::Videos]
    }

    /// Parse a source name, accepting the historical aliases
    /// (`web`, `articles`, `reddit`, `youtube`). Case-insensitive.
    ///
    /// Returns `None` for unknown names; callers ignore those.
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "forums" | "forum" | "web" | "articles" => Some(Self::Forums),
            "discussions" | "discussion" | "reddit" => Some(Self::Discussions),
            "videos" | "video" | "youtube" => Some(Self::Videos),
            _ => None,
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A discussion-board post.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscussionResult {
    pub title: String,
    pub url: String,
    /// Community the post belongs to, without the `r/` prefix.
    pub community: String,
    /// Upvote-like score, clamped at zero.
    pub score: u64,
    pub reply_count: u64,
    /// Body excerpt, at most 300 characters.
    pub excerpt: String,
    pub author: String,
    pub created_at: Option<DateTime<Utc>>,
    pub relevance: f64,
}

/// A forum thread, Q&A answer or repair article.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArticleResult {
    pub title: String,
    pub url: String,
    /// Human-readable publisher name (e.g. "iFixit") or bare host.
    pub source: String,
    /// Search snippet, at most 300 characters.
    pub snippet: String,
    pub relevance: f64,
}

/// A video tutorial.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoResult {
    pub title: String,
    pub url: String,
    pub video_id: String,
    pub channel: String,
    /// Display duration as shown by the source, e.g. `"12:04"`.
    pub duration: String,
    /// Display view count as shown by the source, e.g. `"1.2M views"`.
    pub views: String,
    pub thumbnail: String,
    /// Caption excerpt, at most 500 characters.
    pub transcript: Option<String>,
    pub relevance: f64,
}

/// One result from one source, tagged by medium.
///
/// Serialised untagged: each list in the envelope is already keyed by its
/// source kind, so items carry only their own fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SourceResult {
    Video(VideoResult),
    Discussion(DiscussionResult),
    Article(ArticleResult),
}

impl SourceResult {
    pub fn title(&self) -> &str {
        match self {
            Self::Video(v) => &v.title,
            Self::Discussion(d) => &d.title,
            Self::Article(a) => &a.title,
        }
    }

    pub fn url(&self) -> &str {
        match self {
            Self::Video(v) => &v.url,
            Self::Discussion(d) => &d.url,
            Self::Article(a) => &a.url,
        }
    }

    pub fn relevance(&self) -> f64 {
        match self {
            Self::Video(v) => v.relevance,
            Self::Discussion(d) => d.relevance,
            Self::Article(a) => a.relevance,
        }
    }

    /// Overwrite the relevance score. Only the ranker and the adapters
    /// that created the result call this.
    pub fn set_relevance(&mut self, relevance: f64) {
        match self {
            Self::Video(v) => v.relevance = relevance,
            Self::Discussion(d) => d.relevance = relevance,
            Self::Article(a) => a.relevance = relevance,
        }
    }

    /// Transcript excerpt, for video results that have one.
    pub fn transcript(&self) -> Option<&str> {
        match self {
            Self::Video(v) => v.transcript.as_deref(),
            _ => None,
        }
    }
}

impl From<VideoResult> for SourceResult {
    fn from(value: VideoResult) -> Self {
        Self::Video(value)
    }
}

impl From<DiscussionResult> for SourceResult {
    fn from(value: DiscussionResult) -> Self {
        Self::Discussion(value)
    }
}

impl From<ArticleResult> for SourceResult {
    fn from(value: ArticleResult) -> Self {
        Self::Article(value)
    }
}

/// A validated, immutable deep-search query.
///
/// Construct with [`SearchQuery::builder`] or from a wire
/// [`SearchRequest`]; both reject blank queries and non-positive limits.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchQuery {
    query: String,
    context: Option<String>,
    sources: BTreeSet<SourceKind>,
    max_results: usize,
    language: String,
}

impl SearchQuery {
    /// Start building a query for `query`. Defaults: all sources,
    /// [`DEFAULT_MAX_RESULTS`], [`DEFAULT_LANGUAGE`], no context.
    pub fn builder(query: impl Into<String>) -> SearchQueryBuilder {
        SearchQueryBuilder {
            query: query.into(),
            context: None,
            sources: SourceKind::all().iter().copied().collect(),
            max_results: DEFAULT_MAX_RESULTS as i64,
            language: DEFAULT_LANGUAGE.to_string(),
        }
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn context(&self) -> Option<&str> {
        self.context.as_deref()
    }

    /// Requested source kinds; duplicates are already collapsed.
    pub fn sources(&self) -> &BTreeSet<SourceKind> {
        &self.sources
    }

    pub fn max_results(&self) -> usize {
        self.max_results
    }

    pub fn language(&self) -> &str {
        &self.language
    }
}

/// Builder for [`SearchQuery`].
#[derive(Debug, Clone)]
pub struct SearchQueryBuilder {
    query: String,
    context: Option<String>,
    sources: BTreeSet<SourceKind>,
    max_results: i64,
    language: String,
}

impl SearchQueryBuilder {
    /// Extra free text appended to the query for recall. Blank context is
    /// treated as absent.
    pub fn context(mut self, context: impl Into<String>) -> Self {
        let context = context.into();
        self.context = if context.trim().is_empty() {
            None
        } else {
            Some(context)
        };
        self
    }

    /// Replace the source set with the given kinds.
    pub fn source_kinds(mut self, kinds: impl IntoIterator<Item = SourceKind>) -> Self {
        self.sources = kinds.into_iter().collect();
        self
    }

    /// Replace the source set from wire names. Unknown names are ignored.
    pub fn sources<S: AsRef<str>>(mut self, names: impl IntoIterator<Item = S>) -> Self {
        self.sources = names
            .into_iter()
            .filter_map(|name| {
                let parsed = SourceKind::parse(name.as_ref());
                if parsed.is_none() {
                    tracing::debug!(source = name.as_ref(), "ignoring unknown source");
                }
                parsed
            })
            .collect();
        self
    }

    /// Results cap per source. Signed so out-of-range wire values can be
    /// rejected rather than wrapped.
    pub fn max_results(mut self, max_results: i64) -> Self {
        self.max_results = max_results;
        self
    }

    pub fn language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    /// Validate and build the query.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Validation`] if the query is blank or
    /// `max_results` is not positive.
    pub fn build(self) -> Result<SearchQuery, SearchError> {
        let query = self.query.trim();
        if query.is_empty() {
            return Err(SearchError::Validation("query must not be empty".into()));
        }
        if self.max_results <= 0 {
            return Err(SearchError::Validation(
                "max_results must be greater than 0".into(),
            ));
        }
        let max_results = usize::try_from(self.max_results)
            .map_err(|_| SearchError::Validation("max_results is too large".into()))?;
        let language = if self.language.trim().is_empty() {
            DEFAULT_LANGUAGE.to_string()
        } else {
            self.language.trim().to_string()
        };

        Ok(SearchQuery {
            query: query.to_string(),
            context: self.context,
            sources: self.sources,
            max_results,
            language,
        })
    }
}

/// A deep-search request as received from the surrounding product.
///
/// Every field is optional on the wire so that validation errors, not
/// deserialisation errors, report a missing query.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchRequest {
    pub query: String,
    pub context: Option<String>,
    /// `None` means all sources; `Some(vec![])` means none.
    pub sources: Option<Vec<String>>,
    pub max_results: Option<i64>,
    pub language: Option<String>,
}

impl SearchRequest {
    /// Validate this request into a [`SearchQuery`], using
    /// `default_max_results` when the request does not set a limit.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Validation`] for a blank query or a
    /// non-positive `max_results`.
    pub fn into_query(self, default_max_results: usize) -> Result<SearchQuery, SearchError> {
        let default_max = i64::try_from(default_max_results).unwrap_or(i64::MAX);
        let mut builder = SearchQuery::builder(self.query)
            .max_results(self.max_results.unwrap_or(default_max));
        if let Some(context) = self.context {
            builder = builder.context(context);
        }
        if let Some(sources) = self.sources {
            builder = builder.sources(sources);
        }
        if let Some(language) = self.language {
            builder = builder.language(language);
        }
        builder.build()
    }
}

impl TryFrom<SearchRequest> for SearchQuery {
    type Error = SearchError;

    fn try_from(request: SearchRequest) -> Result<Self, Self::Error> {
        request.into_query(DEFAULT_MAX_RESULTS)
    }
}

/// The response envelope of one deep search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResults {
    /// The original, un-optimised query text.
    pub query: String,
    pub timestamp: DateTime<Utc>,
    /// Ranked results per source kind. Every kind is present; kinds that
    /// were not requested or failed map to an empty list.
    pub results: BTreeMap<SourceKind, Vec<SourceResult>>,
    pub total_results: usize,
    pub search_time_ms: f64,
}

impl SearchResults {
    /// Assemble an envelope, filling in missing kinds and computing the
    /// total from the list lengths.
    pub fn new(
        query: impl Into<String>,
        mut results: BTreeMap<SourceKind, Vec<SourceResult>>,
        elapsed: Duration,
    ) -> Self {
        for kind in SourceKind::all() {
            results.entry(*kind).or_default();
        }
        let total_results = results.values().map(Vec::len).sum();
        Self {
            query: query.into(),
            timestamp: Utc::now(),
            results,
            total_results,
            search_time_ms: elapsed.as_secs_f64() * 1000.0,
        }
    }

    /// Ranked results for one source kind.
    pub fn results_for(&self, kind: SourceKind) -> &[SourceResult] {
        self.results.get(&kind).map_or(&[], Vec::as_slice)
    }
}
