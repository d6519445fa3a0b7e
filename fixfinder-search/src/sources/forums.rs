//! Forum and article search: Q&A sites, tech forums and repair guides.
//!
//! Two strategies run concurrently over general web search:
//!
//! 1. a direct search, phrased as a repair question when the query lacks
//!    repair vocabulary, with discussion-board links filtered out (those are
//!    the discussion adapter's job);
//! 2. a `site:ifixit.com` search for dedicated repair guides.

use async_trait::async_trait;
use url::Url;

use crate::config::SearchConfig;
use crate::error::SearchError;
use crate::http;
use crate::query::REPAIR_PREFIX;
use crate::source::SourceAdapter;
use crate::text;
use crate::types::{ArticleResult, SourceKind, SourceResult};

use super::web_search::{WebHit, WebSearch};
use super::{dedupe_by_url, finish};

/// Weight of query-term overlap with the title.
pub const TITLE_WEIGHT: f64 = 0.5;
/// Weight of query-term overlap with the snippet.
pub const SNIPPET_WEIGHT: f64 = 0.3;
/// Boost for high-signal Q&A and repair sources.
pub const PRIORITY_SOURCE_BOOST: f64 = 0.2;
/// Boost for trusted tech publishers.
pub const TRUSTED_SOURCE_BOOST: f64 = 0.15;
/// Boost for any other source.
pub const OTHER_SOURCE_BOOST: f64 = 0.05;

/// Dedicated repair-guide site searched by the second strategy.
const REPAIR_SITE: &str = "ifixit.com";
/// Hits requested from the repair-guide site.
const REPAIR_SITE_LIMIT: usize = 5;
/// The direct search scans this many hits per wanted result, since some are filtered.
const DIRECT_SCAN_FACTOR: usize = 2;
/// Host whose links belong to the discussion adapter.
const DISCUSSION_HOST: &str = "reddit.com";
/// Maximum snippet length in characters.
const SNIPPET_MAX_CHARS: usize = 300;

/// Vocabulary that makes a direct query already read as a repair question.
const REPAIR_PHRASES: &[&str] = &["fix", "repair", "solve", "solution", "how to"];

/// Known domains and their display names.
const KNOWN_SOURCES: &[(&str, &str)] = &[
    ("stackoverflow.com", "Stack Overflow"),
    ("superuser.com", "Super User"),
    ("serverfault.com", "Server Fault"),
    ("askubuntu.com", "Ask Ubuntu"),
    ("github.com", "GitHub"),
    ("howtogeek.com", "How-To Geek"),
    ("makeuseof.com", "MakeUseOf"),
    ("tomshardware.com", "Tom's Hardware"),
    ("quora.com", "Quora"),
    ("ifixit.com", "iFixit"),
    ("microsoft.com", "Microsoft"),
    ("support.google.com", "Google Support"),
];

const PRIORITY_SOURCES: &[&str] = &["Stack Overflow", "Super User", "GitHub", "iFixit"];
const TRUSTED_SOURCES: &[&str] = &["How-To Geek", "MakeUseOf", "Tom's Hardware"];

/// Forum/article adapter over general web search.
#[derive(Debug, Clone)]
pub struct ForumSearch {
    web: WebSearch,
}

impl ForumSearch {
    /// Build the adapter with its own pooled HTTP client.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Http`] if the HTTP client cannot be built.
    pub fn new(config: &SearchConfig) -> Result<Self, SearchError> {
        let client = http::build_client(config)?;
        Ok(Self {
            web: WebSearch::new(client, config.endpoints.web_search.clone()),
        })
    }

    /// Search and return typed article results.
    ///
    /// # Errors
    ///
    /// Fails only if both strategies fail; the direct search's error is
    /// returned in that case.
    pub async fn search_articles(
        &self,
        query: &str,
        max_results: usize,
    ) -> Result<Vec<ArticleResult>, SearchError> {
        if max_results == 0 {
            return Ok(Vec::new());
        }

        let direct_query = direct_query(query);
        let (direct, site) = futures::join!(
            self.web
                .search(&direct_query, max_results.saturating_mul(DIRECT_SCAN_FACTOR)),
            self.web.search_site(REPAIR_SITE, query, REPAIR_SITE_LIMIT),
        );

        let mut hits: Vec<WebHit> = Vec::new();
        match (direct, site) {
            (Err(direct_err), Err(site_err)) => {
                tracing::debug!(error = %site_err, "repair site search failed");
                return Err(direct_err);
            }
            (direct, site) => {
                match direct {
                    Ok(found) => hits.extend(
                        found
                            .into_iter()
                            .filter(|hit| !is_discussion_link(&hit.url))
                            .take(max_results),
                    ),
                    Err(e) => tracing::warn!(error = %e, "direct forum search failed"),
                }
                match site {
                    Ok(found) => hits.extend(found),
                    Err(e) => tracing::warn!(error = %e, "repair site search failed"),
                }
            }
        }

        let hits = dedupe_by_url(hits, |hit| hit.url.as_str());
        let query_terms = text::term_set(query);
        Ok(hits
            .into_iter()
            .map(|hit| {
                let source = source_name(&hit.url);
                let mut article = ArticleResult {
                    title: hit.title,
                    url: hit.url,
                    source,
                    snippet: text::truncate_chars(&hit.snippet, SNIPPET_MAX_CHARS),
                    relevance: 0.0,
                };
                article.relevance = preliminary_relevance(&article, &query_terms);
                article
            })
            .collect())
    }
}

#[async_trait]
impl SourceAdapter for ForumSearch {
    async fn search(
        &self,
        query: &str,
        max_results: usize,
    ) -> Result<Vec<SourceResult>, SearchError> {
        let articles = self.search_articles(query, max_results).await?;
        Ok(finish(
            articles.into_iter().map(SourceResult::from).collect(),
            max_results,
        ))
    }

    fn kind(&self) -> SourceKind {
        SourceKind::Forums
    }
}

/// Phrase the direct query as a repair question unless it already is one.
fn direct_query(query: &str) -> String {
    let lower = query.to_lowercase();
    if REPAIR_PHRASES.iter().any(|p| lower.contains(p)) {
        query.to_string()
    } else {
        format!("{REPAIR_PREFIX}{query}")
    }
}

fn host_of(url: &str) -> Option<String> {
    Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(str::to_lowercase))
}

fn host_matches(host: &str, domain: &str) -> bool {
    host == domain || host.ends_with(&format!(".{domain}"))
}

fn is_discussion_link(url: &str) -> bool {
    host_of(url).is_some_and(|host| host_matches(&host, DISCUSSION_HOST))
}

/// Display name of the publisher behind `url`.
///
/// Known domains map to their brand name; anything else becomes the bare
/// host without `www.`, or `"Web"` if the URL has no host.
pub fn source_name(url: &str) -> String {
    let Some(host) = host_of(url) else {
        return "Web".into();
    };
    KNOWN_SOURCES
        .iter()
        .find(|(domain, _)| host_matches(&host, domain))
        .map(|(_, name)| (*name).to_string())
        .unwrap_or_else(|| host.trim_start_matches("www.").to_string())
}

/// Preliminary relevance: title overlap, snippet overlap and source quality.
pub fn preliminary_relevance(
    article: &ArticleResult,
    query_terms: &std::collections::HashSet<String>,
) -> f64 {
    let source_boost = if PRIORITY_SOURCES.contains(&article.source.as_str()) {
        PRIORITY_SOURCE_BOOST
    } else if TRUSTED_SOURCES.contains(&article.source.as_str()) {
        TRUSTED_SOURCE_BOOST
    } else {
        OTHER_SOURCE_BOOST
    };

    text::clamp_unit(
        text::overlap_fraction(query_terms, &article.title) * TITLE_WEIGHT
            + text::overlap_fraction(query_terms, &article.snippet) * SNIPPET_WEIGHT
            + source_boost,
    )
}
