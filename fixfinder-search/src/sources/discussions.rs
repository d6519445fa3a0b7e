//! Discussion-board search over Reddit.
//!
//! The primary strategy is Reddit's public JSON search endpoint, which needs
//! no authentication. When it yields fewer posts than wanted (or fails), a
//! `site:reddit.com` web search fills the gap.

use std::collections::HashSet;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use url::Url;

use crate::config::SearchConfig;
use crate::error::SearchError;
use crate::http;
use crate::source::SourceAdapter;
use crate::text;
use crate::types::{DiscussionResult, SourceKind, SourceResult};

use super::web_search::{WebHit, WebSearch};
use super::{dedupe_by_url, finish};

/// Weight of query-term overlap with the title.
pub const TITLE_WEIGHT: f64 = 0.4;
/// Weight of query-term overlap with the post excerpt.
pub const EXCERPT_WEIGHT: f64 = 0.3;
/// Cap of the engagement contribution (log-scaled score and replies).
pub const ENGAGEMENT_CAP: f64 = 0.2;
/// `log10(engagement + 1)` is divided by this before capping.
pub const ENGAGEMENT_DIVISOR: f64 = 5.0;
/// Replies count this many times as much as one upvote.
pub const REPLY_ENGAGEMENT_FACTOR: u64 = 2;
/// Boost for posts in known repair and tech-support communities.
pub const COMMUNITY_BOOST: f64 = 0.1;

/// Communities whose answers are usually repair-focused.
const REPAIR_COMMUNITIES: &[&str] = &[
    "techsupport",
    "fixit",
    "diy",
    "repair",
    "hardware",
    "buildapc",
    "laptops",
    "headphones",
    "audiophile",
    "mobilerepair",
    "appliancerepair",
    "autorepair",
];

/// Site used by the fallback web search and for permalinks.
const SITE: &str = "reddit.com";
const PERMALINK_BASE: &str = "https://www.reddit.com";
/// Maximum excerpt length in characters.
const EXCERPT_MAX_CHARS: usize = 300;
/// Community recorded when a fallback URL has no `/r/<name>/` segment.
const UNKNOWN_COMMUNITY: &str = "unknown";

/// Discussion-board adapter.
#[derive(Debug, Clone)]
pub struct DiscussionSearch {
    client: reqwest::Client,
    search_url: String,
    web: WebSearch,
}

impl DiscussionSearch {
    /// Build the adapter with its own pooled HTTP client, shared by both
    /// strategies.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Http`] if the HTTP client cannot be built.
    pub fn new(config: &SearchConfig) -> Result<Self, SearchError> {
        let client = http::build_client(config)?;
        let base = config.endpoints.discussions.trim_end_matches('/');
        Ok(Self {
            web: WebSearch::new(client.clone(), config.endpoints.web_search.clone()),
            search_url: format!("{base}/search.json"),
            client,
        })
    }

    /// Search and return typed discussion results.
    ///
    /// # Errors
    ///
    /// Fails only if the JSON search fails and the fallback also fails; the
    /// JSON search's error is returned in that case.
    pub async fn search_discussions(
        &self,
        query: &str,
        max_results: usize,
    ) -> Result<Vec<DiscussionResult>, SearchError> {
        if max_results == 0 {
            return Ok(Vec::new());
        }

        let mut posts = Vec::new();
        let mut primary_error = None;
        match self.search_json(query, max_results).await {
            Ok(found) => posts = found,
            Err(e) => {
                tracing::warn!(error = %e, "discussion JSON search failed; trying web fallback");
                primary_error = Some(e);
            }
        }

        if posts.len() < max_results {
            let wanted = max_results - posts.len();
            match self.web.search_site(SITE, query, wanted).await {
                Ok(hits) => posts.extend(hits.into_iter().filter_map(post_from_web_hit)),
                Err(e) => {
                    if let Some(primary) = primary_error {
                        tracing::debug!(error = %e, "discussion web fallback failed");
                        return Err(primary);
                    }
                    tracing::warn!(error = %e, "discussion web fallback failed");
                }
            }
        }

        let posts = dedupe_by_url(posts, |post| post.url.as_str());
        let query_terms = text::term_set(query);
        Ok(posts
            .into_iter()
            .map(|mut post| {
                post.relevance = preliminary_relevance(&post, &query_terms);
                post
            })
            .collect())
    }

    async fn search_json(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<DiscussionResult>, SearchError> {
        tracing::trace!(query, "discussion JSON search");
        let limit = limit.to_string();
        let request = self
            .client
            .get(&self.search_url)
            .query(&[
                ("q", query),
                ("sort", "relevance"),
                ("limit", limit.as_str()),
                ("type", "link"),
            ])
            .header("Accept", "application/json");
        let listing: Listing = http::send_json(request, "discussion search").await?;
        Ok(parse_listing(listing))
    }
}

#[async_trait]
impl SourceAdapter for DiscussionSearch {
    async fn search(
        &self,
        query: &str,
        max_results: usize,
    ) -> Result<Vec<SourceResult>, SearchError> {
        let posts = self.search_discussions(query, max_results).await?;
        Ok(finish(
            posts.into_iter().map(SourceResult::from).collect(),
            max_results,
        ))
    }

    fn kind(&self) -> SourceKind {
        SourceKind::Discussions
    }
}

#[derive(Debug, Deserialize)]
struct Listing {
    #[serde(default)]
    data: ListingData,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ListingData {
    children: Vec<Child>,
}

#[derive(Debug, Deserialize)]
struct Child {
    data: Option<Post>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Post {
    title: Option<String>,
    permalink: Option<String>,
    subreddit: Option<String>,
    score: i64,
    num_comments: i64,
    selftext: Option<String>,
    author: Option<String>,
    created_utc: Option<f64>,
}

fn parse_listing(listing: Listing) -> Vec<DiscussionResult> {
    listing
        .data
        .children
        .into_iter()
        .filter_map(|child| child.data)
        .filter_map(|post| {
            let title = post.title.filter(|t| !t.trim().is_empty())?;
            let permalink = post.permalink.filter(|p| p.starts_with('/'))?;
            Some(DiscussionResult {
                title: title.trim().to_string(),
                url: format!("{PERMALINK_BASE}{permalink}"),
                community: post.subreddit.unwrap_or_default(),
                score: u64::try_from(post.score).unwrap_or(0),
                reply_count: u64::try_from(post.num_comments).unwrap_or(0),
                excerpt: text::truncate_chars(&post.selftext.unwrap_or_default(), EXCERPT_MAX_CHARS),
                author: post.author.unwrap_or_default(),
                created_at: post
                    .created_utc
                    .filter(|secs| *secs > 0.0)
                    .and_then(|secs| DateTime::<Utc>::from_timestamp(secs as i64, 0)),
                relevance: 0.0,
            })
        })
        .collect()
}

/// Convert a fallback web hit into a post, if it points at a board thread.
fn post_from_web_hit(hit: WebHit) -> Option<DiscussionResult> {
    let parsed = Url::parse(&hit.url).ok()?;
    let host = parsed.host_str()?.to_lowercase();
    if host != SITE && !host.ends_with(".reddit.com") {
        return None;
    }
    Some(DiscussionResult {
        community: community_from_url(&parsed).unwrap_or_else(|| UNKNOWN_COMMUNITY.into()),
        title: hit.title,
        url: hit.url,
        score: 0,
        reply_count: 0,
        excerpt: text::truncate_chars(&hit.snippet, EXCERPT_MAX_CHARS),
        author: String::new(),
        created_at: None,
        relevance: 0.0,
    })
}

/// The `<name>` of a `/r/<name>/...` path.
fn community_from_url(url: &Url) -> Option<String> {
    let mut segments = url.path_segments()?;
    while let Some(segment) = segments.next() {
        if segment == "r" {
            return segments
                .next()
                .filter(|name| !name.is_empty())
                .map(str::to_string);
        }
    }
    None
}

/// Preliminary relevance: title and excerpt overlap, engagement and community.
pub fn preliminary_relevance(post: &DiscussionResult, query_terms: &HashSet<String>) -> f64 {
    let mut score = text::overlap_fraction(query_terms, &post.title) * TITLE_WEIGHT
        + text::overlap_fraction(query_terms, &post.excerpt) * EXCERPT_WEIGHT;

    let engagement = post
        .score
        .saturating_add(post.reply_count.saturating_mul(REPLY_ENGAGEMENT_FACTOR));
    if engagement > 0 {
        score += ((engagement as f64 + 1.0).log10() / ENGAGEMENT_DIVISOR).min(ENGAGEMENT_CAP);
    }

    let community = post.community.trim_start_matches("r/").to_lowercase();
    if REPAIR_COMMUNITIES.contains(&community.as_str()) {
        score += COMMUNITY_BOOST;
    }

    text::clamp_unit(score)
}
