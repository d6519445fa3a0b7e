//! Video tutorial search over YouTube.
//!
//! The results page embeds its data as a `ytInitialData` JSON object in an
//! inline script; that object is parsed rather than the rendered markup.
//! Caption excerpts are fetched for the top few videos.

use std::collections::HashSet;

use async_trait::async_trait;
use futures::future::join_all;
use scraper::{Html, Selector};
use serde_json::Value;

use crate::config::SearchConfig;
use crate::error::SearchError;
use crate::http;
use crate::source::SourceAdapter;
use crate::text;
use crate::types::{SourceKind, SourceResult, VideoResult};

use super::{dedupe_by_url, finish};

/// Weight of query-term overlap with the title.
pub const TITLE_WEIGHT: f64 = 0.5;
/// Boost when the title uses repair vocabulary.
pub const REPAIR_TITLE_BOOST: f64 = 0.2;
/// Weight of query-term overlap with the transcript excerpt.
pub const TRANSCRIPT_WEIGHT: f64 = 0.2;
/// Boost for channels known for repair content.
pub const CHANNEL_BOOST: f64 = 0.1;

const REPAIR_TITLE_TERMS: &[&str] = &[
    "fix", "repair", "tutorial", "guide", "how to", "diy", "replace", "broken",
];
const REPAIR_CHANNELS: &[&str] = &[
    "ifixit",
    "jerryrigeverything",
    "ltt",
    "linus",
    "hugh jeffreys",
];

const WATCH_URL: &str = "https://www.youtube.com/watch?v=";
const DATA_MARKER: &str = "ytInitialData";
const SECTIONS_POINTER: &str =
    "/contents/twoColumnSearchResultsRenderer/primaryContents/sectionListRenderer/contents";
/// Caption lines read per transcript.
const TRANSCRIPT_MAX_LINES: usize = 50;
/// Maximum transcript excerpt length in characters.
const TRANSCRIPT_MAX_CHARS: usize = 500;

/// Video adapter.
#[derive(Debug, Clone)]
pub struct VideoSearch {
    client: reqwest::Client,
    results_url: String,
    transcript_url: String,
    transcript_limit: usize,
}

impl VideoSearch {
    /// Build the adapter with its own pooled HTTP client.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Http`] if the HTTP client cannot be built.
    pub fn new(config: &SearchConfig) -> Result<Self, SearchError> {
        let base = config.endpoints.videos.trim_end_matches('/');
        Ok(Self {
            client: http::build_client(config)?,
            results_url: format!("{base}/results"),
            transcript_url: format!("{base}/api/timedtext"),
            transcript_limit: config.transcript_limit,
        })
    }

    /// Search and return typed video results, transcripts attached to the
    /// first few.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Http`] if the results page cannot be fetched or
    /// [`SearchError::Parse`] if it carries no embedded result data.
    /// Transcript failures are not errors.
    pub async fn search_videos(
        &self,
        query: &str,
        max_results: usize,
    ) -> Result<Vec<VideoResult>, SearchError> {
        if max_results == 0 {
            return Ok(Vec::new());
        }

        tracing::trace!(query, "video search");
        let request = self
            .client
            .get(&self.results_url)
            .query(&[("search_query", query)]);
        let html = http::send_text(request, "video search").await?;

        let videos = parse_results_page(&html, max_results)?;
        let mut videos = dedupe_by_url(videos, |video| video.url.as_str());

        let wanted = self.transcript_limit.min(videos.len());
        let transcripts = join_all(
            videos[..wanted]
                .iter()
                .map(|video| self.fetch_transcript(&video.video_id)),
        )
        .await;
        for (video, transcript) in videos.iter_mut().zip(transcripts) {
            video.transcript = transcript;
        }

        let query_terms = text::term_set(query);
        for video in &mut videos {
            video.relevance = preliminary_relevance(video, &query_terms);
        }
        Ok(videos)
    }

    /// Fetch a caption excerpt; any failure yields `None`.
    async fn fetch_transcript(&self, video_id: &str) -> Option<String> {
        let request = self
            .client
            .get(&self.transcript_url)
            .query(&[("lang", "en"), ("v", video_id)]);
        match http::send_text(request, "transcript").await {
            Ok(body) => parse_transcript(&body),
            Err(e) => {
                tracing::debug!(video_id, error = %e, "transcript unavailable");
                None
            }
        }
    }
}

#[async_trait]
impl SourceAdapter for VideoSearch {
    async fn search(
        &self,
        query: &str,
        max_results: usize,
    ) -> Result<Vec<SourceResult>, SearchError> {
        let videos = self.search_videos(query, max_results).await?;
        Ok(finish(
            videos.into_iter().map(SourceResult::from).collect(),
            max_results,
        ))
    }

    fn kind(&self) -> SourceKind {
        SourceKind::Videos
    }
}

/// Pull up to `limit` videos out of the embedded `ytInitialData` object.
pub(crate) fn parse_results_page(html: &str, limit: usize) -> Result<Vec<VideoResult>, SearchError> {
    let data = extract_initial_data(html)?;
    let Some(sections) = data.pointer(SECTIONS_POINTER).and_then(Value::as_array) else {
        tracing::debug!("video results page has no section list");
        return Ok(Vec::new());
    };

    let videos: Vec<VideoResult> = sections
        .iter()
        .filter_map(|section| section.pointer("/itemSectionRenderer/contents"))
        .filter_map(Value::as_array)
        .flatten()
        .filter_map(|item| item.get("videoRenderer"))
        .filter_map(video_from_renderer)
        .take(limit)
        .collect();

    tracing::debug!(count = videos.len(), "video results parsed");
    Ok(videos)
}

fn extract_initial_data(html: &str) -> Result<Value, SearchError> {
    let start = html
        .find(DATA_MARKER)
        .and_then(|marker| {
            let after = &html[marker..];
            let eq = after.find('=')?;
            let brace = after[eq..].find('{')?;
            Some(marker + eq + brace)
        })
        .ok_or_else(|| SearchError::Parse("video results page has no embedded data".into()))?;

    serde_json::Deserializer::from_str(&html[start..])
        .into_iter::<Value>()
        .next()
        .ok_or_else(|| SearchError::Parse("embedded video data is empty".into()))?
        .map_err(|e| SearchError::Parse(format!("embedded video data is malformed: {e}")))
}

fn video_from_renderer(renderer: &Value) -> Option<VideoResult> {
    let video_id = renderer.get("videoId")?.as_str()?.to_string();
    if video_id.is_empty() {
        return None;
    }
    let title = renderer.get("title").and_then(display_text)?;

    let thumbnail = renderer
        .pointer("/thumbnail/thumbnails")
        .and_then(Value::as_array)
        .and_then(|thumbs| thumbs.last())
        .and_then(|thumb| thumb.get("url"))
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| fallback_thumbnail(&video_id));

    Some(VideoResult {
        title,
        url: format!("{WATCH_URL}{video_id}"),
        channel: renderer
            .get("ownerText")
            .and_then(display_text)
            .unwrap_or_default(),
        duration: renderer
            .get("lengthText")
            .and_then(display_text)
            .unwrap_or_default(),
        views: renderer
            .get("viewCountText")
            .and_then(display_text)
            .unwrap_or_default(),
        thumbnail,
        video_id,
        transcript: None,
        relevance: 0.0,
    })
}

/// Text of a `{"simpleText": ..}` or `{"runs": [{"text": ..}]}` node.
fn display_text(node: &Value) -> Option<String> {
    let text = match node.get("simpleText").and_then(Value::as_str) {
        Some(simple) => simple.to_string(),
        None => node
            .get("runs")?
            .as_array()?
            .iter()
            .filter_map(|run| run.get("text").and_then(Value::as_str))
            .collect(),
    };
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}

pub fn fallback_thumbnail(video_id: &str) -> String {
    format!("https://i.ytimg.com/vi/{video_id}/hqdefault.jpg")
}

/// Join the first caption lines of a timed-text document into an excerpt.
pub(crate) fn parse_transcript(body: &str) -> Option<String> {
    let document = Html::parse_fragment(body);
    let text_sel = Selector::parse("text").ok()?;

    let lines: Vec<String> = document
        .select(&text_sel)
        .map(|el| unescape_caption(&el.text().collect::<String>()))
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|line| !line.is_empty())
        .take(TRANSCRIPT_MAX_LINES)
        .collect();
    if lines.is_empty() {
        return None;
    }
    Some(text::truncate_chars(&lines.join(" "), TRANSCRIPT_MAX_CHARS))
}

/// Captions arrive double-escaped; the parser undoes only the outer layer.
fn unescape_caption(line: &str) -> String {
    line.replace("&#39;", "'")
        .replace("&quot;", "\"")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}

/// Preliminary relevance: title overlap, repair vocabulary, transcript
/// overlap and channel.
pub fn preliminary_relevance(video: &VideoResult, query_terms: &HashSet<String>) -> f64 {
    let mut score = text::overlap_fraction(query_terms, &video.title) * TITLE_WEIGHT;

    let title = video.title.to_lowercase();
    if REPAIR_TITLE_TERMS.iter().any(|term| title.contains(term)) {
        score += REPAIR_TITLE_BOOST;
    }

    if let Some(transcript) = &video.transcript {
        score += text::overlap_fraction(query_terms, transcript) * TRANSCRIPT_WEIGHT;
    }

    let channel = video.channel.to_lowercase();
    if REPAIR_CHANNELS.iter().any(|name| channel.contains(name)) {
        score += CHANNEL_BOOST;
    }

    text::clamp_unit(score)
}
