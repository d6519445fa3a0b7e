//! General web search over DuckDuckGo's HTML-only endpoint.
//!
//! Not an adapter by itself: the forum adapter uses it as its primary
//! strategy and the discussion adapter as a `site:`-restricted fallback.
//! The endpoint requires no JavaScript and tolerates automated requests.

use scraper::{Html, Selector};
use url::Url;

use crate::error::SearchError;
use crate::http;

/// One organic hit from the web search results page.
#[derive(Debug, Clone, PartialEq)]
pub struct WebHit {
    pub title: String,
    pub url: String,
    pub snippet: String,
}

/// Web search client bound to one pooled HTTP client and endpoint.
#[derive(Debug, Clone)]
pub struct WebSearch {
    client: reqwest::Client,
    endpoint: String,
}

impl WebSearch {
    pub fn new(client: reqwest::Client, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }

    /// Run `query` and return up to `limit` organic hits in page order.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Http`] if the request fails or
    /// [`SearchError::Parse`] if the page cannot be parsed.
    pub async fn search(&self, query: &str, limit: usize) -> Result<Vec<WebHit>, SearchError> {
        tracing::trace!(query, "web search");

        let request = self
            .client
            .post(&self.endpoint)
            .form(&[("q", query)])
            .header("Accept-Language", "en-US,en;q=0.9");
        let html = http::send_text(request, "web search").await?;

        parse_results_html(&html, limit)
    }

    /// Run `query` restricted to `site` (`site:<site> <query>`).
    pub async fn search_site(
        &self,
        site: &str,
        query: &str,
        limit: usize,
    ) -> Result<Vec<WebHit>, SearchError> {
        self.search(&format!("site:{site} {query}"), limit).await
    }
}

/// Extract the actual URL from DuckDuckGo's redirect wrapper.
///
/// Hits are wrapped like `//duckduckgo.com/l/?uddg=https%3A%2F%2Fexample.com&rut=...`;
/// the `uddg` parameter carries the target.
fn extract_url(href: &str) -> Option<String> {
    let full_href = if href.starts_with("//") {
        format!("https:{href}")
    } else {
        href.to_string()
    };

    let parsed = Url::parse(&full_href).ok()?;

    if parsed.host_str() == Some("duckduckgo.com") && parsed.path().starts_with("/l/") {
        parsed
            .query_pairs()
            .find(|(key, _)| key == "uddg")
            .map(|(_, value)| value.into_owned())
    } else {
        Some(full_href)
    }
}

/// Parse a results page into hits, skipping ads and malformed entries.
pub(crate) fn parse_results_html(html: &str, limit: usize) -> Result<Vec<WebHit>, SearchError> {
    let document = Html::parse_document(html);

    let result_sel = Selector::parse(
        ".result.results_links.results_links_deep:not(.result--ad), .web-result:not(.result--ad)",
    )
    .map_err(|e| SearchError::Parse(format!("invalid result selector: {e:?}")))?;
    let title_sel = Selector::parse(".result__a")
        .map_err(|e| SearchError::Parse(format!("invalid title selector: {e:?}")))?;
    let snippet_sel = Selector::parse(".result__snippet")
        .map_err(|e| SearchError::Parse(format!("invalid snippet selector: {e:?}")))?;

    let mut hits = Vec::new();
    if limit == 0 {
        return Ok(hits);
    }

    for element in document.select(&result_sel) {
        let Some(title_el) = element.select(&title_sel).next() else {
            continue;
        };

        let title = collapse_whitespace(&title_el.text().collect::<String>());
        if title.is_empty() {
            continue;
        }

        let Some(url) = title_el.value().attr("href").and_then(extract_url) else {
            continue;
        };

        let snippet = element
            .select(&snippet_sel)
            .next()
            .map(|el| collapse_whitespace(&el.text().collect::<String>()))
            .unwrap_or_default();

        hits.push(WebHit {
            title,
            url,
            snippet,
        });

        if hits.len() >= limit {
            break;
        }
    }

    tracing::debug!(count = hits.len(), "web search hits parsed");
    Ok(hits)
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
