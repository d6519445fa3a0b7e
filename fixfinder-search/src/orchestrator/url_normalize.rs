//! URL normalisation for adapter-level deduplication.
//!
//! Adapters merge hits from several retrieval strategies (a native API and a
//! site-restricted web search, say), which return the same page under
//! different spellings: `www.` vs bare host, short video links, tracking
//! parameters, fragments. [`normalize_url`] maps them to one comparison key.
//! The key is only ever compared, never shown to users.

use url::Url;

/// Tracking and share query parameters that are stripped during normalisation.
const TRACKING_PARAMS: &[&str] = &[
    "utm_source",
    "utm_medium",
    "utm_campaign",
    "utm_term",
    "utm_content",
    "fbclid",
    "gclid",
    "ref",
    "ref_source",
    "si",
    "feature",
    "pp",
    "share_id",
    "rdt",
];

/// Host prefixes that address the same site as the bare host.
const HOST_ALIAS_PREFIXES: &[&str] = &["www.", "m.", "old.", "mobile."];

/// Normalise a URL into a deduplication key.
///
/// Applies the following transformations:
///
/// 1. Lowercase scheme and host; treat `http` as `https`.
/// 2. Drop `www.`, `m.`, `old.` and `mobile.` host prefixes.
/// 3. Rewrite `youtu.be/<id>` short links to `youtube.com/watch?v=<id>`.
/// 4. Remove default ports, the fragment and a trailing path slash.
/// 5. Strip tracking parameters and sort the rest by key.
///
/// If the input cannot be parsed as a URL, it is returned trimmed.
///
/// # Examples
///
/// ```
/// use fixfinder_search::orchestrator::url_normalize::normalize_url;
///
/// let a = normalize_url("https://www.Reddit.com/r/fixit/comments/abc/title/?utm_source=share");
/// let b = normalize_url("https://reddit.com/r/fixit/comments/abc/title");
/// assert_eq!(a, b);
/// ```
pub fn normalize_url(raw: &str) -> String {
    let raw = raw.trim();
    let Ok(parsed) = Url::parse(raw) else {
        return raw.to_string();
    };
    if parsed.cannot_be_a_base() {
        return raw.to_string();
    }

    let scheme = match parsed.scheme() {
        "http" => "https",
        other => other,
    };

    let mut host = parsed.host_str().unwrap_or_default().to_string();
    for prefix in HOST_ALIAS_PREFIXES {
        if let Some(stripped) = host.strip_prefix(prefix) {
            host = stripped.to_string();
            break;
        }
    }

    let mut path = parsed.path().to_string();
    let mut params: Vec<(String, String)> = parsed
        .query_pairs()
        .filter(|(key, _)| !TRACKING_PARAMS.contains(&key.to_lowercase().as_str()))
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    if host == "youtu.be" {
        let id = path.trim_matches('/').to_string();
        if !id.is_empty() {
            host = "youtube.com".into();
            path = "/watch".into();
            params.retain(|(k, _)| k != "v");
            params.push(("v".into(), id));
        }
    }

    if path.len() > 1 && path.ends_with('/') {
        path.pop();
    }

    let port = match (parsed.scheme(), parsed.port()) {
        (_, None) | ("http", Some(80)) | ("https", Some(443)) => String::new(),
        (_, Some(p)) => format!(":{p}"),
    };

    params.sort();
    let query = if params.is_empty() {
        String::new()
    } else {
        let pairs: Vec<String> = params.iter().map(|(k, v)| format!("{k}={v}")).collect();
        format!("?{}", pairs.join("&"))
    };

    format!("{scheme}://{host}{port}{path}{query}")
}
