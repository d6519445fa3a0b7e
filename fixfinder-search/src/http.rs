//! Pooled HTTP client shared by all requests of one source adapter.
//!
//! Each adapter builds one [`reqwest::Client`] at construction and reuses it
//! for every call, so connection setup is amortised across requests. The
//! client carries browser-like headers, a cookie store and a User-Agent
//! picked from a rotation list.

use std::time::Duration;

use rand::seq::SliceRandom;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE};
use serde::de::DeserializeOwned;

use crate::config::SearchConfig;
use crate::error::SearchError;

/// Realistic browser User-Agent strings; one is picked per client.
const USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:133.0) Gecko/20100101 Firefox/133.0",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10.15; rv:133.0) Gecko/20100101 Firefox/133.0",
];

/// Build a pooled [`reqwest::Client`] for one source adapter.
///
/// The client has:
/// - Up to `config.max_idle_connections` idle connections per host
/// - Request timeout from `config.request_timeout_seconds`
/// - Cookie store (consent pages)
/// - Custom User-Agent if configured, otherwise one from the rotation list
/// - `Accept` / `Accept-Language` browser defaults
///
/// # Errors
///
/// Returns [`SearchError::Http`] if the client cannot be constructed.
pub fn build_client(config: &SearchConfig) -> Result<reqwest::Client, SearchError> {
    let ua = match config.user_agent {
        Some(ref custom) => custom.clone(),
        None => random_user_agent().to_owned(),
    };

    let mut headers = HeaderMap::new();
    headers.insert(
        ACCEPT,
        HeaderValue::from_static("text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8"),
    );
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.5"));

    reqwest::Client::builder()
        .cookie_store(true)
        .timeout(Duration::from_secs(config.request_timeout_seconds))
        .pool_max_idle_per_host(config.max_idle_connections)
        .user_agent(ua)
        .default_headers(headers)
        .redirect(reqwest::redirect::Policy::limited(10))
        .build()
        .map_err(|e| SearchError::Http(format!("failed to build HTTP client: {e}")))
}

/// Select a random User-Agent string from the rotation list.
pub fn random_user_agent() -> &'static str {
    let mut rng = rand::thread_rng();
    USER_AGENTS
        .choose(&mut rng)
        .copied()
        // SAFETY: USER_AGENTS is a non-empty const array, choose only returns None on empty slices
        .unwrap_or(USER_AGENTS[0])
}

/// Send a prepared request and return the body text of a 2xx response.
///
/// `source` names the upstream in error messages.
pub async fn send_text(request: reqwest::RequestBuilder, source: &str) -> Result<String, SearchError> {
    let response = request
        .send()
        .await
        .map_err(|e| SearchError::Http(format!("{source} request failed: {e}")))?
        .error_for_status()
        .map_err(|e| SearchError::Http(format!("{source} HTTP error: {e}")))?;

    let body = response
        .text()
        .await
        .map_err(|e| SearchError::Http(format!("{source} response read failed: {e}")))?;
    tracing::trace!(source, bytes = body.len(), "response received");
    Ok(body)
}

/// Send a prepared request and decode a 2xx JSON response.
pub async fn send_json<T: DeserializeOwned>(
    request: reqwest::RequestBuilder,
    source: &str,
) -> Result<T, SearchError> {
    let body = send_text(request, source).await?;
    serde_json::from_str(&body)
        .map_err(|e| SearchError::Parse(format!("{source} returned unexpected JSON: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn random_user_agent_returns_valid_ua() {
        let ua = random_user_agent();
        assert!(USER_AGENTS.contains(&ua));
        assert!(ua.contains("Mozilla/5.0"));
    }

    #[test]
    fn build_client_with_default_config() {
        assert!(build_client(&SearchConfig::default()).is_ok());
    }

    #[tokio::test]
    async fn custom_user_agent_is_sent() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/ua"))
            .and(header("user-agent", "FixFinderTest/1.0"))
            .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
            .expect(1)
            .mount(&server)
            .await;

        let config = SearchConfig {
            user_agent: Some("FixFinderTest/1.0".into()),
            ..Default::default()
        };
        let client = build_client(&config).expect("client");
        let body = send_text(client.get(format!("{}/ua", server.uri())), "test")
            .await
            .expect("ok");
        assert_eq!(body, "ok");
    }

    #[tokio::test]
    async fn non_success_status_is_http_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(429))
            .mount(&server)
            .await;

        let client = build_client(&SearchConfig::default()).expect("client");
        let err = send_text(client.get(server.uri()), "test").await.unwrap_err();
        assert!(matches!(err, SearchError::Http(_)));
        assert!(err.to_string().contains("429"));
    }

    #[tokio::test]
    async fn malformed_json_is_parse_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>blocked</html>"))
            .mount(&server)
            .await;

        let client = build_client(&SearchConfig::default()).expect("client");
        let err = send_json::<serde_json::Value>(client.get(server.uri()), "test")
            .await
            .unwrap_err();
        assert!(matches!(err, SearchError::Parse(_)));
    }
}
