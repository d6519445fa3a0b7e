//! Search configuration with sensible defaults.
//!
//! [`SearchConfig`] controls per-source time budgets, the pooled HTTP
//! clients each adapter owns, and the endpoints adapters talk to. The
//! defaults target the public sources directly; endpoints are overridable
//! so tests and proxies can stand in for them.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::SearchError;

/// Configuration shared by the orchestrator and every source adapter.
///
/// Deserialises with defaults for every missing field, so a partial TOML
/// `[search]` table is valid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Time budget for one adapter invocation, in seconds. A source that
    /// exceeds it contributes an empty list.
    pub source_timeout_seconds: u64,
    /// Timeout for a single HTTP request made by an adapter, in seconds.
    pub request_timeout_seconds: u64,
    /// Idle connections each adapter keeps pooled per host.
    pub max_idle_connections: usize,
    /// `max_results` used when a request does not specify one.
    pub default_max_results: usize,
    /// How many top videos get a transcript excerpt fetched.
    pub transcript_limit: usize,
    /// Custom User-Agent string. If `None`, each adapter picks one from a
    /// built-in list of realistic browser User-Agents.
    pub user_agent: Option<String>,
    /// Base URLs of the upstream sources.
    pub endpoints: SourceEndpoints,
}

/// Upstream endpoints used by the source adapters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceEndpoints {
    /// HTML-only general web search endpoint (POST form).
    pub web_search: String,
    /// Discussion board base URL; `/search.json` is appended.
    pub discussions: String,
    /// Video site base URL; `/results` and `/api/timedtext` are appended.
    pub videos: String,
}

impl Default for SourceEndpoints {
    fn default() -> Self {
        Self {
            web_search: "https://html.duckduckgo.com/html/".into(),
            discussions: "https://www.reddit.com".into(),
            videos: "https://www.youtube.com".into(),
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            source_timeout_seconds: 15,
            request_timeout_seconds: 15,
            max_idle_connections: 10,
            default_max_results: 10,
            transcript_limit: 5,
            user_agent: None,
            endpoints: SourceEndpoints::default(),
        }
    }
}

impl SearchConfig {
    /// The per-source time budget as a [`Duration`].
    pub fn source_timeout(&self) -> Duration {
        Duration::from_secs(self.source_timeout_seconds)
    }

    /// Validates this configuration, returning an error if any field is invalid.
    ///
    /// Checks:
    /// - `source_timeout_seconds` and `request_timeout_seconds` must be greater than 0
    /// - `max_idle_connections` must be greater than 0
    /// - `default_max_results` must be greater than 0
    /// - every endpoint must parse as an absolute URL
    pub fn validate(&self) -> Result<(), SearchError> {
        if self.source_timeout_seconds == 0 {
            return Err(SearchError::Config(
                "source_timeout_seconds must be greater than 0".into(),
            ));
        }
        if self.request_timeout_seconds == 0 {
            return Err(SearchError::Config(
                "request_timeout_seconds must be greater than 0".into(),
            ));
        }
        if self.max_idle_connections == 0 {
            return Err(SearchError::Config(
                "max_idle_connections must be greater than 0".into(),
            ));
        }
        if self.default_max_results == 0 {
            return Err(SearchError::Config(
                "default_max_results must be greater than 0".into(),
            ));
        }
        for (name, raw) in [
            ("web_search", &self.endpoints.web_search),
            ("discussions", &self.endpoints.discussions),
            ("videos", &self.endpoints.videos),
        ] {
            Url::parse(raw)
                .map_err(|e| SearchError::Config(format!("endpoint {name} is not a URL: {e}")))?;
        }
        Ok(())
    }
}
