//! Error types for the fixfinder-search crate.
//!
//! All errors use stable string messages suitable for display to users
//! and programmatic handling. Query text never appears in error messages.

/// Errors that can occur during a deep search.
///
/// Only [`SearchError::Validation`] ever reaches the caller of
/// [`crate::DeepSearch::execute`]-style entry points; every other variant is
/// produced by a single source adapter and absorbed by the orchestrator.
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    /// The search request was malformed (blank query, non-positive limit).
    #[error("validation error: {0}")]
    Validation(String),

    /// A source did not answer within its time budget.
    #[error("source timed out: {0}")]
    Timeout(String),

    /// An HTTP request to a source failed.
    #[error("HTTP error: {0}")]
    Http(String),

    /// A source response could not be parsed.
    #[error("parse error: {0}")]
    Parse(String),

    /// Invalid search configuration.
    #[error("config error: {0}")]
    Config(String),
}

/// Convenience type alias for fixfinder-search results.
pub type Result<T> = std::result::Result<T, SearchError>;
