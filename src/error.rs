//! Error types for the fixfinder host.

use fixfinder_search::SearchError;

/// Top-level error type for the host process.
#[derive(Debug, thiserror::Error)]
pub enum FixFinderError {
    /// Error from the search engine (validation, configuration).
    #[error(transparent)]
    Search(#[from] SearchError),

    /// Configuration file error.
    #[error("config error: {0}")]
    Config(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON encode/decode error on the host channel.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Reading from or writing to the host channel failed.
    #[error("channel error: {0}")]
    Channel(String),
}

impl FixFinderError {
    /// Short machine-readable category used in error responses.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Search(SearchError::Validation(_)) => "validation",
            Self::Search(SearchError::Config(_)) | Self::Config(_) => "config",
            Self::Search(_) => "search",
            Self::Io(_) => "io",
            Self::Json(_) => "parse",
            Self::Channel(_) => "channel",
        }
    }
}

/// Convenience result type.
pub type Result<T> = std::result::Result<T, FixFinderError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_errors_pass_through_unchanged() {
        let err = FixFinderError::from(SearchError::Validation("query must not be empty".into()));
        assert_eq!(err.to_string(), "validation error: query must not be empty");
        assert_eq!(err.kind(), "validation");
    }

    #[test]
    fn json_errors_are_parse_kind() {
        let err = serde_json::from_str::<serde_json::Value>("{oops")
            .map(|_| ())
            .map_err(FixFinderError::from)
            .unwrap_err();
        assert_eq!(err.kind(), "parse");
        assert!(err.to_string().starts_with("JSON error"));
    }

    #[test]
    fn config_error_display() {
        let err = FixFinderError::Config("bad table".into());
        assert_eq!(err.to_string(), "config error: bad table");
        assert_eq!(err.kind(), "config");
    }
}
