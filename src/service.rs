//! The repair search service: one shared engine behind a JSON-friendly API.

use fixfinder_search::{DeepSearch, SearchRequest, SearchResults};

use crate::config::FixFinderConfig;
use crate::error::Result;

/// Serves deep search requests against one engine.
///
/// Cloning is cheap and clones share adapters and connection pools, so a
/// clone can be moved into each concurrently served request.
#[derive(Debug, Clone)]
pub struct RepairSearchService {
    engine: DeepSearch,
}

impl RepairSearchService {
    /// Build the production engine from `config`.
    ///
    /// # Errors
    ///
    /// Returns a config error for invalid search settings, or an HTTP error
    /// if an adapter client cannot be built.
    pub fn new(config: &FixFinderConfig) -> Result<Self> {
        Ok(Self::from_engine(DeepSearch::new(&config.search)?))
    }

    /// Wrap an already assembled engine (e.g. one with fake adapters).
    pub fn from_engine(engine: DeepSearch) -> Self {
        Self { engine }
    }

    pub fn engine(&self) -> &DeepSearch {
        &self.engine
    }

    /// Run one request.
    ///
    /// # Errors
    ///
    /// Returns a validation error for a blank query or a non-positive
    /// `max_results`. Source failures are not errors.
    pub async fn search(&self, request: SearchRequest) -> Result<SearchResults> {
        Ok(self.engine.handle(request).await?)
    }

    /// Decode a JSON request, run it and encode the envelope.
    ///
    /// # Errors
    ///
    /// Returns a JSON error for malformed input, otherwise the same errors
    /// as [`RepairSearchService::search`].
    pub async fn search_json(&self, request: &str) -> Result<serde_json::Value> {
        let request: SearchRequest = serde_json::from_str(request)?;
        let results = self.search(request).await?;
        Ok(serde_json::to_value(results)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FixFinderError;
    use async_trait::async_trait;
    use fixfinder_search::{ArticleResult, SearchError, SourceAdapter, SourceKind, SourceResult};
    use std::sync::Arc;
    use std::time::Duration;

    /// A forum source returning one fixed guide.
    struct Forums;

    #[async_trait]
    impl SourceAdapter for Forums {
        async fn search(
            &self,
            _query: &str,
            _max_results: usize,
        ) -> std::result::Result<Vec<SourceResult>, SearchError> {
            Ok(vec![
                ArticleResult {
                    title: "Kettle element replacement guide".into(),
                    url: "https://example.com/kettle".into(),
                    source: "example.com".into(),
                    snippet: String::new(),
                    relevance: 0.5,
                }
                .into(),
            ])
        }

        fn kind(&self) -> SourceKind {
            SourceKind::Forums
        }
    }

    fn service() -> RepairSearchService {
        RepairSearchService::from_engine(
            DeepSearch::empty(Duration::from_secs(5)).with_adapter(Arc::new(Forums)),
        )
    }

    #[tokio::test]
    async fn search_json_returns_envelope() {
        let value = service()
            .search_json(r#"{"query": "kettle not heating", "sources": ["forums"]}"#)
            .await
            .expect("ok");
        assert_eq!(value["query"], "kettle not heating");
        assert_eq!(value["total_results"], 1);
        assert_eq!(value["results"]["forums"][0]["source"], "example.com");
        assert_eq!(value["results"]["videos"], serde_json::json!([]));
    }

    #[tokio::test]
    async fn malformed_json_is_parse_error() {
        let err = service().search_json("{not json").await.unwrap_err();
        assert!(matches!(err, FixFinderError::Json(_)));
    }

    #[tokio::test]
    async fn blank_query_is_validation_error() {
        let err = service().search_json(r#"{"query": "  "}"#).await.unwrap_err();
        assert_eq!(err.kind(), "validation");
    }

    #[test]
    fn new_builds_production_engine() {
        let service = RepairSearchService::new(&FixFinderConfig::default()).expect("service");
        assert_eq!(service.engine().default_max_results(), 10);
    }
}
