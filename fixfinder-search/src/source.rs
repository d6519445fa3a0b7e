//! Trait definition for pluggable source adapters.
//!
//! Each source kind (forums, discussions, videos) is served by one
//! [`SourceAdapter`]. The orchestrator holds adapters as
//! `Arc<dyn SourceAdapter>`, so production adapters and test fakes are
//! interchangeable.

use async_trait::async_trait;

use crate::error::SearchError;
use crate::types::{SourceKind, SourceResult};

/// Retrieval for exactly one source kind.
///
/// Implementations must uphold the adapter contract:
///
/// - never return more than `max_results` items;
/// - return `Ok(vec![])`, not an error, when nothing matched;
/// - set a preliminary `relevance` in `[0, 1]` (0 when unknown);
/// - deduplicate their own output by normalised URL;
/// - keep no per-call mutable state on `self`, since one instance serves
///   many concurrent calls.
///
/// The orchestrator wraps every call in a timeout; an implementation does
/// not need its own overall deadline.
#[async_trait]
pub trait SourceAdapter: Send + Sync {
    /// Search this source for `query`.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError`] when the source could not be queried at all
    /// (every internal strategy failed). Empty results are not an error.
    async fn search(
        &self,
        query: &str,
        max_results: usize,
    ) -> Result<Vec<SourceResult>, SearchError>;

    /// Which [`SourceKind`] this adapter serves.
    fn kind(&self) -> SourceKind;
}
