//! Deep search orchestrator: concurrent fan-out, dedup, ranking.
//!
//! [`search::DeepSearch`] fans a query out to the requested source adapters,
//! each under its own timeout, then hands whatever completed to
//! [`rank::rank_and_dedupe`], which collapses cross-source duplicates by
//! title key, rescores and sorts every list.

pub mod dedup;
pub mod rank;
pub mod search;
pub mod url_normalize;

pub use search::{DeepSearch, SourceOutcome};
