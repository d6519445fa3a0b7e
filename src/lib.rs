//! Fixfinder host: serves repair-help deep searches over a JSON bridge.
//!
//! The search engine itself lives in the `fixfinder-search` crate. This
//! crate adds the surrounding application: TOML configuration, the host
//! error type, a shared [`RepairSearchService`], and the newline-delimited
//! JSON bridge used by the `fixfinder-host` binary.

pub mod config;
pub mod error;
pub mod host;
pub mod service;

pub use config::{FixFinderConfig, LoggingConfig};
pub use error::{FixFinderError, Result};
pub use service::RepairSearchService;
