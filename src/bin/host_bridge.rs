//! Headless host bridge binary for stdin/stdout JSON communication.
//!
//! Reads search requests as newline-delimited JSON from stdin and writes one
//! response line per request to stdout. The config file is taken from
//! `FIXFINDER_CONFIG` or the default config path; a missing file means
//! defaults.
//!
//! All tracing/diagnostic output goes to stderr so that stdout remains a
//! clean JSON protocol channel.

use fixfinder::host::stdio::run_stdio_bridge;
use fixfinder::{FixFinderConfig, RepairSearchService};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config_path = FixFinderConfig::resolve_config_path();
    let config = FixFinderConfig::load_or_default(&config_path)
        .map_err(|e| anyhow::anyhow!("failed to load {}: {e}", config_path.display()))?;

    // Initialise tracing to stderr only (stdout is reserved for the JSON
    // protocol).
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.logging.filter)),
        )
        .init();

    tracing::info!(config = %config_path.display(), "fixfinder-host starting");

    let service = RepairSearchService::new(&config)?;
    run_stdio_bridge(service).await.map_err(|e| {
        tracing::error!(error = %e, "fixfinder-host exited with error");
        anyhow::anyhow!("fixfinder-host failed: {e}")
    })?;

    tracing::info!("fixfinder-host shut down cleanly");
    Ok(())
}
