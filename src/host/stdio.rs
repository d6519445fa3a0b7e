//! Stdin/stdout JSON bridge for the repair search service.
//!
//! Reads newline-delimited JSON [`RequestEnvelope`] messages from stdin,
//! runs each search concurrently against one shared service, and writes one
//! [`ResponseEnvelope`] line per request to stdout as soon as it is ready.
//!
//! Stdout is exclusively reserved for the JSON protocol; all diagnostic
//! output (tracing, logs) must be routed to stderr.

use std::sync::Arc;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader, BufWriter};
use tokio::sync::Mutex;
use tokio::task::JoinSet;

use crate::error::{FixFinderError, Result};
use crate::host::contract::{RequestEnvelope, ResponseEnvelope};
use crate::service::RepairSearchService;

/// Run the bridge on the process's stdin and stdout until stdin closes.
///
/// # Errors
///
/// Returns a channel error if stdin cannot be read or stdout cannot be
/// written.
pub async fn run_stdio_bridge(service: RepairSearchService) -> Result<()> {
    let reader = BufReader::new(tokio::io::stdin());
    let writer = Arc::new(Mutex::new(BufWriter::new(tokio::io::stdout())));
    serve(service, reader, writer).await
}

/// Serve requests from `reader`, writing responses to `writer`.
///
/// Each request runs on its own task; responses are written in completion
/// order and carry the request's `request_id`. Returns after EOF once every
/// in-flight request has been answered.
///
/// # Errors
///
/// Returns a channel error if reading or writing fails.
pub async fn serve<R, W>(
    service: RepairSearchService,
    mut reader: R,
    writer: Arc<Mutex<W>>,
) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin + Send + 'static,
{
    let mut in_flight = JoinSet::new();
    let mut line = String::new();

    loop {
        line.clear();
        let bytes_read = reader
            .read_line(&mut line)
            .await
            .map_err(|e| FixFinderError::Channel(format!("failed to read request: {e}")))?;

        // EOF
        if bytes_read == 0 {
            tracing::info!(
                in_flight = in_flight.len(),
                "input closed (EOF); finishing in-flight requests"
            );
            break;
        }

        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let envelope: RequestEnvelope = match serde_json::from_str(trimmed) {
            Ok(envelope) => envelope,
            Err(e) => {
                tracing::warn!(error = %e, "failed to parse request envelope");
                let response = ResponseEnvelope::error(
                    None,
                    "parse",
                    format!("failed to parse request envelope: {e}"),
                );
                write_response(&writer, &response).await?;
                continue;
            }
        };

        let service = service.clone();
        let writer = Arc::clone(&writer);
        in_flight.spawn(async move {
            let response = respond(&service, envelope).await;
            write_response(&writer, &response).await
        });

        // Surface write failures from already finished requests early.
        while let Some(joined) = in_flight.try_join_next() {
            flatten_join(joined)?;
        }
    }

    while let Some(joined) = in_flight.join_next().await {
        flatten_join(joined)?;
    }
    Ok(())
}

/// Run one request and build its response line.
async fn respond(service: &RepairSearchService, envelope: RequestEnvelope) -> ResponseEnvelope {
    let RequestEnvelope {
        request_id,
        request,
    } = envelope;

    let encoded = match service.search(request).await {
        Ok(results) => serde_json::to_value(results).map_err(FixFinderError::from),
        Err(e) => Err(e),
    };
    match encoded {
        Ok(payload) => ResponseEnvelope::ok(request_id, payload),
        Err(e) => {
            tracing::debug!(request_id = ?request_id, error = %e, "request rejected");
            ResponseEnvelope::from_error(request_id, &e)
        }
    }
}

fn flatten_join(joined: std::result::Result<Result<()>, tokio::task::JoinError>) -> Result<()> {
    joined.map_err(|e| FixFinderError::Channel(format!("request task failed: {e}")))?
}

async fn write_response<W>(writer: &Mutex<W>, response: &ResponseEnvelope) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    let json = serde_json::to_string(response)?;
    let mut w = writer.lock().await;
    write_line(&mut *w, &json).await
}

/// Write a single JSON line and flush.
async fn write_line<W>(writer: &mut W, json: &str) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    writer
        .write_all(json.as_bytes())
        .await
        .map_err(|e| FixFinderError::Channel(format!("failed to write response: {e}")))?;
    writer
        .write_all(b"\n")
        .await
        .map_err(|e| FixFinderError::Channel(format!("failed to write newline: {e}")))?;
    writer
        .flush()
        .await
        .map_err(|e| FixFinderError::Channel(format!("failed to flush output: {e}")))?;
    Ok(())
}
