//! Versioned request/response envelopes for the host bridge.

use fixfinder_search::SearchRequest;
use serde::{Deserialize, Serialize};

use crate::error::FixFinderError;

/// Contract version for host envelopes.
pub const CONTRACT_VERSION: u32 = 1;

/// One request line: a search request plus an optional correlation id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RequestEnvelope {
    /// Echoed back on the matching response; responses may arrive out of
    /// order when several requests are in flight.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    #[serde(flatten)]
    pub request: SearchRequest,
}

/// One response line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseEnvelope {
    pub v: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    pub ok: bool,
    /// The search results envelope on success, `null` on error.
    pub payload: serde_json::Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorBody>,
}

/// Error details of a failed request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Machine-readable category, e.g. `validation` or `parse`.
    pub kind: String,
    pub message: String,
}

impl ResponseEnvelope {
    /// Build a successful response envelope.
    #[must_use]
    pub fn ok(request_id: Option<String>, payload: serde_json::Value) -> Self {
        Self {
            v: CONTRACT_VERSION,
            request_id,
            ok: true,
            payload,
            error: None,
        }
    }

    /// Build an error response envelope.
    #[must_use]
    pub fn error(
        request_id: Option<String>,
        kind: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            v: CONTRACT_VERSION,
            request_id,
            ok: false,
            payload: serde_json::Value::Null,
            error: Some(ErrorBody {
                kind: kind.into(),
                message: message.into(),
            }),
        }
    }

    /// Build an error response from a host error.
    #[must_use]
    pub fn from_error(request_id: Option<String>, error: &FixFinderError) -> Self {
        Self::error(request_id, error.kind(), error.to_string())
    }
}
