//! Stable failure envelope for bridge endpoints.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use common::{BridgeError, ErrorKind};

/// JSON body returned for every failed bridge call. Either a success payload
/// or this; never a mix.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub success: bool,
    pub error: String,
    #[serde(rename = "errorKind")]
    pub error_kind: ErrorKind,
}

impl ErrorBody {
    pub fn new(error_kind: ErrorKind, error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: error.into(),
            error_kind,
        }
    }
}

/// Map a bridge failure to its HTTP status and envelope.
///
/// Stderr captured from the underlying commands stays in the logs; the
/// envelope only carries the typed kind and a displayable message.
pub fn bridge_error_response(err: &BridgeError) -> Response {
    let kind = err.kind();
    let status = match kind {
        ErrorKind::Validation => StatusCode::BAD_REQUEST,
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::QueueFull => StatusCode::TOO_MANY_REQUESTS,
        ErrorKind::Timeout => StatusCode::GATEWAY_TIMEOUT,
        ErrorKind::Mount => StatusCode::BAD_GATEWAY,
        ErrorKind::Command => StatusCode::INTERNAL_SERVER_ERROR,
    };

    match err.stderr() {
        Some(stderr) => {
            tracing::error!(kind = %kind, stderr, "bridge operation failed")
        }
        None => tracing::error!(kind = %kind, error = %err, "bridge operation failed"),
    }

    (status, Json(ErrorBody::new(kind, err.public_message()))).into_response()
}
