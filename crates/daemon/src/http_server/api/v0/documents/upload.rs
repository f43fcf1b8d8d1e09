//! Multipart upload endpoint.
//!
//! The file part is spooled to a scratch file first; the bridge owns the
//! scratch file from that point on and removes it whether or not the
//! transfer to the share succeeds.

use std::path::PathBuf;

use axum::extract::{Multipart, State};
use axum::response::{IntoResponse, Response};
use axum::Json;
use reqwest::{Client, RequestBuilder, Url};
use serde::{Deserialize, Serialize};

use common::{BridgeError, ErrorKind};

use crate::http_server::api::client::ApiRequest;
use crate::http_server::api::error::{bridge_error_response, ErrorBody};
use crate::ServiceState;

/// Client-side request: pushes `bytes` to `remote_path` on the share.
#[derive(Debug, Clone)]
pub struct UploadRequest {
    pub remote_path: String,
    pub file_name: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadResponse {
    pub path: String,
    pub size: u64,
    /// Present when the share unmounted uncleanly after the transfer.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

pub async fn handler(
    State(state): State<ServiceState>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, UploadError> {
    let mut scratch: Option<PathBuf> = None;
    let remote_path = match spool_form(&state, &mut multipart, &mut scratch).await {
        Ok(path) => path,
        Err(e) => {
            // Nothing may linger locally, even when the request was bad.
            if let Some(path) = scratch {
                let _ = tokio::fs::remove_file(path).await;
            }
            return Err(e);
        }
    };
    let scratch = scratch.ok_or(UploadError::MissingField("file"))?;

    let outcome = state.bridge().upload(&scratch, &remote_path).await?;

    tracing::debug!(path = %outcome.remote_path, size = outcome.size, "upload complete");
    Ok((
        http::StatusCode::OK,
        Json(UploadResponse {
            path: outcome.remote_path,
            size: outcome.size,
            warning: outcome.warning,
        }),
    )
        .into_response())
}

/// Walk the multipart fields, spooling the file part to a scratch path the
/// caller cleans up on any failure. Returns the remote path field.
async fn spool_form(
    state: &ServiceState,
    multipart: &mut Multipart,
    scratch: &mut Option<PathBuf>,
) -> Result<String, UploadError> {
    let mut remote_path: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| UploadError::Multipart(e.to_string()))?
    {
        let name = field.name().map(|n| n.to_string());
        match name.as_deref() {
            Some("path") => {
                remote_path = Some(
                    field
                        .text()
                        .await
                        .map_err(|e| UploadError::Multipart(e.to_string()))?,
                );
            }
            Some("file") => {
                let file_name = field.file_name().unwrap_or("document").to_string();
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| UploadError::Multipart(e.to_string()))?;
                let path = state.bridge().allocate_scratch(&file_name).await?;
                // Record the path before writing so a half-written spool is
                // still cleaned up.
                *scratch = Some(path.clone());
                tokio::fs::write(&path, &data)
                    .await
                    .map_err(UploadError::Spool)?;
            }
            _ => {}
        }
    }

    remote_path.ok_or(UploadError::MissingField("path"))
}

#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("malformed multipart body: {0}")]
    Multipart(String),
    #[error("missing multipart field `{0}`")]
    MissingField(&'static str),
    #[error("failed to spool upload to scratch: {0}")]
    Spool(std::io::Error),
    #[error(transparent)]
    Bridge(#[from] BridgeError),
}

impl IntoResponse for UploadError {
    fn into_response(self) -> Response {
        match self {
            UploadError::Multipart(_) | UploadError::MissingField(_) => (
                http::StatusCode::BAD_REQUEST,
                Json(ErrorBody::new(ErrorKind::Validation, self.to_string())),
            )
                .into_response(),
            UploadError::Spool(e) => {
                tracing::error!(error = %e, "failed to spool upload");
                (
                    http::StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ErrorBody::new(
                        ErrorKind::Command,
                        "failed to store upload locally",
                    )),
                )
                    .into_response()
            }
            UploadError::Bridge(e) => bridge_error_response(&e),
        }
    }
}

// Client implementation - builds the multipart form the handler parses.
impl ApiRequest for UploadRequest {
    type Response = UploadResponse;

    fn build_request(self, base_url: &Url, client: &Client) -> RequestBuilder {
        let full_url = base_url.join("/api/v0/documents/upload").unwrap();
        let part = reqwest::multipart::Part::bytes(self.bytes).file_name(self.file_name);
        let form = reqwest::multipart::Form::new()
            .text("path", self.remote_path)
            .part("file", part);
        client.post(full_url).multipart(form)
    }
}
