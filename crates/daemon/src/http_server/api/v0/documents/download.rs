//! Download endpoint: fetches a document off the share and serves it as an
//! attachment.
//!
//! The document is spooled through a per-request scratch destination which
//! is removed before the response leaves, so downloads keep no local state.

use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::Json;
use reqwest::{Client, RequestBuilder, Url};
use serde::{Deserialize, Serialize};

use common::{BridgeError, ErrorKind};

use crate::http_server::api::client::ApiRequest;
use crate::http_server::api::error::{bridge_error_response, ErrorBody};
use crate::ServiceState;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownloadRequest {
    /// Remote path of the document, relative to the share's base path.
    pub path: String,
}

pub async fn handler(
    State(state): State<ServiceState>,
    Json(req): Json<DownloadRequest>,
) -> Result<Response, DownloadError> {
    let file_name = req
        .path
        .rsplit(['/', '\\'])
        .next()
        .filter(|n| !n.is_empty())
        .unwrap_or("document")
        .to_string();

    let scratch = state.bridge().allocate_scratch(&file_name).await?;
    let outcome = state.bridge().download(&req.path, &scratch).await?;

    let data = tokio::fs::read(&outcome.local_path)
        .await
        .map_err(DownloadError::Read)?;
    if let Err(e) = tokio::fs::remove_file(&outcome.local_path).await {
        tracing::warn!(path = %outcome.local_path.display(), error = %e, "failed to remove download scratch");
    }

    let mime_type = mime_guess::from_path(&file_name).first_or_octet_stream();

    let mut response = (
        http::StatusCode::OK,
        [
            (axum::http::header::CONTENT_TYPE, mime_type.as_ref()),
            (
                axum::http::header::CONTENT_DISPOSITION,
                &format!("attachment; filename=\"{}\"", file_name),
            ),
        ],
        data,
    )
        .into_response();

    // A raw-bytes response has no JSON body to carry the unmount warning, so
    // it travels in a header.
    if let Some(warning) = &outcome.warning {
        if let Ok(value) = axum::http::HeaderValue::from_str(warning) {
            response.headers_mut().insert("x-bridge-warning", value);
        }
    }

    Ok(response)
}

#[derive(Debug, thiserror::Error)]
pub enum DownloadError {
    #[error("failed to read downloaded document: {0}")]
    Read(std::io::Error),
    #[error(transparent)]
    Bridge(#[from] BridgeError),
}

impl IntoResponse for DownloadError {
    fn into_response(self) -> Response {
        match self {
            DownloadError::Read(e) => {
                tracing::error!(error = %e, "failed to read download scratch");
                (
                    http::StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ErrorBody::new(
                        ErrorKind::Command,
                        "failed to read downloaded document",
                    )),
                )
                    .into_response()
            }
            DownloadError::Bridge(e) => bridge_error_response(&e),
        }
    }
}

// Client implementation - the response is raw bytes, fetched with
// `ApiClient::call_bytes`.
impl ApiRequest for DownloadRequest {
    type Response = serde_json::Value;

    fn build_request(self, base_url: &Url, client: &Client) -> RequestBuilder {
        let full_url = base_url.join("/api/v0/documents/download").unwrap();
        client.post(full_url).json(&self)
    }
}
