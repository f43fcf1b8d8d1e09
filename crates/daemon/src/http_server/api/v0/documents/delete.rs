//! Delete endpoint.
//!
//! Deleting a document that is already gone is success (`removed: false`),
//! so retries after a half-failed call are safe.

use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::Json;
use reqwest::{Client, RequestBuilder, Url};
use serde::{Deserialize, Serialize};

use common::BridgeError;

use crate::http_server::api::client::ApiRequest;
use crate::http_server::api::error::bridge_error_response;
use crate::ServiceState;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteRequest {
    /// Remote path of the document, relative to the share's base path.
    pub path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteResponse {
    /// False when the document was already absent.
    pub removed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

pub async fn handler(
    State(state): State<ServiceState>,
    Json(req): Json<DeleteRequest>,
) -> Result<impl IntoResponse, DeleteError> {
    let outcome = state.bridge().delete(&req.path).await?;

    Ok((
        http::StatusCode::OK,
        Json(DeleteResponse {
            removed: outcome.removed,
            warning: outcome.warning,
        }),
    )
        .into_response())
}

#[derive(Debug, thiserror::Error)]
pub enum DeleteError {
    #[error(transparent)]
    Bridge(#[from] BridgeError),
}

impl IntoResponse for DeleteError {
    fn into_response(self) -> Response {
        match self {
            DeleteError::Bridge(e) => bridge_error_response(&e),
        }
    }
}

impl ApiRequest for DeleteRequest {
    type Response = DeleteResponse;

    fn build_request(self, base_url: &Url, client: &Client) -> RequestBuilder {
        let full_url = base_url.join("/api/v0/documents/delete").unwrap();
        client.post(full_url).json(&self)
    }
}
