use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use reqwest::{Client, RequestBuilder, Url};
use serde::{Deserialize, Serialize};

use crate::http_server::api::client::ApiRequest;

/// Request type for the version endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VersionRequest {}

/// Response type for the version endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VersionResponse {
    pub version: String,
}

impl ApiRequest for VersionRequest {
    type Response = VersionResponse;

    fn build_request(self, base_url: &Url, client: &Client) -> RequestBuilder {
        let full_url = base_url.join("/_status/version").unwrap();
        client.get(full_url)
    }
}

/// Reports the daemon's crate version, for the CLI and deploy checks.
pub async fn handler() -> Response {
    (
        StatusCode::OK,
        Json(VersionResponse {
            version: env!("CARGO_PKG_VERSION").to_string(),
        }),
    )
        .into_response()
}
