use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::Client;
use url::Url;

use super::{ApiError, ApiRequest};

/// HTTP client for the daemon API.
#[derive(Debug, Clone)]
pub struct ApiClient {
    pub remote: Url,
    client: Client,
}

impl ApiClient {
    pub fn new(remote: &Url) -> Result<Self, ApiError> {
        let mut default_headers = HeaderMap::new();
        default_headers.insert("Accept", HeaderValue::from_static("application/json"));
        let client = Client::builder().default_headers(default_headers).build()?;

        Ok(Self {
            remote: remote.clone(),
            client,
        })
    }

    /// Call an endpoint and decode its JSON response.
    pub async fn call<T: ApiRequest>(&self, request: T) -> Result<T::Response, ApiError> {
        let request_builder = request.build_request(&self.remote, &self.client);
        let response = request_builder.send().await?;

        if response.status().is_success() {
            Ok(response.json::<T::Response>().await?)
        } else {
            Err(ApiError::HttpStatus(
                response.status(),
                response.text().await?,
            ))
        }
    }

    /// Call an endpoint that answers with raw bytes (downloads).
    pub async fn call_bytes<T: ApiRequest>(&self, request: T) -> Result<Vec<u8>, ApiError> {
        let request_builder = request.build_request(&self.remote, &self.client);
        let response = request_builder.send().await?;

        if response.status().is_success() {
            Ok(response.bytes().await?.to_vec())
        } else {
            Err(ApiError::HttpStatus(
                response.status(),
                response.text().await?,
            ))
        }
    }

    /// Base URL for API requests.
    pub fn base_url(&self) -> &Url {
        &self.remote
    }

    /// Underlying HTTP client, for custom requests.
    pub fn http_client(&self) -> &Client {
        &self.client
    }
}
