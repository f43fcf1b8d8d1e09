//! Typed client for the daemon API.
//!
//! Each endpoint module implements [`ApiRequest`] for its request type, so
//! the CLI and any other consumer build requests the same way the server
//! parses them.

mod client;
mod error;

pub use client::ApiClient;
pub use error::ApiError;

use reqwest::{Client, RequestBuilder, Url};

/// One API operation: how to build its request and what it returns.
pub trait ApiRequest {
    type Response: serde::de::DeserializeOwned;

    fn build_request(self, base_url: &Url, client: &Client) -> RequestBuilder;
}
