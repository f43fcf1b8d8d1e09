//! Async operation trait for CLI commands.

use crate::http_server::api::client::ApiClient;

/// Context shared by every CLI operation.
#[derive(Debug, Clone)]
pub struct OpContext {
    pub client: ApiClient,
}

#[async_trait::async_trait]
pub trait Op {
    type Error: std::error::Error;
    type Output: std::fmt::Display;

    async fn execute(&self, ctx: &OpContext) -> Result<Self::Output, Self::Error>;
}
