use clap::Args;
use owo_colors::OwoColorize;

use crate::cli::op::{Op, OpContext};
use crate::http_server::api::client::ApiError;
use crate::http_server::health::LivezRequest;

/// Check that the daemon is alive.
#[derive(Args, Debug, Clone)]
pub struct Health {}

#[derive(Debug, thiserror::Error)]
pub enum HealthError {
    #[error("API error: {0}")]
    Api(#[from] ApiError),
}

#[async_trait::async_trait]
impl Op for Health {
    type Error = HealthError;
    type Output = String;

    async fn execute(&self, ctx: &OpContext) -> Result<Self::Output, Self::Error> {
        let response = ctx.client.call(LivezRequest {}).await?;
        Ok(format!(
            "daemon at {} is {}",
            ctx.client.base_url(),
            response.status.green()
        ))
    }
}
