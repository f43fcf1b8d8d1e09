use clap::Args;
use owo_colors::OwoColorize;

use crate::cli::op::{Op, OpContext};
use crate::http_server::api::client::ApiError;
use crate::http_server::api::v0::documents::DeleteRequest;

/// Delete a document from the share.
#[derive(Args, Debug, Clone)]
pub struct Delete {
    /// Remote path relative to the share's base path
    pub remote: String,
}

#[derive(Debug, thiserror::Error)]
pub enum DeleteError {
    #[error("API error: {0}")]
    Api(#[from] ApiError),
}

#[async_trait::async_trait]
impl Op for Delete {
    type Error = DeleteError;
    type Output = String;

    async fn execute(&self, ctx: &OpContext) -> Result<Self::Output, Self::Error> {
        let response = ctx
            .client
            .call(DeleteRequest {
                path: self.remote.clone(),
            })
            .await?;

        let mut out = if response.removed {
            format!("{} {}", "Deleted".green(), self.remote)
        } else {
            format!("{} was already absent", self.remote)
        };
        if let Some(warning) = response.warning {
            out.push_str(&format!("\n{} {}", "warning:".yellow(), warning));
        }
        Ok(out)
    }
}
