use std::path::PathBuf;

use clap::Args;
use owo_colors::OwoColorize;

use crate::cli::op::{Op, OpContext};
use crate::http_server::api::client::ApiError;
use crate::http_server::api::v0::documents::DownloadRequest;

/// Download a document from the share.
#[derive(Args, Debug, Clone)]
pub struct Download {
    /// Remote path relative to the share's base path
    pub remote: String,
    /// Local destination file
    pub local: PathBuf,
}

#[derive(Debug, thiserror::Error)]
pub enum DownloadError {
    #[error("API error: {0}")]
    Api(#[from] ApiError),
    #[error("failed to write {0}: {1}")]
    Write(PathBuf, std::io::Error),
}

#[async_trait::async_trait]
impl Op for Download {
    type Error = DownloadError;
    type Output = String;

    async fn execute(&self, ctx: &OpContext) -> Result<Self::Output, Self::Error> {
        let bytes = ctx
            .client
            .call_bytes(DownloadRequest {
                path: self.remote.clone(),
            })
            .await?;

        if let Some(parent) = self.local.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| DownloadError::Write(self.local.clone(), e))?;
        }
        tokio::fs::write(&self.local, &bytes)
            .await
            .map_err(|e| DownloadError::Write(self.local.clone(), e))?;

        Ok(format!(
            "{} {} -> {} ({} bytes)",
            "Downloaded".green(),
            self.remote,
            self.local.display(),
            bytes.len()
        ))
    }
}
