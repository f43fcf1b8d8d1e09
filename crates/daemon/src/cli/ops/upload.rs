use std::path::PathBuf;

use clap::Args;
use owo_colors::OwoColorize;

use crate::cli::op::{Op, OpContext};
use crate::http_server::api::client::ApiError;
use crate::http_server::api::v0::documents::UploadRequest;

/// Upload a local file to the share.
#[derive(Args, Debug, Clone)]
pub struct Upload {
    /// Local file to upload
    pub local: PathBuf,
    /// Destination path relative to the share's base path
    pub remote: String,
}

#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("failed to read {0}: {1}")]
    Read(PathBuf, std::io::Error),
    #[error("API error: {0}")]
    Api(#[from] ApiError),
}

#[async_trait::async_trait]
impl Op for Upload {
    type Error = UploadError;
    type Output = String;

    async fn execute(&self, ctx: &OpContext) -> Result<Self::Output, Self::Error> {
        let bytes = tokio::fs::read(&self.local)
            .await
            .map_err(|e| UploadError::Read(self.local.clone(), e))?;
        let file_name = self
            .local
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("document")
            .to_string();

        let response = ctx
            .client
            .call(UploadRequest {
                remote_path: self.remote.clone(),
                file_name,
                bytes,
            })
            .await?;

        let mut out = format!(
            "{} {} ({} bytes)",
            "Uploaded".green(),
            response.path,
            response.size
        );
        if let Some(warning) = response.warning {
            out.push_str(&format!("\n{} {}", "warning:".yellow(), warning));
        }
        Ok(out)
    }
}
