use clap::Args;

use crate::cli::op::{Op, OpContext};
use crate::http_server::health::VersionRequest;

/// Print client and daemon versions.
#[derive(Args, Debug, Clone)]
pub struct Version {}

#[derive(Debug, thiserror::Error)]
pub enum VersionError {}

#[async_trait::async_trait]
impl Op for Version {
    type Error = VersionError;
    type Output = String;

    async fn execute(&self, ctx: &OpContext) -> Result<Self::Output, Self::Error> {
        let client_version = env!("CARGO_PKG_VERSION");
        // The daemon may not be running; that is not an error for `version`.
        match ctx.client.call(VersionRequest {}).await {
            Ok(response) => Ok(format!(
                "client {}\ndaemon {}",
                client_version, response.version
            )),
            Err(_) => Ok(format!("client {}\ndaemon unreachable", client_version)),
        }
    }
}
