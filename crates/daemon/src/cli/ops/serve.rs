use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Args;

use common::{BridgeConfig, ShareConfig};

use crate::cli::op::{Op, OpContext};
use crate::process::start_service;
use crate::ServiceConfig;

/// Run the bridge daemon in the foreground.
///
/// Share credentials come from the environment in production; the flags
/// exist for local runs against a test share.
#[derive(Args, Debug, Clone)]
pub struct Serve {
    /// Address the API server binds
    #[arg(long, env = "BRIDGE_LISTEN_ADDR", default_value = "127.0.0.1:8477")]
    pub listen: SocketAddr,

    /// NAS hostname or address
    #[arg(long, env = "NAS_HOST")]
    pub nas_host: String,

    /// SMB share name on the NAS
    #[arg(long, env = "NAS_SHARE")]
    pub nas_share: String,

    /// Account the share is mounted as
    #[arg(long, env = "NAS_USERNAME")]
    pub nas_username: String,

    #[arg(long, env = "NAS_PASSWORD", hide_env_values = true)]
    pub nas_password: String,

    /// SMB domain / workgroup
    #[arg(long, env = "NAS_DOMAIN", default_value = "WORKGROUP")]
    pub nas_domain: String,

    /// Directory on the share documents live under
    #[arg(long, env = "NAS_BASE_PATH", default_value = "")]
    pub nas_base_path: String,

    /// Local mount point for the share
    #[arg(long, env = "BRIDGE_MOUNT_POINT", default_value = "/mnt/sacristy")]
    pub mount_point: PathBuf,

    /// Local scratch directory for in-flight transfers
    #[arg(long, env = "BRIDGE_SCRATCH_DIR")]
    pub scratch_dir: Option<PathBuf>,
}

#[derive(Debug, thiserror::Error)]
pub enum ServeError {
    #[error("daemon failed: {0}")]
    Failed(String),
}

#[async_trait::async_trait]
impl Op for Serve {
    type Error = ServeError;
    type Output = String;

    async fn execute(&self, _ctx: &OpContext) -> Result<Self::Output, Self::Error> {
        let share = ShareConfig {
            host: self.nas_host.clone(),
            share_name: self.nas_share.clone(),
            username: self.nas_username.clone(),
            password: self.nas_password.clone(),
            domain: self.nas_domain.clone(),
            base_path: self.nas_base_path.clone(),
        };

        let scratch_dir = self
            .scratch_dir
            .clone()
            .unwrap_or_else(|| std::env::temp_dir().join("sacristy"));
        let bridge = BridgeConfig::with_dirs(self.mount_point.clone(), scratch_dir);

        let config = ServiceConfig {
            api_listen_addr: self.listen,
            share,
            bridge,
        };

        start_service(&config)
            .await
            .map_err(|e| ServeError::Failed(e.to_string()))?;
        Ok("daemon ended".to_string())
    }
}
