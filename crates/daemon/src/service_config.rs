//! Daemon configuration.

use std::net::SocketAddr;

use common::{BridgeConfig, ShareConfig};

/// Everything the daemon needs to start. Assembled by the CLI from the
/// environment before the service spawns; read-only afterwards.
#[derive(Debug, Clone)]
pub struct Config {
    /// Address the API server binds.
    pub api_listen_addr: SocketAddr,
    /// The share documents are bridged to.
    pub share: ShareConfig,
    /// Mount point, scratch directory and timing knobs.
    pub bridge: BridgeConfig,
}
