//! Shared service state.

use std::sync::Arc;

use common::DocumentBridge;

use crate::service_config::Config;

/// Main service state - one cheap cloneable handle per request.
#[derive(Clone)]
pub struct State {
    bridge: Arc<DocumentBridge>,
}

impl State {
    pub async fn from_config(config: &Config) -> Result<Self, StateSetupError> {
        // Both directories must exist before the first transfer arrives.
        tokio::fs::create_dir_all(&config.bridge.scratch_dir)
            .await
            .map_err(|e| StateSetupError::ScratchDir {
                path: config.bridge.scratch_dir.display().to_string(),
                source: e,
            })?;
        tokio::fs::create_dir_all(&config.bridge.mount_point)
            .await
            .map_err(|e| StateSetupError::MountPoint {
                path: config.bridge.mount_point.display().to_string(),
                source: e,
            })?;

        tracing::info!(
            share = %config.share.unc(),
            mount_point = %config.bridge.mount_point.display(),
            scratch_dir = %config.bridge.scratch_dir.display(),
            "bridge configured"
        );

        let bridge = DocumentBridge::new(config.share.clone(), config.bridge.clone());
        Ok(Self {
            bridge: Arc::new(bridge),
        })
    }

    /// State around an already-built bridge. This is how tests inject a
    /// scripted command runner.
    pub fn with_bridge(bridge: DocumentBridge) -> Self {
        Self {
            bridge: Arc::new(bridge),
        }
    }

    pub fn bridge(&self) -> &DocumentBridge {
        &self.bridge
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StateSetupError {
    #[error("failed to create scratch directory {path}: {source}")]
    ScratchDir {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to create mount point {path}: {source}")]
    MountPoint {
        path: String,
        source: std::io::Error,
    },
}
