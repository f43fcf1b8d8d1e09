//! Transfer operations: upload, download, delete.
//!
//! Each operation validates its remote path, runs inside exactly one mount
//! session, and owns its scratch files for the duration of the call. No
//! operation assumes the share is already mounted from a prior call.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use uuid::Uuid;

use crate::command::{self, CommandError, CommandRunner, ShellRunner};
use crate::config::{BridgeConfig, ShareConfig};
use crate::error::BridgeError;
use crate::mount::MountCoordinator;
use crate::path::validate_remote_path;

/// Successful upload summary.
#[derive(Debug, Clone)]
pub struct UploadOutcome {
    /// Normalized remote path the document now lives at.
    pub remote_path: String,
    pub size: u64,
    /// Unmount diagnostic from the session, if the release was unclean.
    pub warning: Option<String>,
}

/// Successful download summary.
#[derive(Debug, Clone)]
pub struct DownloadOutcome {
    pub remote_path: String,
    pub local_path: PathBuf,
    pub size: u64,
    pub warning: Option<String>,
}

/// Successful delete summary.
#[derive(Debug, Clone)]
pub struct DeleteOutcome {
    pub remote_path: String,
    /// False when the document was already absent; that is still success.
    pub removed: bool,
    pub warning: Option<String>,
}

/// Moves documents between local scratch storage and the network share.
pub struct DocumentBridge {
    share: ShareConfig,
    config: BridgeConfig,
    runner: Arc<dyn CommandRunner>,
    coordinator: MountCoordinator,
}

impl std::fmt::Debug for DocumentBridge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentBridge")
            .field("share", &self.share)
            .field("mount_point", &self.config.mount_point)
            .field("scratch_dir", &self.config.scratch_dir)
            .finish()
    }
}

impl DocumentBridge {
    /// Bridge backed by the platform's mount/copy utilities.
    pub fn new(share: ShareConfig, config: BridgeConfig) -> Self {
        Self::with_runner(share, config, Arc::new(ShellRunner))
    }

    /// Bridge with an injected command runner. This is how tests script
    /// mount failures without a real share.
    pub fn with_runner(
        share: ShareConfig,
        config: BridgeConfig,
        runner: Arc<dyn CommandRunner>,
    ) -> Self {
        let coordinator = MountCoordinator::new(share.clone(), config.clone(), runner.clone());
        Self {
            share,
            config,
            runner,
            coordinator,
        }
    }

    pub fn coordinator(&self) -> &MountCoordinator {
        &self.coordinator
    }

    pub fn scratch_dir(&self) -> &Path {
        &self.config.scratch_dir
    }

    /// Allocate a fresh scratch path for an incoming transfer. The caller
    /// owns the file it writes there; `upload` removes it when done.
    pub async fn allocate_scratch(&self, file_name: &str) -> Result<PathBuf, BridgeError> {
        tokio::fs::create_dir_all(&self.config.scratch_dir)
            .await
            .map_err(|e| BridgeError::local(self.config.scratch_dir.clone(), e))?;
        // File names from multipart parts are untrusted; keep the final
        // component only.
        let name = Path::new(file_name)
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("document");
        Ok(self
            .config
            .scratch_dir
            .join(format!("{}-{}", Uuid::new_v4(), name)))
    }

    /// Copy a received scratch file onto the share.
    ///
    /// The scratch file is deleted whether or not the transfer succeeds;
    /// once a file was handed to the bridge, nothing lingers locally.
    pub async fn upload(&self, local: &Path, remote: &str) -> Result<UploadOutcome, BridgeError> {
        let result = self.upload_inner(local, remote).await;
        self.remove_quietly(local, "scratch file").await;
        result
    }

    async fn upload_inner(&self, local: &Path, remote: &str) -> Result<UploadOutcome, BridgeError> {
        let remote = validate_remote_path(remote)?;
        let meta = tokio::fs::metadata(local)
            .await
            .map_err(|e| BridgeError::local(local.to_path_buf(), e))?;
        let size = meta.len();

        let mounted = self
            .coordinator
            .with_mount(|mount_point| {
                let remote = remote.clone();
                async move {
                    let dest = self.mounted_path(&mount_point, &remote);
                    if let Some(parent) = dest.parent() {
                        self.ensure_remote_dir(parent).await?;
                    }
                    self.copy(local, &dest).await.map_err(BridgeError::from)
                }
            })
            .await?;

        tracing::info!(remote = %remote, size, "document uploaded");
        Ok(UploadOutcome {
            remote_path: remote,
            size,
            warning: mounted.unmount_warning,
        })
    }

    /// Fetch a document off the share into `local_dest`.
    ///
    /// A missing remote file is `NotFound`, distinct from a generic command
    /// failure, and no partial local file is left behind.
    pub async fn download(
        &self,
        remote: &str,
        local_dest: &Path,
    ) -> Result<DownloadOutcome, BridgeError> {
        let remote = validate_remote_path(remote)?;
        if let Some(parent) = local_dest.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| BridgeError::local(parent.to_path_buf(), e))?;
        }

        let result = self
            .coordinator
            .with_mount(|mount_point| {
                let remote = remote.clone();
                async move {
                    let src = self.mounted_path(&mount_point, &remote);
                    match self.copy(&src, local_dest).await {
                        Ok(()) => Ok(()),
                        Err(CommandError::Failed { ref stderr, .. })
                            if command::is_missing_file(stderr) =>
                        {
                            Err(BridgeError::NotFound(remote.clone()))
                        }
                        Err(e) => Err(e.into()),
                    }
                }
            })
            .await;

        match result {
            Ok(mounted) => {
                let size = tokio::fs::metadata(local_dest)
                    .await
                    .map_err(|e| BridgeError::local(local_dest.to_path_buf(), e))?
                    .len();
                tracing::info!(remote = %remote, size, "document downloaded");
                Ok(DownloadOutcome {
                    remote_path: remote,
                    local_path: local_dest.to_path_buf(),
                    size,
                    warning: mounted.unmount_warning,
                })
            }
            Err(e) => {
                self.remove_quietly(local_dest, "partial download").await;
                Err(e)
            }
        }
    }

    /// Remove a document from the share.
    ///
    /// Removing a document that is already gone is success, reported as
    /// `removed: false`. The matching scratch-dir copy, when present, is
    /// dropped as well.
    pub async fn delete(&self, remote: &str) -> Result<DeleteOutcome, BridgeError> {
        let remote = validate_remote_path(remote)?;

        let mounted = self
            .coordinator
            .with_mount(|mount_point| {
                let remote = remote.clone();
                async move {
                    let target = self.mounted_path(&mount_point, &remote);
                    match self
                        .runner
                        .run(
                            "rm",
                            &[target.display().to_string()],
                            self.config.command_timeout,
                        )
                        .await
                    {
                        Ok(_) => Ok(true),
                        Err(CommandError::Failed { ref stderr, .. })
                            if command::is_missing_file(stderr) =>
                        {
                            Ok(false)
                        }
                        Err(e) => Err(BridgeError::from(e)),
                    }
                }
            })
            .await?;

        self.remove_quietly(&self.config.scratch_dir.join(&remote), "scratch copy")
            .await;

        tracing::info!(remote = %remote, removed = mounted.value, "document deleted");
        Ok(DeleteOutcome {
            remote_path: remote,
            removed: mounted.value,
            warning: mounted.unmount_warning,
        })
    }

    /// Where `remote` lives under the mounted share.
    fn mounted_path(&self, mount_point: &Path, remote: &str) -> PathBuf {
        let base = self.share.base_path.trim_matches('/');
        if base.is_empty() {
            mount_point.join(remote)
        } else {
            mount_point.join(base).join(remote)
        }
    }

    /// `mkdir -p` succeeds on an existing directory; anything else is a real
    /// failure and is reported, not swallowed.
    async fn ensure_remote_dir(&self, dir: &Path) -> Result<(), BridgeError> {
        match self
            .runner
            .run(
                "mkdir",
                &["-p".to_string(), dir.display().to_string()],
                self.config.command_timeout,
            )
            .await
        {
            Ok(_) => Ok(()),
            Err(CommandError::Failed { ref stderr, .. })
                if command::is_already_exists(stderr) =>
            {
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn copy(&self, from: &Path, to: &Path) -> Result<(), CommandError> {
        self.runner
            .run(
                "cp",
                &[from.display().to_string(), to.display().to_string()],
                self.config.command_timeout,
            )
            .await
            .map(|_| ())
    }

    /// Best-effort local removal; a missing file is fine, anything else is
    /// logged so it is not lost.
    async fn remove_quietly(&self, path: &Path, what: &str) {
        match tokio::fs::remove_file(path).await {
            Ok(()) => tracing::debug!(path = %path.display(), "removed {}", what),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "failed to remove {}", what)
            }
        }
    }
}
