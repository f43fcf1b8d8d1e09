//! Mount coordination for the shared mount point.
//!
//! The local mount point is a single external resource: two concurrent mount
//! attempts against it, or an unmount while another operation is mid-copy,
//! corrupt every subsequent transfer. The coordinator therefore admits one
//! operation at a time into a mount/operate/unmount critical section and
//! guarantees the unmount path runs on every exit, including timeouts.

use std::fmt;
use std::future::Future;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::{Mutex, Semaphore};

use crate::command::{self, CommandError, CommandRunner};
use crate::config::{BridgeConfig, ShareConfig};
use crate::error::BridgeError;

/// Lifecycle of the local mount point.
///
/// At most one session is in `Mounting`/`Mounted`/`Unmounting` process-wide.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MountState {
    Unmounted,
    Mounting,
    Mounted,
    Unmounting,
}

impl MountState {
    pub fn as_str(&self) -> &'static str {
        match self {
            MountState::Unmounted => "unmounted",
            MountState::Mounting => "mounting",
            MountState::Mounted => "mounted",
            MountState::Unmounting => "unmounting",
        }
    }
}

impl fmt::Display for MountState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Value produced by a mount session, with any unmount diagnostic attached.
///
/// An unmount failure after a successful operation must not be swallowed: a
/// stuck mount affects every future call, so it travels with the result.
#[derive(Debug)]
pub struct Mounted<T> {
    pub value: T,
    pub unmount_warning: Option<String>,
}

/// Owns the mount point and serializes every mount/operate/unmount cycle.
pub struct MountCoordinator {
    share: ShareConfig,
    config: BridgeConfig,
    runner: Arc<dyn CommandRunner>,
    /// Single-slot gate; waiters are admitted in arrival order.
    gate: Mutex<()>,
    /// Admission bound covering the current session plus everyone waiting.
    admission: Semaphore,
    state: parking_lot::Mutex<MountState>,
}

impl fmt::Debug for MountCoordinator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MountCoordinator")
            .field("share", &self.share)
            .field("mount_point", &self.config.mount_point)
            .field("state", &self.state())
            .finish()
    }
}

impl MountCoordinator {
    pub fn new(share: ShareConfig, config: BridgeConfig, runner: Arc<dyn CommandRunner>) -> Self {
        let admission = Semaphore::new(config.max_queued.max(1));
        Self {
            share,
            config,
            runner,
            gate: Mutex::new(()),
            admission,
            state: parking_lot::Mutex::new(MountState::Unmounted),
        }
    }

    /// Current lifecycle state of the mount point.
    pub fn state(&self) -> MountState {
        *self.state.lock()
    }

    pub fn mount_point(&self) -> &Path {
        &self.config.mount_point
    }

    /// Run `body` with the share mounted at the given mount point, then
    /// unmount.
    ///
    /// Callers beyond the admission bound are rejected immediately with
    /// [`BridgeError::QueueFull`]; admitted callers suspend in arrival order
    /// until the slot frees. Mount plus body are bounded by the session
    /// timeout; the unmount path runs regardless of how the body resolves.
    pub async fn with_mount<T, F, Fut>(&self, body: F) -> Result<Mounted<T>, BridgeError>
    where
        F: FnOnce(PathBuf) -> Fut,
        Fut: Future<Output = Result<T, BridgeError>>,
    {
        let _admitted = self
            .admission
            .try_acquire()
            .map_err(|_| BridgeError::QueueFull)?;
        let _slot = self.gate.lock().await;

        self.set_state(MountState::Mounting);
        let outcome = tokio::time::timeout(self.config.session_timeout, async {
            self.mount_with_retries().await?;
            self.set_state(MountState::Mounted);
            body(self.config.mount_point.clone()).await
        })
        .await;

        // Cleanup runs no matter how the session ended. A timed-out or failed
        // mount makes this a no-op: umount's "not mounted" is success below.
        self.set_state(MountState::Unmounting);
        let unmount = self.unmount().await;
        self.set_state(MountState::Unmounted);

        let unmount_warning = match unmount {
            Ok(()) => None,
            Err(e) => {
                tracing::warn!(
                    mount_point = %self.config.mount_point.display(),
                    error = %e,
                    "unclean unmount"
                );
                Some(format!("unclean unmount: {}", e.summary()))
            }
        };

        match outcome {
            Err(_) => Err(BridgeError::Timeout(
                self.config.session_timeout.as_millis() as u64,
            )),
            Ok(Err(e)) => Err(e),
            Ok(Ok(value)) => Ok(Mounted {
                value,
                unmount_warning,
            }),
        }
    }

    async fn mount_with_retries(&self) -> Result<(), BridgeError> {
        let credentials = self.write_credentials()?;
        let source = self.share.unc();
        let args = vec![
            "-t".to_string(),
            "cifs".to_string(),
            source.clone(),
            self.config.mount_point.display().to_string(),
            "-o".to_string(),
            format!("credentials={},rw", credentials.path().display()),
        ];

        let retries = self.config.mount_retries.max(1);
        let mut attempt = 0;
        loop {
            attempt += 1;
            match self
                .runner
                .run("mount", &args, self.config.command_timeout)
                .await
            {
                Ok(_) => {
                    tracing::debug!(share = %source, attempt, "share mounted");
                    return Ok(());
                }
                Err(CommandError::Failed { ref stderr, .. })
                    if command::is_already_mounted(stderr) =>
                {
                    tracing::debug!(share = %source, "share already mounted, reusing");
                    return Ok(());
                }
                Err(e) => {
                    if attempt >= retries {
                        return Err(BridgeError::Mount {
                            host: self.share.host.clone(),
                            share: self.share.share_name.clone(),
                            attempts: attempt,
                            source: e,
                        });
                    }
                    tracing::warn!(share = %source, attempt, error = %e, "mount attempt failed, retrying");
                    tokio::time::sleep(self.config.mount_retry_delay).await;
                }
            }
        }
    }

    /// Credentials go through a private tempfile, never onto the argv where
    /// they would be visible in the process table. tempfile creates with
    /// mode 0600 on unix; the file is removed when the mount attempt ends.
    fn write_credentials(&self) -> Result<tempfile::NamedTempFile, BridgeError> {
        let mut file = tempfile::Builder::new()
            .prefix("sacristy-creds-")
            .tempfile()
            .map_err(|e| BridgeError::local(std::env::temp_dir(), e))?;
        let contents = format!(
            "username={}\npassword={}\ndomain={}\n",
            self.share.username, self.share.password, self.share.domain
        );
        file.write_all(contents.as_bytes())
            .map_err(|e| BridgeError::local(file.path().to_path_buf(), e))?;
        Ok(file)
    }

    async fn unmount(&self) -> Result<(), CommandError> {
        let target = self.config.mount_point.display().to_string();
        let first = match self
            .runner
            .run("umount", &[target.clone()], self.config.command_timeout)
            .await
        {
            Ok(_) => return Ok(()),
            Err(CommandError::Failed { ref stderr, .. }) if command::is_not_mounted(stderr) => {
                return Ok(())
            }
            Err(e) => e,
        };

        tracing::warn!(mount_point = %target, error = %first, "umount failed, attempting lazy unmount");
        match self
            .runner
            .run(
                "umount",
                &["-l".to_string(), target],
                self.config.command_timeout,
            )
            .await
        {
            Ok(_) => Ok(()),
            Err(CommandError::Failed { ref stderr, .. }) if command::is_not_mounted(stderr) => {
                Ok(())
            }
            // Report the original failure; the lazy fallback is best-effort.
            Err(_) => Err(first),
        }
    }

    fn set_state(&self, next: MountState) {
        *self.state.lock() = next;
    }
}
