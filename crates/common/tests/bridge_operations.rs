//! End-to-end bridge behavior against a scripted command runner.
//!
//! The runner executes mkdir/cp/rm for real against a temp directory standing
//! in for the mounted share, while mount/umount are simulated so scenarios
//! can inject failures. Files written under the fake mount point persist
//! across sessions, which is exactly how a real share behaves.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tempfile::TempDir;

use common::{
    BridgeConfig, CommandError, CommandOutput, CommandRunner, DocumentBridge, ErrorKind,
    MountState, ShareConfig,
};

#[derive(Debug, Default)]
struct FakeRunner {
    /// Mount attempts that should fail before one succeeds.
    mount_failures: AtomicUsize,
    /// When set, every umount invocation fails.
    fail_unmount: AtomicBool,
    /// Extra per-command delay, for wedging the gate open in tests.
    command_delay_ms: AtomicUsize,
    mount_calls: AtomicUsize,
    unmount_calls: AtomicUsize,
}

impl FakeRunner {
    fn failing_mounts(n: usize) -> Arc<Self> {
        let runner = Self::default();
        runner.mount_failures.store(n, Ordering::SeqCst);
        Arc::new(runner)
    }

    fn dispatch(&self, command: &str, args: &[String]) -> Result<CommandOutput, CommandError> {
        match command {
            "mount" => {
                self.mount_calls.fetch_add(1, Ordering::SeqCst);
                let remaining = self.mount_failures.load(Ordering::SeqCst);
                if remaining > 0 {
                    self.mount_failures.store(remaining - 1, Ordering::SeqCst);
                    return Err(CommandError::Failed {
                        command: "mount".to_string(),
                        exit_code: 32,
                        stderr: "mount error(13): Permission denied".to_string(),
                    });
                }
                Ok(CommandOutput::empty())
            }
            "umount" => {
                self.unmount_calls.fetch_add(1, Ordering::SeqCst);
                if self.fail_unmount.load(Ordering::SeqCst) {
                    return Err(CommandError::Failed {
                        command: "umount".to_string(),
                        exit_code: 32,
                        stderr: "umount: /mnt/sacristy: target is busy.".to_string(),
                    });
                }
                Ok(CommandOutput::empty())
            }
            "mkdir" => {
                // args are ["-p", dir]
                std::fs::create_dir_all(&args[1]).map_err(|e| CommandError::Failed {
                    command: "mkdir".to_string(),
                    exit_code: 1,
                    stderr: format!("mkdir: cannot create directory '{}': {}", args[1], e),
                })?;
                Ok(CommandOutput::empty())
            }
            "cp" => match std::fs::copy(&args[0], &args[1]) {
                Ok(_) => Ok(CommandOutput::empty()),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    Err(CommandError::Failed {
                        command: "cp".to_string(),
                        exit_code: 1,
                        stderr: format!(
                            "cp: cannot stat '{}': No such file or directory",
                            args[0]
                        ),
                    })
                }
                Err(e) => Err(CommandError::Failed {
                    command: "cp".to_string(),
                    exit_code: 1,
                    stderr: e.to_string(),
                }),
            },
            "rm" => match std::fs::remove_file(&args[0]) {
                Ok(()) => Ok(CommandOutput::empty()),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    Err(CommandError::Failed {
                        command: "rm".to_string(),
                        exit_code: 1,
                        stderr: format!(
                            "rm: cannot remove '{}': No such file or directory",
                            args[0]
                        ),
                    })
                }
                Err(e) => Err(CommandError::Failed {
                    command: "rm".to_string(),
                    exit_code: 1,
                    stderr: e.to_string(),
                }),
            },
            other => Err(CommandError::Spawn {
                command: other.to_string(),
                message: "unexpected command".to_string(),
            }),
        }
    }
}

#[async_trait]
impl CommandRunner for FakeRunner {
    async fn run(
        &self,
        command: &str,
        args: &[String],
        _timeout: Duration,
    ) -> Result<CommandOutput, CommandError> {
        let delay = self.command_delay_ms.load(Ordering::SeqCst);
        if delay > 0 && command == "cp" {
            tokio::time::sleep(Duration::from_millis(delay as u64)).await;
        }
        self.dispatch(command, args)
    }
}

fn bridge_with(
    runner: Arc<FakeRunner>,
    tweak: impl FnOnce(&mut BridgeConfig),
) -> (DocumentBridge, TempDir) {
    let temp = TempDir::new().unwrap();
    let share = ShareConfig {
        host: "nas.test".to_string(),
        share_name: "documents".to_string(),
        username: "svc-bridge".to_string(),
        password: "secret".to_string(),
        domain: "PARISH".to_string(),
        base_path: "records".to_string(),
    };
    let mut config = BridgeConfig {
        mount_point: temp.path().join("mnt"),
        scratch_dir: temp.path().join("scratch"),
        mount_retries: 3,
        mount_retry_delay: Duration::from_millis(5),
        session_timeout: Duration::from_secs(5),
        command_timeout: Duration::from_secs(2),
        max_queued: 32,
    };
    tweak(&mut config);
    std::fs::create_dir_all(&config.mount_point).unwrap();
    std::fs::create_dir_all(&config.scratch_dir).unwrap();
    (DocumentBridge::with_runner(share, config, runner), temp)
}

fn test_bridge(runner: Arc<FakeRunner>) -> (DocumentBridge, TempDir) {
    bridge_with(runner, |_| {})
}

async fn write_scratch(bridge: &DocumentBridge, name: &str, content: &[u8]) -> PathBuf {
    let path = bridge.allocate_scratch(name).await.unwrap();
    tokio::fs::write(&path, content).await.unwrap();
    path
}

#[tokio::test]
async fn test_upload_download_round_trip() {
    let runner = Arc::new(FakeRunner::default());
    let (bridge, temp) = test_bridge(runner);

    let content = b"council minutes, January 2026";
    let scratch = write_scratch(&bridge, "2026-01.pdf", content).await;

    let outcome = bridge
        .upload(&scratch, "dept/minutes/2026-01.pdf")
        .await
        .unwrap();
    assert_eq!(outcome.remote_path, "dept/minutes/2026-01.pdf");
    assert_eq!(outcome.size, content.len() as u64);
    assert!(outcome.warning.is_none());

    // Scratch file must be gone after the upload.
    assert!(!scratch.exists());

    // The fake share really holds the file, under base_path.
    assert!(temp
        .path()
        .join("mnt/records/dept/minutes/2026-01.pdf")
        .exists());

    let dest = temp.path().join("out/2026-01.pdf");
    let downloaded = bridge
        .download("dept/minutes/2026-01.pdf", &dest)
        .await
        .unwrap();
    assert_eq!(downloaded.size, content.len() as u64);
    assert_eq!(tokio::fs::read(&dest).await.unwrap(), content);
}

#[tokio::test]
async fn test_upload_retries_then_succeeds() {
    let runner = FakeRunner::failing_mounts(2);
    let (bridge, _temp) = test_bridge(runner.clone());

    let scratch = write_scratch(&bridge, "a.pdf", b"agenda").await;
    let outcome = bridge.upload(&scratch, "dept/minutes/a.pdf").await.unwrap();

    assert_eq!(outcome.size, 6);
    // Two failures plus the attempt that landed.
    assert_eq!(runner.mount_calls.load(Ordering::SeqCst), 3);
    assert!(!scratch.exists());
}

#[tokio::test]
async fn test_upload_mount_exhaustion_still_cleans_scratch() {
    let runner = FakeRunner::failing_mounts(10);
    let (bridge, _temp) = test_bridge(runner.clone());

    let scratch = write_scratch(&bridge, "a.pdf", b"agenda").await;
    let err = bridge.upload(&scratch, "dept/a.pdf").await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Mount);
    assert_eq!(runner.mount_calls.load(Ordering::SeqCst), 3);
    // Cleanup is unconditional once the file was handed over.
    assert!(!scratch.exists());
}

#[tokio::test]
async fn test_download_missing_is_not_found() {
    let runner = Arc::new(FakeRunner::default());
    let (bridge, temp) = test_bridge(runner);

    let dest = temp.path().join("out/missing.pdf");
    let err = bridge.download("dept/missing.pdf", &dest).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert!(!dest.exists());
}

#[tokio::test]
async fn test_delete_is_idempotent() {
    let runner = Arc::new(FakeRunner::default());
    let (bridge, _temp) = test_bridge(runner);

    let scratch = write_scratch(&bridge, "a.pdf", b"x").await;
    bridge.upload(&scratch, "dept/a.pdf").await.unwrap();

    let first = bridge.delete("dept/a.pdf").await.unwrap();
    assert!(first.removed);

    // Deleting again is success, not CommandError.
    let second = bridge.delete("dept/a.pdf").await.unwrap();
    assert!(!second.removed);
}

#[tokio::test]
async fn test_delete_drops_scratch_copy() {
    let runner = Arc::new(FakeRunner::default());
    let (bridge, _temp) = test_bridge(runner);

    let scratch = write_scratch(&bridge, "a.pdf", b"x").await;
    bridge.upload(&scratch, "dept/a.pdf").await.unwrap();

    // A cached copy keyed by the remote path.
    let cached = bridge.scratch_dir().join("dept/a.pdf");
    std::fs::create_dir_all(cached.parent().unwrap()).unwrap();
    std::fs::write(&cached, b"x").unwrap();

    bridge.delete("dept/a.pdf").await.unwrap();
    assert!(!cached.exists());
}

#[tokio::test]
async fn test_traversal_rejected_before_any_mount() {
    let runner = Arc::new(FakeRunner::default());
    let (bridge, _temp) = test_bridge(runner.clone());

    let scratch = write_scratch(&bridge, "a.pdf", b"x").await;
    let err = bridge.upload(&scratch, "../../etc/passwd").await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Validation);
    assert_eq!(runner.mount_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_unmount_failure_surfaces_warning_without_poisoning() {
    let runner = Arc::new(FakeRunner::default());
    let (bridge, temp) = test_bridge(runner.clone());

    runner.fail_unmount.store(true, Ordering::SeqCst);
    let scratch = write_scratch(&bridge, "a.pdf", b"x").await;
    let outcome = bridge.upload(&scratch, "dept/a.pdf").await.unwrap();

    // The operation succeeded but the unclean release travels with it.
    let warning = outcome.warning.expect("unmount warning expected");
    assert!(warning.contains("unclean unmount"));
    // Plain umount plus the lazy fallback.
    assert_eq!(runner.unmount_calls.load(Ordering::SeqCst), 2);
    assert_eq!(bridge.coordinator().state(), MountState::Unmounted);

    // The next operation acquires the mount normally.
    runner.fail_unmount.store(false, Ordering::SeqCst);
    let dest = temp.path().join("out/a.pdf");
    bridge.download("dept/a.pdf", &dest).await.unwrap();
}

#[tokio::test]
async fn test_session_timeout_resets_coordinator() {
    let runner = Arc::new(FakeRunner::default());
    let (bridge, _temp) = bridge_with(runner.clone(), |config| {
        config.session_timeout = Duration::from_millis(100);
    });

    runner.command_delay_ms.store(500, Ordering::SeqCst);
    let scratch = write_scratch(&bridge, "slow.pdf", b"x").await;
    let err = bridge.upload(&scratch, "slow.pdf").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Timeout);
    assert_eq!(bridge.coordinator().state(), MountState::Unmounted);

    // A timed-out session does not poison the next one.
    runner.command_delay_ms.store(0, Ordering::SeqCst);
    let scratch = write_scratch(&bridge, "fast.pdf", b"y").await;
    bridge.upload(&scratch, "fast.pdf").await.unwrap();
}

#[tokio::test]
async fn test_queue_bound_rejects_excess_callers() {
    let runner = Arc::new(FakeRunner::default());
    let (bridge, _temp) = bridge_with(runner.clone(), |config| {
        config.max_queued = 1;
    });
    let bridge = Arc::new(bridge);

    runner.command_delay_ms.store(200, Ordering::SeqCst);
    let scratch = write_scratch(&bridge, "slow.pdf", b"x").await;

    let first = {
        let bridge = bridge.clone();
        tokio::spawn(async move { bridge.upload(&scratch, "slow.pdf").await })
    };
    tokio::time::sleep(Duration::from_millis(50)).await;

    // The single admission slot is held by the in-flight upload.
    let err = bridge
        .delete("anything.pdf")
        .await
        .expect_err("second caller should be rejected");
    assert_eq!(err.kind(), ErrorKind::QueueFull);

    first.await.unwrap().unwrap();
}
