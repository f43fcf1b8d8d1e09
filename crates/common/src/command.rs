//! External command execution.
//!
//! Mounting and remote file movement shell out to the platform's own
//! utilities (`mount`, `umount`, `cp`, `rm`, `mkdir`). The [`CommandRunner`]
//! trait is the seam that keeps the mount mechanism swappable per platform
//! and lets tests script failures without touching a real share.

use std::process::Stdio;
use std::sync::OnceLock;
use std::time::Duration;

use async_trait::async_trait;
use regex::Regex;
use tokio::process::Command;

/// Captured result of one external command that exited zero.
#[derive(Debug, Clone)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
}

impl CommandOutput {
    /// Output of a command that produced nothing. Handy for scripted runners.
    pub fn empty() -> Self {
        Self {
            stdout: String::new(),
            stderr: String::new(),
            exit_code: 0,
        }
    }
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum CommandError {
    #[error("failed to spawn {command}: {message}")]
    Spawn { command: String, message: String },

    #[error("{command} exited with status {exit_code}: {stderr}")]
    Failed {
        command: String,
        exit_code: i32,
        stderr: String,
    },

    #[error("{command} timed out after {timeout_ms} ms")]
    TimedOut { command: String, timeout_ms: u64 },
}

impl CommandError {
    /// Captured stderr of a failed command, if the failure produced any.
    pub fn stderr(&self) -> Option<&str> {
        match self {
            CommandError::Failed { stderr, .. } => Some(stderr.as_str()),
            _ => None,
        }
    }

    /// Operator-safe one-line summary, without the captured stderr.
    pub fn summary(&self) -> String {
        match self {
            CommandError::Spawn { command, .. } => format!("failed to spawn {}", command),
            CommandError::Failed {
                command, exit_code, ..
            } => format!("{} exited with status {}", command, exit_code),
            CommandError::TimedOut {
                command,
                timeout_ms,
            } => format!("{} timed out after {} ms", command, timeout_ms),
        }
    }
}

/// Executes external commands on behalf of the bridge.
///
/// No retries at this layer; retry policy belongs to callers that know
/// whether their operation is idempotent.
#[async_trait]
pub trait CommandRunner: Send + Sync + std::fmt::Debug {
    /// Run `command` with `args`, killing the child if it outlives `timeout`.
    async fn run(
        &self,
        command: &str,
        args: &[String],
        timeout: Duration,
    ) -> Result<CommandOutput, CommandError>;
}

/// Real runner: spawns exactly one child process per call.
#[derive(Debug, Clone, Copy, Default)]
pub struct ShellRunner;

#[async_trait]
impl CommandRunner for ShellRunner {
    async fn run(
        &self,
        command: &str,
        args: &[String],
        timeout: Duration,
    ) -> Result<CommandOutput, CommandError> {
        let child = Command::new(command)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            // Dropping the wait future on timeout must not orphan the child.
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| CommandError::Spawn {
                command: command.to_string(),
                message: e.to_string(),
            })?;

        let output = match tokio::time::timeout(timeout, child.wait_with_output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => {
                return Err(CommandError::Spawn {
                    command: command.to_string(),
                    message: e.to_string(),
                })
            }
            Err(_) => {
                return Err(CommandError::TimedOut {
                    command: command.to_string(),
                    timeout_ms: timeout.as_millis() as u64,
                })
            }
        };

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
        let exit_code = output.status.code().unwrap_or(-1);

        if output.status.success() {
            Ok(CommandOutput {
                stdout,
                stderr,
                exit_code,
            })
        } else {
            tracing::debug!(command, exit_code, stderr = %stderr, "command failed");
            Err(CommandError::Failed {
                command: command.to_string(),
                exit_code,
                stderr,
            })
        }
    }
}

// mount(8) folds distinct causes into exit code 32, so failures are told
// apart by their stderr text rather than by exit status.

static MISSING_FILE: OnceLock<Regex> = OnceLock::new();
static ALREADY_MOUNTED: OnceLock<Regex> = OnceLock::new();
static NOT_MOUNTED: OnceLock<Regex> = OnceLock::new();
static ALREADY_EXISTS: OnceLock<Regex> = OnceLock::new();

/// True when a command failure reports the target does not exist.
pub fn is_missing_file(stderr: &str) -> bool {
    MISSING_FILE
        .get_or_init(|| Regex::new(r"(?i)no such file or directory").unwrap())
        .is_match(stderr)
}

/// True when mount reports the share is already mounted at the target.
pub fn is_already_mounted(stderr: &str) -> bool {
    ALREADY_MOUNTED
        .get_or_init(|| Regex::new(r"(?i)already mounted|resource busy").unwrap())
        .is_match(stderr)
}

/// True when umount reports nothing is mounted at the target.
pub fn is_not_mounted(stderr: &str) -> bool {
    NOT_MOUNTED
        .get_or_init(|| Regex::new(r"(?i)not mounted|no mount point specified").unwrap())
        .is_match(stderr)
}

/// True when mkdir reports the directory is already there.
pub fn is_already_exists(stderr: &str) -> bool {
    ALREADY_EXISTS
        .get_or_init(|| Regex::new(r"(?i)file exists").unwrap())
        .is_match(stderr)
}
