//! Error taxonomy for bridge operations.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::command::CommandError;

/// Wire-level failure class reported to callers.
///
/// This is what the endpoint layer maps to an HTTP status; the detailed
/// variants of [`BridgeError`] collapse into one of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorKind {
    #[serde(rename = "ValidationError")]
    Validation,
    #[serde(rename = "MountError")]
    Mount,
    #[serde(rename = "CommandError")]
    Command,
    #[serde(rename = "NotFoundError")]
    NotFound,
    #[serde(rename = "TimeoutError")]
    Timeout,
    #[serde(rename = "QueueFullError")]
    QueueFull,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Validation => "ValidationError",
            ErrorKind::Mount => "MountError",
            ErrorKind::Command => "CommandError",
            ErrorKind::NotFound => "NotFoundError",
            ErrorKind::Timeout => "TimeoutError",
            ErrorKind::QueueFull => "QueueFullError",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Failure of one bridge operation.
#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    #[error("invalid remote path {path:?}: {reason}")]
    Validation { path: String, reason: &'static str },

    #[error("failed to mount //{host}/{share} after {attempts} attempts: {source}")]
    Mount {
        host: String,
        share: String,
        attempts: u32,
        #[source]
        source: CommandError,
    },

    #[error("remote file not found: {0}")]
    NotFound(String),

    #[error("operation timed out after {0} ms")]
    Timeout(u64),

    #[error(transparent)]
    Command(#[from] CommandError),

    #[error("local file error at {}: {source}", .path.display())]
    Local {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("transfer queue is full")]
    QueueFull,
}

impl BridgeError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            BridgeError::Validation { .. } => ErrorKind::Validation,
            BridgeError::Mount { .. } => ErrorKind::Mount,
            BridgeError::NotFound(_) => ErrorKind::NotFound,
            BridgeError::Timeout(_) => ErrorKind::Timeout,
            // Local scratch failures are the local half of the same file
            // operation; they share the command class on the wire.
            BridgeError::Command(_) | BridgeError::Local { .. } => ErrorKind::Command,
            BridgeError::QueueFull => ErrorKind::QueueFull,
        }
    }

    /// Captured stderr for diagnostics. Goes to the logs, never into an API
    /// response.
    pub fn stderr(&self) -> Option<&str> {
        match self {
            BridgeError::Command(e) => e.stderr(),
            BridgeError::Mount { source, .. } => source.stderr(),
            _ => None,
        }
    }

    /// Message safe to put in the failure envelope returned to callers.
    pub fn public_message(&self) -> String {
        match self {
            BridgeError::Command(e) => e.summary(),
            BridgeError::Mount {
                host,
                share,
                attempts,
                ..
            } => format!("failed to mount //{}/{} after {} attempts", host, share, attempts),
            other => other.to_string(),
        }
    }

    pub fn local(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        BridgeError::Local {
            path: path.into(),
            source,
        }
    }
}
