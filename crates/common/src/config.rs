//! Static configuration for the document bridge.
//!
//! Both structs are built once at process start and never mutated afterwards;
//! every component takes its own clone.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// Description of the network share the bridge moves documents to and from.
#[derive(Clone)]
pub struct ShareConfig {
    /// NAS hostname or address, e.g. `nas.parish.local`.
    pub host: String,
    /// Name of the SMB share on the NAS.
    pub share_name: String,
    /// Account the share is mounted as.
    pub username: String,
    pub password: String,
    /// SMB domain / workgroup of the account.
    pub domain: String,
    /// Directory on the share under which all remote paths live. May be
    /// empty, meaning the share root.
    pub base_path: String,
}

impl ShareConfig {
    /// UNC-style mount source, `//host/share`.
    pub fn unc(&self) -> String {
        format!("//{}/{}", self.host, self.share_name)
    }
}

// The password must never end up in logs, so Debug is written by hand.
impl fmt::Debug for ShareConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShareConfig")
            .field("host", &self.host)
            .field("share_name", &self.share_name)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("domain", &self.domain)
            .field("base_path", &self.base_path)
            .finish()
    }
}

/// Tuning knobs for mount and transfer behavior.
#[derive(Debug, Clone)]
pub struct BridgeConfig {
    /// Local directory the share is mounted under.
    pub mount_point: PathBuf,
    /// Local directory in-flight transfer scratch files live in.
    pub scratch_dir: PathBuf,
    /// Mount attempts before the operation is abandoned.
    pub mount_retries: u32,
    /// Fixed delay between mount attempts.
    pub mount_retry_delay: Duration,
    /// Ceiling on one whole mount/operate/unmount session.
    pub session_timeout: Duration,
    /// Ceiling on a single external command.
    pub command_timeout: Duration,
    /// Operations allowed to wait at the mount gate before new arrivals are
    /// rejected outright.
    pub max_queued: usize,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            mount_point: PathBuf::from("/mnt/sacristy"),
            scratch_dir: std::env::temp_dir().join("sacristy"),
            mount_retries: 3,
            mount_retry_delay: Duration::from_millis(500),
            session_timeout: Duration::from_secs(30),
            command_timeout: Duration::from_secs(20),
            max_queued: 32,
        }
    }
}

impl BridgeConfig {
    /// Default tuning with the two directories that always come from the
    /// deployment environment.
    pub fn with_dirs(mount_point: PathBuf, scratch_dir: PathBuf) -> Self {
        Self {
            mount_point,
            scratch_dir,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unc_source() {
        let share = ShareConfig {
            host: "nas.parish.local".to_string(),
            share_name: "documents".to_string(),
            username: "svc-bridge".to_string(),
            password: "hunter2".to_string(),
            domain: "PARISH".to_string(),
            base_path: "records".to_string(),
        };
        assert_eq!(share.unc(), "//nas.parish.local/documents");
    }

    #[test]
    fn test_debug_redacts_password() {
        let share = ShareConfig {
            host: "nas".to_string(),
            share_name: "docs".to_string(),
            username: "svc".to_string(),
            password: "topsecret".to_string(),
            domain: "WORKGROUP".to_string(),
            base_path: String::new(),
        };
        let debug = format!("{:?}", share);
        assert!(!debug.contains("topsecret"));
        assert!(debug.contains("<redacted>"));
    }
}
