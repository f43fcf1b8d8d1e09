//! Core of the Sacristy NAS document bridge.
//!
//! The bridge moves parish documents between local scratch storage and an
//! SMB share on a Synology NAS by mounting the share, performing one file
//! operation, and unmounting it again. The mount point is a single shared
//! external resource, so everything here revolves around serializing access
//! to it and guaranteeing cleanup on every exit path.

pub mod bridge;
pub mod command;
pub mod config;
pub mod error;
pub mod mount;
pub mod path;

pub use bridge::{DeleteOutcome, DocumentBridge, DownloadOutcome, UploadOutcome};
pub use command::{CommandError, CommandOutput, CommandRunner, ShellRunner};
pub use config::{BridgeConfig, ShareConfig};
pub use error::{BridgeError, ErrorKind};
pub use mount::{MountCoordinator, MountState, Mounted};
