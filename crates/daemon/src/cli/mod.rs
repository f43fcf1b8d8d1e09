//! Command-line interface.
//!
//! `serve` runs the daemon; every other command is a thin client that talks
//! to a running daemon over its HTTP API.

pub mod op;
pub mod ops;

use clap::{Parser, Subcommand};

/// NAS document bridge for parish records.
#[derive(Parser, Debug)]
#[command(name = "sacristy", version, about)]
pub struct Cli {
    /// Daemon API address the client commands talk to
    #[arg(
        long,
        global = true,
        env = "BRIDGE_API_URL",
        default_value = "http://127.0.0.1:8477"
    )]
    pub api_url: url::Url,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the bridge daemon
    Serve(ops::serve::Serve),
    /// Upload a local file to the share
    Upload(ops::upload::Upload),
    /// Download a document from the share
    Download(ops::download::Download),
    /// Delete a document from the share
    Delete(ops::delete::Delete),
    /// Check that the daemon is alive
    Health(ops::health::Health),
    /// Print client and daemon versions
    Version(ops::version::Version),
}
