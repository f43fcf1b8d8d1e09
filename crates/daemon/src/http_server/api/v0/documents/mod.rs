//! Document transfer endpoints.
//!
//! Each request mounts the share, performs exactly one transfer, and
//! unmounts; concurrent requests queue at the bridge's mount gate in arrival
//! order.

use axum::extract::DefaultBodyLimit;
use axum::routing::post;
use axum::Router;

use crate::ServiceState;

mod delete;
mod download;
mod upload;

// Re-export request/response types for use by the CLI and other clients
pub use delete::{DeleteRequest, DeleteResponse};
pub use download::DownloadRequest;
pub use upload::{UploadRequest, UploadResponse};

/// Scanned registers run large; anything bigger than this is refused before
/// it is spooled.
const MAX_UPLOAD_BYTES: usize = 512 * 1024 * 1024;

pub fn router(state: ServiceState) -> Router {
    Router::new()
        .route("/upload", post(upload::handler))
        .route("/download", post(download::handler))
        .route("/delete", post(delete::handler))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .with_state(state)
}
