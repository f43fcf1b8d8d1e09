//! Service health probes.

mod liveness;
mod version;

pub use liveness::{LivezRequest, LivezResponse};
pub use version::{VersionRequest, VersionResponse};

use axum::routing::get;
use axum::Router;

pub fn router() -> Router {
    Router::new()
        .route("/livez", get(liveness::handler))
        .route("/version", get(version::handler))
}
