//! HTTP surface for the bridge.
//!
//! Routes:
//! - `/api/v0/documents/*` - upload, download, delete
//! - `/_status/*` - liveness and version probes

pub mod api;
pub mod health;

use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::ServiceState;

pub fn router(state: ServiceState) -> Router {
    Router::new()
        .nest("/api/v0/documents", api::v0::documents::router(state))
        .nest("/_status", health::router())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
