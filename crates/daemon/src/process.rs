//! Service lifecycle: bring the HTTP server up and take it down cleanly.

use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use crate::http_server;
use crate::service_config::Config;
use crate::service_state::State;

/// Handle to a background service; dropping it leaves the service running.
pub struct ShutdownHandle {
    shutdown: oneshot::Sender<()>,
    handle: JoinHandle<()>,
}

impl ShutdownHandle {
    /// Ask the server to drain and wait for it to finish.
    pub async fn shutdown(self) {
        let _ = self.shutdown.send(());
        let _ = self.handle.await;
    }
}

/// Run the service in the foreground until ctrl-c.
pub async fn start_service(config: &Config) -> anyhow::Result<()> {
    let state = State::from_config(config).await?;
    let app = http_server::router(state);

    let listener = TcpListener::bind(config.api_listen_addr).await?;
    tracing::info!("API listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("shutdown signal received, draining");
        })
        .await?;
    Ok(())
}

/// Spawn the service in the background, returning a handle to stop it.
pub async fn spawn_service(config: &Config) -> anyhow::Result<ShutdownHandle> {
    let state = State::from_config(config).await?;
    let app = http_server::router(state);

    let listener = TcpListener::bind(config.api_listen_addr).await?;
    tracing::info!("API listening on {}", listener.local_addr()?);

    let (shutdown, rx) = oneshot::channel();
    let handle = tokio::spawn(async move {
        let serve = axum::serve(listener, app).with_graceful_shutdown(async {
            let _ = rx.await;
        });
        if let Err(e) = serve.await {
            tracing::error!("server error: {}", e);
        }
    });

    Ok(ShutdownHandle { shutdown, handle })
}
