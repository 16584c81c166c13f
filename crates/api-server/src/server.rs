//! HTTP listener.
//!
//! Binds a TCP port, serves the router, and shuts down gracefully when the
//! cancellation token fires.

use std::net::SocketAddr;

use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

use crate::state::AppState;

/// Errors produced by the HTTP listener.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Listener configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Interface to bind.
    pub host: String,
    /// TCP port to listen on (0 = OS-assigned).
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 8000,
        }
    }
}

/// A bound HTTP server, ready to run.
pub struct ApiServer {
    listener: TcpListener,
    local_addr: SocketAddr,
    state: AppState,
}

impl ApiServer {
    /// Bind the configured address. The stores in `state` must already be
    /// constructed; they live for as long as the server runs.
    pub async fn bind(config: &ServerConfig, state: AppState) -> Result<Self, ServerError> {
        let listener = TcpListener::bind((config.host.as_str(), config.port)).await?;
        let local_addr = listener.local_addr()?;
        Ok(Self {
            listener,
            local_addr,
            state,
        })
    }

    /// The address the server is listening on.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Serve requests until `cancel` fires, then drain in-flight requests.
    pub async fn run(self, cancel: CancellationToken) -> Result<(), ServerError> {
        tracing::info!(addr = %self.local_addr, "HTTP server listening");
        let app = crate::router(self.state);
        axum::serve(self.listener, app)
            .with_graceful_shutdown(async move {
                cancel.cancelled().await;
                tracing::info!("server shutting down");
            })
            .await?;
        Ok(())
    }
}
