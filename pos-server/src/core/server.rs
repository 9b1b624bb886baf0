//! Server Implementation
//!
//! HTTP 服务器启动和优雅关闭

use std::future::IntoFuture;
use std::net::SocketAddr;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::api;
use crate::core::{Config, Result, ServerState};

/// HTTP Server
pub struct Server {
    config: Config,
    state: Option<ServerState>,
}

impl Server {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            state: None,
        }
    }

    /// Create server with existing state
    pub fn with_state(config: Config, state: ServerState) -> Self {
        Self {
            config,
            state: Some(state),
        }
    }

    /// Serve until Ctrl-C or until the bus shutdown token is cancelled
    ///
    /// Cancelling the token also ends every open event stream; connections
    /// still busy after `shutdown_timeout_ms` are dropped.
    pub async fn run(&self) -> Result<()> {
        let state = match &self.state {
            Some(s) => s.clone(),
            None => ServerState::initialize(&self.config).await?,
        };
        let token = state.bus.shutdown_token().clone();

        let app = api::build_app(&self.config).with_state(state);
        let addr = SocketAddr::from(([0, 0, 0, 0], self.config.http_port));
        let listener = tokio::net::TcpListener::bind(addr).await?;
        tracing::info!(%addr, environment = %self.config.environment, "POS server listening");

        let serve = axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal(token.clone()))
            .into_future();
        let grace = Duration::from_millis(self.config.shutdown_timeout_ms);

        tokio::select! {
            result = serve => result?,
            _ = async {
                token.cancelled().await;
                tokio::time::sleep(grace).await;
            } => {
                tracing::warn!(grace_ms = self.config.shutdown_timeout_ms, "Graceful shutdown timed out");
            }
        }

        tracing::info!("Server stopped");
        Ok(())
    }
}

async fn shutdown_signal(token: CancellationToken) {
    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutting down...");
            token.cancel();
        }
        _ = token.cancelled() => {}
    }
}
