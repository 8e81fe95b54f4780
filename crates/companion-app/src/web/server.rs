use anyhow::{Context, Result};
use axum::Router;
use std::net::SocketAddr;
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};

use companion_relay::{ChatRelay, RelayConfig};

use crate::web::routes::{self, AppState};

/// Web server configuration
#[derive(Debug, Clone)]
pub struct WebServerConfig {
    pub bind_addr: SocketAddr,
    pub relay: RelayConfig,
    pub web_dir: Option<PathBuf>,
}

/// Web server instance
pub struct WebServer {
    config: WebServerConfig,
    state: AppState,
}

impl WebServer {
    /// Create a new web server
    pub fn new(config: WebServerConfig) -> Self {
        let relay = ChatRelay::from_config(config.relay.clone());
        Self {
            config,
            state: AppState::new(relay),
        }
    }

    /// Token fired when the server begins shutting down
    pub fn shutdown_token(&self) -> CancellationToken {
        self.state.shutdown.clone()
    }

    /// Full application: API routes, static client, CORS, request tracing
    pub fn router(&self) -> Router {
        let mut app = routes::create_router(self.state.clone());

        // Serve the browser client for everything that is not an API route
        if let Some(web_dir) = &self.config.web_dir {
            if web_dir.exists() {
                tracing::info!(dir = %web_dir.display(), "serving static files");
                let serve_dir = ServeDir::new(web_dir).append_index_html_on_directories(true);
                app = app.fallback_service(serve_dir);
            } else {
                tracing::warn!(dir = %web_dir.display(), "web directory not found, serving API only");
            }
        }

        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);

        app.layer(cors).layer(TraceLayer::new_for_http())
    }

    /// Start the web server and run until a shutdown signal arrives
    pub async fn start(self) -> Result<()> {
        let app = self.router();

        let listener = tokio::net::TcpListener::bind(&self.config.bind_addr)
            .await
            .with_context(|| format!("Failed to bind {}", self.config.bind_addr))?;

        println!("   Server running: http://{}", self.config.bind_addr);
        println!("   API endpoints: http://{}/api/chat, /api/health", self.config.bind_addr);

        let shutdown = self.shutdown_token();
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal(shutdown))
            .await
            .context("HTTP server error")?;

        Ok(())
    }
}

/// Resolve on Ctrl-C or SIGTERM, cancelling in-flight relay calls first
async fn shutdown_signal(shutdown: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
        _ = shutdown.cancelled() => {},
    }

    tracing::info!("shutting down, aborting in-flight requests");
    shutdown.cancel();
}
