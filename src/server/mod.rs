//! Measurement endpoint
//!
//! A stateless axum service answering latency, download, upload,
//! network-info and health requests. Handlers share nothing but the
//! read-only [`AppState`].

pub mod error;
pub mod handlers;
pub mod state;

pub use error::ApiError;
pub use state::AppState;

use crate::{
    error::{AppError, Result},
    models::config::ServerConfig,
};
use axum::{
    extract::DefaultBodyLimit,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use std::{any::Any, future::Future, net::SocketAddr};
use tokio::net::TcpListener;
use tower_http::{catch_panic::CatchPanicLayer, cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info};

pub struct RouterBuilder {
    unfinished_router: Router<AppState>,
    body_limit: usize,
}

impl RouterBuilder {
    pub fn with_default_routes(config: &ServerConfig) -> Self {
        let router = Router::new()
            .route("/api/ping", get(handlers::ping))
            .route("/api/download", get(handlers::download_default))
            .route("/api/download/:size_kb", get(handlers::download))
            .route("/api/upload", post(handlers::upload))
            .route("/api/network-info", get(handlers::network_info))
            .route("/api/health", get(handlers::health))
            .fallback(handlers::not_found);

        Self {
            unfinished_router: router,
            body_limit: config.body_limit_bytes,
        }
    }

    pub fn with_state(self, state: AppState) -> Router {
        self.unfinished_router
            .layer(CatchPanicLayer::custom(panic_response))
            .layer(DefaultBodyLimit::max(self.body_limit))
            .layer(CorsLayer::permissive())
            .layer(TraceLayer::new_for_http())
            .with_state(state)
    }
}

/// A panicking handler answers 500 and the server keeps running
fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = panic.downcast_ref::<String>() {
        s.as_str()
    } else if let Some(s) = panic.downcast_ref::<&str>() {
        s
    } else {
        "unknown panic payload"
    };
    error!("Handler panicked: {}", detail);
    ApiError::internal().into_response()
}

/// Build the complete router for `config`
pub fn build_router(config: ServerConfig) -> Router {
    let builder = RouterBuilder::with_default_routes(&config);
    builder.with_state(AppState::new(config))
}

pub struct HttpServer {
    router: Router,
    listener: TcpListener,
}

impl HttpServer {
    pub fn new(router: Router, listener: TcpListener) -> Self {
        Self { router, listener }
    }

    /// Bind the listener described by `config`
    pub async fn bind(config: ServerConfig) -> Result<Self> {
        let bind_address = config.socket_addr();
        let listener = TcpListener::bind(bind_address).await.map_err(|e| {
            AppError::io(format!("Failed to bind {}: {}", bind_address, e))
        })?;

        Ok(Self::new(build_router(config), listener))
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Serve until `shutdown` resolves, then drain in-flight requests
    pub async fn run<F>(self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        if let Ok(addr) = self.listener.local_addr() {
            info!("Speed test server running on {}", addr);
            info!("Available endpoints:");
            info!("  GET  /api/ping - Latency test");
            info!("  GET  /api/download/:sizeKB - Download speed test");
            info!("  POST /api/upload - Upload speed test");
            info!("  GET  /api/network-info - Network information");
            info!("  GET  /api/health - Health check");
        }

        // connect info exposes the peer address to the network-info handler
        axum::serve(
            self.listener,
            self.router
                .into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(shutdown)
        .await?;

        info!("Server stopped");
        Ok(())
    }
}

/// Resolves on Ctrl-C
pub async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
