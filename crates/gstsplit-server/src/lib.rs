//! gstsplit HTTP service
//!
//! Routes:
//! - `GET /` - upload form
//! - `GET /health` - health check
//! - `POST /upload` - split an uploaded `.pdf` or `.zip` bundle
//! - `GET /download/:filename` - fetch a split invoice

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;
use tracing::info;

use gstsplit_core::GstsplitConfig;

pub mod error;
pub mod handlers;
pub mod state;

pub use error::ApiError;
pub use state::AppState;

/// Build the router. Shared by [`serve`] and the tests.
pub fn app(state: Arc<AppState>) -> Router {
    let body_limit = state.config.server.max_upload_bytes;

    Router::new()
        .route("/", get(handlers::index))
        .route("/health", get(handlers::health))
        .route("/upload", post(handlers::upload))
        .route("/download/:filename", get(handlers::download))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind and run until the process is stopped.
pub async fn serve(config: GstsplitConfig) -> anyhow::Result<()> {
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    let state = Arc::new(AppState::new(config)?);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Starting gstsplit on http://{}", addr);

    axum::serve(listener, app(state)).await?;
    Ok(())
}
