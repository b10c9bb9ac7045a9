//! HTTP API
//!
//! A single read-only route serving the cached rates.

mod handlers;

pub use handlers::{AppState, ErrorBody, NOT_READY_MESSAGE};

use crate::cache::PriceCache;
use axum::routing::get;
use axum::Router;
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

/// Build the router over a shared cache
pub fn router(cache: Arc<PriceCache>) -> Router {
    Router::new()
        .route("/", get(handlers::get_rates))
        .with_state(AppState { cache })
        .layer(TraceLayer::new_for_http())
}

/// Serve the API on `listener` until `shutdown` resolves
pub async fn serve<F>(listener: TcpListener, cache: Arc<PriceCache>, shutdown: F) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    axum::serve(listener, router(cache))
        .with_graceful_shutdown(shutdown)
        .await?;
    Ok(())
}
