//! HTTP request handlers.

use crate::cache::PriceCache;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Error message served until both rates are known
pub const NOT_READY_MESSAGE: &str = "Price data not ready";

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub cache: Arc<PriceCache>,
}

/// Error payload
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub err: String,
}

/// GET / - Current rates and cross rate.
pub async fn get_rates(State(state): State<AppState>) -> Response {
    match state.cache.snapshot().await {
        Some(snapshot) => (StatusCode::OK, Json(snapshot)).into_response(),
        None => {
            tracing::debug!("Rates requested before price data is ready");
            let body = ErrorBody {
                err: NOT_READY_MESSAGE.to_string(),
            };
            (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
        }
    }
}
