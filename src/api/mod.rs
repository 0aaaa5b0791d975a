pub mod advisory;
pub mod health;
pub mod market;
pub mod notifications;

use crate::error::{AppError, Result};
use crate::types::{PairState, Timeframe};
use crate::AppState;
use axum::Router;
use serde::Serialize;

/// API response wrapper.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub data: T,
}

impl<T> ApiResponse<T> {
    pub fn new(data: T) -> Self {
        Self { data }
    }
}

/// Create the API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .nest("/api/market", market::router())
        .nest("/api/advisory", advisory::router())
        .nest("/api/notifications", notifications::router())
}

/// Current state of one pair from the latest snapshot.
pub(crate) fn find_pair(state: &AppState, symbol: &str) -> Result<PairState> {
    state
        .market
        .snapshot()
        .find(symbol)
        .cloned()
        .ok_or_else(|| AppError::NotFound(format!("Unknown pair: {}", symbol)))
}

/// Parse an optional timeframe query value, defaulting to 30s.
pub(crate) fn parse_timeframe(value: Option<&str>) -> Result<Timeframe> {
    match value {
        None => Ok(Timeframe::default()),
        Some(s) => Timeframe::from_str(s)
            .ok_or_else(|| AppError::BadRequest(format!("Unknown timeframe: {}", s))),
    }
}
