//! Market API
//!
//! - GET  /api/market                - Full snapshot of every pair
//! - GET  /api/market/pairs/:symbol  - One pair
//! - POST /api/market/pause          - Stop ticking
//! - POST /api/market/resume         - Resume ticking

use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;

use super::{find_pair, ApiResponse};
use crate::error::Result;
use crate::types::{MarketSnapshot, PairState};
use crate::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketOverview {
    pub running: bool,
    #[serde(flatten)]
    pub snapshot: MarketSnapshot,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationControl {
    pub running: bool,
    /// False when the simulation was already in the requested state.
    pub changed: bool,
    pub tick: u64,
}

/// Create the market router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_market))
        .route("/pairs/:symbol", get(get_pair))
        .route("/pause", post(pause))
        .route("/resume", post(resume))
}

/// Full snapshot of every pair.
async fn get_market(State(state): State<AppState>) -> Json<ApiResponse<MarketOverview>> {
    let snapshot = state.market.snapshot();
    Json(ApiResponse::new(MarketOverview {
        running: state.market.is_running(),
        snapshot: (*snapshot).clone(),
    }))
}

/// One pair, looked up leniently by symbol.
async fn get_pair(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
) -> Result<Json<ApiResponse<PairState>>> {
    Ok(Json(ApiResponse::new(find_pair(&state, &symbol)?)))
}

async fn pause(State(state): State<AppState>) -> Json<ApiResponse<SimulationControl>> {
    let changed = state.market.pause();
    Json(ApiResponse::new(SimulationControl {
        running: state.market.is_running(),
        changed,
        tick: state.market.snapshot().tick,
    }))
}

async fn resume(State(state): State<AppState>) -> Json<ApiResponse<SimulationControl>> {
    let changed = state.market.resume();
    Json(ApiResponse::new(SimulationControl {
        running: state.market.is_running(),
        changed,
        tick: state.market.snapshot().tick,
    }))
}
