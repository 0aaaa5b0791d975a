use crate::AppState;
use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
    simulation_running: bool,
    tick: u64,
    tick_interval_ms: u64,
    advisory_provider: bool,
    notifications: bool,
    ws_clients: usize,
    /// Pairs with at least one WebSocket subscriber.
    ws_rooms: usize,
}

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        simulation_running: state.market.is_running(),
        tick: state.market.snapshot().tick,
        tick_interval_ms: state.config.simulator.tick_interval_ms,
        advisory_provider: state.advisory.has_provider(),
        notifications: state.notifier.is_some(),
        ws_clients: state.room_manager.client_count(),
        ws_rooms: state.room_manager.room_count(),
    })
}

pub fn router() -> Router<AppState> {
    Router::new().route("/api/health", get(health))
}
