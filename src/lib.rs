//! PocketSignal - OTC forex signal simulator with AI advisory

pub mod api;
pub mod config;
pub mod error;
pub mod services;
pub mod sources;
pub mod types;
pub mod websocket;

use axum::{routing::get, Router};
use config::Config;
use services::{AdvisoryService, MarketFeed, NotificationSink};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use websocket::RoomManager;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub market: Arc<MarketFeed>,
    pub advisory: Arc<AdvisoryService>,
    pub notifier: Option<Arc<dyn NotificationSink>>,
    pub room_manager: Arc<RoomManager>,
}

/// Build the HTTP and WebSocket router.
pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .merge(api::router())
        .route("/ws", get(websocket::ws_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
