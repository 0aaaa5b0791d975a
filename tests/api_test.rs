//! Integration tests for API endpoints
//!
//! Requests run in-process against the full router with an offline advisory
//! service and a recording notification sink.

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use pocketsignal::config::{Config, SimulatorConfig};
use pocketsignal::error::Result;
use pocketsignal::services::{AdvisoryService, MarketFeed, MarketSimulator, NotificationSink};
use pocketsignal::sources::fallback_seeds;
use pocketsignal::types::SeedOrigin;
use pocketsignal::websocket::RoomManager;
use pocketsignal::AppState;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde_json::Value;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;
use tower::ServiceExt;

#[derive(Default)]
struct RecordingSink {
    sent: Mutex<Vec<(String, String)>>,
}

impl NotificationSink for RecordingSink {
    fn name(&self) -> &str {
        "recording"
    }

    fn send<'a>(
        &'a self,
        chat_id: &'a str,
        text: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>> {
        Box::pin(async move {
            self.sent
                .lock()
                .unwrap()
                .push((chat_id.to_string(), text.to_string()));
            Ok(())
        })
    }
}

fn state(notifier: Option<Arc<dyn NotificationSink>>) -> AppState {
    let simulator = MarketSimulator::new(
        &fallback_seeds(),
        SeedOrigin::Fallback,
        &SimulatorConfig::default(),
        0,
        StdRng::seed_from_u64(1),
    );

    AppState {
        config: Arc::new(Config::default()),
        market: MarketFeed::new(simulator.snapshot()),
        advisory: Arc::new(AdvisoryService::offline()),
        notifier,
        room_manager: RoomManager::new(),
    }
}

async fn call(state: &AppState, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => request
            .header("content-type", "application/json")
            .body(Body::from(json.to_string())),
        None => request.body(Body::empty()),
    }
    .unwrap();

    let response = pocketsignal::app(state.clone()).oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

async fn get(state: &AppState, uri: &str) -> (StatusCode, Value) {
    call(state, Method::GET, uri, None).await
}

#[tokio::test]
async fn test_health() {
    let state = state(None);
    let (status, body) = get(&state, "/api/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["simulationRunning"], true);
    assert_eq!(body["tick"], 0);
    assert_eq!(body["tickIntervalMs"], 500);
    assert_eq!(body["advisoryProvider"], false);
    assert_eq!(body["notifications"], false);
    assert_eq!(body["wsClients"], 0);
    assert_eq!(body["wsRooms"], 0);
}

#[tokio::test]
async fn test_health_counts_subscribed_rooms() {
    let state = state(None);
    let (tx_a, _rx_a) = mpsc::unbounded_channel();
    let (tx_b, _rx_b) = mpsc::unbounded_channel();
    let a = state.room_manager.register(tx_a);
    let b = state.room_manager.register(tx_b);
    state.room_manager.subscribe(a, &["EUR/USD OTC".to_string()]);
    state
        .room_manager
        .subscribe(b, &["eurusd".to_string(), "USD/JPY OTC".to_string()]);

    let (_, body) = get(&state, "/api/health").await;
    assert_eq!(body["wsClients"], 2);
    assert_eq!(body["wsRooms"], 2);
}

#[tokio::test]
async fn test_market_snapshot() {
    let state = state(None);
    let (status, body) = get(&state, "/api/market").await;

    assert_eq!(status, StatusCode::OK);
    let data = &body["data"];
    assert_eq!(data["running"], true);
    assert_eq!(data["origin"], "fallback");
    assert_eq!(data["pairs"].as_array().map(Vec::len), Some(8));

    let first = &data["pairs"][0];
    assert_eq!(first["symbol"], "EUR/USD OTC");
    assert_eq!(first["signal"], "neutral");
    assert_eq!(first["confidence"], 50);
    assert_eq!(first["history"].as_array().map(Vec::len), Some(40));
}

#[tokio::test]
async fn test_pair_lookup() {
    let state = state(None);

    let (status, body) = get(&state, "/api/market/pairs/usdjpy").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["symbol"], "USD/JPY OTC");
    assert_eq!(body["data"]["currentPrice"], 154.65);

    let (status, body) = get(&state, "/api/market/pairs/XAUUSD").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["status"], 404);
    assert!(body["error"].as_str().unwrap().contains("XAUUSD"));
}

#[tokio::test]
async fn test_pause_and_resume() {
    let state = state(None);

    let (status, body) = call(&state, Method::POST, "/api/market/pause", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["running"], false);
    assert_eq!(body["data"]["changed"], true);

    let (_, body) = call(&state, Method::POST, "/api/market/pause", None).await;
    assert_eq!(body["data"]["changed"], false);

    let (_, health) = get(&state, "/api/health").await;
    assert_eq!(health["simulationRunning"], false);

    let (_, body) = call(&state, Method::POST, "/api/market/resume", None).await;
    assert_eq!(body["data"]["running"], true);
    assert_eq!(body["data"]["changed"], true);
}

#[tokio::test]
async fn test_commentary_offline() {
    let state = state(None);
    let query = serde_urlencoded::to_string([("timeframe", "1M")]).unwrap();

    let (status, body) = get(&state, &format!("/api/advisory/EURUSD/commentary?{}", query)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["source"], "fallback");
    assert_eq!(body["data"]["timeframe"], "1M");
    assert!(body["data"]["text"].as_str().unwrap().starts_with("Relay mode"));

    let (status, _) = get(&state, "/api/advisory/EURUSD/commentary?timeframe=2M").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_timing_offline() {
    let state = state(None);
    let query = serde_urlencoded::to_string([("timeframe", "30s"), ("unit", "hours")]).unwrap();

    let (status, body) = get(&state, &format!("/api/advisory/gbp-usd/timing?{}", query)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["symbol"], "GBP/USD OTC");
    assert_eq!(body["data"]["timeEstimate"], "Immediate signal");
    assert_eq!(body["data"]["durationSeconds"], 0);

    let (status, _) = get(&state, "/api/advisory/gbp-usd/timing?unit=days").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_quick_prediction_horizons() {
    let state = state(None);

    for seconds in ["3", "5", "15"] {
        let query = serde_urlencoded::to_string([("seconds", seconds)]).unwrap();
        let (status, body) = get(&state, &format!("/api/advisory/EURJPY/quick?{}", query)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["source"], "fallback");
        let direction = body["data"]["direction"].as_str().unwrap().to_string();
        assert!(direction == "up" || direction == "down", "{}", direction);
    }

    let (status, body) = get(&state, "/api/advisory/EURJPY/quick?seconds=7").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], 400);
}

#[tokio::test]
async fn test_telegram_requires_configuration() {
    let state = state(None);
    let request = serde_json::json!({ "chatId": "42", "symbol": "EUR/USD OTC" });

    let (status, body) = call(&state, Method::POST, "/api/notifications/telegram", Some(request)).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["status"], 503);
}

#[tokio::test]
async fn test_telegram_sends_formatted_signal() {
    let sink = Arc::new(RecordingSink::default());
    let notifier: Arc<dyn NotificationSink> = sink.clone();
    let state = state(Some(notifier));
    let request = serde_json::json!({
        "chatId": " 42 ",
        "symbol": "eurusd",
        "timeframe": "5s",
        "includeAnalysis": true
    });

    let (status, body) = call(&state, Method::POST, "/api/notifications/telegram", Some(request)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["sent"], true);
    assert_eq!(body["data"]["chatId"], "42");

    let sent = sink.sent.lock().unwrap();
    assert_eq!(sent.len(), 1);
    let (chat_id, text) = &sent[0];
    assert_eq!(chat_id, "42");
    assert!(text.contains("EUR/USD OTC"));
    assert!(text.contains("5s"));
    // Relay-mode commentary is not attached.
    assert!(!text.contains("AI analysis"));
}

#[tokio::test]
async fn test_telegram_rejects_empty_chat() {
    let sink = Arc::new(RecordingSink::default());
    let notifier: Arc<dyn NotificationSink> = sink.clone();
    let state = state(Some(notifier));
    let request = serde_json::json!({ "chatId": "  ", "symbol": "EURUSD" });

    let (status, _) = call(&state, Method::POST, "/api/notifications/telegram", Some(request)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(sink.sent.lock().unwrap().is_empty());
}
