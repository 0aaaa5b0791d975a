pub mod handler;
pub mod room_manager;

pub use handler::ws_handler;
pub use room_manager::RoomManager;

use crate::services::{FeedEvent, MarketFeed};
use crate::types::{PairUpdateData, ServerMessage};
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Push every published snapshot to the rooms of its pairs.
pub fn spawn_fanout(feed: Arc<MarketFeed>, rooms: Arc<RoomManager>) -> JoinHandle<()> {
    let mut rx = feed.subscribe();

    tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(event) => fan_out(&rooms, &event),
                Err(RecvError::Lagged(skipped)) => {
                    warn!("WebSocket fan-out lagged, skipped {} events", skipped);
                }
                Err(RecvError::Closed) => {
                    debug!("Market feed closed, stopping fan-out");
                    break;
                }
            }
        }
    })
}

/// Deliver one feed event to the interested clients.
pub fn fan_out(rooms: &RoomManager, event: &FeedEvent) {
    match event {
        FeedEvent::Tick(snapshot) => {
            for pair in &snapshot.pairs {
                if !rooms.has_subscribers(&pair.symbol) {
                    continue;
                }
                let msg = ServerMessage::PairUpdate {
                    data: PairUpdateData::from_pair(pair, snapshot.tick),
                };
                if let Ok(json) = serde_json::to_string(&msg) {
                    rooms.broadcast(&pair.symbol, &json);
                }
            }
        }
        FeedEvent::Status { running, tick } => {
            let msg = ServerMessage::MarketStatus {
                running: *running,
                tick: *tick,
            };
            if let Ok(json) = serde_json::to_string(&msg) {
                rooms.broadcast_all(&json);
            }
        }
    }
}
