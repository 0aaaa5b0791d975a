use super::{PairState, SignalType};
use serde::{Deserialize, Serialize};

/// Incoming WebSocket message from client.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    Subscribe {
        pairs: Vec<String>,
    },
    Unsubscribe {
        pairs: Vec<String>,
    },
}

/// Outgoing WebSocket message to client.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    PairUpdate {
        data: PairUpdateData,
    },
    /// Simulation paused or resumed.
    MarketStatus {
        running: bool,
        tick: u64,
    },
    Subscribed {
        pairs: Vec<String>,
    },
    Unsubscribed {
        pairs: Vec<String>,
    },
    Error {
        error: String,
    },
}

/// Per-tick update for one pair. The full history is only served over HTTP.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PairUpdateData {
    pub symbol: String,
    pub price: f64,
    pub change: f64,
    pub rsi: f64,
    pub stochastic: f64,
    pub trend: Option<f64>,
    pub signal: SignalType,
    pub confidence: u8,
    pub tick: u64,
    pub timestamp: i64,
}

impl PairUpdateData {
    pub fn from_pair(pair: &PairState, tick: u64) -> Self {
        Self {
            symbol: pair.symbol.clone(),
            price: pair.current_price,
            change: pair.change,
            rsi: pair.rsi,
            stochastic: pair.stochastic,
            trend: pair.trend,
            signal: pair.signal,
            confidence: pair.confidence,
            tick,
            timestamp: pair.last_updated,
        }
    }
}
