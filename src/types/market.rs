use super::SignalType;
use serde::{Serialize, Serializer};
use std::collections::VecDeque;

/// A single timestamped price sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PricePoint {
    /// Unix timestamp in milliseconds.
    pub timestamp: i64,
    pub value: f64,
}

/// Fixed-capacity sliding window of price samples, oldest first.
///
/// Once seeded the window always holds exactly `capacity` samples; each push
/// evicts the oldest sample.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceWindow {
    samples: VecDeque<PricePoint>,
    capacity: usize,
}

impl PriceWindow {
    /// Create an empty window.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Create a window filled with `capacity` identical samples ending at `now`.
    pub fn seeded(capacity: usize, price: f64, now: i64, spacing_ms: i64) -> Self {
        let mut window = Self::new(capacity);
        let capacity = window.capacity;
        for i in 0..capacity {
            let age = (capacity - 1 - i) as i64;
            window.samples.push_back(PricePoint {
                timestamp: now - age * spacing_ms,
                value: price,
            });
        }
        window
    }

    /// Append a sample, evicting the oldest when full.
    pub fn push(&mut self, point: PricePoint) {
        while self.samples.len() >= self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back(point);
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn oldest(&self) -> Option<&PricePoint> {
        self.samples.front()
    }

    pub fn newest(&self) -> Option<&PricePoint> {
        self.samples.back()
    }

    /// Sample `n` positions from the newest end, where `n = 1` is the newest.
    pub fn nth_from_newest(&self, n: usize) -> Option<&PricePoint> {
        let idx = self.samples.len().checked_sub(n)?;
        self.samples.get(idx)
    }

    pub fn iter(&self) -> impl Iterator<Item = &PricePoint> {
        self.samples.iter()
    }
}

impl Serialize for PriceWindow {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.samples.iter())
    }
}

/// Simulated state for one instrument.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PairState {
    /// Display symbol, e.g. `EUR/USD OTC`.
    pub symbol: String,
    pub current_price: f64,
    pub history: PriceWindow,
    /// Percentage change against the oldest sample in the window.
    pub change: f64,
    /// RSI-like oscillator in [10, 90].
    pub rsi: f64,
    /// Stochastic-like oscillator in [5, 95].
    pub stochastic: f64,
    /// Price delta over the trend lookback, absent until computable.
    pub trend: Option<f64>,
    pub signal: SignalType,
    /// Confidence score in [10, 99].
    pub confidence: u8,
    pub last_updated: i64,
}

impl PairState {
    /// Lookup key for this pair (see [`symbol_key`]).
    pub fn key(&self) -> String {
        symbol_key(&self.symbol)
    }

    /// Whether this is a yen-quoted pair.
    pub fn is_jpy(&self) -> bool {
        self.symbol.to_uppercase().contains("JPY")
    }

    /// Price formatted with the precision customary for the pair.
    pub fn formatted_price(&self) -> String {
        if self.is_jpy() {
            format!("{:.3}", self.current_price)
        } else {
            format!("{:.5}", self.current_price)
        }
    }
}

/// Base price for one instrument at startup.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PairSeed {
    pub symbol: String,
    pub base_price: f64,
}

impl PairSeed {
    pub fn new(symbol: impl Into<String>, base_price: f64) -> Self {
        Self {
            symbol: symbol.into(),
            base_price,
        }
    }
}

/// Where the startup base prices came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SeedOrigin {
    /// Derived from a live exchange-rate snapshot.
    Live,
    /// Built-in static table.
    Fallback,
}

/// Immutable view of every tracked instrument after one tick.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketSnapshot {
    /// Number of ticks applied since seeding.
    pub tick: u64,
    pub origin: SeedOrigin,
    pub timestamp: i64,
    pub pairs: Vec<PairState>,
}

impl MarketSnapshot {
    /// Find a pair by any spelling of its symbol.
    pub fn find(&self, query: &str) -> Option<&PairState> {
        let key = symbol_key(query);
        if key.is_empty() {
            return None;
        }
        self.pairs.iter().find(|p| p.key() == key)
    }
}

/// Normalise a symbol for lookup: `EUR/USD OTC`, `eur-usd` and `EURUSD`
/// all map to `EURUSD`.
pub fn symbol_key(symbol: &str) -> String {
    let compact: String = symbol
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_uppercase())
        .collect();

    match compact.strip_suffix("OTC") {
        Some(stripped) if !stripped.is_empty() => stripped.to_string(),
        _ => compact,
    }
}
