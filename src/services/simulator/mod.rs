//! Market simulator.
//!
//! Owns the per-pair state and advances every pair once per tick:
//! generate price and oscillators, classify, score, then publish the whole
//! batch as one new [`MarketSnapshot`].

pub mod classifier;
pub mod feed;
pub mod generator;
pub mod scorer;

pub use classifier::{classify, IndicatorReading};
pub use feed::{Clock, FeedEvent, ManualClock, MarketFeed, SystemClock};
pub use generator::TREND_LOOKBACK;
pub use scorer::{base_score, confidence};

use crate::config::SimulatorConfig;
use crate::types::{MarketSnapshot, PairSeed, PairState, PriceWindow, SeedOrigin, SignalType};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Arc;

const INITIAL_OSCILLATOR: f64 = 50.0;

/// Build the initial state of one pair with a full window of identical samples.
pub fn seed_pair(seed: &PairSeed, config: &SimulatorConfig, now: i64) -> PairState {
    let capacity = config.history_capacity.max(TREND_LOOKBACK);
    PairState {
        symbol: seed.symbol.clone(),
        current_price: seed.base_price,
        history: PriceWindow::seeded(capacity, seed.base_price, now, config.seed_spacing_ms),
        change: 0.0,
        rsi: INITIAL_OSCILLATOR,
        stochastic: INITIAL_OSCILLATOR,
        trend: None,
        signal: SignalType::Neutral,
        confidence: scorer::NEUTRAL_CONFIDENCE,
        last_updated: now,
    }
}

/// Compute the next state of one pair. The input is left untouched.
pub fn step_pair<R: Rng + ?Sized>(pair: &PairState, now: i64, rng: &mut R) -> PairState {
    let generated = generator::generate(pair, now, rng);
    let reading = IndicatorReading::new(generated.rsi, generated.stochastic, generated.trend);
    let signal = classify(&reading);
    let confidence = confidence(signal, &reading, rng);

    PairState {
        symbol: pair.symbol.clone(),
        current_price: generated.price,
        history: generated.history,
        change: generated.change,
        rsi: generated.rsi,
        stochastic: generated.stochastic,
        trend: generated.trend,
        signal,
        confidence,
        last_updated: now,
    }
}

/// Single-writer simulator over every tracked pair.
pub struct MarketSimulator<R = StdRng> {
    rng: R,
    snapshot: Arc<MarketSnapshot>,
}

impl MarketSimulator<StdRng> {
    /// Simulator with an OS-seeded random source.
    pub fn from_entropy(
        seeds: &[PairSeed],
        origin: SeedOrigin,
        config: &SimulatorConfig,
        now: i64,
    ) -> Self {
        Self::new(seeds, origin, config, now, StdRng::from_entropy())
    }
}

impl<R: Rng> MarketSimulator<R> {
    /// Seed every pair and start at tick 0.
    pub fn new(
        seeds: &[PairSeed],
        origin: SeedOrigin,
        config: &SimulatorConfig,
        now: i64,
        rng: R,
    ) -> Self {
        let pairs = seeds.iter().map(|s| seed_pair(s, config, now)).collect();
        Self {
            rng,
            snapshot: Arc::new(MarketSnapshot {
                tick: 0,
                origin,
                timestamp: now,
                pairs,
            }),
        }
    }

    /// Current published snapshot.
    pub fn snapshot(&self) -> Arc<MarketSnapshot> {
        self.snapshot.clone()
    }

    /// Advance every pair by one tick and publish the new snapshot.
    pub fn tick(&mut self, now: i64) -> Arc<MarketSnapshot> {
        let current = self.snapshot.clone();
        let pairs = current
            .pairs
            .iter()
            .map(|pair| step_pair(pair, now, &mut self.rng))
            .collect();

        self.snapshot = Arc::new(MarketSnapshot {
            tick: current.tick + 1,
            origin: current.origin,
            timestamp: now,
            pairs,
        });
        self.snapshot.clone()
    }
}
