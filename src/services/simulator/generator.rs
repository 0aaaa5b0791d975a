//! Synthetic price and indicator generation.
//!
//! Prices follow a uniform random walk scaled by an instrument-class
//! volatility. The RSI-like and stochastic-like oscillators are clamped
//! random walks; they carry no information about the price path.

use crate::types::{PairState, PricePoint, PriceWindow};
use rand::Rng;

/// Number of samples (newest included) spanned by the trend delta.
pub const TREND_LOOKBACK: usize = 10;

pub const RSI_MIN: f64 = 10.0;
pub const RSI_MAX: f64 = 90.0;
pub const STOCHASTIC_MIN: f64 = 5.0;
pub const STOCHASTIC_MAX: f64 = 95.0;

/// Maximum per-tick move of the RSI-like oscillator.
const RSI_STEP: f64 = 2.5;
/// Maximum per-tick move of the stochastic-like oscillator.
const STOCHASTIC_STEP: f64 = 4.0;

/// Multiplicative per-tick jitter applied to the base volatility.
const VOLATILITY_JITTER: (f64, f64) = (0.8, 1.2);

/// Volatility class of an instrument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VolatilityClass {
    /// Yen-quoted pairs, priced in the hundreds.
    YenScale,
    /// Everything else, priced around 1.
    Standard,
}

impl VolatilityClass {
    pub fn from_symbol(symbol: &str) -> Self {
        if symbol.to_uppercase().contains("JPY") {
            VolatilityClass::YenScale
        } else {
            VolatilityClass::Standard
        }
    }

    /// Peak-to-peak price move per tick before jitter.
    pub fn base(&self) -> f64 {
        match self {
            VolatilityClass::YenScale => 0.03,
            VolatilityClass::Standard => 0.00008,
        }
    }

    /// Base volatility scaled by a fresh jitter factor.
    pub fn jittered<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        self.base() * rng.gen_range(VOLATILITY_JITTER.0..=VOLATILITY_JITTER.1)
    }
}

/// Next price: `current + U[-volatility/2, volatility/2]`.
///
/// A draw that would make the price non-positive keeps the current price.
pub fn next_price<R: Rng + ?Sized>(current: f64, volatility: f64, rng: &mut R) -> f64 {
    if volatility.is_nan() || volatility <= 0.0 {
        return current;
    }
    let half = volatility / 2.0;
    let candidate = current + rng.gen_range(-half..=half);
    if candidate > 0.0 {
        candidate
    } else {
        current
    }
}

pub fn walk_rsi<R: Rng + ?Sized>(rsi: f64, rng: &mut R) -> f64 {
    bounded_walk(rsi, RSI_STEP, RSI_MIN, RSI_MAX, rng)
}

pub fn walk_stochastic<R: Rng + ?Sized>(stochastic: f64, rng: &mut R) -> f64 {
    bounded_walk(stochastic, STOCHASTIC_STEP, STOCHASTIC_MIN, STOCHASTIC_MAX, rng)
}

fn bounded_walk<R: Rng + ?Sized>(value: f64, step: f64, min: f64, max: f64, rng: &mut R) -> f64 {
    (value + rng.gen_range(-step..=step)).clamp(min, max)
}

/// Price delta against the sample [`TREND_LOOKBACK`] positions back.
///
/// `window` must already contain `price` as its newest sample.
pub fn trend(window: &PriceWindow, price: f64) -> Option<f64> {
    window
        .nth_from_newest(TREND_LOOKBACK)
        .map(|start| price - start.value)
}

/// Percentage change against the oldest sample in the window.
pub fn percent_change(window: &PriceWindow, price: f64) -> f64 {
    match window.oldest() {
        Some(oldest) if oldest.value != 0.0 => (price - oldest.value) / oldest.value * 100.0,
        _ => 0.0,
    }
}

/// Raw per-tick output for one pair, before classification.
#[derive(Debug, Clone, PartialEq)]
pub struct Generated {
    pub price: f64,
    pub history: PriceWindow,
    pub change: f64,
    pub rsi: f64,
    pub stochastic: f64,
    pub trend: Option<f64>,
}

/// Advance one pair's price, window and oscillators by one tick.
pub fn generate<R: Rng + ?Sized>(pair: &PairState, now: i64, rng: &mut R) -> Generated {
    let volatility = VolatilityClass::from_symbol(&pair.symbol).jittered(rng);
    let price = next_price(pair.current_price, volatility, rng);

    let mut history = pair.history.clone();
    history.push(PricePoint {
        timestamp: now,
        value: price,
    });

    let rsi = walk_rsi(pair.rsi, rng);
    let stochastic = walk_stochastic(pair.stochastic, rng);
    let trend = trend(&history, price);
    let change = percent_change(&history, price);

    Generated {
        price,
        history,
        change,
        rsi,
        stochastic,
        trend,
    }
}
