//! Local technical rules used whenever the advisory provider cannot answer.
//!
//! Everything here is deterministic: the same pair state always produces the
//! same output.

use crate::types::{Direction, PairState, TimingPrediction};

const OVERSOLD_RSI: f64 = 30.0;
const OVERBOUGHT_RSI: f64 = 70.0;
const OVERSOLD_STOCHASTIC: f64 = 25.0;
const OVERBOUGHT_STOCHASTIC: f64 = 75.0;

/// Expected direction from oscillator extremes, then momentum.
///
/// Oversold extremes call a rebound up, overbought extremes a correction
/// down; otherwise the direction follows the sign of the window change.
pub fn technical_direction(pair: &PairState) -> Direction {
    if pair.rsi < OVERSOLD_RSI && pair.stochastic < OVERSOLD_STOCHASTIC {
        return Direction::Up;
    }
    if pair.rsi > OVERBOUGHT_RSI && pair.stochastic > OVERBOUGHT_STOCHASTIC {
        return Direction::Down;
    }
    if pair.change > 0.0 {
        Direction::Up
    } else {
        Direction::Down
    }
}

fn rsi_state(rsi: f64) -> &'static str {
    if rsi > OVERBOUGHT_RSI {
        "overbought (selling pressure)"
    } else if rsi < OVERSOLD_RSI {
        "oversold (buying pressure)"
    } else {
        "neutral"
    }
}

/// One-paragraph commentary built from the trend and the RSI state.
pub fn technical_commentary(pair: &PairState) -> String {
    let trend = if pair.change >= 0.0 { "rising" } else { "falling" };
    format!(
        "Relay mode (AI unavailable): {} flow is currently {}. RSI is {} ({:.1}). \
         Signal based on the immediate technical structure.",
        pair.symbol,
        trend,
        rsi_state(pair.rsi),
        pair.rsi
    )
}

/// Entry-timing answer used when the provider cannot produce one.
pub fn technical_timing(pair: &PairState) -> TimingPrediction {
    TimingPrediction {
        time_estimate: "Immediate signal".to_string(),
        direction: technical_direction(pair),
        reason: "Technical flow detection (relay mode). Favourable volatility detected."
            .to_string(),
        duration_seconds: 0,
    }
}
