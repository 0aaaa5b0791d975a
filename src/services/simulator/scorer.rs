//! Confidence scoring for a classified signal.

use super::classifier::IndicatorReading;
use crate::types::{Side, SignalType};
use rand::Rng;

pub const MIN_CONFIDENCE: u8 = 10;
pub const MAX_CONFIDENCE: u8 = 99;
pub const NEUTRAL_CONFIDENCE: u8 = 50;

const STRONG_BASE: i32 = 78;
const REGULAR_BASE: i32 = 60;
const DEEP_RSI_BONUS: i32 = 12;
const RSI_BONUS: i32 = 6;
const STOCHASTIC_BONUS: i32 = 8;
const TREND_BONUS: i32 = 5;

/// Symmetric bound of the cosmetic noise term.
pub const NOISE_SPAN: i32 = 3;

/// Deterministic part of the score, before noise and clamping.
pub fn base_score(signal: SignalType, reading: &IndicatorReading) -> i32 {
    let Some(side) = signal.side() else {
        return NEUTRAL_CONFIDENCE as i32;
    };

    let mut score = if signal.is_strong() {
        STRONG_BASE
    } else {
        REGULAR_BASE
    };

    score += match side {
        Side::Buy if reading.rsi <= 25.0 => DEEP_RSI_BONUS,
        Side::Buy if reading.rsi <= 35.0 => RSI_BONUS,
        Side::Sell if reading.rsi >= 75.0 => DEEP_RSI_BONUS,
        Side::Sell if reading.rsi >= 65.0 => RSI_BONUS,
        _ => 0,
    };

    score += match side {
        Side::Buy if reading.stochastic <= 15.0 => STOCHASTIC_BONUS,
        Side::Sell if reading.stochastic >= 85.0 => STOCHASTIC_BONUS,
        _ => 0,
    };

    if reading.trend.is_some_and(|t| side.agrees_with(t)) {
        score += TREND_BONUS;
    }

    score
}

pub fn clamp_confidence(score: i32) -> u8 {
    score.clamp(MIN_CONFIDENCE as i32, MAX_CONFIDENCE as i32) as u8
}

/// Confidence in [10, 99]. Neutral is always exactly 50; other signals get
/// a uniform noise term in `[-NOISE_SPAN, NOISE_SPAN]`.
pub fn confidence<R: Rng + ?Sized>(signal: SignalType, reading: &IndicatorReading, rng: &mut R) -> u8 {
    if signal == SignalType::Neutral {
        return NEUTRAL_CONFIDENCE;
    }
    let noise = rng.gen_range(-NOISE_SPAN..=NOISE_SPAN);
    clamp_confidence(base_score(signal, reading) + noise)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn reading(rsi: f64, stochastic: f64, trend: Option<f64>) -> IndicatorReading {
        IndicatorReading::new(rsi, stochastic, trend)
    }

    #[test]
    fn test_neutral_is_always_fifty() {
        let mut rng = StdRng::seed_from_u64(9);
        for _ in 0..100 {
            assert_eq!(
                confidence(SignalType::Neutral, &reading(50.0, 50.0, None), &mut rng),
                50
            );
        }
    }

    #[test]
    fn test_strong_buy_full_bonuses() {
        // 78 + 12 + 8 + 5
        let r = reading(20.0, 15.0, Some(0.001));
        assert_eq!(base_score(SignalType::StrongBuy, &r), 103);
    }

    #[test]
    fn test_buy_partial_bonuses() {
        // 60 + 6, stochastic too high, trend agrees
        let r = reading(33.0, 50.0, Some(0.5));
        assert_eq!(base_score(SignalType::Buy, &r), 71);
    }

    #[test]
    fn test_sell_side_bonuses() {
        assert_eq!(base_score(SignalType::Sell, &reading(66.0, 50.0, Some(-1.0))), 71);
        assert_eq!(base_score(SignalType::StrongSell, &reading(80.0, 90.0, None)), 98);
        assert_eq!(base_score(SignalType::Sell, &reading(60.0, 50.0, Some(1.0))), 60);
    }

    #[test]
    fn test_rsi_bonus_thresholds_inclusive() {
        assert_eq!(base_score(SignalType::Buy, &reading(25.0, 50.0, None)), 72);
        assert_eq!(base_score(SignalType::Buy, &reading(35.0, 50.0, None)), 66);
        assert_eq!(base_score(SignalType::Buy, &reading(35.1, 50.0, None)), 60);
        assert_eq!(base_score(SignalType::Sell, &reading(75.0, 50.0, None)), 72);
        assert_eq!(base_score(SignalType::Sell, &reading(65.0, 50.0, None)), 66);
    }

    #[test]
    fn test_noise_is_bounded_and_clamped() {
        let mut rng = StdRng::seed_from_u64(1234);
        let strong = reading(20.0, 15.0, Some(0.001));
        let plain = reading(40.0, 50.0, Some(0.001));
        for _ in 0..1000 {
            let c = confidence(SignalType::StrongBuy, &strong, &mut rng);
            assert!((96..=99).contains(&c), "got {}", c);

            let c = confidence(SignalType::Buy, &plain, &mut rng);
            assert!((62..=68).contains(&c), "got {}", c);
        }
    }

    #[test]
    fn test_clamp_confidence() {
        assert_eq!(clamp_confidence(-20), MIN_CONFIDENCE);
        assert_eq!(clamp_confidence(150), MAX_CONFIDENCE);
        assert_eq!(clamp_confidence(55), 55);
    }
}
