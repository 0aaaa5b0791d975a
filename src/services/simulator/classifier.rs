//! First-match signal classification.

use crate::types::SignalType;

/// Indicator values a signal is derived from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndicatorReading {
    pub rsi: f64,
    pub stochastic: f64,
    /// Price delta over the trend lookback, `None` until computable.
    pub trend: Option<f64>,
}

impl IndicatorReading {
    pub fn new(rsi: f64, stochastic: f64, trend: Option<f64>) -> Self {
        Self {
            rsi,
            stochastic,
            trend,
        }
    }

    fn trend_up(&self) -> bool {
        self.trend.is_some_and(|t| t > 0.0)
    }

    fn trend_down(&self) -> bool {
        self.trend.is_some_and(|t| t < 0.0)
    }
}

/// One row of the decision table.
pub struct Rule {
    pub name: &'static str,
    pub applies: fn(&IndicatorReading) -> bool,
    pub signal: SignalType,
}

fn oversold_extreme(r: &IndicatorReading) -> bool {
    r.rsi < 30.0 && r.stochastic < 20.0
}

fn overbought_extreme(r: &IndicatorReading) -> bool {
    r.rsi > 70.0 && r.stochastic > 80.0
}

fn weak_with_uptrend(r: &IndicatorReading) -> bool {
    r.rsi < 45.0 && r.trend_up()
}

fn strong_with_downtrend(r: &IndicatorReading) -> bool {
    r.rsi > 55.0 && r.trend_down()
}

/// Evaluated top to bottom; the first matching rule wins. Extremes come
/// before the trend-following rules.
pub const RULES: [Rule; 4] = [
    Rule {
        name: "oversold_extreme",
        applies: oversold_extreme,
        signal: SignalType::StrongBuy,
    },
    Rule {
        name: "overbought_extreme",
        applies: overbought_extreme,
        signal: SignalType::StrongSell,
    },
    Rule {
        name: "weak_with_uptrend",
        applies: weak_with_uptrend,
        signal: SignalType::Buy,
    },
    Rule {
        name: "strong_with_downtrend",
        applies: strong_with_downtrend,
        signal: SignalType::Sell,
    },
];

/// The rule that decides `reading`, if any.
pub fn matching_rule(reading: &IndicatorReading) -> Option<&'static Rule> {
    RULES.iter().find(|rule| (rule.applies)(reading))
}

/// Classify a reading. Total: anything no rule claims is neutral.
pub fn classify(reading: &IndicatorReading) -> SignalType {
    matching_rule(reading)
        .map(|rule| rule.signal)
        .unwrap_or(SignalType::Neutral)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reading(rsi: f64, stochastic: f64, trend: Option<f64>) -> IndicatorReading {
        IndicatorReading::new(rsi, stochastic, trend)
    }

    #[test]
    fn test_strong_buy_beats_buy() {
        let r = reading(20.0, 10.0, Some(1.0));
        assert_eq!(classify(&r), SignalType::StrongBuy);
        assert_eq!(matching_rule(&r).unwrap().name, "oversold_extreme");
    }

    #[test]
    fn test_strong_sell_beats_sell() {
        assert_eq!(classify(&reading(80.0, 90.0, Some(-1.0))), SignalType::StrongSell);
    }

    #[test]
    fn test_trend_following_rules() {
        assert_eq!(classify(&reading(40.0, 50.0, Some(0.0001))), SignalType::Buy);
        assert_eq!(classify(&reading(60.0, 50.0, Some(-0.0001))), SignalType::Sell);
    }

    #[test]
    fn test_boundaries_are_strict() {
        assert_eq!(classify(&reading(30.0, 10.0, None)), SignalType::Neutral);
        assert_eq!(classify(&reading(20.0, 20.0, None)), SignalType::Neutral);
        assert_eq!(classify(&reading(70.0, 90.0, None)), SignalType::Neutral);
        assert_eq!(classify(&reading(45.0, 50.0, Some(1.0))), SignalType::Neutral);
        assert_eq!(classify(&reading(55.0, 50.0, Some(-1.0))), SignalType::Neutral);
    }

    #[test]
    fn test_missing_or_flat_trend_is_neutral() {
        assert_eq!(classify(&reading(40.0, 50.0, None)), SignalType::Neutral);
        assert_eq!(classify(&reading(60.0, 50.0, None)), SignalType::Neutral);
        assert_eq!(classify(&reading(40.0, 50.0, Some(0.0))), SignalType::Neutral);
    }

    #[test]
    fn test_wrong_way_trend_is_neutral() {
        assert_eq!(classify(&reading(40.0, 50.0, Some(-1.0))), SignalType::Neutral);
        assert_eq!(classify(&reading(60.0, 50.0, Some(1.0))), SignalType::Neutral);
    }

    #[test]
    fn test_mid_range_without_trend_is_neutral_over_grid() {
        for rsi in (35..=65).step_by(5) {
            for stoch in (25..=75).step_by(5) {
                let signal = classify(&reading(rsi as f64, stoch as f64, None));
                assert_eq!(signal, SignalType::Neutral, "rsi {} stoch {}", rsi, stoch);
            }
        }
    }
}
