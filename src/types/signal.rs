use serde::{Deserialize, Serialize};

/// Discrete trading signal produced on every tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SignalType {
    StrongBuy,
    Buy,
    #[default]
    Neutral,
    Sell,
    StrongSell,
}

impl SignalType {
    /// Every signal category, strongest buy first.
    /// Which side of the market the signal points to. Neutral has none.
    pub fn side(&self) -> Option<Side> {
        match self {
            SignalType::StrongBuy | SignalType::Buy => Some(Side::Buy),
            SignalType::Sell | SignalType::StrongSell => Some(Side::Sell),
            SignalType::Neutral => None,
        }
    }

    /// Whether this is one of the two extreme categories.
    pub fn is_strong(&self) -> bool {
        matches!(self, SignalType::StrongBuy | SignalType::StrongSell)
    }

    /// Get display label for this signal.
    pub fn label(&self) -> &'static str {
        match self {
            SignalType::StrongBuy => "Strong Buy",
            SignalType::Buy => "Buy",
            SignalType::Neutral => "Neutral",
            SignalType::Sell => "Sell",
            SignalType::StrongSell => "Strong Sell",
        }
    }
}

/// Buy-side or sell-side move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    /// Whether a raw price delta points the same way as this side.
    pub fn agrees_with(&self, trend: f64) -> bool {
        match self {
            Side::Buy => trend > 0.0,
            Side::Sell => trend < 0.0,
        }
    }
}

/// Short-horizon price direction used by the advisory calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Up,
    Down,
}

impl Direction {
    /// Parse a provider reply such as `"UP"`, `"Direction: down"` or `"Up."`.
    ///
    /// Direction words are matched as whole words anywhere in the reply. A
    /// reply that names both directions, or neither, is unusable.
    pub fn parse_reply(text: &str) -> Option<Self> {
        let upper = text.to_uppercase();
        let mut up = false;
        let mut down = false;

        for word in upper.split(|c: char| !c.is_alphabetic()) {
            match word {
                "UP" | "HAUSSE" | "HIGHER" => up = true,
                "DOWN" | "BAISSE" | "LOWER" => down = true,
                _ => {}
            }
        }

        match (up, down) {
            (true, false) => Some(Direction::Up),
            (false, true) => Some(Direction::Down),
            _ => None,
        }
    }

    /// Get display label for this direction.
    pub fn label(&self) -> &'static str {
        match self {
            Direction::Up => "UP",
            Direction::Down => "DOWN",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signal_sides() {
        assert_eq!(SignalType::StrongBuy.side(), Some(Side::Buy));
        assert_eq!(SignalType::Buy.side(), Some(Side::Buy));
        assert_eq!(SignalType::Neutral.side(), None);
        assert_eq!(SignalType::Sell.side(), Some(Side::Sell));
        assert_eq!(SignalType::StrongSell.side(), Some(Side::Sell));
    }

    #[test]
    fn test_signal_serialization() {
        let json = serde_json::to_string(&SignalType::StrongSell).unwrap();
        assert_eq!(json, "\"strong_sell\"");
        let parsed: SignalType = serde_json::from_str("\"buy\"").unwrap();
        assert_eq!(parsed, SignalType::Buy);
    }

    #[test]
    fn test_side_agreement() {
        assert!(Side::Buy.agrees_with(0.001));
        assert!(!Side::Buy.agrees_with(0.0));
        assert!(Side::Sell.agrees_with(-0.5));
        assert!(!Side::Sell.agrees_with(0.5));
    }

    #[test]
    fn test_direction_parse_reply() {
        assert_eq!(Direction::parse_reply("UP"), Some(Direction::Up));
        assert_eq!(Direction::parse_reply("  down\n"), Some(Direction::Down));
        assert_eq!(Direction::parse_reply("**Up**."), Some(Direction::Up));
        assert_eq!(Direction::parse_reply("HAUSSE"), Some(Direction::Up));
        assert_eq!(Direction::parse_reply("maybe"), None);
        assert_eq!(Direction::parse_reply(""), None);
    }

    #[test]
    fn test_direction_found_anywhere_in_reply() {
        assert_eq!(Direction::parse_reply("Direction: DOWN"), Some(Direction::Down));
        assert_eq!(Direction::parse_reply("The answer is UP"), Some(Direction::Up));
        assert_eq!(Direction::parse_reply("Tendance: baisse."), Some(Direction::Down));
        // Whole words only.
        assert_eq!(Direction::parse_reply("upward pressure, downtrend"), None);
        assert_eq!(Direction::parse_reply("UP or DOWN, hard to tell"), None);
    }
}
