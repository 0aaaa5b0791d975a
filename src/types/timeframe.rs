use serde::{Deserialize, Serialize};

/// Expiry timeframe selected for a signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Timeframe {
    #[serde(rename = "3s")]
    S3,
    #[serde(rename = "5s")]
    S5,
    #[serde(rename = "15s")]
    S15,
    #[serde(rename = "30s")]
    #[default]
    S30,
    #[serde(rename = "1M")]
    M1,
    #[serde(rename = "1H")]
    H1,
}

impl Timeframe {
    /// Parse from string. Minutes and hours accept either case.
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim() {
            "3s" | "3S" => Some(Self::S3),
            "5s" | "5S" => Some(Self::S5),
            "15s" | "15S" => Some(Self::S15),
            "30s" | "30S" => Some(Self::S30),
            "1M" | "1m" | "60s" => Some(Self::M1),
            "1H" | "1h" => Some(Self::H1),
            _ => None,
        }
    }

    /// Label used on the wire and in cache keys.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::S3 => "3s",
            Self::S5 => "5s",
            Self::S15 => "15s",
            Self::S30 => "30s",
            Self::M1 => "1M",
            Self::H1 => "1H",
        }
    }
}

impl std::fmt::Display for Timeframe {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unit the timing prediction should be expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PredictionUnit {
    #[default]
    Minutes,
    Hours,
}

impl PredictionUnit {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "minutes" | "minute" | "min" | "m" => Some(Self::Minutes),
            "hours" | "hour" | "h" => Some(Self::Hours),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Minutes => "minutes",
            Self::Hours => "hours",
        }
    }
}

/// Expiry horizons offered by the quick predictor, in seconds.
pub const QUICK_HORIZONS_SECS: [u64; 3] = [3, 5, 15];
