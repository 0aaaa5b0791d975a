use super::{Direction, Timeframe};
use serde::{Deserialize, Serialize};

/// Who produced an advisory result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdvisorySource {
    /// The generative-language provider answered.
    Provider,
    /// Served from the commentary cache.
    Cache,
    /// Local technical rules.
    Fallback,
}

/// Short free-text market commentary for one pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Commentary {
    pub symbol: String,
    pub timeframe: Timeframe,
    pub text: String,
    pub source: AdvisorySource,
    pub timestamp: i64,
}

/// Structured entry-timing prediction.
///
/// Field names match the JSON shape the provider is asked to return.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimingPrediction {
    /// Human-readable estimate, e.g. `"2 min"`.
    pub time_estimate: String,
    pub direction: Direction,
    pub reason: String,
    #[serde(default)]
    pub duration_seconds: u64,
}

/// Timing prediction together with its request metadata.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimingReport {
    pub symbol: String,
    pub timeframe: Timeframe,
    #[serde(flatten)]
    pub prediction: TimingPrediction,
    pub source: AdvisorySource,
    pub sequence: u64,
    pub timestamp: i64,
}

/// Single-direction call for a short expiry.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuickPrediction {
    pub symbol: String,
    pub horizon_secs: u64,
    pub direction: Direction,
    pub source: AdvisorySource,
    pub sequence: u64,
    pub timestamp: i64,
}
