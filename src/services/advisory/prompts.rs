//! Prompt construction and reply parsing for the advisory calls.

use crate::error::{AppError, Result};
use crate::types::{Direction, PairState, PredictionUnit, TimingPrediction};
use serde::Deserialize;

pub fn commentary_prompt(pair: &PairState) -> String {
    format!(
        "Market analysis for binary-options trading.\n\
         Pair: {}\n\
         Price: {}\n\
         RSI: {:.2}\n\
         Trend: {:.4}%\n\n\
         Task: describe the current buyer/seller dynamic in one short, punchy sentence.",
        pair.symbol,
        pair.formatted_price(),
        pair.rsi,
        pair.change
    )
}

pub fn timing_prompt(pair: &PairState, unit: PredictionUnit) -> String {
    format!(
        "Act as a market-timing algorithm.\n\
         Pair: {}\n\
         RSI: {:.2}\n\
         Stoch: {:.2}\n\n\
         Task: when should a position be entered? Express the estimate in {}.\n\
         Reply in JSON:\n\
         {{\n  \"timeEstimate\": \"e.g. 2 min\",\n  \"direction\": \"UP or DOWN\",\n  \
         \"reason\": \"e.g. low RSI\",\n  \"durationSeconds\": 120\n}}",
        pair.symbol,
        pair.rsi,
        pair.stochastic,
        unit.as_str()
    )
}

pub fn quick_direction_prompt(pair: &PairState, horizon_secs: u64) -> String {
    let momentum = if pair.change >= 0.0 { "UP" } else { "DOWN" };
    format!(
        "Scalping analysis ({}s).\n\
         Market: {}\n\
         RSI: {:.2}\n\
         Stoch: {:.2}\n\
         Trend: {:.4}%\n\n\
         RULE:\n\
         - If RSI < 35 or Stoch < 25 -> UP\n\
         - If RSI > 65 or Stoch > 75 -> DOWN\n\
         - Otherwise follow the trend ({}).\n\n\
         Reply ONLY with \"UP\" or \"DOWN\".",
        horizon_secs, pair.symbol, pair.rsi, pair.stochastic, pair.change, momentum
    )
}

/// Timing reply as the model writes it; fields are loosely typed.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawTiming {
    time_estimate: String,
    direction: String,
    #[serde(default)]
    reason: String,
    #[serde(default)]
    duration_seconds: Option<f64>,
}

/// Strip a Markdown code fence around a JSON reply, if present.
fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

pub fn parse_timing(text: &str) -> Result<TimingPrediction> {
    let raw: RawTiming = serde_json::from_str(strip_code_fence(text))
        .map_err(|e| AppError::MalformedPayload(format!("timing reply: {}", e)))?;

    let direction = Direction::parse_reply(&raw.direction).ok_or_else(|| {
        AppError::MalformedPayload(format!("unknown direction {:?}", raw.direction))
    })?;

    let duration_seconds = raw
        .duration_seconds
        .filter(|d| d.is_finite() && *d > 0.0)
        .map(|d| d.round() as u64)
        .unwrap_or(0);

    Ok(TimingPrediction {
        time_estimate: raw.time_estimate,
        direction,
        reason: raw.reason,
        duration_seconds,
    })
}

pub fn parse_direction(text: &str) -> Result<Direction> {
    Direction::parse_reply(text)
        .ok_or_else(|| AppError::MalformedPayload(format!("unclear direction reply {:?}", text)))
}
