//! Advisory API
//!
//! - GET /api/advisory/:symbol/commentary?timeframe=  - Short market commentary
//! - GET /api/advisory/:symbol/timing?timeframe=&unit= - Entry-timing prediction
//! - GET /api/advisory/:symbol/quick?seconds=          - UP/DOWN for 3, 5 or 15 seconds

use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;

use super::{find_pair, parse_timeframe, ApiResponse};
use crate::error::{AppError, Result};
use crate::types::{Commentary, PredictionUnit, QuickPrediction, TimingReport, QUICK_HORIZONS_SECS};
use crate::AppState;

const DEFAULT_QUICK_HORIZON_SECS: u64 = 5;

/// Query parameters shared by the advisory endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct AdvisoryQuery {
    /// Expiry timeframe: 3s, 5s, 15s, 30s, 1M, 1H.
    pub timeframe: Option<String>,
    /// Timing unit: minutes or hours.
    pub unit: Option<String>,
    /// Quick-prediction horizon: 3, 5 or 15 seconds.
    pub seconds: Option<u64>,
}

/// Create the advisory router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/:symbol/commentary", get(get_commentary))
        .route("/:symbol/timing", get(get_timing))
        .route("/:symbol/quick", get(get_quick))
}

async fn get_commentary(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
    Query(query): Query<AdvisoryQuery>,
) -> Result<Json<ApiResponse<Commentary>>> {
    let timeframe = parse_timeframe(query.timeframe.as_deref())?;
    let pair = find_pair(&state, &symbol)?;
    let commentary = state.advisory.commentary(&pair, timeframe).await;
    Ok(Json(ApiResponse::new(commentary)))
}

async fn get_timing(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
    Query(query): Query<AdvisoryQuery>,
) -> Result<Json<ApiResponse<TimingReport>>> {
    let timeframe = parse_timeframe(query.timeframe.as_deref())?;
    let unit = match query.unit.as_deref() {
        None => PredictionUnit::default(),
        Some(s) => PredictionUnit::from_str(s)
            .ok_or_else(|| AppError::BadRequest(format!("Unknown unit: {}", s)))?,
    };
    let pair = find_pair(&state, &symbol)?;
    let report = state.advisory.timing(&pair, timeframe, unit).await?;
    Ok(Json(ApiResponse::new(report)))
}

async fn get_quick(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
    Query(query): Query<AdvisoryQuery>,
) -> Result<Json<ApiResponse<QuickPrediction>>> {
    let seconds = query.seconds.unwrap_or(DEFAULT_QUICK_HORIZON_SECS);
    if !QUICK_HORIZONS_SECS.contains(&seconds) {
        return Err(AppError::BadRequest(format!(
            "Unsupported horizon {}s, expected one of {:?}",
            seconds, QUICK_HORIZONS_SECS
        )));
    }
    let pair = find_pair(&state, &symbol)?;
    let prediction = state.advisory.quick_direction(&pair, seconds).await?;
    Ok(Json(ApiResponse::new(prediction)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_parsing() {
        let query: AdvisoryQuery = serde_urlencoded::from_str("timeframe=1M&unit=hours").unwrap();
        assert_eq!(query.timeframe.as_deref(), Some("1M"));
        assert_eq!(query.unit.as_deref(), Some("hours"));
        assert_eq!(query.seconds, None);

        let query: AdvisoryQuery = serde_urlencoded::from_str("seconds=15").unwrap();
        assert_eq!(query.seconds, Some(15));
    }
}
