//! Signal delivery to chat channels.

use axum::{extract::State, routing::post, Json, Router};
use serde::{Deserialize, Serialize};

use super::{find_pair, parse_timeframe, ApiResponse};
use crate::error::{AppError, Result};
use crate::services::format_signal_message;
use crate::types::AdvisorySource;
use crate::AppState;

fn default_include_analysis() -> bool {
    true
}

/// Request body for sending a signal to Telegram.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TelegramRequest {
    pub chat_id: String,
    pub symbol: String,
    pub timeframe: Option<String>,
    /// Attach the AI commentary when the provider answers.
    #[serde(default = "default_include_analysis")]
    pub include_analysis: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TelegramResponse {
    pub sent: bool,
    pub chat_id: String,
    pub symbol: String,
    pub message: String,
}

/// Create the notifications router.
pub fn router() -> Router<AppState> {
    Router::new().route("/telegram", post(send_telegram))
}

async fn send_telegram(
    State(state): State<AppState>,
    Json(request): Json<TelegramRequest>,
) -> Result<Json<ApiResponse<TelegramResponse>>> {
    let sink = state
        .notifier
        .clone()
        .ok_or_else(|| AppError::NotConfigured("Telegram bot token".to_string()))?;

    let chat_id = request.chat_id.trim();
    if chat_id.is_empty() {
        return Err(AppError::BadRequest("chatId is required".to_string()));
    }

    let timeframe = parse_timeframe(request.timeframe.as_deref())?;
    let pair = find_pair(&state, &request.symbol)?;

    // Relay-mode text would only repeat the indicator line.
    let analysis = if request.include_analysis {
        let commentary = state.advisory.commentary(&pair, timeframe).await;
        (commentary.source != AdvisorySource::Fallback).then_some(commentary.text)
    } else {
        None
    };

    let message = format_signal_message(&pair, timeframe, analysis.as_deref());
    sink.send(chat_id, &message).await?;

    Ok(Json(ApiResponse::new(TelegramResponse {
        sent: true,
        chat_id: chat_id.to_string(),
        symbol: pair.symbol,
        message,
    })))
}
