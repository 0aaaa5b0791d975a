//! Chat notification sink.
//!
//! Fire-and-forget: a failed send is reported to the caller and never retried.

use crate::config::TelegramConfig;
use crate::error::{AppError, Result};
use crate::types::{PairState, Side, Timeframe};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;
use tracing::{error, info};

const SEND_TIMEOUT_SECS: u64 = 10;

/// Destination for formatted signal messages.
pub trait NotificationSink: Send + Sync {
    fn name(&self) -> &str;

    fn send<'a>(
        &'a self,
        chat_id: &'a str,
        text: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>>;
}

/// Markdown message describing the current signal of one pair.
pub fn format_signal_message(
    pair: &PairState,
    timeframe: Timeframe,
    analysis: Option<&str>,
) -> String {
    let marker = match pair.signal.side() {
        Some(Side::Buy) => "🟢",
        Some(Side::Sell) => "🔴",
        None => "⚪",
    };

    let analysis_line = analysis
        .map(|a| format!("🤖 *AI analysis:* _{}_\n\n", strip_markup(a.trim())))
        .unwrap_or_default();

    format!(
        "📊 *OTC SIGNAL*\n\n\
         💱 *Pair:* `{}`\n\
         ⏱ *Expiry:* {}\n\
         💵 *Price:* `{}`\n\n\
         🎯 *SIGNAL:* {} *{}* ({}%)\n\
         📈 *RSI:* {:.1} | *Stoch:* {:.1}\n\n\
         {}\
         🚀 _Sent via PocketSignal_",
        pair.symbol,
        timeframe.as_str(),
        pair.formatted_price(),
        marker,
        pair.signal.label().to_uppercase(),
        pair.confidence,
        pair.rsi,
        pair.stochastic,
        analysis_line
    )
}

/// Drop Markdown control characters from free text.
///
/// Telegram's legacy Markdown has no escapes inside an entity, so text placed
/// in the italic block must not open or close one itself.
fn strip_markup(text: &str) -> String {
    text.chars()
        .filter(|c| !matches!(c, '*' | '_' | '`' | '['))
        .collect()
}

#[derive(Debug, Serialize)]
struct SendMessageRequest<'a> {
    chat_id: &'a str,
    text: &'a str,
    parse_mode: &'static str,
}

#[derive(Debug, Deserialize)]
struct TelegramResponse {
    ok: bool,
    description: Option<String>,
}

/// Telegram Bot API `sendMessage` client.
#[derive(Clone)]
pub struct TelegramNotifier {
    client: Client,
    bot_token: String,
    api_url: String,
}

impl TelegramNotifier {
    pub fn new(bot_token: String, api_url: &str) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(SEND_TIMEOUT_SECS))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            bot_token,
            api_url: api_url.trim_end_matches('/').to_string(),
        }
    }

    /// Build a notifier from configuration; `None` when no token is set.
    pub fn from_config(config: &TelegramConfig) -> Option<Self> {
        let token = config.bot_token.clone()?;
        Some(Self::new(token, &config.api_url))
    }

    fn endpoint(&self) -> String {
        format!("{}/bot{}/sendMessage", self.api_url, self.bot_token)
    }

    async fn send_message(&self, chat_id: &str, text: &str) -> Result<()> {
        let body = SendMessageRequest {
            chat_id,
            text,
            parse_mode: "Markdown",
        };

        let response = match self.client.post(self.endpoint()).json(&body).send().await {
            Ok(response) => response,
            Err(e) => {
                error!("Network error sending to Telegram: {}", e);
                return Err(AppError::Notification(
                    "network error while sending to Telegram".to_string(),
                ));
            }
        };

        let status = response.status();
        let parsed = response.json::<TelegramResponse>().await.ok();

        match parsed {
            Some(TelegramResponse { ok: true, .. }) if status.is_success() => {
                info!("Signal sent to Telegram chat {}", chat_id);
                Ok(())
            }
            other => {
                let description = other
                    .and_then(|r| r.description)
                    .unwrap_or_else(|| status.to_string());
                error!("Telegram error: {}", description);
                Err(AppError::Notification(format!("Telegram error: {}", description)))
            }
        }
    }
}

impl NotificationSink for TelegramNotifier {
    fn name(&self) -> &str {
        "telegram"
    }

    fn send<'a>(
        &'a self,
        chat_id: &'a str,
        text: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>> {
        Box::pin(self.send_message(chat_id, text))
    }
}
