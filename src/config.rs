use std::env;
use std::time::Duration;

/// Market simulator configuration.
#[derive(Debug, Clone)]
pub struct SimulatorConfig {
    /// Tick period in milliseconds.
    pub tick_interval_ms: u64,
    /// Number of samples kept per pair (at least the trend lookback).
    pub history_capacity: usize,
    /// Spacing between the identical samples used to seed each window (ms).
    pub seed_spacing_ms: i64,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: 500,
            history_capacity: 40,
            seed_spacing_ms: 1000,
        }
    }
}

/// Live exchange-rate source used to seed base prices.
#[derive(Debug, Clone)]
pub struct RateSourceConfig {
    /// Base URL of the open exchange-rate API.
    pub api_url: String,
    /// Timeout for the one-shot startup fetch (ms).
    pub timeout_ms: u64,
}

impl Default for RateSourceConfig {
    fn default() -> Self {
        Self {
            api_url: "https://open.er-api.com".to_string(),
            timeout_ms: 5000,
        }
    }
}

/// Generative-language advisory provider configuration.
#[derive(Debug, Clone)]
pub struct AdvisoryConfig {
    /// Gemini API key. Without it every advisory call uses the technical fallback.
    pub api_key: Option<String>,
    pub model: String,
    pub api_url: String,
    /// Per-call timeout (ms).
    pub timeout_ms: u64,
    /// How long commentary stays cached per (symbol, timeframe).
    pub commentary_ttl_secs: u64,
}

impl AdvisoryConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for AdvisoryConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: "gemini-2.5-flash".to_string(),
            api_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            timeout_ms: 10_000,
            commentary_ttl_secs: 60,
        }
    }
}

/// Telegram notification sink configuration.
#[derive(Debug, Clone)]
pub struct TelegramConfig {
    /// Bot token. Without it the notification endpoint is disabled.
    pub bot_token: Option<String>,
    pub api_url: String,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            bot_token: None,
            api_url: "https://api.telegram.org".to_string(),
        }
    }
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server host address.
    pub host: String,
    /// Server port.
    pub port: u16,
    pub simulator: SimulatorConfig,
    pub rates: RateSourceConfig,
    pub advisory: AdvisoryConfig,
    pub telegram: TelegramConfig,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let simulator_defaults = SimulatorConfig::default();
        let rates_defaults = RateSourceConfig::default();
        let advisory_defaults = AdvisoryConfig::default();
        let telegram_defaults = TelegramConfig::default();

        Self {
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3001),
            simulator: SimulatorConfig {
                tick_interval_ms: env::var("TICK_INTERVAL_MS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .filter(|v| *v > 0)
                    .unwrap_or(simulator_defaults.tick_interval_ms),
                history_capacity: env::var("HISTORY_CAPACITY")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(simulator_defaults.history_capacity),
                seed_spacing_ms: simulator_defaults.seed_spacing_ms,
            },
            rates: RateSourceConfig {
                api_url: env::var("RATES_API_URL").unwrap_or(rates_defaults.api_url),
                timeout_ms: env::var("RATES_TIMEOUT_MS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(rates_defaults.timeout_ms),
            },
            advisory: AdvisoryConfig {
                api_key: env::var("GEMINI_API_KEY")
                    .or_else(|_| env::var("API_KEY"))
                    .ok()
                    .filter(|k| !k.trim().is_empty()),
                model: env::var("GEMINI_MODEL").unwrap_or(advisory_defaults.model),
                api_url: env::var("GEMINI_API_URL").unwrap_or(advisory_defaults.api_url),
                timeout_ms: env::var("ADVISORY_TIMEOUT_MS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(advisory_defaults.timeout_ms),
                commentary_ttl_secs: env::var("COMMENTARY_CACHE_SECS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(advisory_defaults.commentary_ttl_secs),
            },
            telegram: TelegramConfig {
                bot_token: env::var("TELEGRAM_BOT_TOKEN")
                    .ok()
                    .filter(|t| !t.trim().is_empty()),
                api_url: env::var("TELEGRAM_API_URL").unwrap_or(telegram_defaults.api_url),
            },
        }
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.simulator.tick_interval_ms)
    }

    pub fn rates_timeout(&self) -> Duration {
        Duration::from_millis(self.rates.timeout_ms)
    }

    pub fn commentary_ttl(&self) -> Duration {
        Duration::from_secs(self.advisory.commentary_ttl_secs)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3001,
            simulator: SimulatorConfig::default(),
            rates: RateSourceConfig::default(),
            advisory: AdvisoryConfig::default(),
            telegram: TelegramConfig::default(),
        }
    }
}
