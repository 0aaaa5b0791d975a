use pocketsignal::config::Config;
use pocketsignal::services::{
    AdvisoryProvider, AdvisoryService, GeminiClient, MarketFeed, MarketSimulator,
    NotificationSink, SystemClock, TelegramNotifier,
};
use pocketsignal::sources::{self, ExchangeRateClient, RateProvider};
use pocketsignal::websocket::{self, RoomManager};
use pocketsignal::AppState;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pocketsignal=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Arc::new(Config::from_env());
    info!("Starting PocketSignal on {}:{}", config.host, config.port);

    // Seed prices from live rates, falling back to the static table
    let rates = ExchangeRateClient::new(config.rates.api_url.clone(), config.rates_timeout());
    let provider: &dyn RateProvider = &rates;
    let (seeds, origin) = sources::load_seeds(Some(provider), config.rates_timeout()).await;

    let simulator = MarketSimulator::from_entropy(
        &seeds,
        origin,
        &config.simulator,
        chrono::Utc::now().timestamp_millis(),
    );
    let market = MarketFeed::new(simulator.snapshot());
    market.spawn(simulator, Arc::new(SystemClock), config.tick_interval());

    let room_manager = RoomManager::new();
    websocket::spawn_fanout(market.clone(), room_manager.clone());

    let provider: Option<Arc<dyn AdvisoryProvider>> =
        match GeminiClient::from_config(&config.advisory) {
            Some(client) => {
                info!("Advisory provider enabled ({})", config.advisory.model);
                Some(Arc::new(client))
            }
            None => {
                warn!("No Gemini API key set, advisory runs in relay mode");
                None
            }
        };
    let advisory = Arc::new(AdvisoryService::new(provider, config.commentary_ttl()));

    let notifier: Option<Arc<dyn NotificationSink>> =
        match TelegramNotifier::from_config(&config.telegram) {
            Some(notifier) => {
                info!("Telegram notifications enabled");
                Some(Arc::new(notifier))
            }
            None => {
                info!("TELEGRAM_BOT_TOKEN not set, notifications disabled");
                None
            }
        };

    let state = AppState {
        config: config.clone(),
        market,
        advisory,
        notifier,
        room_manager,
    };

    let app = pocketsignal::app(state);

    // Start the server
    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("PocketSignal listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
