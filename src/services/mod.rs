pub mod advisory;
pub mod cache;
pub mod notifier;
pub mod simulator;

pub use advisory::{AdvisoryProvider, AdvisoryService, GeminiClient, GenerationRequest};
pub use cache::Cache;
pub use notifier::{format_signal_message, NotificationSink, TelegramNotifier};
pub use simulator::{Clock, FeedEvent, ManualClock, MarketFeed, MarketSimulator, SystemClock};
