//! AI advisory service.
//!
//! Wraps a generative-language provider behind three calls (commentary,
//! entry timing, quick direction). Every call degrades to the local
//! technical rules in [`fallback`] when the provider is missing, fails, or
//! answers with something unusable.

pub mod fallback;
pub mod gemini;
pub mod prompts;
pub mod sequencer;

pub use gemini::GeminiClient;
pub use sequencer::RequestSequencer;

use crate::error::{AppError, Result};
use crate::services::Cache;
use crate::types::{
    AdvisorySource, Commentary, PairState, PredictionUnit, QuickPrediction, Timeframe,
    TimingReport,
};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// A single text-generation request.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub prompt: String,
    pub max_output_tokens: Option<u32>,
    pub temperature: Option<f32>,
    /// Ask the provider for a JSON document.
    pub json_response: bool,
}

impl GenerationRequest {
    pub fn text(prompt: String) -> Self {
        Self {
            prompt,
            max_output_tokens: None,
            temperature: None,
            json_response: false,
        }
    }
}

/// Generative-language backend.
pub trait AdvisoryProvider: Send + Sync {
    fn name(&self) -> &str;

    /// Generate text for `request`. Empty output is an error.
    fn generate<'a>(
        &'a self,
        request: &'a GenerationRequest,
    ) -> Pin<Box<dyn Future<Output = Result<String>> + Send + 'a>>;
}

/// Advisory calls with caching, fallback and stale-response discarding.
pub struct AdvisoryService {
    provider: Option<Arc<dyn AdvisoryProvider>>,
    commentary_cache: Cache<String>,
    sequencer: RequestSequencer,
}

impl AdvisoryService {
    pub fn new(provider: Option<Arc<dyn AdvisoryProvider>>, commentary_ttl: Duration) -> Self {
        Self {
            provider,
            commentary_cache: Cache::new(commentary_ttl),
            sequencer: RequestSequencer::new(),
        }
    }

    /// Service that only ever uses the technical fallback.
    pub fn offline() -> Self {
        Self::new(None, Duration::from_secs(60))
    }

    pub fn has_provider(&self) -> bool {
        self.provider.is_some()
    }

    async fn ask(&self, request: GenerationRequest) -> Option<String> {
        let provider = self.provider.as_ref()?;
        match provider.generate(&request).await {
            Ok(text) => Some(text),
            Err(e) => {
                warn!("{} advisory fallback: {}", provider.name(), e);
                None
            }
        }
    }

    /// Short market commentary, cached per (symbol, timeframe).
    ///
    /// Only provider answers are cached; fallback text is recomputed so it
    /// tracks the latest oscillator values.
    pub async fn commentary(&self, pair: &PairState, timeframe: Timeframe) -> Commentary {
        let cache_key = format!("{}-{}", pair.key(), timeframe.as_str());
        let now = chrono::Utc::now().timestamp_millis();

        if let Some(text) = self.commentary_cache.get(&cache_key) {
            debug!("Commentary cache hit for {}", cache_key);
            return Commentary {
                symbol: pair.symbol.clone(),
                timeframe,
                text,
                source: AdvisorySource::Cache,
                timestamp: now,
            };
        }

        let request = GenerationRequest {
            max_output_tokens: Some(100),
            ..GenerationRequest::text(prompts::commentary_prompt(pair))
        };

        let (text, source) = match self.ask(request).await {
            Some(text) => {
                let text = text.trim().to_string();
                self.commentary_cache.cleanup();
                self.commentary_cache.set(cache_key, text.clone());
                (text, AdvisorySource::Provider)
            }
            None => (fallback::technical_commentary(pair), AdvisorySource::Fallback),
        };

        Commentary {
            symbol: pair.symbol.clone(),
            timeframe,
            text,
            source,
            timestamp: now,
        }
    }

    /// Structured entry-timing prediction.
    ///
    /// Fails only with [`AppError::Superseded`] when a newer timing request
    /// for the same pair was issued while this one was in flight.
    pub async fn timing(
        &self,
        pair: &PairState,
        timeframe: Timeframe,
        unit: PredictionUnit,
    ) -> Result<TimingReport> {
        let key = format!("timing:{}", pair.key());
        let sequence = self.sequencer.issue(&key);

        let request = GenerationRequest {
            json_response: true,
            ..GenerationRequest::text(prompts::timing_prompt(pair, unit))
        };

        let (prediction, source) = match self.ask(request).await {
            Some(text) => match prompts::parse_timing(&text) {
                Ok(prediction) => (prediction, AdvisorySource::Provider),
                Err(e) => {
                    warn!("Timing reply unusable for {}: {}", pair.symbol, e);
                    (fallback::technical_timing(pair), AdvisorySource::Fallback)
                }
            },
            None => (fallback::technical_timing(pair), AdvisorySource::Fallback),
        };

        self.ensure_current(&key, sequence)?;

        Ok(TimingReport {
            symbol: pair.symbol.clone(),
            timeframe,
            prediction,
            source,
            sequence,
            timestamp: chrono::Utc::now().timestamp_millis(),
        })
    }

    /// Single UP/DOWN call for a short expiry.
    ///
    /// Fails only with [`AppError::Superseded`], like [`Self::timing`].
    pub async fn quick_direction(
        &self,
        pair: &PairState,
        horizon_secs: u64,
    ) -> Result<QuickPrediction> {
        let key = format!("quick:{}", pair.key());
        let sequence = self.sequencer.issue(&key);

        let request = GenerationRequest {
            max_output_tokens: Some(10),
            temperature: Some(0.1),
            ..GenerationRequest::text(prompts::quick_direction_prompt(pair, horizon_secs))
        };

        let (direction, source) = match self.ask(request).await {
            Some(text) => match prompts::parse_direction(&text) {
                Ok(direction) => (direction, AdvisorySource::Provider),
                Err(e) => {
                    warn!("Quick direction reply unusable for {}: {}", pair.symbol, e);
                    (fallback::technical_direction(pair), AdvisorySource::Fallback)
                }
            },
            None => (fallback::technical_direction(pair), AdvisorySource::Fallback),
        };

        self.ensure_current(&key, sequence)?;

        Ok(QuickPrediction {
            symbol: pair.symbol.clone(),
            horizon_secs,
            direction,
            source,
            sequence,
            timestamp: chrono::Utc::now().timestamp_millis(),
        })
    }

    fn ensure_current(&self, key: &str, sequence: u64) -> Result<()> {
        if self.sequencer.is_current(key, sequence) {
            return Ok(());
        }
        let latest = self.sequencer.latest(key).unwrap_or(sequence);
        debug!("Discarding stale response #{} for {} (latest #{})", sequence, key, latest);
        Err(AppError::Superseded { latest })
    }
}
