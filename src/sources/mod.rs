//! Startup price sources.
//!
//! Base prices come from a one-shot live exchange-rate snapshot when it is
//! reachable, and from a built-in table otherwise.

pub mod exchange_rates;

pub use exchange_rates::ExchangeRateClient;

use crate::error::{AppError, Result};
use crate::types::{PairSeed, SeedOrigin};
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;
use tracing::{info, warn};

/// Currency quotes against a single base currency.
#[derive(Debug, Clone, PartialEq)]
pub struct RateTable {
    base: String,
    rates: HashMap<String, f64>,
}

impl RateTable {
    pub fn new(base: impl Into<String>, rates: HashMap<String, f64>) -> Self {
        Self {
            base: base.into().to_uppercase(),
            rates: rates
                .into_iter()
                .map(|(code, rate)| (code.to_uppercase(), rate))
                .collect(),
        }
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    pub fn len(&self) -> usize {
        self.rates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }

    /// Units of `code` per one unit of the base currency.
    pub fn rate(&self, code: &str) -> Result<f64> {
        let code = code.to_uppercase();
        if code == self.base {
            return Ok(1.0);
        }
        match self.rates.get(&code) {
            Some(rate) if rate.is_finite() && *rate > 0.0 => Ok(*rate),
            Some(rate) => Err(AppError::MalformedPayload(format!(
                "invalid rate for {}: {}",
                code, rate
            ))),
            None => Err(AppError::MalformedPayload(format!("missing rate for {}", code))),
        }
    }
}

/// One-shot source of exchange rates.
pub trait RateProvider: Send + Sync {
    fn name(&self) -> &str;

    fn fetch_rates(&self) -> Pin<Box<dyn Future<Output = Result<RateTable>> + Send + '_>>;
}

/// How a pair's price is derived from USD-based quotes.
#[derive(Debug, Clone, Copy)]
enum Quote {
    /// `1 / rate(code)`, for XXX/USD pairs.
    Inverse(&'static str),
    /// `rate(code)`, for USD/XXX pairs.
    Direct(&'static str),
    /// `rate(numerator) / rate(denominator)`, for crosses.
    Cross(&'static str, &'static str),
}

impl Quote {
    fn price(&self, rates: &RateTable) -> Result<f64> {
        match *self {
            Quote::Inverse(code) => Ok(1.0 / rates.rate(code)?),
            Quote::Direct(code) => rates.rate(code),
            Quote::Cross(numerator, denominator) => {
                Ok(rates.rate(numerator)? / rates.rate(denominator)?)
            }
        }
    }
}

/// Tracked pairs: symbol, derivation from USD quotes, static fallback price.
const PAIRS: [(&str, Quote, f64); 8] = [
    ("EUR/USD OTC", Quote::Inverse("EUR"), 1.05420),
    ("GBP/USD OTC", Quote::Inverse("GBP"), 1.26120),
    ("USD/JPY OTC", Quote::Direct("JPY"), 154.65),
    ("AUD/CAD OTC", Quote::Cross("CAD", "AUD"), 0.91380),
    ("USD/CHF OTC", Quote::Direct("CHF"), 0.88550),
    ("NZD/USD OTC", Quote::Inverse("NZD"), 0.58420),
    ("EUR/JPY OTC", Quote::Cross("JPY", "EUR"), 163.15),
    ("GBP/JPY OTC", Quote::Cross("JPY", "GBP"), 195.35),
];

/// Built-in base prices.
pub fn fallback_seeds() -> Vec<PairSeed> {
    PAIRS
        .iter()
        .map(|(symbol, _, price)| PairSeed::new(*symbol, *price))
        .collect()
}

/// Derive every tracked pair from a USD-based rate table.
///
/// Fails if any required currency is missing or invalid.
pub fn derive_seeds(rates: &RateTable) -> Result<Vec<PairSeed>> {
    if rates.base() != "USD" {
        return Err(AppError::MalformedPayload(format!(
            "expected USD-based rates, got {}",
            rates.base()
        )));
    }

    PAIRS
        .iter()
        .map(|(symbol, quote, _)| {
            let price = quote.price(rates)?;
            if !price.is_finite() || price <= 0.0 {
                return Err(AppError::MalformedPayload(format!(
                    "derived price for {} is invalid: {}",
                    symbol, price
                )));
            }
            Ok(PairSeed::new(*symbol, price))
        })
        .collect()
}

/// Resolve startup base prices, never failing.
///
/// Any provider error, timeout or unusable payload falls back to the static
/// table.
pub async fn load_seeds(
    provider: Option<&dyn RateProvider>,
    timeout: Duration,
) -> (Vec<PairSeed>, SeedOrigin) {
    let Some(provider) = provider else {
        info!("No rate provider configured, using fallback prices");
        return (fallback_seeds(), SeedOrigin::Fallback);
    };

    let fetched = match tokio::time::timeout(timeout, provider.fetch_rates()).await {
        Ok(result) => result,
        Err(_) => Err(AppError::ExternalApi(format!(
            "{} timed out after {}ms",
            provider.name(),
            timeout.as_millis()
        ))),
    };

    match fetched.and_then(|rates| derive_seeds(&rates)) {
        Ok(seeds) => {
            info!("Seeded {} pairs from live rates ({})", seeds.len(), provider.name());
            (seeds, SeedOrigin::Live)
        }
        Err(e) => {
            warn!("Live rates unavailable, using fallback prices: {}", e);
            (fallback_seeds(), SeedOrigin::Fallback)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn usd_rates(pairs: &[(&str, f64)]) -> RateTable {
        RateTable::new(
            "USD",
            pairs.iter().map(|(c, r)| (c.to_string(), *r)).collect(),
        )
    }

    fn full_rates() -> RateTable {
        usd_rates(&[
            ("EUR", 0.8),
            ("GBP", 0.5),
            ("JPY", 150.0),
            ("AUD", 1.5),
            ("CAD", 1.35),
            ("CHF", 0.9),
            ("NZD", 1.6),
        ])
    }

    #[test]
    fn test_fallback_table() {
        let seeds = fallback_seeds();
        assert_eq!(seeds.len(), 8);
        assert_eq!(seeds[0], PairSeed::new("EUR/USD OTC", 1.0542));
        assert_eq!(seeds[7], PairSeed::new("GBP/JPY OTC", 195.35));
    }

    #[test]
    fn test_derive_seeds_arithmetic() {
        let seeds = derive_seeds(&full_rates()).unwrap();
        let price = |symbol: &str| seeds.iter().find(|s| s.symbol == symbol).unwrap().base_price;

        assert!((price("EUR/USD OTC") - 1.25).abs() < 1e-12);
        assert!((price("GBP/USD OTC") - 2.0).abs() < 1e-12);
        assert!((price("USD/JPY OTC") - 150.0).abs() < 1e-12);
        assert!((price("AUD/CAD OTC") - 0.9).abs() < 1e-12);
        assert!((price("USD/CHF OTC") - 0.9).abs() < 1e-12);
        assert!((price("NZD/USD OTC") - 0.625).abs() < 1e-12);
        assert!((price("EUR/JPY OTC") - 187.5).abs() < 1e-9);
        assert!((price("GBP/JPY OTC") - 300.0).abs() < 1e-9);
    }

    #[test]
    fn test_derive_seeds_keeps_symbol_order() {
        let derived: Vec<String> = derive_seeds(&full_rates())
            .unwrap()
            .into_iter()
            .map(|s| s.symbol)
            .collect();
        let fallback: Vec<String> = fallback_seeds().into_iter().map(|s| s.symbol).collect();
        assert_eq!(derived, fallback);
    }

    #[test]
    fn test_derive_seeds_missing_currency() {
        let rates = usd_rates(&[("EUR", 0.8)]);
        assert!(matches!(derive_seeds(&rates), Err(AppError::MalformedPayload(_))));
    }

    #[test]
    fn test_derive_seeds_rejects_zero_rate() {
        let mut rates = full_rates();
        rates.rates.insert("EUR".to_string(), 0.0);
        assert!(derive_seeds(&rates).is_err());
    }

    #[test]
    fn test_derive_seeds_rejects_other_base() {
        let rates = RateTable::new("EUR", full_rates().rates);
        assert!(derive_seeds(&rates).is_err());
    }

    #[test]
    fn test_rate_table_is_case_insensitive() {
        let rates = usd_rates(&[("eur", 0.8)]);
        assert_eq!(rates.rate("EUR").unwrap(), 0.8);
        assert_eq!(rates.rate("usd").unwrap(), 1.0);
    }

    #[tokio::test]
    async fn test_load_seeds_without_provider() {
        let (seeds, origin) = load_seeds(None, Duration::from_millis(10)).await;
        assert_eq!(origin, SeedOrigin::Fallback);
        assert_eq!(seeds, fallback_seeds());
    }
}
