use super::{RateProvider, RateTable};
use crate::error::{AppError, Result};
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;
use tracing::{debug, info};

const BASE_CURRENCY: &str = "USD";

/// open.er-api.com latest-rates payload.
#[derive(Debug, Deserialize)]
struct LatestRatesResponse {
    result: String,
    base_code: Option<String>,
    rates: Option<HashMap<String, f64>>,
    #[serde(rename = "error-type")]
    error_type: Option<String>,
}

/// Open exchange-rate API client (no key required).
#[derive(Clone)]
pub struct ExchangeRateClient {
    client: Client,
    api_url: String,
}

impl ExchangeRateClient {
    pub fn new(api_url: impl Into<String>, timeout: Duration) -> Self {
        let client = Client::builder()
            .user_agent("PocketSignal/0.1 (OTC signal simulator)")
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            api_url: api_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn latest_url(&self) -> String {
        format!("{}/v6/latest/{}", self.api_url, BASE_CURRENCY)
    }

    async fn fetch_latest(&self) -> Result<RateTable> {
        let url = self.latest_url();
        debug!("Fetching exchange rates from {}", url);

        let response = self
            .client
            .get(&url)
            .header("Accept", "application/json")
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(AppError::ExternalApi(format!(
                "exchange-rate API returned {}",
                response.status()
            )));
        }

        let body: LatestRatesResponse = response.json().await?;
        let table = parse_latest(body)?;
        info!("Fetched {} exchange rates against {}", table.len(), table.base());
        Ok(table)
    }
}

fn parse_latest(body: LatestRatesResponse) -> Result<RateTable> {
    if body.result != "success" {
        return Err(AppError::ExternalApi(format!(
            "exchange-rate API reported {}: {}",
            body.result,
            body.error_type.unwrap_or_else(|| "unknown error".to_string())
        )));
    }

    let rates = body
        .rates
        .ok_or_else(|| AppError::MalformedPayload("missing rates table".to_string()))?;
    let base = body.base_code.unwrap_or_else(|| BASE_CURRENCY.to_string());

    Ok(RateTable::new(base, rates))
}

impl RateProvider for ExchangeRateClient {
    fn name(&self) -> &str {
        "open.er-api.com"
    }

    fn fetch_rates(&self) -> Pin<Box<dyn Future<Output = Result<RateTable>> + Send + '_>> {
        Box::pin(self.fetch_latest())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_success_payload() {
        let body: LatestRatesResponse = serde_json::from_str(
            r#"{"result":"success","base_code":"USD","rates":{"USD":1,"EUR":0.92,"JPY":151.3}}"#,
        )
        .unwrap();
        let table = parse_latest(body).unwrap();
        assert_eq!(table.base(), "USD");
        assert_eq!(table.rate("EUR").unwrap(), 0.92);
    }

    #[test]
    fn test_parse_error_payload() {
        let body: LatestRatesResponse =
            serde_json::from_str(r#"{"result":"error","error-type":"unsupported-code"}"#).unwrap();
        let err = parse_latest(body).unwrap_err();
        assert!(err.to_string().contains("unsupported-code"));
    }

    #[test]
    fn test_parse_missing_rates() {
        let body: LatestRatesResponse = serde_json::from_str(r#"{"result":"success"}"#).unwrap();
        assert!(matches!(parse_latest(body), Err(AppError::MalformedPayload(_))));
    }

    #[test]
    fn test_latest_url_trims_trailing_slash() {
        let client = ExchangeRateClient::new("http://localhost:9999/", Duration::from_secs(1));
        assert_eq!(client.latest_url(), "http://localhost:9999/v6/latest/USD");
    }

    #[tokio::test]
    async fn test_unreachable_host_is_an_error() {
        let client = ExchangeRateClient::new("http://127.0.0.1:9", Duration::from_millis(200));
        assert!(client.fetch_rates().await.is_err());
    }
}
