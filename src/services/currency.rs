use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::{debug, error};

use crate::errors::ServiceError;

/// Source of exchange rates for cross-currency transfers.
///
/// Implementations must be side-effect free: a rate lookup happens before any
/// balance is touched, and a failed lookup aborts the transfer with
/// `ConversionUnavailable`.
#[async_trait]
pub trait CurrencyConverter: Send + Sync {
    /// Rate multiplier from `from` to `to`. Both are ISO 4217 codes.
    async fn rate(&self, from: &str, to: &str) -> Result<Decimal, ServiceError>;

    /// Converts `amount` from one currency to another. Same-currency
    /// conversions never hit the rate source.
    async fn convert(&self, amount: Decimal, from: &str, to: &str) -> Result<Decimal, ServiceError> {
        if from == to {
            return Ok(amount);
        }
        let rate = self.rate(from, to).await?;
        Ok((amount * rate).round_dp(4))
    }
}

#[derive(Debug, Deserialize)]
struct RatesDocument {
    rates: HashMap<String, Decimal>,
}

/// Rate source backed by the public exchangerate-api document endpoint:
/// one GET per base currency returning every quote in a `rates` map.
pub struct ExchangeRateClient {
    http: reqwest::Client,
    base_url: String,
}

impl ExchangeRateClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ServiceError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ServiceError::InternalError(format!("http client init failed: {}", e)))?;
        Ok(Self {
            http,
            base_url: base_url.into(),
        })
    }
}

#[async_trait]
impl CurrencyConverter for ExchangeRateClient {
    async fn rate(&self, from: &str, to: &str) -> Result<Decimal, ServiceError> {
        let url = format!("{}/{}", self.base_url.trim_end_matches('/'), from);
        debug!(%url, from, to, "fetching exchange rate");

        let response = self.http.get(&url).send().await.map_err(|e| {
            error!(from, to, "exchange rate request failed: {}", e);
            ServiceError::ConversionUnavailable(format!("rate source unreachable for {}", from))
        })?;

        if !response.status().is_success() {
            error!(from, to, status = %response.status(), "exchange rate request rejected");
            return Err(ServiceError::ConversionUnavailable(format!(
                "rate source returned {} for {}",
                response.status(),
                from
            )));
        }

        let document: RatesDocument = response.json().await.map_err(|e| {
            error!(from, to, "exchange rate response unreadable: {}", e);
            ServiceError::ConversionUnavailable(format!("malformed rate document for {}", from))
        })?;

        document
            .rates
            .get(to)
            .copied()
            .ok_or_else(|| {
                ServiceError::ConversionUnavailable(format!("no rate from {} to {}", from, to))
            })
    }
}

/// Deterministic converter for tests and offline development. Rates are
/// looked up as `(from, to)` pairs; missing pairs fail like a dead source.
#[derive(Default)]
pub struct FixedRateConverter {
    rates: HashMap<(String, String), Decimal>,
}

impl FixedRateConverter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rate(mut self, from: &str, to: &str, rate: Decimal) -> Self {
        self.rates.insert((from.to_string(), to.to_string()), rate);
        self
    }
}

#[async_trait]
impl CurrencyConverter for FixedRateConverter {
    async fn rate(&self, from: &str, to: &str) -> Result<Decimal, ServiceError> {
        self.rates
            .get(&(from.to_string(), to.to_string()))
            .copied()
            .ok_or_else(|| {
                ServiceError::ConversionUnavailable(format!("no rate from {} to {}", from, to))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn same_currency_skips_rate_source() {
        // No rates configured, so any lookup would fail.
        let converter = FixedRateConverter::new();
        let converted = converter.convert(dec!(25.00), "USD", "USD").await.unwrap();
        assert_eq!(converted, dec!(25.00));
    }

    #[tokio::test]
    async fn fixed_converter_applies_rate() {
        let converter = FixedRateConverter::new().with_rate("USD", "EUR", dec!(0.9));
        let converted = converter.convert(dec!(100.00), "USD", "EUR").await.unwrap();
        assert_eq!(converted, dec!(90.00));
    }

    #[tokio::test]
    async fn missing_pair_is_unavailable() {
        let converter = FixedRateConverter::new();
        let err = converter.convert(dec!(1), "USD", "JPY").await.unwrap_err();
        assert!(matches!(err, ServiceError::ConversionUnavailable(_)));
    }

    #[tokio::test]
    async fn client_parses_rates_document() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/USD"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "base": "USD",
                "rates": { "EUR": 0.9, "GBP": 0.78 }
            })))
            .mount(&server)
            .await;

        let client = ExchangeRateClient::new(server.uri(), Duration::from_secs(2)).unwrap();
        assert_eq!(client.rate("USD", "EUR").await.unwrap(), dec!(0.9));

        let converted = client.convert(dec!(50.00), "USD", "GBP").await.unwrap();
        assert_eq!(converted, dec!(39.00));
    }

    #[tokio::test]
    async fn client_maps_http_errors_to_unavailable() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/XXX"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let client = ExchangeRateClient::new(server.uri(), Duration::from_secs(2)).unwrap();
        let err = client.rate("XXX", "EUR").await.unwrap_err();
        assert!(matches!(err, ServiceError::ConversionUnavailable(_)));
    }

    #[tokio::test]
    async fn client_rejects_document_without_target_currency() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/USD"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "rates": { "EUR": 0.9 }
            })))
            .mount(&server)
            .await;

        let client = ExchangeRateClient::new(server.uri(), Duration::from_secs(2)).unwrap();
        let err = client.rate("USD", "CHF").await.unwrap_err();
        assert!(matches!(err, ServiceError::ConversionUnavailable(_)));
    }
}
