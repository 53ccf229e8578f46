use anyhow::Context;
use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use reqwest::Url;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, info, instrument};

use crate::core::currency::{CurrencyPair, FetchedRate, RateProvider};
use crate::core::error::ExchangeError;

/// Every rate the feed reports is relative to this currency.
pub const BASE_CURRENCY: &str = "EUR";

const LATEST_ENDPOINT: &str = "latest";

/// Rate provider for the fixer.io "latest" feed. Cross rates are derived
/// through the fixed EUR base.
pub struct FixerProvider {
    base_url: String,
    access_key: String,
    client: reqwest::Client,
}

impl FixerProvider {
    pub fn new(base_url: &str, access_key: &str, timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent("fxrate/1.0")
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(FixerProvider {
            base_url: base_url.trim_end_matches('/').to_string(),
            access_key: access_key.to_string(),
            client,
        })
    }

    fn latest_url(&self, pair: &CurrencyPair) -> Result<Url, ExchangeError> {
        let symbols = format!("{},{}", pair.from, pair.to);
        Url::parse_with_params(
            &format!("{}/{}", self.base_url, LATEST_ENDPOINT),
            &[
                ("access_key", self.access_key.as_str()),
                ("base", BASE_CURRENCY),
                ("symbols", symbols.as_str()),
            ],
        )
        .map_err(|e| ExchangeError::NetworkError(format!("Invalid feed URL: {e}")))
    }
}

/// Decoded body of a feed response, successful or not.
#[derive(Debug, Deserialize)]
struct FeedSnapshot {
    success: bool,
    timestamp: Option<i64>,
    #[allow(dead_code)]
    base: Option<String>,
    #[serde(default)]
    rates: HashMap<String, f64>,
    error: Option<FeedError>,
}

#[derive(Debug, Deserialize)]
struct FeedError {
    code: i64,
    #[serde(rename = "type")]
    kind: Option<String>,
    info: Option<String>,
}

impl FeedSnapshot {
    fn into_error(self) -> ExchangeError {
        let (code, message) = match self.error {
            Some(error) => (error.code, error.info.or(error.kind)),
            None => (0, None),
        };
        debug!(code, ?message, "Rate feed reported failure");
        ExchangeError::from_api_code(code, Some(message.as_deref().unwrap_or("Unknown error")))
    }

    /// 1 `pair.from` = (`rates[to]` / `rates[from]`) `pair.to`.
    fn cross_rate(&self, pair: &CurrencyPair) -> Result<f64, ExchangeError> {
        let from_rate = self.rates.get(&pair.from).copied().unwrap_or(0.0);
        let to_rate = self.rates.get(&pair.to).copied().unwrap_or(0.0);

        if !(from_rate > 0.0 && to_rate > 0.0) {
            debug!(from_rate, to_rate, "Invalid rates returned for {}", pair);
            return Err(ExchangeError::InvalidResponse);
        }

        let cross_rate = to_rate / from_rate;
        if !cross_rate.is_finite() {
            debug!(from_rate, to_rate, "Cross rate for {} is not finite", pair);
            return Err(ExchangeError::InvalidResponse);
        }
        info!(
            "{} rates - {}: {}, {}: {}. Cross rate: 1 {} = {} {}",
            BASE_CURRENCY, pair.from, from_rate, pair.to, to_rate, pair.from, cross_rate, pair.to
        );
        Ok(cross_rate)
    }
}

#[async_trait]
impl RateProvider for FixerProvider {
    #[instrument(name = "FixerRateFetch", skip(self), fields(pair = %pair))]
    async fn fetch(&self, pair: &CurrencyPair) -> Result<FetchedRate, ExchangeError> {
        if pair.is_identity() {
            debug!("Identity pair, skipping feed request");
            return Ok(FetchedRate {
                pair: pair.clone(),
                rate: 1.0,
                observed_at: Utc::now(),
            });
        }

        let url = self.latest_url(pair)?;
        debug!(
            "Requesting {} rates for {},{} from {}/{}",
            BASE_CURRENCY, pair.from, pair.to, self.base_url, LATEST_ENDPOINT
        );

        let response = self.client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                ExchangeError::NetworkError(format!("Request timed out for {pair}"))
            } else {
                ExchangeError::NetworkError(format!("Request error: {e} for {pair}"))
            }
        })?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| ExchangeError::NetworkError(format!("Failed to read response: {e}")))?;

        let decoded = serde_json::from_str::<FeedSnapshot>(&text);
        if !status.is_success() {
            return Err(match decoded {
                Ok(snapshot) if snapshot.error.is_some() => snapshot.into_error(),
                _ => ExchangeError::from_http_status(status.as_u16(), LATEST_ENDPOINT, None),
            });
        }

        let snapshot = decoded.map_err(|e| {
            ExchangeError::NetworkError(format!("Failed to parse JSON response for {pair}: {e}"))
        })?;

        if !snapshot.success {
            return Err(snapshot.into_error());
        }

        let rate = snapshot.cross_rate(pair)?;
        let observed_at = snapshot
            .timestamp
            .and_then(|ts| Utc.timestamp_opt(ts, 0).single())
            .unwrap_or_else(Utc::now);

        Ok(FetchedRate {
            pair: pair.clone(),
            rate,
            observed_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const TEST_KEY: &str = "test-key";

    fn provider(server: &MockServer) -> FixerProvider {
        FixerProvider::new(&server.uri(), TEST_KEY, Duration::from_secs(5)).unwrap()
    }

    async fn mount_latest(server: &MockServer, symbols: &str, response: ResponseTemplate) {
        Mock::given(method("GET"))
            .and(path("/latest"))
            .and(query_param("access_key", TEST_KEY))
            .and(query_param("base", "EUR"))
            .and(query_param("symbols", symbols))
            .respond_with(response)
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_successful_cross_rate() {
        let mock_server = MockServer::start().await;
        let mock_response = r#"{
            "success": true,
            "timestamp": 1700000000,
            "base": "EUR",
            "date": "2023-11-14",
            "rates": {"USD": 1.1, "GBP": 0.85}
        }"#;
        mount_latest(
            &mock_server,
            "USD,GBP",
            ResponseTemplate::new(200).set_body_string(mock_response),
        )
        .await;

        let fetched = provider(&mock_server)
            .fetch(&CurrencyPair::new("USD", "GBP"))
            .await
            .expect("Failed to get rate");

        let expected = 0.85 / 1.1;
        assert!(((fetched.rate - expected) / expected).abs() < 1e-9);
        assert_eq!(fetched.observed_at.timestamp(), 1_700_000_000);
        assert_eq!(fetched.pair, CurrencyPair::new("USD", "GBP"));
    }

    #[tokio::test]
    async fn test_cross_rate_direction() {
        let mock_server = MockServer::start().await;
        let mock_response = r#"{"success": true, "rates": {"USD": 1.1, "GBP": 0.85}}"#;
        mount_latest(
            &mock_server,
            "GBP,USD",
            ResponseTemplate::new(200).set_body_string(mock_response),
        )
        .await;

        let fetched = provider(&mock_server)
            .fetch(&CurrencyPair::new("GBP", "USD"))
            .await
            .unwrap();
        assert!((fetched.rate - 1.1 / 0.85).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_missing_timestamp_uses_now() {
        let mock_server = MockServer::start().await;
        mount_latest(
            &mock_server,
            "USD,GBP",
            ResponseTemplate::new(200)
                .set_body_string(r#"{"success": true, "rates": {"USD": 1.1, "GBP": 0.85}}"#),
        )
        .await;

        let before = Utc::now();
        let fetched = provider(&mock_server)
            .fetch(&CurrencyPair::new("USD", "GBP"))
            .await
            .unwrap();
        assert!(fetched.observed_at >= before);
    }

    #[tokio::test]
    async fn test_identity_pair_skips_network() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .expect(0)
            .mount(&mock_server)
            .await;

        let fetched = provider(&mock_server)
            .fetch(&CurrencyPair::new("USD", "USD"))
            .await
            .unwrap();
        assert_eq!(fetched.rate, 1.0);
    }

    #[tokio::test]
    async fn test_non_positive_rate_is_invalid_response() {
        let mock_server = MockServer::start().await;
        mount_latest(
            &mock_server,
            "USD,GBP",
            ResponseTemplate::new(200)
                .set_body_string(r#"{"success": true, "rates": {"USD": 0, "GBP": 0.85}}"#),
        )
        .await;

        let result = provider(&mock_server)
            .fetch(&CurrencyPair::new("USD", "GBP"))
            .await;
        assert_eq!(result.unwrap_err(), ExchangeError::InvalidResponse);
    }

    #[tokio::test]
    async fn test_overflowing_cross_rate_is_invalid_response() {
        let mock_server = MockServer::start().await;
        mount_latest(
            &mock_server,
            "USD,GBP",
            ResponseTemplate::new(200)
                .set_body_string(r#"{"success": true, "rates": {"USD": 1e-310, "GBP": 1e10}}"#),
        )
        .await;

        let result = provider(&mock_server)
            .fetch(&CurrencyPair::new("USD", "GBP"))
            .await;
        assert_eq!(result.unwrap_err(), ExchangeError::InvalidResponse);
    }

    #[tokio::test]
    async fn test_missing_rate_is_invalid_response() {
        let mock_server = MockServer::start().await;
        mount_latest(
            &mock_server,
            "USD,XYZ",
            ResponseTemplate::new(200)
                .set_body_string(r#"{"success": true, "rates": {"USD": 1.1}}"#),
        )
        .await;

        let result = provider(&mock_server)
            .fetch(&CurrencyPair::new("USD", "XYZ"))
            .await;
        assert_eq!(result.unwrap_err(), ExchangeError::InvalidResponse);
    }

    #[tokio::test]
    async fn test_feed_error_codes() {
        let cases = [
            (104, ExchangeError::RateLimitExceeded),
            (105, ExchangeError::FunctionAccessRestricted),
            (601, ExchangeError::InvalidBaseCurrency),
            (
                999,
                ExchangeError::ApiError("Something unusual happened".to_string()),
            ),
        ];

        for (code, expected) in cases {
            let mock_server = MockServer::start().await;
            let body = format!(
                r#"{{"success": false, "error": {{"code": {code}, "type": "some_error", "info": "Something unusual happened"}}}}"#
            );
            mount_latest(
                &mock_server,
                "USD,GBP",
                ResponseTemplate::new(200).set_body_string(body),
            )
            .await;

            let result = provider(&mock_server)
                .fetch(&CurrencyPair::new("USD", "GBP"))
                .await;
            assert_eq!(result.unwrap_err(), expected, "code {code}");
        }
    }

    #[tokio::test]
    async fn test_feed_error_without_info() {
        let mock_server = MockServer::start().await;
        mount_latest(
            &mock_server,
            "USD,GBP",
            ResponseTemplate::new(200).set_body_string(r#"{"success": false}"#),
        )
        .await;

        let result = provider(&mock_server)
            .fetch(&CurrencyPair::new("USD", "GBP"))
            .await;
        assert_eq!(
            result.unwrap_err(),
            ExchangeError::ApiError("Unknown error".to_string())
        );
    }

    #[tokio::test]
    async fn test_http_status_errors() {
        let cases: [(u16, ExchangeError); 6] = [
            (400, ExchangeError::BadRequest("latest".to_string())),
            (401, ExchangeError::Unauthorized),
            (403, ExchangeError::Forbidden),
            (404, ExchangeError::NotFound("resource".to_string())),
            (429, ExchangeError::TooManyRequests),
            (
                500,
                ExchangeError::NetworkError("Connection error (Status: 500)".to_string()),
            ),
        ];

        for (status, expected) in cases {
            let mock_server = MockServer::start().await;
            mount_latest(&mock_server, "USD,GBP", ResponseTemplate::new(status)).await;

            let result = provider(&mock_server)
                .fetch(&CurrencyPair::new("USD", "GBP"))
                .await;
            assert_eq!(result.unwrap_err(), expected, "status {status}");
        }
    }

    #[tokio::test]
    async fn test_malformed_response() {
        let mock_server = MockServer::start().await;
        mount_latest(
            &mock_server,
            "USD,GBP",
            ResponseTemplate::new(200).set_body_string(r#"{"rates": "nope"}"#),
        )
        .await;

        let result = provider(&mock_server)
            .fetch(&CurrencyPair::new("USD", "GBP"))
            .await;
        match result.unwrap_err() {
            ExchangeError::NetworkError(detail) => {
                assert!(detail.contains("Failed to parse JSON response for USD/GBP"))
            }
            other => panic!("Expected NetworkError, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_timeout_is_network_error() {
        let mock_server = MockServer::start().await;
        mount_latest(
            &mock_server,
            "USD,GBP",
            ResponseTemplate::new(200)
                .set_body_string(r#"{"success": true, "rates": {"USD": 1.1, "GBP": 0.85}}"#)
                .set_delay(Duration::from_millis(500)),
        )
        .await;

        let provider =
            FixerProvider::new(&mock_server.uri(), TEST_KEY, Duration::from_millis(50)).unwrap();
        let result = provider.fetch(&CurrencyPair::new("USD", "GBP")).await;
        assert!(matches!(result, Err(ExchangeError::NetworkError(_))));
    }

    #[tokio::test]
    async fn test_connection_refused_is_network_error() {
        // Nothing listens on the discard port
        let provider =
            FixerProvider::new("http://127.0.0.1:9", TEST_KEY, Duration::from_secs(1)).unwrap();
        let result = provider.fetch(&CurrencyPair::new("USD", "GBP")).await;
        assert!(matches!(result, Err(ExchangeError::NetworkError(_))));
    }
}
