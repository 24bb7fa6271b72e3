//! Fixer.io rate provider.
//!
//! Fixer reports failures either with a non-2xx status or, more often, with
//! HTTP 200 and a `{"success": false, "error": {...}}` body. Both surface as
//! [`ProviderError`]s.

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::Client;
use serde::Deserialize;
use serde::de::DeserializeOwned;

use currency_types::{DateRange, LatestRates, ProviderError, RateProvider, Rates, TimeSeriesRates};

pub const DEFAULT_FIXER_URL: &str = "http://data.fixer.io/api";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

// ─────────────────────────────────────────────────────────────────────────────
// Wire types
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(default = "default_success")]
    success: bool,
    error: Option<FixerError>,
}

fn default_success() -> bool {
    true
}

#[derive(Debug, Default, Deserialize)]
struct FixerError {
    #[serde(default)]
    code: i64,
    #[serde(default, rename = "type")]
    kind: String,
    #[serde(default)]
    info: String,
}

impl From<FixerError> for ProviderError {
    fn from(err: FixerError) -> Self {
        ProviderError::Api {
            code: err.code,
            kind: err.kind,
            info: err.info,
        }
    }
}

#[derive(Debug, Deserialize)]
struct SymbolsResponse {
    symbols: BTreeMap<String, String>,
}

#[derive(Debug, Deserialize)]
struct LatestResponse {
    base: String,
    date: NaiveDate,
    rates: Rates,
}

#[derive(Debug, Deserialize)]
struct TimeSeriesResponse {
    base: String,
    start_date: NaiveDate,
    end_date: NaiveDate,
    rates: BTreeMap<NaiveDate, Rates>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Client
// ─────────────────────────────────────────────────────────────────────────────

/// Fixer API client. Endpoint, key and timeout are fixed at construction.
#[derive(Debug, Clone)]
pub struct FixerClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl FixerClient {
    /// Creates a client for the public Fixer endpoint with the default timeout.
    pub fn new(api_key: impl Into<String>) -> Result<Self, ProviderError> {
        Self::with_timeout(api_key, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ProviderError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            base_url: DEFAULT_FIXER_URL.to_string(),
            api_key: api_key.into(),
        })
    }

    /// Points the client at another endpoint (mirrors, test servers).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, ProviderError> {
        let url = format!("{}/{}", self.base_url, path);
        tracing::debug!(%url, "Requesting rate provider");

        let response = self
            .client
            .get(&url)
            .query(&[("access_key", self.api_key.as_str())])
            .query(query)
            .send()
            .await
            .map_err(|e| ProviderError::Transport(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ProviderError::Transport(e.to_string()))?;

        let envelope = serde_json::from_str::<Envelope>(&body).ok();

        if !status.is_success() {
            return Err(match envelope.and_then(|e| e.error) {
                Some(err) => err.into(),
                None => ProviderError::Status {
                    status: status.as_u16(),
                    body,
                },
            });
        }

        if let Some(Envelope { success: false, error }) = envelope {
            return Err(error.unwrap_or_default().into());
        }

        serde_json::from_str(&body).map_err(|e| ProviderError::Decode(e.to_string()))
    }
}

fn symbols_param(symbols: &[String]) -> Option<(&'static str, String)> {
    (!symbols.is_empty()).then(|| ("symbols", symbols.join(",")))
}

#[async_trait]
impl RateProvider for FixerClient {
    async fn list_symbols(&self) -> Result<BTreeMap<String, String>, ProviderError> {
        let response: SymbolsResponse = self.get("symbols", &[]).await?;
        Ok(response.symbols)
    }

    async fn latest_rates(
        &self,
        base: &str,
        symbols: &[String],
    ) -> Result<LatestRates, ProviderError> {
        let mut query = vec![("base", base.to_string())];
        query.extend(symbols_param(symbols));

        let response: LatestResponse = self.get("latest", &query).await?;
        Ok(LatestRates {
            base: response.base,
            date: response.date,
            rates: response.rates,
        })
    }

    async fn time_series(
        &self,
        base: &str,
        range: DateRange,
        symbols: &[String],
    ) -> Result<TimeSeriesRates, ProviderError> {
        let mut query = vec![
            ("start_date", range.start().to_string()),
            ("end_date", range.end().to_string()),
            ("base", base.to_string()),
        ];
        query.extend(symbols_param(symbols));

        let response: TimeSeriesResponse = self.get("timeseries", &query).await?;
        Ok(TimeSeriesRates {
            base: response.base,
            start_date: response.start_date,
            end_date: response.end_date,
            rates: response.rates,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let client = FixerClient::new("key")
            .unwrap()
            .with_base_url("http://localhost:9999/api/");
        assert_eq!(client.base_url(), "http://localhost:9999/api");
    }

    #[test]
    fn test_symbols_param_omitted_when_empty() {
        assert_eq!(symbols_param(&[]), None);
        assert_eq!(
            symbols_param(&["EUR".to_string(), "JPY".to_string()]),
            Some(("symbols", "EUR,JPY".to_string()))
        );
    }

    #[test]
    fn test_time_series_dates_decode_as_keys() {
        let body = r#"{
            "success": true, "timeseries": true, "base": "USD",
            "start_date": "2024-01-01", "end_date": "2024-01-02",
            "rates": {"2024-01-01": {"EUR": 0.9}, "2024-01-02": {"EUR": 0.91}}
        }"#;
        let parsed: TimeSeriesResponse = serde_json::from_str(body).unwrap();
        let first = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        assert_eq!(parsed.rates.len(), 2);
        assert_eq!(parsed.rates[&first]["EUR"], 0.9);
    }
}
