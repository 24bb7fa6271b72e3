//! # Currency Client SDK
//!
//! A typed Rust client for the currency reference API.

use currency_types::{
    ConversionResponse, CreateCurrencyRequest, Currency, ImportSummary, Paginated,
    PaginationQuery, Rate, UpdateCurrencyRequest,
};
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;

/// Error type for client operations.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ClientError {
    /// HTTP status of an API error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Currency API client.
pub struct CurrencyClient {
    base_url: String,
    http: Client,
}

impl CurrencyClient {
    /// Creates a new client.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http: Client::new(),
        }
    }

    /// Checks if the API is healthy.
    pub async fn health(&self) -> Result<bool, ClientError> {
        let resp = self
            .http
            .get(format!("{}/health", self.base_url))
            .send()
            .await?;
        Ok(resp.status().is_success())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Currencies
    // ─────────────────────────────────────────────────────────────────────────

    pub async fn list_currencies(
        &self,
        page: &PaginationQuery,
    ) -> Result<Paginated<Currency>, ClientError> {
        self.send(self.http.get(self.url("/currencies")).query(page))
            .await
    }

    pub async fn create_currency(&self, name: &str, code: &str) -> Result<Currency, ClientError> {
        let req = CreateCurrencyRequest {
            name: name.to_string(),
            code: code.to_string(),
        };
        self.send(self.http.post(self.url("/currencies")).json(&req))
            .await
    }

    /// Seeds the catalog from the provider's symbol list.
    pub async fn import_currencies(&self) -> Result<ImportSummary, ClientError> {
        self.send(self.http.post(self.url("/currencies/import")))
            .await
    }

    pub async fn get_currency(&self, code: &str) -> Result<Currency, ClientError> {
        self.send(self.http.get(self.url(&format!("/currencies/{code}"))))
            .await
    }

    pub async fn update_currency(
        &self,
        code: &str,
        patch: &UpdateCurrencyRequest,
    ) -> Result<Currency, ClientError> {
        self.send(
            self.http
                .patch(self.url(&format!("/currencies/{code}")))
                .json(patch),
        )
        .await
    }

    pub async fn delete_currency(&self, code: &str) -> Result<(), ClientError> {
        self.send_empty(self.http.delete(self.url(&format!("/currencies/{code}"))))
            .await
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Rates
    // ─────────────────────────────────────────────────────────────────────────

    pub async fn list_rates(
        &self,
        code: &str,
        page: &PaginationQuery,
    ) -> Result<Paginated<Rate>, ClientError> {
        self.send(
            self.http
                .get(self.url(&format!("/currencies/{code}/rates")))
                .query(page),
        )
        .await
    }

    /// Today's snapshot for `code`, fetched from the provider if missing.
    pub async fn latest_rate(&self, code: &str) -> Result<Rate, ClientError> {
        self.send(
            self.http
                .post(self.url(&format!("/currencies/{code}/rates/latest"))),
        )
        .await
    }

    /// Starts a background backfill for one currency.
    pub async fn backfill_rates(
        &self,
        code: &str,
        start_date: &str,
        end_date: &str,
    ) -> Result<(), ClientError> {
        self.send_empty(
            self.http
                .post(self.url(&format!("/currencies/{code}/rates")))
                .query(&[("start_date", start_date), ("end_date", end_date)]),
        )
        .await
    }

    /// Starts a background refresh of today's snapshot for every currency.
    pub async fn refresh_all_rates(&self) -> Result<(), ClientError> {
        self.send_empty(self.http.post(self.url("/currencies/rates/latest")))
            .await
    }

    /// Starts a background backfill for every currency.
    pub async fn backfill_all_rates(
        &self,
        start_date: &str,
        end_date: &str,
    ) -> Result<(), ClientError> {
        self.send_empty(
            self.http
                .post(self.url("/currencies/rates"))
                .query(&[("start_date", start_date), ("end_date", end_date)]),
        )
        .await
    }

    pub async fn latest_rates_for_codes(
        &self,
        codes: &[&str],
    ) -> Result<Paginated<Rate>, ClientError> {
        self.send(
            self.http
                .get(self.url("/currencies_rates"))
                .query(&[("code", codes.join(","))]),
        )
        .await
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Conversion
    // ─────────────────────────────────────────────────────────────────────────

    pub async fn convert(
        &self,
        from: &str,
        to: &str,
        amount: f64,
    ) -> Result<ConversionResponse, ClientError> {
        self.conversion("/currency/convert", from, to, amount).await
    }

    pub async fn convert_cross(
        &self,
        from: &str,
        to: &str,
        amount: f64,
    ) -> Result<ConversionResponse, ClientError> {
        self.conversion("/currency/convert/cross", from, to, amount)
            .await
    }

    async fn conversion(
        &self,
        path: &str,
        from: &str,
        to: &str,
        amount: f64,
    ) -> Result<ConversionResponse, ClientError> {
        let amount = amount.to_string();
        self.send(
            self.http
                .get(self.url(path))
                .query(&[("from", from), ("to", to), ("amount", amount.as_str())]),
        )
        .await
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send<T: DeserializeOwned>(&self, req: RequestBuilder) -> Result<T, ClientError> {
        let resp = req.send().await?;
        self.handle_response(resp).await
    }

    async fn send_empty(&self, req: RequestBuilder) -> Result<(), ClientError> {
        let resp = req.send().await?;
        if resp.status().is_success() {
            Ok(())
        } else {
            Err(Self::api_error(resp).await)
        }
    }

    async fn handle_response<T: DeserializeOwned>(
        &self,
        resp: reqwest::Response,
    ) -> Result<T, ClientError> {
        if resp.status().is_success() {
            let body = resp.text().await?;
            Ok(serde_json::from_str(&body)?)
        } else {
            Err(Self::api_error(resp).await)
        }
    }

    async fn api_error(resp: reqwest::Response) -> ClientError {
        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        let message = serde_json::from_str::<serde_json::Value>(&body)
            .ok()
            .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(String::from))
            .unwrap_or(body);
        ClientError::Api {
            status: status.as_u16(),
            message,
        }
    }
}
