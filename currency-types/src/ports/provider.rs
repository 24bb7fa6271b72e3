//! Rate provider port.
//!
//! The orchestrator fetches snapshots through this trait; the Fixer HTTP
//! client is the production adapter.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::{DateRange, Rates};

/// Failures talking to the upstream rate provider.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// Connection, TLS or timeout failure.
    #[error("provider request failed: {0}")]
    Transport(String),

    #[error("provider returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// The provider answered with `success: false`.
    #[error("provider error {code} ({kind}): {info}")]
    Api {
        code: i64,
        kind: String,
        info: String,
    },

    #[error("could not decode provider response: {0}")]
    Decode(String),
}

/// Latest rates for one base as reported by the provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LatestRates {
    pub base: String,
    pub date: NaiveDate,
    pub rates: Rates,
}

/// Daily rates for one base over a window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSeriesRates {
    pub base: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub rates: BTreeMap<NaiveDate, Rates>,
}

/// Source of exchange rate snapshots.
///
/// An empty `symbols` slice asks for every currency the provider knows.
#[async_trait::async_trait]
pub trait RateProvider: Send + Sync + 'static {
    /// Supported currencies as `code -> name`.
    async fn list_symbols(&self) -> Result<BTreeMap<String, String>, ProviderError>;

    async fn latest_rates(
        &self,
        base: &str,
        symbols: &[String],
    ) -> Result<LatestRates, ProviderError>;

    async fn time_series(
        &self,
        base: &str,
        range: DateRange,
        symbols: &[String],
    ) -> Result<TimeSeriesRates, ProviderError>;
}
