//! Data Transfer Objects (DTOs) for requests and responses.

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::DateRange;
use crate::error::DomainError;

// ─────────────────────────────────────────────────────────────────────────────
// Currency DTOs
// ─────────────────────────────────────────────────────────────────────────────

/// Request to create a new currency.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateCurrencyRequest {
    /// Display name
    #[schema(example = "US Dollar")]
    pub name: String,
    /// ISO-style code
    #[schema(example = "USD")]
    pub code: String,
}

/// Partial update of a currency. Only present fields are applied.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct UpdateCurrencyRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(example = "United States Dollar")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

/// Outcome of importing the provider's symbol list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ImportSummary {
    /// Currencies inserted
    pub created: usize,
    /// Symbols that could not be inserted (usually already present)
    pub skipped: usize,
}

// ─────────────────────────────────────────────────────────────────────────────
// Rate DTOs
// ─────────────────────────────────────────────────────────────────────────────

/// `start_date` / `end_date` query parameters (`YYYY-MM-DD`).
#[derive(Debug, Clone, Default, Serialize, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct DateRangeQuery {
    #[param(example = "2024-01-01")]
    pub start_date: Option<String>,
    #[param(example = "2024-01-31")]
    pub end_date: Option<String>,
}

impl DateRangeQuery {
    /// Validates both bounds into a [`DateRange`].
    pub fn to_range(&self) -> Result<DateRange, DomainError> {
        match (self.start_date.as_deref(), self.end_date.as_deref()) {
            (Some(start), Some(end)) => DateRange::parse(start, end),
            _ => Err(DomainError::InvalidDateRange(
                "start_date and end_date are required".into(),
            )),
        }
    }
}

/// Comma-separated list of currency codes.
#[derive(Debug, Clone, Default, Serialize, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CodesQuery {
    #[param(example = "USD,EUR")]
    pub code: Option<String>,
}

impl CodesQuery {
    pub fn codes(&self) -> Vec<String> {
        self.code
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(crate::domain::currency::normalize_code)
            .filter(|code| !code.is_empty())
            .collect()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Conversion DTOs
// ─────────────────────────────────────────────────────────────────────────────

/// Conversion query parameters.
#[derive(Debug, Clone, Serialize, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ConvertQuery {
    #[param(example = "USD")]
    pub from: String,
    #[param(example = "EUR")]
    pub to: String,
    #[param(example = 100.0)]
    pub amount: f64,
}

/// Result of a conversion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ConversionResponse {
    #[schema(example = "USD")]
    pub from: String,
    #[schema(example = "EUR")]
    pub to: String,
    #[schema(example = 100.0)]
    pub amount: f64,
    #[schema(example = 90.0)]
    pub result: f64,
}

// ─────────────────────────────────────────────────────────────────────────────
// Pagination
// ─────────────────────────────────────────────────────────────────────────────

pub const DEFAULT_LIMIT: u32 = 10;

/// `skip` / `limit` / `order_by` query parameters.
#[derive(Debug, Clone, Serialize, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PaginationQuery {
    #[serde(default)]
    pub skip: u32,
    #[serde(default = "default_limit")]
    pub limit: u32,
    /// Field to order by; prefix with `-` for descending
    #[param(example = "-created_at")]
    pub order_by: Option<String>,
}

fn default_limit() -> u32 {
    DEFAULT_LIMIT
}

impl Default for PaginationQuery {
    fn default() -> Self {
        Self {
            skip: 0,
            limit: DEFAULT_LIMIT,
            order_by: None,
        }
    }
}

/// Cursor of the following page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Next {
    pub limit: u32,
    pub skip: u32,
}

/// Envelope for collection responses.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Paginated<T> {
    pub limit: u32,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub skip: u32,
    pub total: u64,
    pub count: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_by: Option<String>,
    pub data: Vec<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next: Option<Next>,
}

fn is_zero(value: &u32) -> bool {
    *value == 0
}

impl<T> Paginated<T> {
    /// Builds a scrollable page: `next` is set while `skip + limit < total`.
    /// An unbounded page (`limit == 0`) has no next page.
    pub fn scrollable(data: Vec<T>, skip: u32, limit: u32, total: u64) -> Self {
        let cursor = skip.saturating_add(limit);
        let next = (limit > 0 && u64::from(cursor) < total).then_some(Next {
            limit,
            skip: cursor,
        });

        Self {
            limit,
            skip,
            total,
            count: data.len(),
            order_by: None,
            data,
            next,
        }
    }

    pub fn with_order_by(mut self, order_by: Option<String>) -> Self {
        self.order_by = order_by.filter(|o| !o.is_empty());
        self
    }
}
