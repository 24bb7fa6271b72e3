//! Rate snapshot domain model.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use exchange_rates::RateTable;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Target currency code -> units of target per one unit of base.
pub type Rates = BTreeMap<String, f64>;

/// Unique identifier for a Rate snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct RateId(Uuid);

impl RateId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for RateId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RateId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for RateId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// Exchange rates of one base currency on one calendar day.
///
/// `base` refers to a catalog code by value only; nothing guarantees the
/// currency still exists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Rate {
    pub id: RateId,
    #[schema(example = "USD")]
    pub base: String,
    /// Calendar day, `YYYY-MM-DD`
    #[schema(value_type = String, example = "2024-01-01")]
    pub date: NaiveDate,
    #[schema(example = json!({"EUR": 0.9, "JPY": 140.0}))]
    pub rates: Rates,
    #[schema(value_type = String, example = "2024-01-01T00:00:00Z")]
    pub created_at: DateTime<Utc>,
    #[schema(value_type = String, example = "2024-01-01T00:00:00Z")]
    pub updated_at: DateTime<Utc>,
}

impl Rate {
    /// Creates a new snapshot with fresh id and timestamps.
    pub fn new(base: impl Into<String>, date: NaiveDate, rates: Rates) -> Self {
        let now = Utc::now();
        Self {
            id: RateId::new(),
            base: base.into(),
            date,
            rates,
            created_at: now,
            updated_at: now,
        }
    }

    /// Creates a snapshot with all fields specified (for database reconstruction).
    pub fn from_parts(
        id: RateId,
        base: String,
        date: NaiveDate,
        rates: Rates,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            base,
            date,
            rates,
            created_at,
            updated_at,
        }
    }
}

impl RateTable for Rate {
    fn base(&self) -> &str {
        &self.base
    }

    fn rate_for(&self, code: &str) -> Option<f64> {
        self.rates.get(code).copied()
    }
}
