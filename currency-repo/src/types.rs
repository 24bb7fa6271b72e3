//! Shared database types with feature-gated fields for SQLite and PostgreSQL.

use sqlx::FromRow;

use currency_types::{Currency, CurrencyId, Rate, RateId, RepoError};

// ─────────────────────────────────────────────────────────────────────────────
// Feature-gated imports
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(not(feature = "sqlite"))]
use chrono::{DateTime, NaiveDate, Utc};
#[cfg(not(feature = "sqlite"))]
use currency_types::Rates;
#[cfg(not(feature = "sqlite"))]
use sqlx::types::Json;
#[cfg(not(feature = "sqlite"))]
use uuid::Uuid;

// ─────────────────────────────────────────────────────────────────────────────
// Database row structs (derive FromRow for automatic mapping)
// ─────────────────────────────────────────────────────────────────────────────

/// Currency row from database.
#[derive(FromRow)]
pub struct DbCurrency {
    #[cfg(not(feature = "sqlite"))]
    pub id: Uuid,
    #[cfg(feature = "sqlite")]
    pub id: String,

    pub name: String,
    pub code: String,

    #[cfg(not(feature = "sqlite"))]
    pub created_at: DateTime<Utc>,
    #[cfg(feature = "sqlite")]
    pub created_at: String,

    #[cfg(not(feature = "sqlite"))]
    pub updated_at: DateTime<Utc>,
    #[cfg(feature = "sqlite")]
    pub updated_at: String,
}

/// Rate snapshot row from database.
#[derive(FromRow)]
pub struct DbRate {
    #[cfg(not(feature = "sqlite"))]
    pub id: Uuid,
    #[cfg(feature = "sqlite")]
    pub id: String,

    pub base: String,

    #[cfg(not(feature = "sqlite"))]
    pub date: NaiveDate,
    #[cfg(feature = "sqlite")]
    pub date: String,

    #[cfg(not(feature = "sqlite"))]
    pub rates: Json<Rates>,
    #[cfg(feature = "sqlite")]
    pub rates: String,

    #[cfg(not(feature = "sqlite"))]
    pub created_at: DateTime<Utc>,
    #[cfg(feature = "sqlite")]
    pub created_at: String,

    #[cfg(not(feature = "sqlite"))]
    pub updated_at: DateTime<Utc>,
    #[cfg(feature = "sqlite")]
    pub updated_at: String,
}

// ─────────────────────────────────────────────────────────────────────────────
// SQLite text encodings
// ─────────────────────────────────────────────────────────────────────────────

/// Fixed-width RFC 3339 so that text ordering matches time ordering.
#[cfg(feature = "sqlite")]
pub fn timestamp_to_text(ts: chrono::DateTime<chrono::Utc>) -> String {
    ts.to_rfc3339_opts(chrono::SecondsFormat::Micros, true)
}

#[cfg(feature = "sqlite")]
pub fn date_to_text(date: chrono::NaiveDate) -> String {
    date.format(currency_types::domain::date_range::DATE_FORMAT)
        .to_string()
}

#[cfg(feature = "sqlite")]
fn parse_uuid(s: &str) -> Result<uuid::Uuid, RepoError> {
    uuid::Uuid::parse_str(s).map_err(|e| RepoError::Database(e.to_string()))
}

#[cfg(feature = "sqlite")]
fn parse_timestamp(s: &str) -> Result<chrono::DateTime<chrono::Utc>, RepoError> {
    Ok(chrono::DateTime::parse_from_rfc3339(s)
        .map_err(|e| RepoError::Database(e.to_string()))?
        .with_timezone(&chrono::Utc))
}

// ─────────────────────────────────────────────────────────────────────────────
// Domain conversion (feature-gated implementations)
// ─────────────────────────────────────────────────────────────────────────────

impl DbCurrency {
    /// Convert database row to domain Currency.
    pub fn into_domain(self) -> Result<Currency, RepoError> {
        #[cfg(not(feature = "sqlite"))]
        let (id, created_at, updated_at) = (self.id, self.created_at, self.updated_at);

        #[cfg(feature = "sqlite")]
        let (id, created_at, updated_at) = (
            parse_uuid(&self.id)?,
            parse_timestamp(&self.created_at)?,
            parse_timestamp(&self.updated_at)?,
        );

        Ok(Currency::from_parts(
            CurrencyId::from_uuid(id),
            self.name,
            self.code,
            created_at,
            updated_at,
        ))
    }
}

impl DbRate {
    /// Convert database row to domain Rate.
    pub fn into_domain(self) -> Result<Rate, RepoError> {
        #[cfg(not(feature = "sqlite"))]
        let (id, date, rates, created_at, updated_at) = (
            self.id,
            self.date,
            self.rates.0,
            self.created_at,
            self.updated_at,
        );

        #[cfg(feature = "sqlite")]
        let (id, date, rates, created_at, updated_at) = {
            let date = chrono::NaiveDate::parse_from_str(
                &self.date,
                currency_types::domain::date_range::DATE_FORMAT,
            )
            .map_err(|e| RepoError::Database(e.to_string()))?;
            let rates = serde_json::from_str(&self.rates)
                .map_err(|e| RepoError::Database(e.to_string()))?;
            (
                parse_uuid(&self.id)?,
                date,
                rates,
                parse_timestamp(&self.created_at)?,
                parse_timestamp(&self.updated_at)?,
            )
        };

        Ok(Rate::from_parts(
            RateId::from_uuid(id),
            self.base,
            date,
            rates,
            created_at,
            updated_at,
        ))
    }
}

/// Maps a driver error, surfacing unique-index violations as conflicts.
pub fn map_db_error(err: sqlx::Error) -> RepoError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            RepoError::Conflict(db.message().to_string())
        }
        _ => RepoError::Database(err.to_string()),
    }
}
