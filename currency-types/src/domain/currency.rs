//! Currency domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::dto::UpdateCurrencyRequest;
use crate::error::DomainError;

/// Unique identifier for a Currency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct CurrencyId(Uuid);

impl CurrencyId {
    /// Creates a new random CurrencyId.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a CurrencyId from an existing UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }

    /// Returns the UUID value.
    pub fn into_uuid(self) -> Uuid {
        self.0
    }
}

impl Default for CurrencyId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for CurrencyId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for CurrencyId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// Normalizes a currency code: trimmed and upper-cased.
pub fn normalize_code(code: &str) -> String {
    code.trim().to_uppercase()
}

/// A currency known to the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Currency {
    /// Unique identifier
    pub id: CurrencyId,
    /// Display name
    #[schema(example = "US Dollar")]
    pub name: String,
    /// ISO-style code, unique across the catalog
    #[schema(example = "USD")]
    pub code: String,
    /// When the currency was created
    #[schema(value_type = String, example = "2024-01-01T00:00:00Z")]
    pub created_at: DateTime<Utc>,
    /// When the currency was last updated
    #[schema(value_type = String, example = "2024-01-01T00:00:00Z")]
    pub updated_at: DateTime<Utc>,
}

impl Currency {
    /// Creates a new currency with fresh id and timestamps.
    ///
    /// # Validation
    /// - Name cannot be empty
    /// - Code cannot be empty; it is stored upper-cased
    pub fn new(name: String, code: &str) -> Result<Self, DomainError> {
        let name = name.trim().to_string();
        if name.is_empty() {
            return Err(DomainError::ValidationError(
                "Currency name cannot be empty".into(),
            ));
        }

        let code = normalize_code(code);
        if code.is_empty() {
            return Err(DomainError::ValidationError(
                "Currency code cannot be empty".into(),
            ));
        }

        let now = Utc::now();
        Ok(Self {
            id: CurrencyId::new(),
            name,
            code,
            created_at: now,
            updated_at: now,
        })
    }

    /// Creates a currency with all fields specified (for database reconstruction).
    pub fn from_parts(
        id: CurrencyId,
        name: String,
        code: String,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            name,
            code,
            created_at,
            updated_at,
        }
    }

    /// Applies a partial update. Only `Some` fields overwrite; `updated_at` is refreshed.
    pub fn apply(&mut self, patch: &UpdateCurrencyRequest) -> Result<(), DomainError> {
        if let Some(name) = &patch.name {
            let name = name.trim();
            if name.is_empty() {
                return Err(DomainError::ValidationError(
                    "Currency name cannot be empty".into(),
                ));
            }
            self.name = name.to_string();
        }

        if let Some(code) = &patch.code {
            let code = normalize_code(code);
            if code.is_empty() {
                return Err(DomainError::ValidationError(
                    "Currency code cannot be empty".into(),
                ));
            }
            self.code = code;
        }

        self.updated_at = Utc::now();
        Ok(())
    }
}
