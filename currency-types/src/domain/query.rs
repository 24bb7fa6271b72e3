//! Search filters and ordering accepted by the stores.

use chrono::NaiveDate;

use crate::error::DomainError;

/// Equality filters over the currency catalog. Unset fields match everything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CurrencyFilter {
    pub code: Option<String>,
    /// `code IN (...)`
    pub codes: Option<Vec<String>>,
}

impl CurrencyFilter {
    pub fn by_code(code: impl Into<String>) -> Self {
        Self {
            code: Some(code.into()),
            ..Self::default()
        }
    }

    pub fn by_codes(codes: Vec<String>) -> Self {
        Self {
            codes: Some(codes),
            ..Self::default()
        }
    }
}

/// Equality filters over rate snapshots. Unset fields match everything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RateFilter {
    pub base: Option<String>,
    pub date: Option<NaiveDate>,
}

impl RateFilter {
    pub fn by_base(base: impl Into<String>) -> Self {
        Self {
            base: Some(base.into()),
            date: None,
        }
    }

    pub fn by_base_date(base: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            base: Some(base.into()),
            date: Some(date),
        }
    }
}

/// Sortable columns. Each maps to a fixed column name, so ordering never
/// interpolates caller input into SQL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    CreatedAt,
    UpdatedAt,
    Code,
    Name,
    Base,
    Date,
}

impl SortField {
    pub fn column(&self) -> &'static str {
        match self {
            SortField::CreatedAt => "created_at",
            SortField::UpdatedAt => "updated_at",
            SortField::Code => "code",
            SortField::Name => "name",
            SortField::Base => "base",
            SortField::Date => "date",
        }
    }
}

/// Ordering in the `"-created_at"` notation: a leading `-` means descending.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sort {
    pub field: SortField,
    pub descending: bool,
}

impl Default for Sort {
    /// Newest first.
    fn default() -> Self {
        Self {
            field: SortField::CreatedAt,
            descending: true,
        }
    }
}

const CURRENCY_FIELDS: &[SortField] = &[
    SortField::CreatedAt,
    SortField::UpdatedAt,
    SortField::Code,
    SortField::Name,
];

const RATE_FIELDS: &[SortField] = &[
    SortField::CreatedAt,
    SortField::UpdatedAt,
    SortField::Base,
    SortField::Date,
];

impl Sort {
    pub fn asc(field: SortField) -> Self {
        Self {
            field,
            descending: false,
        }
    }

    pub fn desc(field: SortField) -> Self {
        Self {
            field,
            descending: true,
        }
    }

    /// Parses an order string for the currency catalog.
    pub fn for_currencies(order_by: Option<&str>) -> Result<Self, DomainError> {
        Self::parse(order_by, CURRENCY_FIELDS)
    }

    /// Parses an order string for rate snapshots.
    pub fn for_rates(order_by: Option<&str>) -> Result<Self, DomainError> {
        Self::parse(order_by, RATE_FIELDS)
    }

    fn parse(order_by: Option<&str>, allowed: &[SortField]) -> Result<Self, DomainError> {
        let raw = order_by.map(str::trim).unwrap_or_default();
        if raw.is_empty() {
            return Ok(Self::default());
        }

        let (descending, name) = match raw.strip_prefix('-') {
            Some(name) => (true, name),
            None => (false, raw),
        };

        allowed
            .iter()
            .find(|field| field.column() == name)
            .map(|&field| Self { field, descending })
            .ok_or_else(|| DomainError::ValidationError(format!("Cannot order by {raw:?}")))
    }

    /// `ORDER BY` body, e.g. `created_at DESC`.
    pub fn to_sql(&self) -> String {
        let direction = if self.descending { "DESC" } else { "ASC" };
        format!("{} {}", self.field.column(), direction)
    }
}
