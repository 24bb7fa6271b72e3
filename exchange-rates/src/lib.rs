//! Conversion Engine for Base-Currency Rate Tables
//!
//! A rate table is a snapshot of "1 unit of `base` = N units of `code`" for a
//! set of target codes. This crate converts amounts through such a table in
//! two modes:
//!
//! - **Direct**: the table's base *is* the source currency, so the result is
//!   a plain multiplication by the target's rate.
//! - **Cross-rate**: the table is anchored on [`REFERENCE_CURRENCY`] and the
//!   result goes through both legs (`rate[to] / rate[from]`), computed in
//!   decimal arithmetic and rounded to [`CROSS_RATE_SCALE`] places.
//!
//! # Example
//! ```
//! use std::collections::HashMap;
//! use exchange_rates::{RateTable, convert, convert_cross};
//!
//! struct Snapshot {
//!     base: String,
//!     rates: HashMap<String, f64>,
//! }
//!
//! impl RateTable for Snapshot {
//!     fn base(&self) -> &str {
//!         &self.base
//!     }
//!     fn rate_for(&self, code: &str) -> Option<f64> {
//!         self.rates.get(code).copied()
//!     }
//! }
//!
//! let usd = Snapshot {
//!     base: "USD".into(),
//!     rates: HashMap::from([("EUR".into(), 0.9)]),
//! };
//! assert_eq!(convert(&usd, "USD", "EUR", 100.0).unwrap(), 90.0);
//!
//! let eur = Snapshot {
//!     base: "EUR".into(),
//!     rates: HashMap::from([("USD".into(), 1.25), ("GBP".into(), 0.85)]),
//! };
//! assert_eq!(convert_cross(&eur, "USD", "GBP", 10.0).unwrap(), 6.8);
//! ```

use std::collections::HashMap;

use rust_decimal::prelude::*;

/// Anchor currency for cross-rate conversion.
pub const REFERENCE_CURRENCY: &str = "EUR";

/// Fractional digits kept by [`convert_cross`].
pub const CROSS_RATE_SCALE: u32 = 3;

// ─────────────────────────────────────────────────────────────────────────────
// Errors
// ─────────────────────────────────────────────────────────────────────────────

/// Error type for conversion operations.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConversionError {
    #[error("Invalid conversion parameters: {0}")]
    InvalidParameters(String),
}

impl ConversionError {
    fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidParameters(msg.into())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Rate Table
// ─────────────────────────────────────────────────────────────────────────────

/// A base-currency snapshot that conversions can be computed against.
pub trait RateTable {
    /// The currency every rate in this table is relative to.
    fn base(&self) -> &str;

    /// Units of `code` bought by one unit of [`RateTable::base`].
    fn rate_for(&self, code: &str) -> Option<f64>;
}

/// Plain `(base, map)` pair, handy when no domain type is at hand.
impl RateTable for (&str, &HashMap<String, f64>) {
    fn base(&self) -> &str {
        self.0
    }

    fn rate_for(&self, code: &str) -> Option<f64> {
        self.1.get(code).copied()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Conversion Functions
// ─────────────────────────────────────────────────────────────────────────────

fn check_amount(amount: f64) -> Result<(), ConversionError> {
    if !amount.is_finite() || amount < 0.0 {
        return Err(ConversionError::invalid(format!(
            "amount must be a non-negative number, got {amount}"
        )));
    }
    Ok(())
}

fn lookup<T: RateTable + ?Sized>(table: &T, code: &str) -> Result<f64, ConversionError> {
    table.rate_for(code).ok_or_else(|| {
        ConversionError::invalid(format!(
            "no {} rate for {} in snapshot",
            table.base(),
            code
        ))
    })
}

fn to_decimal(value: f64) -> Result<Decimal, ConversionError> {
    Decimal::from_f64(value)
        .ok_or_else(|| ConversionError::invalid(format!("{value} is not representable")))
}

/// Converts `amount` of `from` into `to` using a table whose base is `from`.
///
/// Returns `amount * rate[to]`.
pub fn convert<T: RateTable + ?Sized>(
    table: &T,
    from: &str,
    to: &str,
    amount: f64,
) -> Result<f64, ConversionError> {
    check_amount(amount)?;

    if from != table.base() {
        return Err(ConversionError::invalid(format!(
            "snapshot base is {}, cannot convert from {}",
            table.base(),
            from
        )));
    }

    let to_rate = lookup(table, to)?;
    Ok(to_rate * amount)
}

/// Converts `amount` of `from` into `to` through a [`REFERENCE_CURRENCY`] table.
///
/// Returns `round(amount * rate[to] / rate[from], 3)`.
pub fn convert_cross<T: RateTable + ?Sized>(
    table: &T,
    from: &str,
    to: &str,
    amount: f64,
) -> Result<f64, ConversionError> {
    check_amount(amount)?;

    if table.base() != REFERENCE_CURRENCY {
        return Err(ConversionError::invalid(format!(
            "cross-rate conversion needs a {} snapshot, got {}",
            REFERENCE_CURRENCY,
            table.base()
        )));
    }

    let from_rate = to_decimal(lookup(table, from)?)?;
    let to_rate = to_decimal(lookup(table, to)?)?;
    let amount = to_decimal(amount)?;

    let result = to_rate
        .checked_div(from_rate)
        .and_then(|cross| cross.checked_mul(amount))
        .ok_or_else(|| {
            ConversionError::invalid(format!("cannot derive {to} per {from} from snapshot"))
        })?
        .round_dp_with_strategy(CROSS_RATE_SCALE, RoundingStrategy::MidpointAwayFromZero);

    result
        .to_f64()
        .ok_or_else(|| ConversionError::invalid(format!("{result} does not fit in f64")))
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn table(base: &str, rates: &[(&str, f64)]) -> (String, HashMap<String, f64>) {
        (
            base.to_string(),
            rates.iter().map(|(c, r)| (c.to_string(), *r)).collect(),
        )
    }

    fn convert_with(
        (base, rates): &(String, HashMap<String, f64>),
        from: &str,
        to: &str,
        amount: f64,
    ) -> Result<f64, ConversionError> {
        convert(&(base.as_str(), rates), from, to, amount)
    }

    fn cross_with(
        (base, rates): &(String, HashMap<String, f64>),
        from: &str,
        to: &str,
        amount: f64,
    ) -> Result<f64, ConversionError> {
        convert_cross(&(base.as_str(), rates), from, to, amount)
    }

    #[test]
    fn test_direct_multiplies_by_target_rate() {
        let usd = table("USD", &[("EUR", 0.9), ("JPY", 140.0)]);
        assert_eq!(convert_with(&usd, "USD", "EUR", 100.0).unwrap(), 90.0);
        assert_eq!(convert_with(&usd, "USD", "JPY", 2.5).unwrap(), 350.0);
    }

    #[test]
    fn test_direct_zero_amount() {
        let usd = table("USD", &[("EUR", 0.9)]);
        assert_eq!(convert_with(&usd, "USD", "EUR", 0.0).unwrap(), 0.0);
    }

    #[test]
    fn test_direct_rejects_base_mismatch() {
        let usd = table("USD", &[("EUR", 0.9)]);
        let err = convert_with(&usd, "GBP", "EUR", 100.0).unwrap_err();
        assert!(matches!(err, ConversionError::InvalidParameters(_)));
    }

    #[test]
    fn test_direct_rejects_unknown_target() {
        let usd = table("USD", &[("EUR", 0.9)]);
        let err = convert_with(&usd, "USD", "CHF", 100.0).unwrap_err();
        assert!(matches!(err, ConversionError::InvalidParameters(_)));
    }

    #[test]
    fn test_direct_rejects_negative_amount() {
        let usd = table("USD", &[("EUR", 0.9)]);
        assert!(convert_with(&usd, "USD", "EUR", -1.0).is_err());
        assert!(convert_with(&usd, "USD", "EUR", f64::NAN).is_err());
    }

    #[test]
    fn test_cross_rounds_to_three_places() {
        let eur = table("EUR", &[("USD", 1.1), ("JPY", 140.0)]);
        let result = cross_with(&eur, "USD", "JPY", 100.0).unwrap();
        assert!((result - 12727.273).abs() < 1e-9);
    }

    #[test]
    fn test_cross_via_reference_leg() {
        let eur = table("EUR", &[("EUR", 1.0), ("GBP", 0.85)]);
        assert_eq!(cross_with(&eur, "EUR", "GBP", 10.0).unwrap(), 8.5);
        assert_eq!(cross_with(&eur, "GBP", "EUR", 8.5).unwrap(), 10.0);
    }

    #[test]
    fn test_cross_rounds_midpoint_away_from_zero() {
        // 0.0125 / 5 = 0.0025
        let eur = table("EUR", &[("AAA", 5.0), ("BBB", 0.0125)]);
        assert_eq!(cross_with(&eur, "AAA", "BBB", 1.0).unwrap(), 0.003);
    }

    #[test]
    fn test_cross_rejects_non_reference_base() {
        let usd = table("USD", &[("USD", 1.0), ("EUR", 0.9)]);
        let err = cross_with(&usd, "USD", "EUR", 1.0).unwrap_err();
        assert!(matches!(err, ConversionError::InvalidParameters(_)));
    }

    #[test]
    fn test_cross_rejects_missing_codes() {
        let eur = table("EUR", &[("USD", 1.1)]);
        assert!(cross_with(&eur, "USD", "JPY", 1.0).is_err());
        assert!(cross_with(&eur, "JPY", "USD", 1.0).is_err());
    }

    #[test]
    fn test_cross_rejects_zero_source_rate() {
        let eur = table("EUR", &[("USD", 0.0), ("GBP", 0.85)]);
        assert!(cross_with(&eur, "USD", "GBP", 1.0).is_err());
    }
}
