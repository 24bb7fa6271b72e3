//! Domain models for the currency service.

pub mod currency;
pub mod date_range;
pub mod query;
pub mod rate;

pub use currency::{Currency, CurrencyId};
pub use date_range::DateRange;
pub use query::{CurrencyFilter, RateFilter, Sort, SortField};
pub use rate::{Rate, RateId, Rates};
