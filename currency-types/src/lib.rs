//! # Currency Types
//!
//! Domain types and port traits for the currency reference service.
//! This crate has ZERO external IO dependencies - only data structures,
//! validation rules, and trait definitions.
//!
//! ## Architecture
//!
//! This crate represents the **innermost core** of the hexagonal architecture:
//! - `domain/` - Pure domain types (Currency, Rate, DateRange, query shapes)
//! - `ports/` - Trait definitions that adapters must implement
//! - `dto/` - Data Transfer Objects for API boundaries
//! - `error/` - Domain and application error types

pub mod domain;
pub mod dto;
pub mod error;
pub mod ports;

// Re-export commonly used types
pub use domain::{
    Currency, CurrencyFilter, CurrencyId, DateRange, Rate, RateFilter, RateId, Rates, Sort,
    SortField,
};
pub use dto::*;
pub use error::{AppError, DomainError, RepoError};
pub use ports::{
    CurrencyRepository, LatestRates, ProviderError, RateProvider, RateRepository, Store,
    TimeSeriesRates,
};
