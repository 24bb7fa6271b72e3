//! # Currency Hex
//!
//! Application service layer, rate provider client and HTTP adapter for the
//! currency reference service.
//!
//! ## Architecture
//!
//! - `service/` - Application service (catalog, rate acquisition, conversion)
//! - `inbound/` - HTTP adapter (Axum server)
//! - `outbound/` - Fixer rate provider client
//!
//! The service is generic over `R: Store` and `P: RateProvider`, allowing
//! different store and provider implementations to be injected.

pub mod inbound;
mod locks;
pub mod openapi;
pub mod outbound;
pub mod service;


pub use outbound::FixerClient;
pub use service::CurrencyService;
