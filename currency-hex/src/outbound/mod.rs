//! Outbound adapters.
//!
//! Clients the application layer drives through the port traits.

mod fixer;

pub use fixer::{DEFAULT_FIXER_URL, DEFAULT_TIMEOUT, FixerClient};
