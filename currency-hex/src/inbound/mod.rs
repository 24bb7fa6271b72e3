//! HTTP Inbound Adapter
//!
//! Axum-based HTTP server that drives the application layer.

pub mod handlers;
mod request_id;
mod server;

pub use request_id::{RequestId, X_REQUEST_ID};
pub use server::HttpServer;
