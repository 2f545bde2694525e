//! HTTP Inbound Adapter
//!
//! Axum-based HTTP server that drives the rate aggregator.

pub mod handlers;
mod server;

pub use handlers::{parse_pairs, sanitize_pairs};
pub use server::HttpServer;
