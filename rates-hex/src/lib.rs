//! # Rates Hex
//!
//! Application service layer and HTTP adapter for the currency rates service.
//!
//! ## Architecture
//!
//! - `service` - [`RateAggregator`], the cache / upstream / store orchestration
//! - `inbound/` - HTTP adapter (Axum server)
//! - `openapi` - OpenAPI document served next to the API
//!
//! The aggregator is generic over `C: RateClient` and `S: RateStore`, so
//! adapters are injected at compile time; the cache is a runtime
//! `Arc<dyn CacheStore>` because it is optional.

pub mod inbound;
pub mod openapi;
pub mod service;


pub use service::{AggregatorSettings, DEFAULT_CACHE_TTL, DEFAULT_UPSTREAM_TIMEOUT, RateAggregator};
