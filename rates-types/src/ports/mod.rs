//! Port traits (interfaces for adapters).
//!
//! These are the contracts that adapters must implement.
//! The aggregator depends on these traits, not concrete implementations.

mod cache;
mod store;
mod upstream;

pub use cache::CacheStore;
pub use store::RateStore;
pub use upstream::{RateClient, UpstreamRates};
