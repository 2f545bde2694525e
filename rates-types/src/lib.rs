//! # Rates Types
//!
//! Domain types and port traits for the currency rate aggregation service.
//! This crate has ZERO external IO dependencies - only data structures,
//! business rules, and trait definitions.
//!
//! ## Architecture
//!
//! This crate represents the **innermost core** of the hexagonal architecture:
//! - `domain/` - Pure domain types (CurrencyCode, Pair, RateGroup, RateObservation)
//! - `ports/` - Trait definitions that adapters must implement
//! - `dto/` - Data Transfer Objects for API boundaries
//! - `error/` - Domain and adapter error types

pub mod domain;
pub mod dto;
pub mod error;
pub mod ports;

// Re-export commonly used types
pub use domain::{
    CacheTtl, CurrencyCode, GroupReport, GroupStatus, Pair, RateGroup, RateMap, RateObservation,
    RateResult, RatesReport, cache_key,
};
pub use dto::*;
pub use error::{AppError, CacheError, DomainError, RepoError, UpstreamError};
pub use ports::{CacheStore, RateClient, RateStore, UpstreamRates};
