//! Domain models for the currency rates service.

pub mod currency;
pub mod group;
pub mod observation;
pub mod report;

pub use currency::{CurrencyCode, Pair};
pub use group::{CACHE_KEY_PREFIX, CacheTtl, RateGroup, cache_key};
pub use observation::{RateMap, RateObservation, RateResult};
pub use report::{GroupReport, GroupStatus, RatesReport};
