//! Rate observations and caller-facing rate results.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use utoipa::ToSchema;

use super::currency::{CurrencyCode, Pair};

/// Normalized rates of one group: quote -> rate, ordered by quote code.
///
/// This is also the cache payload, serialized as a JSON object.
pub type RateMap = BTreeMap<CurrencyCode, f64>;

/// One historical rate, as appended to the persistent store.
///
/// Observations are immutable. The store is a log: several observations of
/// the same pair accumulate over time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateObservation {
    pub base: CurrencyCode,
    pub quote: CurrencyCode,
    pub rate: f64,
    pub fetched_at: DateTime<Utc>,
}

impl RateObservation {
    pub fn new(pair: Pair, rate: f64, fetched_at: DateTime<Utc>) -> Self {
        Self {
            base: pair.base,
            quote: pair.quote,
            rate,
            fetched_at,
        }
    }

    /// Builds one observation per quote, all stamped with the same time.
    pub fn batch(base: CurrencyCode, rates: &RateMap, fetched_at: DateTime<Utc>) -> Vec<Self> {
        rates
            .iter()
            .map(|(quote, rate)| Self::new(Pair::new(base, *quote), *rate, fetched_at))
            .collect()
    }

    pub fn pair(&self) -> Pair {
        Pair::new(self.base, self.quote)
    }
}

/// A resolved rate returned to callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct RateResult {
    /// `BASE:QUOTE`
    #[schema(example = "USD:EUR")]
    pub pair: String,
    #[schema(value_type = String, example = "USD")]
    pub base: CurrencyCode,
    #[schema(value_type = String, example = "EUR")]
    pub quote: CurrencyCode,
    /// Units of `quote` per one unit of `base`
    #[schema(example = 0.92)]
    pub rate: f64,
    pub fetched_at: DateTime<Utc>,
}

impl RateResult {
    pub fn new(pair: Pair, rate: f64, fetched_at: DateTime<Utc>) -> Self {
        Self {
            pair: pair.to_string(),
            base: pair.base,
            quote: pair.quote,
            rate,
            fetched_at,
        }
    }
}
