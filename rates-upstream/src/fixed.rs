//! Fixed reference-rate provider.
//!
//! Serves cross rates derived from a static USD valuation table. Used for
//! local development without an API key and in tests that need a real
//! [`RateClient`] without network access.

use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::{Number, Value};

use rates_types::{CurrencyCode, RateClient, UpstreamError, UpstreamRates};

/// USD value of one unit of each currency.
pub const REFERENCE_RATES: &[(&str, f64)] = &[
    ("USD", 1.0),
    ("EUR", 1.087),
    ("GBP", 1.266),
    ("INR", 0.01203),
    ("JPY", 0.0067),
    ("CHF", 1.13),
    ("CAD", 0.74),
    ("AUD", 0.66),
];

/// Provider answering from an in-memory valuation table.
#[derive(Debug, Clone)]
pub struct StaticRateClient {
    usd_values: HashMap<CurrencyCode, f64>,
}

impl Default for StaticRateClient {
    fn default() -> Self {
        let usd_values = REFERENCE_RATES
            .iter()
            .filter_map(|(code, value)| Some((code.parse().ok()?, *value)))
            .collect();
        Self { usd_values }
    }
}

impl StaticRateClient {
    /// Adds or replaces the USD value of a currency.
    pub fn with_rate(mut self, code: CurrencyCode, usd_value: f64) -> Self {
        self.usd_values.insert(code, usd_value);
        self
    }

    /// Units of `quote` per one unit of `base`.
    pub fn rate(&self, base: &CurrencyCode, quote: &CurrencyCode) -> Option<f64> {
        if base == quote {
            return Some(1.0);
        }
        let base_usd = self.usd_values.get(base)?;
        let quote_usd = self.usd_values.get(quote)?;
        Some(base_usd / quote_usd)
    }
}

#[async_trait]
impl RateClient for StaticRateClient {
    async fn fetch(
        &self,
        base: &CurrencyCode,
        quotes: &[CurrencyCode],
    ) -> Result<UpstreamRates, UpstreamError> {
        // Mirrors the real provider, which rejects an unknown base with 422.
        if !self.usd_values.contains_key(base) {
            return Err(UpstreamError::HttpStatus(422));
        }

        Ok(quotes
            .iter()
            .filter_map(|quote| {
                let rate = Number::from_f64(self.rate(base, quote)?)?;
                Some((quote.to_string(), Value::Number(rate)))
            })
            .collect())
    }
}
