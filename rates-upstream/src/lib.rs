//! Upstream exchange rate providers.
//!
//! Adapters implementing the [`RateClient`] port:
//! - [`FreeCurrencyClient`] - freecurrencyapi.com over HTTP
//! - [`StaticRateClient`] - fixed reference table for development and testing
//!
//! [`Upstream`] selects one of them at runtime.
//!
//! # Example
//! ```
//! use rates_types::{CurrencyCode, RateClient};
//! use rates_upstream::StaticRateClient;
//!
//! # async fn demo() -> Result<(), rates_types::UpstreamError> {
//! let client = StaticRateClient::default();
//! let usd: CurrencyCode = "USD".parse().unwrap();
//! let eur: CurrencyCode = "EUR".parse().unwrap();
//! let rates = client.fetch(&usd, &[eur]).await?;
//! assert!(rates.contains_key("EUR"));
//! # Ok(())
//! # }
//! ```

mod fixed;
mod freecurrency;

pub use fixed::{REFERENCE_RATES, StaticRateClient};
pub use freecurrency::{DEFAULT_API_URL, DEFAULT_TIMEOUT, FreeCurrencyClient, parse_body};

use async_trait::async_trait;
use rates_types::{CurrencyCode, RateClient, UpstreamError, UpstreamRates};

/// Runtime-selected upstream provider.
pub enum Upstream {
    FreeCurrency(FreeCurrencyClient),
    Static(StaticRateClient),
}

impl Upstream {
    pub fn name(&self) -> &'static str {
        match self {
            Upstream::FreeCurrency(_) => "freecurrencyapi",
            Upstream::Static(_) => "static",
        }
    }
}

#[async_trait]
impl RateClient for Upstream {
    async fn fetch(
        &self,
        base: &CurrencyCode,
        quotes: &[CurrencyCode],
    ) -> Result<UpstreamRates, UpstreamError> {
        match self {
            Upstream::FreeCurrency(client) => client.fetch(base, quotes).await,
            Upstream::Static(client) => client.fetch(base, quotes).await,
        }
    }
}
