//! Upstream rate provider port.
//!
//! Implementations can be HTTP clients, fixed tables, test doubles, etc.

use crate::domain::CurrencyCode;
use crate::error::UpstreamError;

/// Raw quote -> value mapping as returned by a provider.
///
/// Values are left as JSON so the aggregator decides what counts as a rate.
pub type UpstreamRates = serde_json::Map<String, serde_json::Value>;

#[async_trait::async_trait]
pub trait RateClient: Send + Sync + 'static {
    /// Fetches the rates of every quote against `base` in a single request.
    async fn fetch(
        &self,
        base: &CurrencyCode,
        quotes: &[CurrencyCode],
    ) -> Result<UpstreamRates, UpstreamError>;
}
