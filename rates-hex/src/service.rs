//! Rate Aggregator
//!
//! Resolves currency pairs through the cache, the upstream provider and the
//! persistent store, all reached through their ports. Contains NO
//! infrastructure logic.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use futures::future::join_all;
use serde_json::Value;
use tracing::{debug, error, warn};

use rates_types::{
    CacheStore, CacheTtl, CurrencyCode, GroupReport, GroupStatus, Pair, RateClient, RateGroup,
    RateMap, RateObservation, RateResult, RateStore, RatesReport, UpstreamError, UpstreamRates,
};

/// Default bound on a single upstream call.
pub const DEFAULT_UPSTREAM_TIMEOUT: Duration = Duration::from_secs(15);

/// Default cache lifetime of a rate entry.
pub const DEFAULT_CACHE_TTL: CacheTtl = CacheTtl::from_secs(300);

/// Tunables of the aggregator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AggregatorSettings {
    pub cache_ttl: CacheTtl,
    pub upstream_timeout: Duration,
}

impl Default for AggregatorSettings {
    fn default() -> Self {
        Self {
            cache_ttl: DEFAULT_CACHE_TTL,
            upstream_timeout: DEFAULT_UPSTREAM_TIMEOUT,
        }
    }
}

/// Application service for rate lookups.
///
/// Generic over the upstream client `C` and the persistent store `S`; the
/// cache is optional and injected with [`RateAggregator::with_cache`].
pub struct RateAggregator<C: RateClient, S: RateStore> {
    client: C,
    store: S,
    cache: Option<Arc<dyn CacheStore>>,
    settings: AggregatorSettings,
}

impl<C: RateClient, S: RateStore> RateAggregator<C, S> {
    /// Creates an aggregator without a cache.
    pub fn new(client: C, store: S, settings: AggregatorSettings) -> Self {
        Self {
            client,
            store,
            cache: None,
            settings,
        }
    }

    /// Attaches a cache store.
    pub fn with_cache(mut self, cache: Arc<dyn CacheStore>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn settings(&self) -> &AggregatorSettings {
        &self.settings
    }

    /// Whether a cache is attached and answers a ping.
    pub async fn cache_healthy(&self) -> bool {
        match &self.cache {
            Some(cache) => match cache.ping().await {
                Ok(()) => true,
                Err(err) => {
                    warn!(error = %err, "Cache ping failed");
                    false
                }
            },
            None => false,
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Rate resolution
    // ─────────────────────────────────────────────────────────────────────────

    /// Resolves the given pairs.
    ///
    /// Pairs are grouped by base currency; each group is served from the
    /// cache or fetched upstream in one call. Groups are resolved
    /// concurrently and fail independently: a failed group shows up in the
    /// report and contributes no results.
    #[tracing::instrument(skip_all, fields(pairs = pairs.len()))]
    pub async fn get_rates(&self, pairs: &[Pair]) -> RatesReport {
        let groups = RateGroup::partition(pairs);
        let mut report = RatesReport::default();
        if groups.is_empty() {
            return report;
        }

        let outcomes = join_all(groups.iter().map(|group| self.resolve_group(group))).await;

        for (group, (status, results)) in groups.iter().zip(outcomes) {
            let group_report = GroupReport::new(group, status, results.len());
            debug!(
                base = %group_report.base,
                requested = group_report.symbols.len(),
                resolved = group_report.resolved,
                failed = group_report.status.is_failed(),
                "Group resolved"
            );
            report.push_group(group_report, results);
        }
        report
    }

    #[tracing::instrument(skip_all, fields(base = %group.base, symbols = group.symbols.len()))]
    async fn resolve_group(&self, group: &RateGroup) -> (GroupStatus, Vec<RateResult>) {
        let key = group.cache_key();

        if let Some(rates) = self.read_cache(&key).await {
            debug!(key = %key, "Cache hit");
            return (GroupStatus::Cached, assemble(group, &rates, Utc::now()));
        }

        let raw = match self.fetch(group).await {
            Ok(raw) => raw,
            Err(err) => {
                if err.is_unavailable() {
                    warn!(error = %err, "Upstream fetch failed");
                } else {
                    error!(error = %err, "Upstream sent an unreadable response");
                }
                return (GroupStatus::Failed(err), Vec::new());
            }
        };

        let rates = normalize(group, &raw);
        let fetched_at = Utc::now();
        if rates.is_empty() {
            debug!("Upstream returned no usable rates");
        } else {
            self.write_cache(&key, &rates).await;
            self.persist(group.base, &rates, fetched_at).await;
        }

        (GroupStatus::Fetched, assemble(group, &rates, fetched_at))
    }

    async fn fetch(&self, group: &RateGroup) -> Result<UpstreamRates, UpstreamError> {
        let timeout = self.settings.upstream_timeout;
        let symbols = group.symbols();
        tokio::time::timeout(timeout, self.client.fetch(&group.base, &symbols))
            .await
            .unwrap_or(Err(UpstreamError::Timeout(timeout)))
    }

    fn active_cache(&self) -> Option<&Arc<dyn CacheStore>> {
        if self.settings.cache_ttl.is_enabled() {
            self.cache.as_ref()
        } else {
            None
        }
    }

    async fn read_cache(&self, key: &str) -> Option<RateMap> {
        let cache = self.active_cache()?;

        let payload = match cache.get(key).await {
            Ok(Some(payload)) => payload,
            Ok(None) => return None,
            Err(err) => {
                warn!(key = %key, error = %err, "Cache read failed, treating as miss");
                return None;
            }
        };

        match serde_json::from_slice::<RateMap>(&payload) {
            Ok(mut rates) => {
                rates.retain(|_, rate| is_usable(*rate));
                (!rates.is_empty()).then_some(rates)
            }
            Err(err) => {
                warn!(key = %key, error = %err, "Undecodable cache entry, treating as miss");
                None
            }
        }
    }

    async fn write_cache(&self, key: &str, rates: &RateMap) {
        let Some(cache) = self.active_cache() else {
            return;
        };

        let payload = match serde_json::to_vec(rates) {
            Ok(payload) => payload,
            Err(err) => {
                warn!(key = %key, error = %err, "Could not encode cache entry");
                return;
            }
        };

        if let Err(err) = cache
            .setex(key, self.settings.cache_ttl.as_secs(), payload)
            .await
        {
            warn!(key = %key, error = %err, "Cache write failed");
        }
    }

    async fn persist(&self, base: CurrencyCode, rates: &RateMap, fetched_at: DateTime<Utc>) {
        let rows = RateObservation::batch(base, rates, fetched_at);
        if let Err(err) = self.store.insert(&rows).await {
            error!(base = %base, rows = rows.len(), error = %err, "Failed to persist rates");
        }
    }
}

fn is_usable(rate: f64) -> bool {
    rate.is_finite() && rate > 0.0
}

/// Keeps the requested quotes whose value is a positive number.
///
/// Values may arrive as JSON numbers or numeric strings.
pub(crate) fn normalize(group: &RateGroup, raw: &UpstreamRates) -> RateMap {
    raw.iter()
        .filter_map(|(quote, value)| {
            let quote = CurrencyCode::new(quote).ok()?;
            if !group.contains(&quote) {
                return None;
            }
            let rate = match value {
                Value::Number(n) => n.as_f64()?,
                Value::String(s) => s.trim().parse::<f64>().ok()?,
                _ => return None,
            };
            is_usable(rate).then_some((quote, rate))
        })
        .collect()
}

fn assemble(group: &RateGroup, rates: &RateMap, fetched_at: DateTime<Utc>) -> Vec<RateResult> {
    rates
        .iter()
        .filter(|(quote, _)| group.contains(quote))
        .map(|(quote, rate)| RateResult::new(Pair::new(group.base, *quote), *rate, fetched_at))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn group(pairs: &[&str]) -> RateGroup {
        let pairs: Vec<Pair> = pairs.iter().map(|p| p.parse().unwrap()).collect();
        RateGroup::partition(&pairs).remove(0)
    }

    fn raw(value: Value) -> UpstreamRates {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_normalize_accepts_numbers_and_numeric_strings() {
        let g = group(&["USD:EUR", "USD:GBP"]);
        let rates = normalize(&g, &raw(json!({ "EUR": 0.92, "GBP": "0.79" })));

        assert_eq!(rates.len(), 2);
        assert_eq!(rates[&"GBP".parse::<CurrencyCode>().unwrap()], 0.79);
    }

    #[test]
    fn test_normalize_drops_unusable_values() {
        let g = group(&["USD:EUR", "USD:GBP", "USD:JPY", "USD:CHF", "USD:CAD"]);
        let rates = normalize(
            &g,
            &raw(json!({
                "EUR": null,
                "GBP": "abc",
                "JPY": -1.0,
                "CHF": 0,
                "CAD": "NaN",
            })),
        );

        assert!(rates.is_empty());
    }

    #[test]
    fn test_normalize_uppercases_and_filters_unrequested() {
        let g = group(&["USD:EUR"]);
        let rates = normalize(&g, &raw(json!({ "eur": 0.92, "GBP": 0.79, "EURO": 1.0 })));

        assert_eq!(rates.len(), 1);
        assert!(rates.contains_key(&"EUR".parse::<CurrencyCode>().unwrap()));
    }

    #[test]
    fn test_default_settings() {
        let settings = AggregatorSettings::default();
        assert_eq!(settings.cache_ttl.as_secs(), 300);
        assert_eq!(settings.upstream_timeout, Duration::from_secs(15));
    }
}
