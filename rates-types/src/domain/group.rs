//! Grouping of requested pairs by base currency, and cache keys.

use std::collections::{BTreeSet, HashMap};

use super::currency::{CurrencyCode, Pair};

/// Prefix shared by every rate cache key.
pub const CACHE_KEY_PREFIX: &str = "rates";

/// Builds the cache key for a base and a set of quote symbols.
///
/// Symbols are de-duplicated and sorted, so the key does not depend on the
/// order they were requested in: `{GBP, EUR}` and `{EUR, GBP}` under `USD`
/// both map to `rates:USD:EUR,GBP`.
pub fn cache_key<'a>(
    base: &CurrencyCode,
    symbols: impl IntoIterator<Item = &'a CurrencyCode>,
) -> String {
    let sorted: BTreeSet<&CurrencyCode> = symbols.into_iter().collect();
    let joined = sorted
        .iter()
        .map(|code| code.as_str())
        .collect::<Vec<_>>()
        .join(",");
    format!("{CACHE_KEY_PREFIX}:{base}:{joined}")
}

/// All distinct quotes requested for one base currency within a single call.
///
/// A group is the unit of caching, upstream batching, persistence, and failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateGroup {
    pub base: CurrencyCode,
    pub symbols: BTreeSet<CurrencyCode>,
}

impl RateGroup {
    pub fn new(base: CurrencyCode) -> Self {
        Self {
            base,
            symbols: BTreeSet::new(),
        }
    }

    /// Partitions pairs by base currency.
    ///
    /// Groups come out in the order each base is first seen in the input.
    /// Quotes inside a group are a sorted set, so duplicate pairs collapse.
    pub fn partition<'a>(pairs: impl IntoIterator<Item = &'a Pair>) -> Vec<RateGroup> {
        let mut groups: Vec<RateGroup> = Vec::new();
        let mut index: HashMap<CurrencyCode, usize> = HashMap::new();

        for pair in pairs {
            let slot = *index.entry(pair.base).or_insert_with(|| {
                groups.push(RateGroup::new(pair.base));
                groups.len() - 1
            });
            groups[slot].symbols.insert(pair.quote);
        }

        groups
    }

    pub fn cache_key(&self) -> String {
        cache_key(&self.base, &self.symbols)
    }

    /// Symbols in ascending order, as sent upstream.
    pub fn symbols(&self) -> Vec<CurrencyCode> {
        self.symbols.iter().copied().collect()
    }

    pub fn contains(&self, quote: &CurrencyCode) -> bool {
        self.symbols.contains(quote)
    }
}

/// Cache lifetime for rate entries.
///
/// Zero disables caching entirely: no lookups and no writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CacheTtl(u64);

impl CacheTtl {
    pub const DISABLED: CacheTtl = CacheTtl(0);

    pub const fn from_secs(seconds: u64) -> Self {
        Self(seconds)
    }

    /// Non-positive values disable caching.
    pub fn from_signed_secs(seconds: i64) -> Self {
        Self(u64::try_from(seconds).unwrap_or(0))
    }

    pub fn as_secs(&self) -> u64 {
        self.0
    }

    pub fn is_enabled(&self) -> bool {
        self.0 > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn code(s: &str) -> CurrencyCode {
        s.parse().unwrap()
    }

    fn pair(s: &str) -> Pair {
        s.parse().unwrap()
    }

    #[test]
    fn test_cache_key_single_symbol() {
        assert_eq!(cache_key(&code("USD"), &[code("EUR")]), "rates:USD:EUR");
    }

    #[test]
    fn test_cache_key_is_order_independent() {
        let base = code("USD");
        let ab = cache_key(&base, &[code("EUR"), code("GBP")]);
        let ba = cache_key(&base, &[code("GBP"), code("EUR")]);
        assert_eq!(ab, ba);
        assert_eq!(ab, "rates:USD:EUR,GBP");
    }

    #[test]
    fn test_cache_key_ignores_duplicates() {
        let base = code("USD");
        let key = cache_key(&base, &[code("JPY"), code("EUR"), code("JPY")]);
        assert_eq!(key, "rates:USD:EUR,JPY");
    }

    #[test]
    fn test_partition_groups_by_base_in_first_seen_order() {
        let pairs = [
            pair("GBP:JPY"),
            pair("USD:EUR"),
            pair("gbp:usd"),
            pair("USD:CHF"),
        ];
        let groups = RateGroup::partition(&pairs);

        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].base, code("GBP"));
        assert_eq!(groups[0].symbols(), vec![code("JPY"), code("USD")]);
        assert_eq!(groups[1].base, code("USD"));
        assert_eq!(groups[1].symbols(), vec![code("CHF"), code("EUR")]);
    }

    #[test]
    fn test_partition_collapses_duplicates() {
        let pairs = [pair("USD:EUR"), pair("usd:eur"), pair("USD:EUR")];
        let groups = RateGroup::partition(&pairs);

        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].symbols.len(), 1);
        assert_eq!(groups[0].cache_key(), "rates:USD:EUR");
    }

    #[test]
    fn test_partition_empty() {
        assert!(RateGroup::partition(&Vec::<Pair>::new()).is_empty());
    }

    #[test]
    fn test_cache_ttl() {
        assert!(!CacheTtl::DISABLED.is_enabled());
        assert!(!CacheTtl::from_signed_secs(-5).is_enabled());
        assert_eq!(CacheTtl::from_signed_secs(-5).as_secs(), 0);
        assert!(CacheTtl::from_secs(60).is_enabled());
    }
}
