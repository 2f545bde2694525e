//! Configuration loading from environment.

use std::env;
use std::time::Duration;

use anyhow::Context;
use rates_repo::CacheBackend;
use rates_types::{CacheTtl, CurrencyCode, Pair};
use rates_upstream::DEFAULT_API_URL;

/// Where rates come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Provider {
    FreeCurrency { api_url: String, api_key: String },
    /// Built-in reference table, no network.
    Static,
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub database_url: String,
    pub cache: CacheBackend,
    pub provider: Provider,
    pub cache_ttl: CacheTtl,
    pub upstream_timeout: Duration,
    pub default_base: CurrencyCode,
    pub default_symbols: Vec<CurrencyCode>,
    pub log_format: LogFormat,
}

impl Config {
    /// Loads configuration from environment variables.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Loads configuration through an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let port: u16 = var("PORT")
            .unwrap_or_else(|| "5000".to_string())
            .trim()
            .parse()
            .context("PORT must be a port number")?;

        let database_url = var("DATABASE_URL")
            .ok_or_else(|| anyhow::anyhow!("DATABASE_URL environment variable is required"))?;

        let cache = match (var("REDIS_URL"), var("CACHE_BACKEND")) {
            (Some(url), _) => CacheBackend::Redis(url),
            (None, Some(backend)) if backend.eq_ignore_ascii_case("memory") => {
                CacheBackend::Memory
            }
            (None, Some(backend)) if backend.eq_ignore_ascii_case("none") => {
                CacheBackend::Disabled
            }
            (None, Some(backend)) => anyhow::bail!("Unknown CACHE_BACKEND {backend:?}"),
            (None, None) => CacheBackend::Disabled,
        };

        let provider = match var("RATES_PROVIDER")
            .unwrap_or_else(|| "freecurrencyapi".to_string())
            .to_ascii_lowercase()
            .as_str()
        {
            "freecurrencyapi" => Provider::FreeCurrency {
                api_url: var("FREECURRENCY_API_URL").unwrap_or_else(|| DEFAULT_API_URL.into()),
                api_key: var("FREECURRENCY_API_KEY").ok_or_else(|| {
                    anyhow::anyhow!("FREECURRENCY_API_KEY is required for the freecurrencyapi provider")
                })?,
            },
            "static" => Provider::Static,
            other => anyhow::bail!("Unknown RATES_PROVIDER {other:?}"),
        };

        let cache_ttl = match var("RATE_CACHE_TTL") {
            Some(raw) => CacheTtl::from_signed_secs(
                raw.trim()
                    .parse::<i64>()
                    .context("RATE_CACHE_TTL must be an integer")?,
            ),
            None => rates_hex::DEFAULT_CACHE_TTL,
        };

        let upstream_timeout = match var("UPSTREAM_TIMEOUT_SECS") {
            Some(raw) => {
                let secs: u64 = raw
                    .trim()
                    .parse()
                    .context("UPSTREAM_TIMEOUT_SECS must be a positive integer")?;
                anyhow::ensure!(secs > 0, "UPSTREAM_TIMEOUT_SECS must be a positive integer");
                Duration::from_secs(secs)
            }
            None => rates_hex::DEFAULT_UPSTREAM_TIMEOUT,
        };

        let default_base: CurrencyCode = var("DEFAULT_BASE")
            .unwrap_or_else(|| "USD".to_string())
            .parse()
            .context("DEFAULT_BASE must be a 3-letter currency code")?;

        let default_symbols = var("DEFAULT_SYMBOLS")
            .unwrap_or_else(|| "EUR,GBP,JPY".to_string())
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::parse)
            .collect::<Result<Vec<CurrencyCode>, _>>()
            .context("DEFAULT_SYMBOLS must be comma-separated currency codes")?;

        let log_format = match var("LOG_FORMAT").as_deref() {
            Some(f) if f.eq_ignore_ascii_case("json") => LogFormat::Json,
            _ => LogFormat::Text,
        };

        Ok(Self {
            port,
            database_url,
            cache,
            provider,
            cache_ttl,
            upstream_timeout,
            default_base,
            default_symbols,
            log_format,
        })
    }

    /// `DEFAULT_BASE` paired with each of `DEFAULT_SYMBOLS`.
    pub fn default_pairs(&self) -> Vec<Pair> {
        self.default_symbols
            .iter()
            .map(|quote| Pair::new(self.default_base, *quote))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> anyhow::Result<Config> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    const BASE: &[(&str, &str)] = &[
        ("DATABASE_URL", "sqlite::memory:"),
        ("FREECURRENCY_API_KEY", "secret"),
    ];

    fn with(extra: &[(&'static str, &'static str)]) -> Vec<(&'static str, &'static str)> {
        BASE.iter().chain(extra).copied().collect()
    }

    #[test]
    fn test_defaults() {
        let config = load(BASE).unwrap();

        assert_eq!(config.port, 5000);
        assert_eq!(config.cache, CacheBackend::Disabled);
        assert_eq!(
            config.provider,
            Provider::FreeCurrency {
                api_url: DEFAULT_API_URL.into(),
                api_key: "secret".into()
            }
        );
        assert_eq!(config.cache_ttl.as_secs(), 300);
        assert_eq!(config.upstream_timeout, Duration::from_secs(15));
        assert_eq!(config.log_format, LogFormat::Text);

        let defaults: Vec<String> = config.default_pairs().iter().map(Pair::to_string).collect();
        assert_eq!(defaults, vec!["USD:EUR", "USD:GBP", "USD:JPY"]);
    }

    #[test]
    fn test_database_url_is_required() {
        let err = load(&[("FREECURRENCY_API_KEY", "secret")]).unwrap_err();
        assert!(err.to_string().contains("DATABASE_URL"));
    }

    #[test]
    fn test_api_key_is_required_for_freecurrency() {
        assert!(load(&[("DATABASE_URL", "sqlite::memory:")]).is_err());

        let config = load(&[
            ("DATABASE_URL", "sqlite::memory:"),
            ("RATES_PROVIDER", "static"),
        ])
        .unwrap();
        assert_eq!(config.provider, Provider::Static);
    }

    #[test]
    fn test_cache_backend_selection() {
        let config = load(&with(&[("REDIS_URL", "redis://localhost:6379/0")])).unwrap();
        assert_eq!(
            config.cache,
            CacheBackend::Redis("redis://localhost:6379/0".into())
        );

        let config = load(&with(&[("CACHE_BACKEND", "memory")])).unwrap();
        assert_eq!(config.cache, CacheBackend::Memory);

        assert!(load(&with(&[("CACHE_BACKEND", "memcached")])).is_err());
    }

    #[test]
    fn test_cache_backend_defaults_to_disabled() {
        let config = load(BASE).unwrap();
        assert_eq!(config.cache, CacheBackend::Disabled);

        let config = load(&with(&[("CACHE_BACKEND", "none")])).unwrap();
        assert_eq!(config.cache, CacheBackend::Disabled);

        let config = load(&with(&[("CACHE_BACKEND", "NONE")])).unwrap();
        assert_eq!(config.cache, CacheBackend::Disabled);

        let config = load(&with(&[
            ("REDIS_URL", "redis://localhost:6379/0"),
            ("CACHE_BACKEND", "none"),
        ]))
        .unwrap();
        assert_eq!(
            config.cache,
            CacheBackend::Redis("redis://localhost:6379/0".into())
        );
    }

    #[test]
    fn test_non_positive_ttl_disables_cache() {
        let config = load(&with(&[("RATE_CACHE_TTL", "0")])).unwrap();
        assert!(!config.cache_ttl.is_enabled());

        let config = load(&with(&[("RATE_CACHE_TTL", "-5")])).unwrap();
        assert!(!config.cache_ttl.is_enabled());

        assert!(load(&with(&[("RATE_CACHE_TTL", "soon")])).is_err());
    }

    #[test]
    fn test_overrides() {
        let config = load(&with(&[
            ("PORT", "8080"),
            ("UPSTREAM_TIMEOUT_SECS", "3"),
            ("DEFAULT_BASE", "eur"),
            ("DEFAULT_SYMBOLS", "usd, chf"),
            ("LOG_FORMAT", "JSON"),
        ]))
        .unwrap();

        assert_eq!(config.port, 8080);
        assert_eq!(config.upstream_timeout, Duration::from_secs(3));
        assert_eq!(config.log_format, LogFormat::Json);
        let defaults: Vec<String> = config.default_pairs().iter().map(Pair::to_string).collect();
        assert_eq!(defaults, vec!["EUR:USD", "EUR:CHF"]);
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        assert!(load(&with(&[("PORT", "http")])).is_err());
        assert!(load(&with(&[("UPSTREAM_TIMEOUT_SECS", "0")])).is_err());
        assert!(load(&with(&[("DEFAULT_BASE", "DOLLAR")])).is_err());
        assert!(load(&with(&[("RATES_PROVIDER", "ecb")])).is_err());
    }
}
