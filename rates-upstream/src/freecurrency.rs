//! freecurrencyapi.com provider.
//!
//! `GET {api_url}?base_currency=USD&currencies=EUR,GBP&apikey=...` answers
//! `{"data": {"EUR": 0.92, "GBP": 0.79}}`.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;

use rates_types::{CurrencyCode, RateClient, UpstreamError, UpstreamRates};

pub const DEFAULT_API_URL: &str = "https://api.freecurrencyapi.com/v1/latest";

/// Default HTTP request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// HTTP client for the freecurrencyapi.com `latest` endpoint.
pub struct FreeCurrencyClient {
    http: Client,
    api_url: String,
    api_key: String,
    timeout: Duration,
}

impl FreeCurrencyClient {
    pub fn new(api_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self::with_timeout(api_url, api_key, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(
        api_url: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        let http = match Client::builder().timeout(timeout).build() {
            Ok(http) => http,
            Err(err) => {
                tracing::warn!(error = %err, "Could not build HTTP client, using defaults");
                Client::new()
            }
        };
        Self::with_client(http, api_url, api_key, timeout)
    }

    /// Wraps an existing `reqwest` client. `timeout` bounds every request
    /// whatever the client's own settings.
    pub fn with_client(
        http: Client,
        api_url: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            http,
            api_url: api_url.into(),
            api_key: api_key.into(),
            timeout,
        }
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    fn transport_error(&self, err: reqwest::Error) -> UpstreamError {
        if err.is_timeout() {
            UpstreamError::Timeout(self.timeout)
        } else {
            UpstreamError::Unavailable(err.to_string())
        }
    }
}

#[async_trait]
impl RateClient for FreeCurrencyClient {
    #[tracing::instrument(skip(self, quotes), fields(base = %base, quotes = quotes.len()))]
    async fn fetch(
        &self,
        base: &CurrencyCode,
        quotes: &[CurrencyCode],
    ) -> Result<UpstreamRates, UpstreamError> {
        let currencies = quotes
            .iter()
            .map(CurrencyCode::as_str)
            .collect::<Vec<_>>()
            .join(",");

        let response = self
            .http
            .get(&self.api_url)
            .timeout(self.timeout)
            .query(&[
                ("base_currency", base.as_str()),
                ("currencies", currencies.as_str()),
                ("apikey", self.api_key.as_str()),
            ])
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        if !status.is_success() {
            tracing::debug!(status = status.as_u16(), "upstream rejected request");
            return Err(UpstreamError::HttpStatus(status.as_u16()));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| self.transport_error(e))?;

        parse_body(&body)
    }
}

/// Extracts the `data` object from a provider response body.
pub fn parse_body(body: &[u8]) -> Result<UpstreamRates, UpstreamError> {
    let value: Value =
        serde_json::from_slice(body).map_err(|e| UpstreamError::MalformedPayload(e.to_string()))?;

    let Value::Object(mut root) = value else {
        return Err(UpstreamError::MalformedPayload(
            "expected a JSON object".into(),
        ));
    };

    match root.remove("data") {
        Some(Value::Object(data)) => Ok(data),
        Some(_) => Err(UpstreamError::MalformedPayload(
            "`data` is not an object".into(),
        )),
        None => Err(UpstreamError::MalformedPayload(
            "missing `data` object".into(),
        )),
    }
}
