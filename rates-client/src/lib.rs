//! # Rates Client SDK
//!
//! A typed Rust client for the currency rates API.

use rates_types::{HealthResponse, Pair, PairInput, RatesRequest, RatesResponse};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;

/// Error type for client operations.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Rates API client.
pub struct RatesClient {
    base_url: String,
    http: Client,
}

impl RatesClient {
    /// Creates a new client.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http: Client::new(),
        }
    }

    /// Service and cache health.
    pub async fn health(&self) -> Result<HealthResponse, ClientError> {
        let resp = self
            .http
            .get(format!("{}/health", self.base_url))
            .send()
            .await?;
        self.handle_response(resp).await
    }

    /// Rates for the given pairs via `GET /api/rates`.
    ///
    /// An empty slice asks for the server's default pairs.
    pub async fn get_rates(&self, pairs: &[Pair]) -> Result<RatesResponse, ClientError> {
        let mut req = self.http.get(format!("{}/api/rates", self.base_url));
        if !pairs.is_empty() {
            let joined = pairs
                .iter()
                .map(Pair::to_string)
                .collect::<Vec<_>>()
                .join(",");
            req = req.query(&[("pairs", joined)]);
        }
        let resp = req.send().await?;
        self.rates_response(resp).await
    }

    /// Rates for the given pairs via `POST /api/rates`.
    ///
    /// The server validates the codes; nothing valid is an [`ClientError::Api`] 400.
    pub async fn post_rates(&self, pairs: Vec<PairInput>) -> Result<RatesResponse, ClientError> {
        let resp = self
            .http
            .post(format!("{}/api/rates", self.base_url))
            .json(&RatesRequest { pairs })
            .send()
            .await?;
        self.rates_response(resp).await
    }

    /// A 502 still carries a [`RatesResponse`] listing the failed groups.
    async fn rates_response(&self, resp: reqwest::Response) -> Result<RatesResponse, ClientError> {
        if resp.status() == StatusCode::BAD_GATEWAY {
            let body = resp.text().await?;
            if let Ok(rates) = serde_json::from_str::<RatesResponse>(&body) {
                return Ok(rates);
            }
            return Err(ClientError::Api {
                status: StatusCode::BAD_GATEWAY.as_u16(),
                message: body,
            });
        }
        self.handle_response(resp).await
    }

    async fn handle_response<T: DeserializeOwned>(
        &self,
        resp: reqwest::Response,
    ) -> Result<T, ClientError> {
        let status = resp.status();
        if status.is_success() {
            let body = resp.text().await?;
            Ok(serde_json::from_str(&body)?)
        } else {
            let body = resp.text().await.unwrap_or_default();
            let message = serde_json::from_str::<serde_json::Value>(&body)
                .ok()
                .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(String::from))
                .unwrap_or(body);
            Err(ClientError::Api {
                status: status.as_u16(),
                message,
            })
        }
    }
}
