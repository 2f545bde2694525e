//! Data Transfer Objects (DTOs) for requests and responses.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{CurrencyCode, GroupStatus, Pair, RateResult, RatesReport};

// ─────────────────────────────────────────────────────────────────────────────
// Rate DTOs
// ─────────────────────────────────────────────────────────────────────────────

/// A currency pair as submitted by a caller, before validation.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PairInput {
    #[schema(example = "USD")]
    #[serde(default)]
    pub base: String,
    #[schema(example = "EUR")]
    #[serde(default)]
    pub quote: String,
}

impl From<Pair> for PairInput {
    fn from(pair: Pair) -> Self {
        Self {
            base: pair.base.to_string(),
            quote: pair.quote.to_string(),
        }
    }
}

/// Request body for `POST /api/rates`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct RatesRequest {
    #[serde(default)]
    pub pairs: Vec<PairInput>,
}

/// A base currency whose upstream fetch failed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct GroupFailure {
    #[schema(value_type = String, example = "GBP")]
    pub base: CurrencyCode,
    #[schema(value_type = Vec<String>, example = json!(["JPY"]))]
    pub symbols: Vec<CurrencyCode>,
    #[schema(example = "Upstream returned HTTP 503")]
    pub error: String,
}

/// Response of the rate endpoints.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct RatesResponse {
    /// Resolved rates, grouped by base currency
    pub data: Vec<RateResult>,
    /// Base currencies that could not be resolved
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub failures: Vec<GroupFailure>,
}

impl From<RatesReport> for RatesResponse {
    fn from(report: RatesReport) -> Self {
        let failures = report
            .groups
            .into_iter()
            .filter_map(|group| match group.status {
                GroupStatus::Failed(err) => Some(GroupFailure {
                    base: group.base,
                    symbols: group.symbols,
                    error: err.to_string(),
                }),
                GroupStatus::Cached | GroupStatus::Fetched => None,
            })
            .collect();

        Self {
            data: report.results,
            failures,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Health DTOs
// ─────────────────────────────────────────────────────────────────────────────

/// Response of `GET /health`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    #[schema(example = "ok")]
    pub status: String,
    /// Whether the cache store answered a ping
    pub cache: bool,
}
