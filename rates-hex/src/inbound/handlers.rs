//! HTTP request handlers.

use std::collections::HashSet;
use std::sync::Arc;

use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;

use rates_types::{
    AppError, HealthResponse, Pair, PairInput, RateClient, RateStore, RatesRequest, RatesResponse,
};

use crate::RateAggregator;

/// Application state shared across handlers.
pub struct AppState<C: RateClient, S: RateStore> {
    pub aggregator: RateAggregator<C, S>,
    /// Used by `GET /api/rates` when the query names no valid pair.
    pub default_pairs: Vec<Pair>,
}

/// Wrapper to implement IntoResponse for AppError (orphan rule workaround).
pub struct ApiError(pub AppError);

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self.0 {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
        };

        let body = serde_json::json!({
            "error": message,
            "code": status.as_u16()
        });

        (status, Json(body)).into_response()
    }
}

/// Query string of `GET /api/rates`.
#[derive(Debug, Default, Deserialize)]
pub struct RatesQuery {
    /// Comma-separated `BASE:QUOTE` list
    pub pairs: Option<String>,
}

/// Parses `USD:EUR,usd:gbp,...`, skipping malformed chunks and duplicates.
pub fn parse_pairs(raw: &str) -> Vec<Pair> {
    dedupe(
        raw.split(',')
            .map(str::trim)
            .filter(|chunk| !chunk.is_empty())
            .filter_map(|chunk| chunk.parse::<Pair>().ok()),
    )
}

/// Validates submitted pairs, skipping invalid entries and duplicates.
pub fn sanitize_pairs(inputs: &[PairInput]) -> Vec<Pair> {
    dedupe(
        inputs
            .iter()
            .filter_map(|input| Pair::parse(&input.base, &input.quote).ok()),
    )
}

fn dedupe(pairs: impl Iterator<Item = Pair>) -> Vec<Pair> {
    let mut seen = HashSet::new();
    pairs.filter(|pair| seen.insert(*pair)).collect()
}

/// Health check endpoint.
pub async fn health<C: RateClient, S: RateStore>(
    State(state): State<Arc<AppState<C, S>>>,
) -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok".into(),
        cache: state.aggregator.cache_healthy().await,
    })
}

/// Rates for the pairs in the query string, or the default pairs.
#[tracing::instrument(skip(state))]
pub async fn get_rates<C: RateClient, S: RateStore>(
    State(state): State<Arc<AppState<C, S>>>,
    Query(query): Query<RatesQuery>,
) -> Response {
    let mut pairs = query.pairs.as_deref().map(parse_pairs).unwrap_or_default();
    if pairs.is_empty() {
        pairs = state.default_pairs.clone();
    }

    resolve(&state, &pairs).await
}

/// Rates for the pairs in the request body.
#[tracing::instrument(skip(state, req), fields(submitted = req.pairs.len()))]
pub async fn post_rates<C: RateClient, S: RateStore>(
    State(state): State<Arc<AppState<C, S>>>,
    Json(req): Json<RatesRequest>,
) -> Result<Response, ApiError> {
    let pairs = sanitize_pairs(&req.pairs);
    if pairs.is_empty() {
        return Err(AppError::BadRequest("No valid currency pairs provided".into()).into());
    }

    Ok(resolve(&state, &pairs).await)
}

/// Runs the aggregator; 502 only when every group failed.
async fn resolve<C: RateClient, S: RateStore>(state: &AppState<C, S>, pairs: &[Pair]) -> Response {
    let report = state.aggregator.get_rates(pairs).await;
    let all_failed = !report.groups.is_empty() && report.groups.iter().all(|g| g.status.is_failed());

    let status = if all_failed {
        StatusCode::BAD_GATEWAY
    } else {
        StatusCode::OK
    };

    (status, Json(RatesResponse::from(report))).into_response()
}
