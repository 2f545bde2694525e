//! OpenAPI specification and documentation.

#![allow(dead_code)] // Path functions are only used by utoipa for documentation generation

use rates_types::domain::RateResult;
use rates_types::dto::{GroupFailure, HealthResponse, PairInput, RatesRequest, RatesResponse};
use utoipa::OpenApi;

// Dummy functions to generate path documentation
// These are not the actual handlers, just for OpenAPI path generation

/// Health check endpoint
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Service is up; `cache` reports whether the cache answered a ping", body = HealthResponse)
    )
)]
async fn health() {}

/// Rates for the pairs in the query string
///
/// Malformed pairs are skipped. When no valid pair remains, the configured
/// default pairs are returned.
#[utoipa::path(
    get,
    path = "/api/rates",
    tag = "rates",
    params(
        ("pairs" = Option<String>, Query, description = "Comma-separated BASE:QUOTE list", example = "USD:EUR,USD:GBP")
    ),
    responses(
        (status = 200, description = "Resolved rates; failed base currencies are listed in `failures`", body = RatesResponse),
        (status = 502, description = "Every base currency failed upstream", body = RatesResponse)
    )
)]
async fn get_rates() {}

/// Rates for the pairs in the request body
#[utoipa::path(
    post,
    path = "/api/rates",
    tag = "rates",
    request_body = RatesRequest,
    responses(
        (status = 200, description = "Resolved rates; failed base currencies are listed in `failures`", body = RatesResponse),
        (status = 400, description = "No valid currency pairs provided"),
        (status = 502, description = "Every base currency failed upstream", body = RatesResponse)
    )
)]
async fn post_rates() {}

/// OpenAPI documentation for the Rates API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Currency Rates Service API",
        version = "1.0.0",
        description = "Aggregates currency exchange rates from an upstream provider, with a TTL cache in front and a persistent history behind.\n\nPairs sharing a base currency are fetched in one upstream call. A failing base currency never affects the others.",
        license(name = "MIT"),
    ),
    paths(health, get_rates, post_rates),
    components(
        schemas(
            HealthResponse,
            PairInput,
            RatesRequest,
            RatesResponse,
            RateResult,
            GroupFailure,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "rates", description = "Currency rate lookups"),
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_lists_rate_paths() {
        let doc = ApiDoc::openapi();

        assert!(doc.paths.paths.contains_key("/health"));
        assert!(doc.paths.paths.contains_key("/api/rates"));

        let schemas = doc.components.unwrap().schemas;
        assert!(schemas.contains_key("RatesResponse"));
        assert!(schemas.contains_key("RateResult"));
    }
}
