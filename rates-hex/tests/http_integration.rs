//! Integration tests for the HTTP adapter.
//!
//! Drives the full router against the static rate table, an in-memory
//! SQLite store and the in-process cache.

use std::sync::Arc;

use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
};
use http_body_util::BodyExt;
use rates_hex::{AggregatorSettings, RateAggregator, inbound::HttpServer};
use rates_repo::{MemoryCache, SqliteRepo};
use rates_types::Pair;
use rates_upstream::StaticRateClient;
use serde_json::{Value, json};
use tower::ServiceExt;

async fn create_test_server(with_cache: bool) -> HttpServer<StaticRateClient, SqliteRepo> {
    let repo = SqliteRepo::new("sqlite::memory:").await.unwrap();
    let mut aggregator =
        RateAggregator::new(StaticRateClient::default(), repo, AggregatorSettings::default());
    if with_cache {
        aggregator = aggregator.with_cache(Arc::new(MemoryCache::new()));
    }

    let defaults: Vec<Pair> = vec!["USD:EUR".parse().unwrap(), "USD:GBP".parse().unwrap()];
    HttpServer::new(aggregator, defaults)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post_rates(body: Value) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri("/api/rates")
        .header("Content-Type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn send(app: axum::Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&body).unwrap())
}

fn pairs_of(body: &Value) -> Vec<String> {
    body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["pair"].as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn test_health_reports_cache() {
    let app = create_test_server(true).await.router();
    let (status, body) = send(app, get("/health")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "ok", "cache": true }));

    let app = create_test_server(false).await.router();
    let (_, body) = send(app, get("/health")).await;
    assert_eq!(body["cache"], json!(false));
}

#[tokio::test]
async fn test_get_rates_from_query() {
    let app = create_test_server(true).await.router();
    let (status, body) = send(app, get("/api/rates?pairs=usd:jpy,USD:EUR,bogus")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(pairs_of(&body), vec!["USD:EUR", "USD:JPY"]);
    assert!(body["data"][0]["rate"].as_f64().unwrap() > 0.0);
    assert!(body["data"][0]["fetched_at"].is_string());
    assert!(body.get("failures").is_none());
}

#[tokio::test]
async fn test_get_rates_falls_back_to_defaults() {
    let server = create_test_server(true).await;

    let (status, body) = send(server.router(), get("/api/rates")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(pairs_of(&body), vec!["USD:EUR", "USD:GBP"]);

    let (_, body) = send(server.router(), get("/api/rates?pairs=nonsense")).await;
    assert_eq!(pairs_of(&body), vec!["USD:EUR", "USD:GBP"]);
}

#[tokio::test]
async fn test_post_rates_sanitizes_input() {
    let app = create_test_server(true).await.router();
    let (status, body) = send(
        app,
        post_rates(json!({
            "pairs": [
                { "base": "gbp", "quote": "usd" },
                { "base": "GBP", "quote": "USD" },
                { "base": "GB", "quote": "USD" },
                { "base": "usd", "quote": "eur" }
            ]
        })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(pairs_of(&body), vec!["GBP:USD", "USD:EUR"]);
}

#[tokio::test]
async fn test_post_rates_rejects_empty_input() {
    let app = create_test_server(true).await.router();
    let (status, body) = send(
        app,
        post_rates(json!({ "pairs": [{ "base": "US", "quote": "EURO" }] })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], json!("No valid currency pairs provided"));
    assert_eq!(body["code"], json!(400));
}

#[tokio::test]
async fn test_partial_failure_is_reported() {
    let app = create_test_server(true).await.router();
    let (status, body) = send(app, get("/api/rates?pairs=USD:EUR,XYZ:EUR")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(pairs_of(&body), vec!["USD:EUR"]);
    assert_eq!(body["failures"][0]["base"], json!("XYZ"));
    assert_eq!(body["failures"][0]["symbols"], json!(["EUR"]));
}

#[tokio::test]
async fn test_total_failure_is_bad_gateway() {
    let app = create_test_server(true).await.router();
    let (status, body) = send(app, get("/api/rates?pairs=XYZ:EUR")).await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["data"], json!([]));
    assert_eq!(body["failures"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_openapi_document_is_served() {
    let app = create_test_server(false).await.router();
    let (status, body) = send(app, get("/api-docs/openapi.json")).await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["paths"]["/api/rates"].is_object());
}
