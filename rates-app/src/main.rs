//! # Rates Application
//!
//! Binary that wires together all the components:
//! - Load configuration from environment
//! - Initialize the store, cache and upstream adapters
//! - Create the rate aggregator
//! - Start the HTTP server

mod config;

use opentelemetry::global;
use opentelemetry_sdk::{propagation::TraceContextPropagator, trace as sdktrace};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use rates_hex::{AggregatorSettings, RateAggregator, inbound::HttpServer};
use rates_repo::{build_cache, build_repo};
use rates_upstream::{FreeCurrencyClient, StaticRateClient, Upstream};

use config::{Config, LogFormat, Provider};

fn init_tracer() -> anyhow::Result<(sdktrace::Tracer, sdktrace::SdkTracerProvider)> {
    global::set_text_map_propagator(TraceContextPropagator::new());

    // Use gRPC exporter with batch processing (non-blocking)
    let exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_tonic()
        .build()?;

    let provider = sdktrace::SdkTracerProvider::builder()
        .with_batch_exporter(exporter)
        .build();

    global::set_tracer_provider(provider.clone());

    use opentelemetry::trace::TracerProvider as _;
    Ok((provider.tracer("rates-service"), provider))
}

fn build_upstream(config: &Config) -> Upstream {
    match &config.provider {
        Provider::FreeCurrency { api_url, api_key } => Upstream::FreeCurrency(
            FreeCurrencyClient::with_timeout(api_url, api_key, config.upstream_timeout),
        ),
        Provider::Static => Upstream::Static(StaticRateClient::default()),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Load configuration
    let config = Config::from_env()?;

    // OpenTelemetry export only when a collector is configured
    let otel = match std::env::var("OTEL_EXPORTER_OTLP_ENDPOINT") {
        Ok(_) => Some(init_tracer()?),
        Err(_) => None,
    };
    let telemetry = otel
        .as_ref()
        .map(|(tracer, _)| tracing_opentelemetry::layer().with_tracer(tracer.clone()));

    let json = config.log_format == LogFormat::Json;

    // Initialize tracing subscriber
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,rates_app=debug,rates_hex=debug".into()),
        )
        .with(json.then(|| tracing_subscriber::fmt::layer().json()))
        .with((!json).then(tracing_subscriber::fmt::layer))
        .with(telemetry)
        .init();

    tracing::info!("Starting rates server on port {}", config.port);

    // Build repository (handles connection and migration)
    let repo = build_repo(&config.database_url).await?;

    let cache = build_cache(&config.cache).await?;
    if cache.is_none() || !config.cache_ttl.is_enabled() {
        tracing::warn!("Rate cache disabled; every request goes upstream");
    }

    let upstream = build_upstream(&config);
    tracing::info!(
        provider = upstream.name(),
        ttl_secs = config.cache_ttl.as_secs(),
        "Rate aggregator configured"
    );

    // Create the rate aggregator
    let settings = AggregatorSettings {
        cache_ttl: config.cache_ttl,
        upstream_timeout: config.upstream_timeout,
    };
    let mut aggregator = RateAggregator::new(upstream, repo, settings);
    if let Some(cache) = cache {
        aggregator = aggregator.with_cache(cache);
    }

    // Create and run the HTTP server
    let server = HttpServer::new(aggregator, config.default_pairs());
    let addr = format!("0.0.0.0:{}", config.port);

    server.run(&addr).await?;

    // Ensure traces are flushed before exit
    if let Some((_, provider)) = otel {
        let _ = provider.shutdown();
    }
    Ok(())
}
