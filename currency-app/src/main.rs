//! # Currency Application
//!
//! Binary that wires together all the components:
//! - Load configuration from environment
//! - Initialize the repository adapter and the Fixer client
//! - Create the currency service
//! - Start the optional refresh scheduler and the HTTP server

mod config;

use std::time::Duration;

use opentelemetry::global;
use opentelemetry_sdk::{
    metrics::SdkMeterProvider, propagation::TraceContextPropagator, trace as sdktrace,
};
use tokio::time::MissedTickBehavior;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use currency_hex::{CurrencyService, FixerClient, inbound::HttpServer};
use currency_repo::{Repo, build_repo};

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
    Ok((provider.tracer("currency-service"), provider))
}

/// Global meter provider read by the HTTP metrics layer.
fn init_meter() -> anyhow::Result<SdkMeterProvider> {
    let exporter = opentelemetry_otlp::MetricExporter::builder()
        .with_tonic()
        .build()?;

    let provider = SdkMeterProvider::builder()
        .with_periodic_exporter(exporter)
        .build();

    global::set_meter_provider(provider.clone());
    Ok(provider)
}

/// Refreshes today's snapshot of every currency once per `period`.
fn spawn_scheduler(service: CurrencyService<Repo, FixerClient>, period: Duration) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            ticker.tick().await;
            tracing::info!("Scheduled refresh of latest rates");
            if let Err(e) = service.refresh_all_latest_rates().await {
                tracing::error!(error = %e, "Scheduled refresh failed");
            }
        }
    });
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize OpenTelemetry tracing and metrics
    let (otel_tracer, otel_provider) = init_tracer()?;
    let meter_provider = init_meter()?;
    let telemetry = tracing_opentelemetry::layer().with_tracer(otel_tracer);

    // Initialize tracing subscriber
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,currency_app=debug,currency_hex=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .with(telemetry)
        .init();

    // Load configuration
    let config = config::Config::from_env()?;

    tracing::info!("Starting currency server on port {}", config.port);
    tracing::info!("Using database: {}", config.database_url);
    tracing::info!("Using rate provider: {}", config.fixer_url);

    // Build repository (handles connection and migration)
    let repo = build_repo(&config.database_url).await?;

    // Rate provider with fixed endpoint, key and timeout
    let provider = FixerClient::with_timeout(config.fixer_api_key, config.fixer_timeout)?
        .with_base_url(config.fixer_url);

    // Create the currency service
    let service = CurrencyService::new(repo, provider);

    if let Some(period) = config.refresh_interval {
        tracing::info!(period_secs = period.as_secs(), "Starting rate refresh scheduler");
        spawn_scheduler(service.clone(), period);
    }

    // Create and run the HTTP server
    let server = HttpServer::new(service);
    let addr = format!("0.0.0.0:{}", config.port);

    server.run(&addr).await?;

    // Ensure traces and metrics are flushed before exit
    let _ = otel_provider.shutdown();
    let _ = meter_provider.shutdown();
    Ok(())
}
