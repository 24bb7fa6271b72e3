//! HTTP Server configuration and startup.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    Router,
    body::Body,
    http::{Method, Request, header},
    middleware,
    routing::{get, post},
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use currency_types::{RateProvider, Store};

use super::handlers::{self, AppState};
use super::request_id::{X_REQUEST_ID, request_id_middleware};
use crate::CurrencyService;

/// HTTP Server for the Currency API.
pub struct HttpServer<R: Store, P: RateProvider> {
    state: Arc<AppState<R, P>>,
}

impl<R: Store, P: RateProvider> HttpServer<R, P> {
    /// Creates a new HTTP server with the given service.
    pub fn new(service: CurrencyService<R, P>) -> Self {
        Self {
            state: Arc::new(AppState { service }),
        }
    }

    /// Builds the Axum router with all routes.
    pub fn router(&self) -> Router {
        // Build HTTP metrics layer (uses globally set MeterProvider)
        let metrics = axum_otel_metrics::HttpMetricsLayerBuilder::new().build();

        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods([Method::GET, Method::POST, Method::HEAD])
            .allow_headers([header::CONTENT_TYPE])
            .max_age(Duration::from_secs(24 * 60 * 60));

        Router::new()
            .route("/health", get(handlers::health))
            .route("/api-docs/openapi.json", get(handlers::openapi_json))
            .route(
                "/currencies",
                get(handlers::list_currencies::<R, P>).post(handlers::create_currency::<R, P>),
            )
            .route(
                "/currencies/import",
                post(handlers::import_currencies::<R, P>),
            )
            .route(
                "/currencies/rates",
                post(handlers::backfill_all_rates::<R, P>),
            )
            .route(
                "/currencies/rates/latest",
                post(handlers::refresh_all_rates::<R, P>),
            )
            .route(
                "/currencies/{code}",
                get(handlers::get_currency::<R, P>)
                    .patch(handlers::update_currency::<R, P>)
                    .delete(handlers::delete_currency::<R, P>),
            )
            .route(
                "/currencies/{code}/rates",
                get(handlers::list_currency_rates::<R, P>)
                    .post(handlers::backfill_currency_rates::<R, P>),
            )
            .route(
                "/currencies/{code}/rates/latest",
                post(handlers::create_latest_rate::<R, P>),
            )
            .route(
                "/currencies_rates",
                get(handlers::latest_rates_for_codes::<R, P>),
            )
            .route("/currency/convert", get(handlers::convert::<R, P>))
            .route(
                "/currency/convert/cross",
                get(handlers::convert_cross::<R, P>),
            )
            .layer(metrics)
            .layer(cors)
            .layer(
                TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                    let request_id = request
                        .headers()
                        .get(&X_REQUEST_ID)
                        .and_then(|v| v.to_str().ok())
                        .unwrap_or_default();
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        request_id = %request_id,
                    )
                }),
            )
            // Outermost, so the id is set before the request span opens.
            .layer(middleware::from_fn(request_id_middleware))
            .with_state(self.state.clone())
    }

    /// Runs the server on the given address with graceful shutdown.
    pub async fn run(self, addr: &str) -> anyhow::Result<()> {
        let listener = tokio::net::TcpListener::bind(addr).await?;
        tracing::info!("Server listening on {}", listener.local_addr()?);

        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        Ok(())
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown...");
}
