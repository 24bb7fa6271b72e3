//! HTTP-level tests of the currency API.
//!
//! Requests run through the full router (request id, tracing, CORS and
//! metrics layers) against an in-memory SQLite store and a canned provider.

use std::collections::BTreeMap;

use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode},
};
use chrono::Utc;
use http_body_util::BodyExt;
use tower::ServiceExt;

use currency_hex::{CurrencyService, inbound::HttpServer};
use currency_repo::SqliteRepo;
use currency_types::{
    DateRange, LatestRates, ProviderError, RateProvider, Rates, TimeSeriesRates,
};

/// Provider answering every base with the same rates, dated today.
struct CannedProvider;

fn canned_rates() -> Rates {
    Rates::from([("EUR".to_string(), 0.9), ("JPY".to_string(), 140.0)])
}

#[async_trait]
impl RateProvider for CannedProvider {
    async fn list_symbols(&self) -> Result<BTreeMap<String, String>, ProviderError> {
        Ok(BTreeMap::from([
            ("EUR".to_string(), "Euro".to_string()),
            ("USD".to_string(), "United States Dollar".to_string()),
        ]))
    }

    async fn latest_rates(
        &self,
        base: &str,
        _symbols: &[String],
    ) -> Result<LatestRates, ProviderError> {
        Ok(LatestRates {
            base: base.to_string(),
            date: Utc::now().date_naive(),
            rates: canned_rates(),
        })
    }

    async fn time_series(
        &self,
        base: &str,
        range: DateRange,
        _symbols: &[String],
    ) -> Result<TimeSeriesRates, ProviderError> {
        Ok(TimeSeriesRates {
            base: base.to_string(),
            start_date: range.start(),
            end_date: range.end(),
            rates: BTreeMap::from([(range.start(), canned_rates())]),
        })
    }
}

/// Helper to create the router over a fresh in-memory store.
async fn create_app() -> Router {
    let repo = SqliteRepo::new("sqlite::memory:").await.unwrap();
    let service = CurrencyService::new(repo, CannedProvider);
    HttpServer::new(service).router()
}

fn request(method: Method, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

fn json_request(method: Method, uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("Content-Type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn send(app: &Router, req: Request<Body>) -> (StatusCode, serde_json::Value) {
    let response = app.clone().oneshot(req).await.unwrap();
    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json = if body.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&body).unwrap()
    };
    (status, json)
}

async fn create_currency(app: &Router, name: &str, code: &str) {
    let (status, _) = send(
        app,
        json_request(
            Method::POST,
            "/currencies",
            serde_json::json!({ "name": name, "code": code }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
}

// ─────────────────────────────────────────────────────────────────────────────
// Plumbing
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_health_check() {
    let app = create_app().await;

    let (status, body) = send(&app, request(Method::GET, "/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_request_id_is_echoed() {
    let app = create_app().await;

    let req = Request::builder()
        .uri("/health")
        .header("X-Request-ID", "abc-123")
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(req).await.unwrap();
    assert_eq!(response.headers()["x-request-id"], "abc-123");

    let response = app.oneshot(request(Method::GET, "/health")).await.unwrap();
    let generated = response.headers()["x-request-id"].to_str().unwrap();
    assert_eq!(generated.len(), 36);
}

#[tokio::test]
async fn test_openapi_document_served() {
    let app = create_app().await;

    let (status, body) = send(&app, request(Method::GET, "/api-docs/openapi.json")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["paths"]["/currency/convert"].is_object());
}

// ─────────────────────────────────────────────────────────────────────────────
// Currencies
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_currency_lifecycle() {
    let app = create_app().await;
    create_currency(&app, "US Dollar", "usd").await;

    let (status, body) = send(&app, request(Method::GET, "/currencies/usd")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["code"], "USD");

    let (status, body) = send(
        &app,
        json_request(
            Method::PATCH,
            "/currencies/USD",
            serde_json::json!({ "name": "United States Dollar" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "United States Dollar");
    assert_eq!(body["code"], "USD");

    let (status, _) = send(&app, request(Method::DELETE, "/currencies/USD")).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = send(&app, request(Method::GET, "/currencies/USD")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], 404);
}

#[tokio::test]
async fn test_duplicate_currency_is_bad_request() {
    let app = create_app().await;
    create_currency(&app, "US Dollar", "USD").await;

    let (status, body) = send(
        &app,
        json_request(
            Method::POST,
            "/currencies",
            serde_json::json!({ "name": "Dollar", "code": "USD" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 400);
    assert!(body["error"].as_str().unwrap().contains("USD"));
}

#[tokio::test]
async fn test_list_currencies_paginates() {
    let app = create_app().await;
    for (name, code) in [("Euro", "EUR"), ("Yen", "JPY"), ("Dollar", "USD")] {
        create_currency(&app, name, code).await;
    }

    let (status, body) = send(
        &app,
        request(Method::GET, "/currencies?limit=2&order_by=code"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 3);
    assert_eq!(body["count"], 2);
    assert_eq!(body["data"][0]["code"], "EUR");
    assert_eq!(body["next"]["skip"], 2);

    let (status, _) = send(&app, request(Method::GET, "/currencies?order_by=date")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_import_currencies() {
    let app = create_app().await;

    let (status, body) = send(&app, request(Method::POST, "/currencies/import")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["created"], 2);
    assert_eq!(body["skipped"], 0);
}

// ─────────────────────────────────────────────────────────────────────────────
// Rates & conversion
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_latest_rate_then_convert() {
    let app = create_app().await;
    create_currency(&app, "US Dollar", "USD").await;

    let (status, rate) = send(&app, request(Method::POST, "/currencies/usd/rates/latest")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(rate["base"], "USD");
    assert_eq!(rate["rates"]["EUR"], 0.9);

    let (status, again) = send(&app, request(Method::POST, "/currencies/USD/rates/latest")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(again["id"], rate["id"]);

    let (status, body) = send(
        &app,
        request(Method::GET, "/currency/convert?from=USD&to=EUR&amount=100"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["result"], 90.0);

    let (status, body) = send(&app, request(Method::GET, "/currencies_rates?code=usd")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 1);

    let (status, body) = send(&app, request(Method::GET, "/currencies/USD/rates")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 1);
}

#[tokio::test]
async fn test_latest_rate_for_unknown_currency() {
    let app = create_app().await;

    let (status, _) = send(&app, request(Method::POST, "/currencies/XYZ/rates/latest")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_convert_without_snapshot_is_not_found() {
    let app = create_app().await;

    let (status, _) = send(
        &app,
        request(Method::GET, "/currency/convert?from=USD&to=EUR&amount=1"),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        &app,
        request(Method::GET, "/currency/convert/cross?from=USD&to=GBP&amount=1"),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_backfill_validates_range() {
    let app = create_app().await;
    create_currency(&app, "US Dollar", "USD").await;

    let (status, _) = send(
        &app,
        request(
            Method::POST,
            "/currencies/USD/rates?start_date=2024-01-02&end_date=2024-01-01",
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&app, request(Method::POST, "/currencies/USD/rates")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        request(
            Method::POST,
            "/currencies/XYZ/rates?start_date=2024-01-01&end_date=2024-01-02",
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        &app,
        request(
            Method::POST,
            "/currencies/USD/rates?start_date=2024-01-01&end_date=2024-01-31",
        ),
    )
    .await;
    assert_eq!(status, StatusCode::ACCEPTED);
}

#[tokio::test]
async fn test_bulk_endpoints_accept() {
    let app = create_app().await;
    create_currency(&app, "US Dollar", "USD").await;

    let (status, _) = send(&app, request(Method::POST, "/currencies/rates/latest")).await;
    assert_eq!(status, StatusCode::ACCEPTED);

    let (status, _) = send(
        &app,
        request(
            Method::POST,
            "/currencies/rates?start_date=2024-01-01&end_date=2024-01-02",
        ),
    )
    .await;
    assert_eq!(status, StatusCode::ACCEPTED);

    let (status, _) = send(&app, request(Method::POST, "/currencies/rates")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_backfill_all_accepted_when_catalog_unreadable() {
    let repo = SqliteRepo::new("sqlite::memory:").await.unwrap();
    sqlx::query("DROP TABLE currencies")
        .execute(repo.pool())
        .await
        .unwrap();
    let app = HttpServer::new(CurrencyService::new(repo, CannedProvider)).router();

    let (status, _) = send(
        &app,
        request(
            Method::POST,
            "/currencies/rates?start_date=2024-01-01&end_date=2024-01-02",
        ),
    )
    .await;
    assert_eq!(status, StatusCode::ACCEPTED);
}
