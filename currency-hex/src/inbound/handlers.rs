//! HTTP request handlers.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use utoipa::OpenApi;

use currency_types::{
    AppError, CodesQuery, ConvertQuery, CreateCurrencyRequest, DateRangeQuery, Paginated,
    PaginationQuery, RateProvider, Store, UpdateCurrencyRequest,
};

use crate::CurrencyService;
use crate::openapi::ApiDoc;

/// Application state shared across handlers.
pub struct AppState<R: Store, P: RateProvider> {
    pub service: CurrencyService<R, P>,
}

/// Wrapper to implement IntoResponse for AppError (orphan rule workaround).
pub struct ApiError(pub AppError);

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        ApiError(err)
    }
}

impl From<currency_types::DomainError> for ApiError {
    fn from(err: currency_types::DomainError) -> Self {
        ApiError(err.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self.0 {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            AppError::Provider(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
            AppError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
        };

        if status.is_server_error() {
            tracing::error!(error = %message, "Request failed");
        } else if status == StatusCode::NOT_FOUND {
            tracing::warn!(error = %message, "Resource not found");
        }

        let body = serde_json::json!({
            "error": message,
            "code": status.as_u16()
        });

        (status, Json(body)).into_response()
    }
}

/// Health check endpoint.
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "healthy" }))
}

/// Serves the OpenAPI document.
pub async fn openapi_json() -> impl IntoResponse {
    Json(ApiDoc::openapi())
}

// ─────────────────────────────────────────────────────────────────────────────
// Currencies
// ─────────────────────────────────────────────────────────────────────────────

#[tracing::instrument(skip(state))]
pub async fn list_currencies<R: Store, P: RateProvider>(
    State(state): State<Arc<AppState<R, P>>>,
    Query(page): Query<PaginationQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let (currencies, total) = state
        .service
        .list_currencies(page.skip, page.limit, page.order_by.as_deref())
        .await?;

    tracing::debug!(count = currencies.len(), total, "Listed currencies");
    Ok(Json(
        Paginated::scrollable(currencies, page.skip, page.limit, total)
            .with_order_by(page.order_by),
    ))
}

#[tracing::instrument(skip(state), fields(code = %req.code))]
pub async fn create_currency<R: Store, P: RateProvider>(
    State(state): State<Arc<AppState<R, P>>>,
    Json(req): Json<CreateCurrencyRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let currency = state.service.create_currency(req).await?;
    Ok((StatusCode::CREATED, Json(currency)))
}

/// Seeds the catalog from the provider's symbol list.
#[tracing::instrument(skip(state))]
pub async fn import_currencies<R: Store, P: RateProvider>(
    State(state): State<Arc<AppState<R, P>>>,
) -> Result<impl IntoResponse, ApiError> {
    let summary = state.service.import_currencies().await?;
    Ok(Json(summary))
}

#[tracing::instrument(skip(state))]
pub async fn get_currency<R: Store, P: RateProvider>(
    State(state): State<Arc<AppState<R, P>>>,
    Path(code): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let currency = state.service.get_currency_by_code(&code).await?;
    Ok(Json(currency))
}

#[tracing::instrument(skip(state))]
pub async fn update_currency<R: Store, P: RateProvider>(
    State(state): State<Arc<AppState<R, P>>>,
    Path(code): Path<String>,
    Json(patch): Json<UpdateCurrencyRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let currency = state.service.update_currency(&code, patch).await?;
    Ok(Json(currency))
}

#[tracing::instrument(skip(state))]
pub async fn delete_currency<R: Store, P: RateProvider>(
    State(state): State<Arc<AppState<R, P>>>,
    Path(code): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    state.service.delete_currency(&code).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ─────────────────────────────────────────────────────────────────────────────
// Rates
// ─────────────────────────────────────────────────────────────────────────────

#[tracing::instrument(skip(state))]
pub async fn list_currency_rates<R: Store, P: RateProvider>(
    State(state): State<Arc<AppState<R, P>>>,
    Path(code): Path<String>,
    Query(page): Query<PaginationQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let (rates, total) = state
        .service
        .list_rates_for_currency(&code, page.skip, page.limit, page.order_by.as_deref())
        .await?;

    Ok(Json(
        Paginated::scrollable(rates, page.skip, page.limit, total).with_order_by(page.order_by),
    ))
}

/// Synchronous get-or-create of today's snapshot for one currency.
#[tracing::instrument(skip(state))]
pub async fn create_latest_rate<R: Store, P: RateProvider>(
    State(state): State<Arc<AppState<R, P>>>,
    Path(code): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let currency = state.service.get_currency_by_code(&code).await?;
    let rate = state
        .service
        .get_or_create_latest_rate(&currency.code)
        .await?;
    Ok(Json(rate))
}

/// Accepts a time-series backfill for one currency and runs it detached.
#[tracing::instrument(skip(state))]
pub async fn backfill_currency_rates<R: Store, P: RateProvider>(
    State(state): State<Arc<AppState<R, P>>>,
    Path(code): Path<String>,
    Query(dates): Query<DateRangeQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let currency = state.service.get_currency_by_code(&code).await?;
    let range = dates.to_range()?;

    let _task = state
        .service
        .spawn_backfill_time_series(&currency.code, range);

    tracing::debug!(%range, "Accepted time series backfill");
    Ok(StatusCode::ACCEPTED)
}

/// Accepts a refresh of today's snapshot for every currency.
#[tracing::instrument(skip(state))]
pub async fn refresh_all_rates<R: Store, P: RateProvider>(
    State(state): State<Arc<AppState<R, P>>>,
) -> impl IntoResponse {
    let _task = state.service.spawn_refresh_all_latest_rates();
    StatusCode::ACCEPTED
}

/// Accepts a time-series backfill for every currency.
#[tracing::instrument(skip(state))]
pub async fn backfill_all_rates<R: Store, P: RateProvider>(
    State(state): State<Arc<AppState<R, P>>>,
    Query(dates): Query<DateRangeQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let range = dates.to_range()?;
    let _task = state.service.spawn_backfill_all_time_series(range);

    tracing::debug!(%range, "Accepted time series backfill");
    Ok(StatusCode::ACCEPTED)
}

/// Newest stored snapshot for each requested code.
#[tracing::instrument(skip(state))]
pub async fn latest_rates_for_codes<R: Store, P: RateProvider>(
    State(state): State<Arc<AppState<R, P>>>,
    Query(query): Query<CodesQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let rates = state.service.latest_rates_for_codes(&query.codes()).await?;
    let count = rates.len();
    Ok(Json(Paginated::scrollable(
        rates,
        0,
        count as u32,
        count as u64,
    )))
}

// ─────────────────────────────────────────────────────────────────────────────
// Conversion
// ─────────────────────────────────────────────────────────────────────────────

#[tracing::instrument(skip(state))]
pub async fn convert<R: Store, P: RateProvider>(
    State(state): State<Arc<AppState<R, P>>>,
    Query(query): Query<ConvertQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let conversion = state
        .service
        .convert(&query.from, &query.to, query.amount)
        .await?;
    Ok(Json(conversion))
}

#[tracing::instrument(skip(state))]
pub async fn convert_cross<R: Store, P: RateProvider>(
    State(state): State<Arc<AppState<R, P>>>,
    Query(query): Query<ConvertQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let conversion = state
        .service
        .convert_cross(&query.from, &query.to, query.amount)
        .await?;
    Ok(Json(conversion))
}
