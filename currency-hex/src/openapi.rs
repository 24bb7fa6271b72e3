//! OpenAPI document for the currency API.

#![allow(dead_code)] // Path functions are only used by utoipa for documentation generation

use currency_types::domain::{Currency, CurrencyId, Rate, RateId};
use currency_types::dto::{
    CodesQuery, ConversionResponse, ConvertQuery, CreateCurrencyRequest, DateRangeQuery,
    ImportSummary, Next, PaginationQuery, UpdateCurrencyRequest,
};
use utoipa::OpenApi;

// Dummy functions to generate path documentation
// These are not the actual handlers, just for OpenAPI path generation

/// Health check endpoint
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Service is healthy", body = inline(serde_json::Value), example = json!({"status": "healthy"}))
    )
)]
async fn health() {}

/// List currencies
#[utoipa::path(
    get,
    path = "/currencies",
    tag = "currencies",
    params(PaginationQuery),
    responses(
        (status = 200, description = "Page of currencies", body = inline(serde_json::Value)),
        (status = 400, description = "Unknown order_by field")
    )
)]
async fn list_currencies() {}

/// Create a currency
#[utoipa::path(
    post,
    path = "/currencies",
    tag = "currencies",
    request_body = CreateCurrencyRequest,
    responses(
        (status = 201, description = "Currency created", body = Currency),
        (status = 400, description = "Blank field or duplicate code")
    )
)]
async fn create_currency() {}

/// Import the provider's currency list
#[utoipa::path(
    post,
    path = "/currencies/import",
    tag = "currencies",
    responses(
        (status = 200, description = "Import finished", body = ImportSummary),
        (status = 500, description = "Provider unavailable")
    )
)]
async fn import_currencies() {}

/// Get a currency by code
#[utoipa::path(
    get,
    path = "/currencies/{code}",
    tag = "currencies",
    params(("code" = String, Path, description = "Currency code")),
    responses(
        (status = 200, description = "Currency details", body = Currency),
        (status = 404, description = "Currency not found")
    )
)]
async fn get_currency() {}

/// Partially update a currency
#[utoipa::path(
    patch,
    path = "/currencies/{code}",
    tag = "currencies",
    params(("code" = String, Path, description = "Currency code")),
    request_body = UpdateCurrencyRequest,
    responses(
        (status = 200, description = "Updated currency", body = Currency),
        (status = 400, description = "Blank field or duplicate code"),
        (status = 404, description = "Currency not found")
    )
)]
async fn update_currency() {}

/// Delete a currency
#[utoipa::path(
    delete,
    path = "/currencies/{code}",
    tag = "currencies",
    params(("code" = String, Path, description = "Currency code")),
    responses(
        (status = 204, description = "Currency deleted"),
        (status = 404, description = "Currency not found")
    )
)]
async fn delete_currency() {}

/// List stored rate snapshots of a currency
#[utoipa::path(
    get,
    path = "/currencies/{code}/rates",
    tag = "rates",
    params(("code" = String, Path, description = "Base currency code"), PaginationQuery),
    responses(
        (status = 200, description = "Page of rate snapshots", body = inline(serde_json::Value)),
        (status = 404, description = "Currency not found")
    )
)]
async fn list_currency_rates() {}

/// Get or create today's snapshot of a currency
#[utoipa::path(
    post,
    path = "/currencies/{code}/rates/latest",
    tag = "rates",
    params(("code" = String, Path, description = "Base currency code")),
    responses(
        (status = 200, description = "Stored or freshly fetched snapshot", body = Rate),
        (status = 404, description = "Currency not found"),
        (status = 500, description = "Provider failure")
    )
)]
async fn create_latest_rate() {}

/// Backfill daily snapshots of a currency (runs in the background)
#[utoipa::path(
    post,
    path = "/currencies/{code}/rates",
    tag = "rates",
    params(("code" = String, Path, description = "Base currency code"), DateRangeQuery),
    responses(
        (status = 202, description = "Backfill accepted"),
        (status = 400, description = "Invalid date range"),
        (status = 404, description = "Currency not found")
    )
)]
async fn backfill_currency_rates() {}

/// Refresh today's snapshot of every currency (runs in the background)
#[utoipa::path(
    post,
    path = "/currencies/rates/latest",
    tag = "rates",
    responses((status = 202, description = "Refresh accepted"))
)]
async fn refresh_all_rates() {}

/// Backfill daily snapshots of every currency (runs in the background)
#[utoipa::path(
    post,
    path = "/currencies/rates",
    tag = "rates",
    params(DateRangeQuery),
    responses(
        (status = 202, description = "Backfill accepted"),
        (status = 400, description = "Invalid date range")
    )
)]
async fn backfill_all_rates() {}

/// Newest stored snapshot per currency code
#[utoipa::path(
    get,
    path = "/currencies_rates",
    tag = "rates",
    params(CodesQuery),
    responses(
        (status = 200, description = "Latest snapshots", body = inline(serde_json::Value)),
        (status = 404, description = "Unknown codes or no stored snapshot")
    )
)]
async fn latest_rates_for_codes() {}

/// Convert with the newest snapshot of the source currency
#[utoipa::path(
    get,
    path = "/currency/convert",
    tag = "conversion",
    params(ConvertQuery),
    responses(
        (status = 200, description = "Converted amount", body = ConversionResponse),
        (status = 400, description = "Unknown target or invalid amount"),
        (status = 404, description = "No snapshot stored for the source currency")
    )
)]
async fn convert() {}

/// Convert through the EUR snapshot, rounded to three decimals
#[utoipa::path(
    get,
    path = "/currency/convert/cross",
    tag = "conversion",
    params(ConvertQuery),
    responses(
        (status = 200, description = "Converted amount", body = ConversionResponse),
        (status = 400, description = "Unknown code or invalid amount"),
        (status = 404, description = "No EUR snapshot stored")
    )
)]
async fn convert_cross() {}

/// OpenAPI documentation for the Currency API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Currency Reference Service API",
        version = "1.0.0",
        description = "Currency catalog, daily exchange rate snapshots fetched from Fixer, and conversion.\n\nBulk refresh and backfill endpoints answer `202 Accepted` and keep working in the background.",
        license(name = "MIT"),
    ),
    paths(
        health,
        list_currencies,
        create_currency,
        import_currencies,
        get_currency,
        update_currency,
        delete_currency,
        list_currency_rates,
        create_latest_rate,
        backfill_currency_rates,
        refresh_all_rates,
        backfill_all_rates,
        latest_rates_for_codes,
        convert,
        convert_cross,
    ),
    components(
        schemas(
            Currency,
            CurrencyId,
            Rate,
            RateId,
            CreateCurrencyRequest,
            UpdateCurrencyRequest,
            ImportSummary,
            ConversionResponse,
            Next,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "currencies", description = "Currency catalog"),
        (name = "rates", description = "Exchange rate snapshots"),
        (name = "conversion", description = "Amount conversion"),
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_lists_every_route() {
        let doc = ApiDoc::openapi();
        for path in [
            "/currencies",
            "/currencies/{code}",
            "/currencies/{code}/rates",
            "/currencies/{code}/rates/latest",
            "/currencies/rates",
            "/currencies/rates/latest",
            "/currencies_rates",
            "/currency/convert",
            "/currency/convert/cross",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
    }
}
