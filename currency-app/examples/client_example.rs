//! Client example walking the catalog, rate and conversion flows against a
//! locally started server.
//!
//! The server runs on a temp SQLite file with a fixed in-process rate
//! provider, so no Fixer key is needed.
//!
//! Run with: cargo run -p currency-app --example client_example --no-default-features --features sqlite

use std::collections::BTreeMap;
use std::net::SocketAddr;

use async_trait::async_trait;
use chrono::Utc;
use currency_client::CurrencyClient;
use currency_hex::{CurrencyService, inbound::HttpServer};
use currency_repo::build_repo;
use currency_types::{
    DateRange, LatestRates, PaginationQuery, ProviderError, RateProvider, Rates, TimeSeriesRates,
    UpdateCurrencyRequest,
};
use tempfile::tempdir;
use tokio::net::TcpListener;

/// Answers every base with the same table, dated today.
struct FixedRates;

fn table(base: &str) -> Rates {
    [("EUR", 0.92), ("GBP", 0.79), ("JPY", 149.5), ("USD", 1.0)]
        .into_iter()
        .filter(|(code, _)| *code != base)
        .map(|(code, rate)| (code.to_string(), rate))
        .collect()
}

#[async_trait]
impl RateProvider for FixedRates {
    async fn list_symbols(&self) -> Result<BTreeMap<String, String>, ProviderError> {
        Ok(BTreeMap::from([
            ("EUR".to_string(), "Euro".to_string()),
            ("GBP".to_string(), "British Pound Sterling".to_string()),
            ("JPY".to_string(), "Japanese Yen".to_string()),
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
            rates: table(base),
        })
    }

    async fn time_series(
        &self,
        base: &str,
        range: DateRange,
        _symbols: &[String],
    ) -> Result<TimeSeriesRates, ProviderError> {
        let rates = range
            .start()
            .iter_days()
            .take_while(|day| *day <= range.end())
            .map(|day| (day, table(base)))
            .collect();
        Ok(TimeSeriesRates {
            base: base.to_string(),
            start_date: range.start(),
            end_date: range.end(),
            rates,
        })
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt().with_env_filter("info").init();

    // Find an available port
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr: SocketAddr = listener.local_addr()?;
    let port = addr.port();
    drop(listener);

    // Use a temp file-backed SQLite DB
    let tmp = tempdir()?;
    let db_path = tmp.path().join("currency.db");
    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());

    println!("🚀 Starting server on port {port}...");
    println!("   Database: {db_url}");

    // Build repository (handles connection and migration)
    let repo = build_repo(&db_url).await?;

    // Start server in background
    let service = CurrencyService::new(repo, FixedRates);
    let server = HttpServer::new(service);
    let router = server.router();

    let server_addr = format!("127.0.0.1:{port}");
    let listener = TcpListener::bind(&server_addr).await?;
    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, router.into_make_service()).await {
            eprintln!("server error: {e}");
        }
    });

    // Create client
    let base_url = format!("http://127.0.0.1:{port}");
    let client = CurrencyClient::new(&base_url);

    // ─────────────────────────────────────────────────────────────────────────
    // Demo: catalog, rates, conversion
    // ─────────────────────────────────────────────────────────────────────────

    let health = client.health().await?;
    println!("✅ Server health: {health}");

    let summary = client.import_currencies().await?;
    println!(
        "✅ Imported currencies: {} created, {} skipped",
        summary.created, summary.skipped
    );

    let duplicate = client.create_currency("Dollar", "usd").await;
    println!(
        "✅ Duplicate code rejected: {}",
        duplicate.map(|c| c.code).unwrap_err()
    );

    let usd = client
        .update_currency(
            "USD",
            &UpdateCurrencyRequest {
                name: Some("US Dollar".to_string()),
                code: None,
            },
        )
        .await?;
    println!("✅ Renamed {} to {:?}", usd.code, usd.name);

    let page = client
        .list_currencies(&PaginationQuery {
            skip: 0,
            limit: 2,
            order_by: Some("code".to_string()),
        })
        .await?;
    println!("\n📋 First page ({} of {}):", page.count, page.total);
    for currency in &page.data {
        println!("   - {} ({})", currency.code, currency.name);
    }

    let rate = client.latest_rate("USD").await?;
    println!("\n✅ USD snapshot for {}: {:?}", rate.date, rate.rates);

    let eur = client.latest_rate("EUR").await?;
    println!("✅ EUR snapshot for {}: {} rates", eur.date, eur.rates.len());

    let direct = client.convert("USD", "JPY", 100.0).await?;
    println!(
        "✅ {} {} = {} {}",
        direct.amount, direct.from, direct.result, direct.to
    );

    let cross = client.convert_cross("USD", "GBP", 100.0).await?;
    println!(
        "✅ {} {} = {} {} (via EUR)",
        cross.amount, cross.from, cross.result, cross.to
    );

    client.backfill_rates("USD", "2024-01-01", "2024-01-07").await?;
    println!("✅ Backfill accepted");

    let latest = client.latest_rates_for_codes(&["USD", "EUR"]).await?;
    println!("✅ Latest snapshots stored for {} currencies", latest.count);

    println!("\n🎉 Example completed successfully!");

    Ok(())
}
