use anyhow::Result;
use chrono::NaiveDate;
use currency_hex::FixerClient;
use currency_types::{DateRange, ProviderError, RateProvider};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client(server: &MockServer) -> FixerClient {
    FixerClient::new("test-key")
        .unwrap()
        .with_base_url(server.uri())
}

#[tokio::test]
async fn test_latest_sends_key_and_base() -> Result<()> {
    let server = MockServer::start().await;

    let body = r#"{
        "success": true,
        "timestamp": 1704067199,
        "base": "USD",
        "date": "2024-01-01",
        "rates": {"EUR": 0.9, "JPY": 140.0}
    }"#;

    Mock::given(method("GET"))
        .and(path("/latest"))
        .and(query_param("access_key", "test-key"))
        .and(query_param("base", "USD"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "application/json"))
        .expect(1)
        .mount(&server)
        .await;

    let latest = client(&server).latest_rates("USD", &[]).await?;

    assert_eq!(latest.base, "USD");
    assert_eq!(latest.date, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
    assert_eq!(latest.rates["EUR"], 0.9);
    assert_eq!(latest.rates["JPY"], 140.0);

    let requests = server.received_requests().await.unwrap_or_default();
    let query = requests[0].url.query().unwrap_or_default();
    assert!(!query.contains("symbols"), "empty symbol list must be omitted");

    Ok(())
}

#[tokio::test]
async fn test_latest_restricts_symbols() -> Result<()> {
    let server = MockServer::start().await;

    let body = r#"{"success": true, "base": "EUR", "date": "2024-01-01", "rates": {"USD": 1.1}}"#;

    Mock::given(method("GET"))
        .and(path("/latest"))
        .and(query_param("symbols", "USD,GBP"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "application/json"))
        .expect(1)
        .mount(&server)
        .await;

    let latest = client(&server)
        .latest_rates("EUR", &["USD".to_string(), "GBP".to_string()])
        .await?;
    assert_eq!(latest.rates.len(), 1);

    Ok(())
}

#[tokio::test]
async fn test_time_series_keys_rates_by_day() -> Result<()> {
    let server = MockServer::start().await;

    let body = r#"{
        "success": true,
        "timeseries": true,
        "start_date": "2024-01-01",
        "end_date": "2024-01-03",
        "base": "USD",
        "rates": {
            "2024-01-01": {"EUR": 0.9},
            "2024-01-02": {"EUR": 0.91},
            "2024-01-03": {"EUR": 0.92}
        }
    }"#;

    Mock::given(method("GET"))
        .and(path("/timeseries"))
        .and(query_param("start_date", "2024-01-01"))
        .and(query_param("end_date", "2024-01-03"))
        .and(query_param("base", "USD"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "application/json"))
        .mount(&server)
        .await;

    let range = DateRange::parse("2024-01-01", "2024-01-03")?;
    let series = client(&server).time_series("USD", range, &[]).await?;

    assert_eq!(series.base, "USD");
    assert_eq!(series.rates.len(), 3);
    let last = NaiveDate::from_ymd_opt(2024, 1, 3).unwrap();
    assert_eq!(series.rates[&last]["EUR"], 0.92);

    Ok(())
}

#[tokio::test]
async fn test_symbols_lists_codes_and_names() -> Result<()> {
    let server = MockServer::start().await;

    let body = r#"{"success": true, "symbols": {"EUR": "Euro", "USD": "United States Dollar"}}"#;

    Mock::given(method("GET"))
        .and(path("/symbols"))
        .and(query_param("access_key", "test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "application/json"))
        .mount(&server)
        .await;

    let symbols = client(&server).list_symbols().await?;
    assert_eq!(symbols.len(), 2);
    assert_eq!(symbols["EUR"], "Euro");

    Ok(())
}

#[tokio::test]
async fn test_unsuccessful_body_is_api_error() -> Result<()> {
    let server = MockServer::start().await;

    let body = r#"{
        "success": false,
        "error": {"code": 101, "type": "invalid_access_key", "info": "You have not supplied a valid API Access Key."}
    }"#;

    Mock::given(method("GET"))
        .and(path("/latest"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "application/json"))
        .mount(&server)
        .await;

    let err = client(&server).latest_rates("USD", &[]).await.unwrap_err();
    match err {
        ProviderError::Api { code, kind, .. } => {
            assert_eq!(code, 101);
            assert_eq!(kind, "invalid_access_key");
        }
        other => panic!("expected Api error, got {other:?}"),
    }

    Ok(())
}

#[tokio::test]
async fn test_server_error_is_status_error() -> Result<()> {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/latest"))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream down"))
        .mount(&server)
        .await;

    let err = client(&server).latest_rates("USD", &[]).await.unwrap_err();
    assert!(
        matches!(err, ProviderError::Status { status: 500, ref body } if body == "upstream down"),
        "unexpected error: {err:?}"
    );

    Ok(())
}

#[tokio::test]
async fn test_malformed_body_is_decode_error() -> Result<()> {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/latest"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(r#"{"base": "USD"}"#, "application/json"))
        .mount(&server)
        .await;

    let err = client(&server).latest_rates("USD", &[]).await.unwrap_err();
    assert!(matches!(err, ProviderError::Decode(_)), "unexpected error: {err:?}");

    Ok(())
}
