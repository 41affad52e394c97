//! HTTP-level tests for the stock analysis endpoints.
//!
//! The router is driven in-process with `tower::ServiceExt::oneshot` against
//! stub providers and the CSV fixtures under `tests/fixtures`.

use std::sync::Arc;

use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use chrono::{Datelike, NaiveDate, Weekday};
use serde_json::Value;
use tower::ServiceExt;

use stock_analyzer::app::create_app;
use stock_analyzer::external::csv_provider::CsvProvider;
use stock_analyzer::external::market_data::{MarketDataProvider, ProviderError};
use stock_analyzer::models::{CompanyProfile, OhlcvBar};
use stock_analyzer::state::{AnalysisDefaults, AppState};

// ---------------------------------------------------------------------------
// Stub provider
// ---------------------------------------------------------------------------

#[derive(Clone, Copy)]
enum History {
    TradingYear,
    Empty,
    NetworkDown,
    RateLimited,
}

#[derive(Clone, Copy)]
enum Profile {
    Full,
    Broken,
}

struct StubProvider {
    history: History,
    profile: Profile,
}

fn trading_days_2023() -> Vec<NaiveDate> {
    NaiveDate::from_ymd_opt(2023, 1, 3)
        .unwrap()
        .iter_days()
        .filter(|d| !matches!(d.weekday(), Weekday::Sat | Weekday::Sun))
        .take(250)
        .collect()
}

fn close_at(i: usize) -> f64 {
    130.0 + i as f64 * 0.25 + (i as f64 / 5.0).sin() * 3.0
}

#[async_trait]
impl MarketDataProvider for StubProvider {
    fn name(&self) -> &'static str {
        "stub"
    }

    async fn fetch_history(
        &self,
        _ticker: &str,
        _start: NaiveDate,
        _end: NaiveDate,
    ) -> Result<Vec<OhlcvBar>, ProviderError> {
        match self.history {
            History::TradingYear => Ok(trading_days_2023()
                .into_iter()
                .enumerate()
                .map(|(i, date)| {
                    let close = close_at(i);
                    OhlcvBar {
                        date,
                        open: close - 0.5,
                        high: close + 1.0,
                        low: close - 1.5,
                        close,
                        volume: 50_000_000 + i as u64,
                    }
                })
                .collect()),
            History::Empty => Ok(vec![]),
            History::NetworkDown => Err(ProviderError::Network("connection refused".into())),
            History::RateLimited => Err(ProviderError::RateLimited),
        }
    }

    async fn fetch_profile(&self, _ticker: &str) -> Result<CompanyProfile, ProviderError> {
        match self.profile {
            Profile::Full => Ok(CompanyProfile {
                long_name: Some("Apple Inc.".into()),
                sector: Some("Technology".into()),
                market_cap: Some(2_950_000_000_000.0),
                ..CompanyProfile::default()
            }),
            Profile::Broken => Err(ProviderError::Parse("expected value at line 1".into())),
        }
    }
}

fn app_with(provider: Arc<dyn MarketDataProvider>) -> Router {
    create_app(AppState {
        provider,
        defaults: Arc::new(AnalysisDefaults {
            ticker: "AAPL".to_string(),
            start: NaiveDate::from_ymd_opt(2023, 1, 1).unwrap(),
            windows: vec![50, 200],
        }),
    })
}

fn stub_app(history: History, profile: Profile) -> Router {
    app_with(Arc::new(StubProvider { history, profile }))
}

async fn get(app: Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

const AAPL_2023: &str = "/api/stocks/analyze?ticker=AAPL&start=2023-01-01&end=2023-12-31";

// ---------------------------------------------------------------------------
// Successful analysis
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_analysis_builds_chart_with_moving_averages() {
    let (status, body) = get(stub_app(History::TradingYear, Profile::Full), AAPL_2023).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ticker"], "AAPL");
    assert_eq!(body["notice"]["level"], "success");
    assert_eq!(body["notice"]["message"], "Displaying data for AAPL");

    let layers = body["chart"]["layers"].as_array().unwrap();
    assert_eq!(layers.len(), 3);
    assert_eq!(layers[0]["type"], "candlestick");
    assert_eq!(layers[0]["close"].as_array().unwrap().len(), 250);
    assert_eq!(layers[1]["name"], "50-Day Moving Average");
    assert_eq!(layers[2]["name"], "200-Day Moving Average");

    let ma200 = layers[2]["values"].as_array().unwrap();
    assert!(ma200[..199].iter().all(Value::is_null));
    assert_eq!(ma200.iter().filter(|v| !v.is_null()).count(), 250 - 200 + 1);

    let expected = (0..200).map(close_at).sum::<f64>() / 200.0;
    assert!((ma200[199].as_f64().unwrap() - expected).abs() < 1e-9);

    assert_eq!(body["chart"]["layout"]["title"], "AAPL Stock Analysis");
}

#[tokio::test]
async fn test_analysis_includes_last_ten_rows_with_indicators() {
    let (_, body) = get(stub_app(History::TradingYear, Profile::Full), AAPL_2023).await;

    let rows = body["recent"].as_array().unwrap();
    assert_eq!(rows.len(), 10);

    let last_day = trading_days_2023()[249].to_string();
    assert_eq!(rows[9]["date"], last_day.as_str());
    assert!(rows[9]["MA50"].is_number());
    assert!(rows[9]["MA200"].is_number());
}

#[tokio::test]
async fn test_analysis_info_panel() {
    let (_, body) = get(stub_app(History::TradingYear, Profile::Full), AAPL_2023).await;

    let info = &body["info"];
    assert_eq!(info["status"], "available");
    assert_eq!(info["header"]["name"], "Apple Inc.");
    assert_eq!(info["header"]["industry"], "N/A");
    assert_eq!(info["header"]["logo"]["kind"], "caption");

    let market_cap = info["metrics"]
        .as_array()
        .unwrap()
        .iter()
        .find(|m| m["label"] == "Market Cap")
        .unwrap();
    assert_eq!(market_cap["value"], "$2.95 T");
}

#[tokio::test]
async fn test_profile_failure_still_renders_chart() {
    let (status, body) = get(stub_app(History::TradingYear, Profile::Broken), AAPL_2023).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["chart"]["layers"].as_array().unwrap().len(), 3);
    assert_eq!(body["info"]["status"], "unavailable");
    assert_eq!(
        body["info"]["error"]["message"],
        "Could not fetch stock info: parse error: expected value at line 1"
    );
    assert_eq!(body["info"]["warning"]["level"], "warning");
}

#[tokio::test]
async fn test_custom_windows_and_lowercase_ticker() {
    let (status, body) = get(
        stub_app(History::TradingYear, Profile::Full),
        "/api/stocks/analyze?ticker=aapl&start=2023-01-01&end=2023-12-31&windows=20",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ticker"], "AAPL");
    let layers = body["chart"]["layers"].as_array().unwrap();
    assert_eq!(layers.len(), 2);
    assert_eq!(layers[1]["name"], "20-Day Moving Average");
}

#[tokio::test]
async fn test_repeated_windows_draw_one_line() {
    let (status, body) = get(
        stub_app(History::TradingYear, Profile::Full),
        "/api/stocks/analyze?ticker=AAPL&start=2023-01-01&end=2023-12-31&windows=20,20",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let layers = body["chart"]["layers"].as_array().unwrap();
    assert_eq!(layers.len(), 2);

    let row = body["recent"][0].as_object().unwrap();
    let ma_keys: Vec<&String> = row.keys().filter(|k| k.starts_with("MA")).collect();
    assert_eq!(ma_keys, vec!["MA20"]);
}

#[tokio::test]
async fn test_query_defaults_are_applied() {
    let (status, body) =
        get(stub_app(History::TradingYear, Profile::Full), "/api/stocks/analyze").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ticker"], "AAPL");
    assert_eq!(body["start"], "2023-01-01");
}

// ---------------------------------------------------------------------------
// Failures
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_empty_history_is_not_found() {
    let (status, body) = get(stub_app(History::Empty, Profile::Full), AAPL_2023).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["level"], "error");
    assert_eq!(
        body["message"],
        "No data found for ticker 'AAPL'. It might be delisted or incorrect."
    );
}

#[tokio::test]
async fn test_provider_error_is_bad_gateway_with_message() {
    let (status, body) = get(stub_app(History::NetworkDown, Profile::Full), AAPL_2023).await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["message"], "An error occurred: network error: connection refused");
}

#[tokio::test]
async fn test_rate_limited_is_429() {
    let (status, _) = get(stub_app(History::RateLimited, Profile::Full), AAPL_2023).await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
}

#[tokio::test]
async fn test_blank_ticker_asks_for_one() {
    let (status, body) = get(
        stub_app(History::TradingYear, Profile::Full),
        "/api/stocks/analyze?ticker=%20%20&start=2023-01-01&end=2023-12-31",
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["level"], "warning");
    assert_eq!(body["message"], "Please enter a stock ticker.");
}

#[tokio::test]
async fn test_invalid_inputs_are_rejected() {
    let cases = [
        "/api/stocks/analyze?ticker=AAPL&start=2023-12-31&end=2023-01-01",
        "/api/stocks/analyze?ticker=AAPL&start=yesterday",
        "/api/stocks/analyze?ticker=AAPL&windows=0",
        "/api/stocks/analyze?ticker=..%2Fetc",
    ];

    for uri in cases {
        let (status, body) = get(stub_app(History::TradingYear, Profile::Full), uri).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{}", uri);
        assert_eq!(body["level"], "error", "{}", uri);
    }
}

// ---------------------------------------------------------------------------
// Landing and health
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_landing_notice() {
    let (status, body) = get(stub_app(History::Empty, Profile::Full), "/api/stocks").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["level"], "info");
}

#[tokio::test]
async fn test_health_reports_provider() {
    let (status, body) = get(stub_app(History::Empty, Profile::Full), "/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "OK");
    assert_eq!(body["provider"], "stub");
}

// ---------------------------------------------------------------------------
// CSV source end to end
// ---------------------------------------------------------------------------

fn csv_app() -> Router {
    let dir = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures");
    app_with(Arc::new(CsvProvider::new(dir)))
}

#[tokio::test]
async fn test_csv_source_end_to_end() {
    let (status, body) = get(
        csv_app(),
        "/api/stocks/analyze?ticker=msft&start=2024-02-01&end=2024-03-14&windows=5",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["chart"]["layers"][0]["dates"].as_array().unwrap().len(), 30);

    let rows = body["recent"].as_array().unwrap();
    assert_eq!(rows[9]["date"], "2024-03-13");
    assert!((rows[9]["MA5"].as_f64().unwrap() - 411.902).abs() < 1e-9);

    assert_eq!(body["info"]["header"]["name"], "Microsoft Corporation");
    assert_eq!(body["info"]["header"]["logo"]["url"], "https://logo.clearbit.com/microsoft.com");
}

#[tokio::test]
async fn test_csv_unknown_ticker_is_not_found() {
    let (status, body) = get(
        csv_app(),
        "/api/stocks/analyze?ticker=NOPE&start=2024-02-01&end=2024-03-14",
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(
        body["message"],
        "No data found for ticker 'NOPE'. It might be delisted or incorrect."
    );
}
