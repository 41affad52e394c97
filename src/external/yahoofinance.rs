use crate::external::market_data::{MarketDataProvider, ProviderError};
use crate::models::{lenient_f64, CompanyProfile, OhlcvBar};
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Deserialize;
use tokio::sync::Mutex;
use tracing::{debug, warn};

const CHART_URL: &str = "https://query1.finance.yahoo.com/v8/finance/chart";
const SECONDS_PER_DAY: i64 = 86_400;
const QUOTE_SUMMARY_URL: &str = "https://query2.finance.yahoo.com/v10/finance/quoteSummary";

// fc.yahoo.com answers 404 but sets the session cookie the crumb is bound to
const COOKIE_URL: &str = "https://fc.yahoo.com";
const CRUMB_URL: &str = "https://query1.finance.yahoo.com/v1/test/getcrumb";

/// Yahoo Finance provider - free, no API key required.
///
/// The chart endpoint is open. `quoteSummary` wants a session cookie plus a
/// matching crumb, fetched on first use and cached until Yahoo rejects it.
pub struct YahooFinanceProvider {
    client: reqwest::Client,
    crumb: Mutex<Option<String>>,
}

impl YahooFinanceProvider {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::builder()
                .user_agent("Mozilla/5.0 (compatible; StockAnalyzer/0.1)")
                .cookie_store(true)
                .build()
                .unwrap_or_else(|_| reqwest::Client::new()),
            crumb: Mutex::new(None),
        }
    }

    async fn crumb(&self) -> Result<String, ProviderError> {
        let mut cached = self.crumb.lock().await;
        if let Some(crumb) = cached.as_ref() {
            return Ok(crumb.clone());
        }

        self.client
            .get(COOKIE_URL)
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        let resp = self
            .client
            .get(CRUMB_URL)
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        let status = resp.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(ProviderError::RateLimited);
        }
        if !status.is_success() {
            return Err(ProviderError::BadResponse(format!("crumb request failed: HTTP {}", status)));
        }

        let body = resp
            .text()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;
        let crumb = parse_crumb(&body)?;

        debug!("Obtained Yahoo session crumb");
        *cached = Some(crumb.clone());
        Ok(crumb)
    }

    async fn forget_crumb(&self) {
        *self.crumb.lock().await = None;
    }

    async fn quote_summary(&self, ticker: &str) -> Result<QuoteSummaryResponse, ProviderError> {
        let url = format!("{}/{}", QUOTE_SUMMARY_URL, ticker);
        let crumb = self.crumb().await?;

        self.get_json(
            &url,
            &[
                ("modules", "assetProfile,price,summaryDetail,financialData".to_string()),
                ("crumb", crumb),
            ],
        )
        .await
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<T, ProviderError> {
        let resp = self
            .client
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        let status = resp.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(ProviderError::RateLimited);
        }
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(ProviderError::NotFound);
        }
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(ProviderError::Unauthorized);
        }
        if !status.is_success() {
            return Err(ProviderError::BadResponse(format!("HTTP {}", status)));
        }

        resp.json::<T>()
            .await
            .map_err(|e| ProviderError::Parse(e.to_string()))
    }
}

impl Default for YahooFinanceProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Deserialize)]
struct YahooChartResponse {
    chart: YahooChart,
}

#[derive(Debug, Deserialize)]
struct YahooChart {
    result: Option<Vec<YahooResult>>,
    error: Option<YahooError>,
}

#[derive(Debug, Deserialize)]
struct YahooError {
    description: String,
}

#[derive(Debug, Deserialize)]
struct YahooResult {
    #[serde(default)]
    meta: YahooMeta,
    // absent when the range holds no trading days
    #[serde(default)]
    timestamp: Vec<i64>,
    indicators: YahooIndicators,
}

#[derive(Debug, Default, Deserialize)]
struct YahooMeta {
    /// Exchange offset from UTC in seconds.
    #[serde(default)]
    gmtoffset: i64,
}

#[derive(Debug, Deserialize)]
struct YahooIndicators {
    quote: Vec<YahooQuote>,
}

#[derive(Debug, Default, Deserialize)]
struct YahooQuote {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<f64>>,
}

fn parse_chart(body: YahooChartResponse) -> Result<Vec<OhlcvBar>, ProviderError> {
    if let Some(error) = body.chart.error {
        if error.description.contains("No data found") {
            return Err(ProviderError::NotFound);
        }
        return Err(ProviderError::BadResponse(error.description));
    }

    let result = body
        .chart
        .result
        .and_then(|mut r| if r.is_empty() { None } else { Some(r.swap_remove(0)) })
        .ok_or_else(|| ProviderError::BadResponse("No results in response".into()))?;

    if result.timestamp.is_empty() {
        return Ok(Vec::new());
    }

    let quote = result
        .indicators
        .quote
        .into_iter()
        .next()
        .ok_or_else(|| ProviderError::BadResponse("No quote data in response".into()))?;

    if quote.close.len() != result.timestamp.len() {
        return Err(ProviderError::Parse(
            "Timestamp and price arrays have different lengths".into(),
        ));
    }

    let field = |values: &[Option<f64>], i: usize| values.get(i).copied().flatten();
    let offset = result.meta.gmtoffset;

    let bars = result
        .timestamp
        .iter()
        .enumerate()
        .filter_map(|(i, ts)| {
            // market holidays come back as nulls
            let open = field(&quote.open, i)?;
            let high = field(&quote.high, i)?;
            let low = field(&quote.low, i)?;
            let close = field(&quote.close, i)?;
            let volume = field(&quote.volume, i).unwrap_or(0.0).max(0.0) as u64;

            // timestamps mark the session open; the bar belongs to the exchange's calendar day
            let date = chrono::DateTime::from_timestamp(ts + offset, 0).map(|dt| dt.date_naive())?;

            Some(OhlcvBar {
                date,
                open,
                high,
                low,
                close,
                volume,
            })
        })
        .collect();

    Ok(bars)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QuoteSummaryResponse {
    quote_summary: QuoteSummary,
}

#[derive(Debug, Deserialize)]
struct QuoteSummary {
    result: Option<Vec<QuoteSummaryResult>>,
    error: Option<YahooError>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QuoteSummaryResult {
    #[serde(default)]
    asset_profile: Option<AssetProfile>,
    #[serde(default)]
    price: Option<PriceModule>,
    #[serde(default)]
    summary_detail: Option<SummaryDetail>,
    #[serde(default)]
    financial_data: Option<FinancialData>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AssetProfile {
    sector: Option<String>,
    industry: Option<String>,
    website: Option<String>,
    long_business_summary: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PriceModule {
    long_name: Option<String>,
    short_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_f64")]
    regular_market_price: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    market_cap: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SummaryDetail {
    #[serde(default, rename = "trailingPE", deserialize_with = "lenient_f64")]
    trailing_pe: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    dividend_yield: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    fifty_two_week_high: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    fifty_two_week_low: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    market_cap: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FinancialData {
    #[serde(default, deserialize_with = "lenient_f64")]
    current_price: Option<f64>,
}

fn parse_quote_summary(body: QuoteSummaryResponse) -> Result<CompanyProfile, ProviderError> {
    if let Some(error) = body.quote_summary.error {
        if error.description.contains("not found") {
            return Err(ProviderError::NotFound);
        }
        return Err(ProviderError::BadResponse(error.description));
    }

    let result = body
        .quote_summary
        .result
        .and_then(|r| r.into_iter().next())
        .ok_or_else(|| ProviderError::BadResponse("No results in response".into()))?;

    let asset = result.asset_profile.unwrap_or_default();
    let price = result.price.unwrap_or_default();
    let detail = result.summary_detail.unwrap_or_default();
    let financial = result.financial_data.unwrap_or_default();

    let logo_url = asset
        .website
        .as_deref()
        .and_then(CompanyProfile::logo_from_website);

    Ok(CompanyProfile {
        long_name: price.long_name.or(price.short_name),
        sector: asset.sector,
        industry: asset.industry,
        website: asset.website,
        long_business_summary: asset.long_business_summary,
        current_price: financial.current_price.or(price.regular_market_price),
        market_cap: price.market_cap.or(detail.market_cap),
        trailing_pe: detail.trailing_pe,
        dividend_yield: detail.dividend_yield,
        fifty_two_week_high: detail.fifty_two_week_high,
        fifty_two_week_low: detail.fifty_two_week_low,
        logo_url,
    })
}

/// Keeps bars whose exchange date falls in `[start, end)`.
fn within(bars: Vec<OhlcvBar>, start: NaiveDate, end: NaiveDate) -> Vec<OhlcvBar> {
    bars.into_iter()
        .filter(|bar| bar.date >= start && bar.date < end)
        .collect()
}

/// The crumb endpoint answers with the bare token, or an HTML/JSON error page.
fn parse_crumb(body: &str) -> Result<String, ProviderError> {
    let crumb = body.trim();
    if crumb.is_empty() || crumb.contains(|c: char| matches!(c, '<' | '{') || c.is_whitespace()) {
        return Err(ProviderError::BadResponse("no crumb in response".into()));
    }
    Ok(crumb.to_string())
}

fn epoch_seconds(date: NaiveDate) -> i64 {
    date.and_hms_opt(0, 0, 0)
        .map(|dt| dt.and_utc().timestamp())
        .unwrap_or_default()
}

#[async_trait]
impl MarketDataProvider for YahooFinanceProvider {
    fn name(&self) -> &'static str {
        "yahoo"
    }

    async fn fetch_history(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<OhlcvBar>, ProviderError> {
        let url = format!("{}/{}", CHART_URL, ticker);

        // widened by a day each side; sessions east of UTC open on the previous UTC day
        let period1 = epoch_seconds(start) - SECONDS_PER_DAY;
        let period2 = epoch_seconds(end) + SECONDS_PER_DAY;

        let body: YahooChartResponse = self
            .get_json(
                &url,
                &[
                    ("interval", "1d".to_string()),
                    ("period1", period1.to_string()),
                    ("period2", period2.to_string()),
                    ("events", "history".to_string()),
                ],
            )
            .await?;

        Ok(within(parse_chart(body)?, start, end))
    }

    async fn fetch_profile(&self, ticker: &str) -> Result<CompanyProfile, ProviderError> {
        let body = match self.quote_summary(ticker).await {
            Err(ProviderError::Unauthorized) => {
                // crumbs expire with the session cookie; retry once with a fresh pair
                warn!("Yahoo rejected the session crumb for {}, refreshing", ticker);
                self.forget_crumb().await;
                self.quote_summary(ticker).await?
            }
            other => other?,
        };

        parse_quote_summary(body)
    }
}
