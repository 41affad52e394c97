use std::collections::BTreeMap;

use chrono::NaiveDate;
use tracing::{info, warn};

use crate::errors::AppError;
use crate::external::market_data::MarketDataProvider;
use crate::models::{
    AnalysisReport, CompanyHeader, CompanyProfile, IndicatorSeries, InfoPanel, Logo, Metric,
    Notice, NoticeLevel, TableRow,
};
use crate::services::{chart_builder, fetcher, indicators};
use crate::utils::format::{format_currency, format_percent, format_price, format_ratio};

const RECENT_ROWS: usize = 10;
const LOGO_WIDTH: u32 = 100;
const PROFILE_WARNING: &str =
    "Note: profile data from the provider can be unreliable. Some data may be missing.";

#[derive(Debug, Clone)]
pub struct AnalysisRequest {
    pub ticker: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub windows: Vec<usize>,
}

pub fn landing() -> Notice {
    Notice::new(
        NoticeLevel::Info,
        "Enter a stock ticker and choose a date range to analyze a stock.",
    )
}

/// Runs one analysis: bars, moving averages, chart, company panel and the latest rows.
///
/// Failing to fetch bars aborts the whole analysis. Failing to fetch the
/// profile only replaces the info panel with a warning.
pub async fn analyze(
    provider: &dyn MarketDataProvider,
    request: &AnalysisRequest,
) -> Result<AnalysisReport, AppError> {
    let ticker = fetcher::normalize_ticker(&request.ticker);
    if ticker.is_empty() {
        return Err(AppError::MissingTicker);
    }
    if request.start > request.end {
        return Err(AppError::Validation(format!(
            "start date {} is after end date {}",
            request.start, request.end
        )));
    }

    let series = fetcher::fetch_series(provider, &ticker, request.start, request.end).await?;
    let data = indicators::with_moving_averages(&series, &request.windows);
    let chart = chart_builder::build_chart(&data, &ticker);

    let info = match fetcher::fetch_profile(provider, &ticker).await {
        Ok(profile) => info_panel(&profile),
        Err(e) => {
            warn!("Showing chart for {} without company info", ticker);
            InfoPanel::Unavailable {
                error: Notice::new(NoticeLevel::Error, e.to_string()),
                warning: Notice::new(NoticeLevel::Warning, PROFILE_WARNING),
            }
        }
    };

    info!(
        "Analysis for {} ready: {} bars, {} indicator columns",
        ticker,
        data.series.len(),
        data.columns.len()
    );

    Ok(AnalysisReport {
        notice: Notice::new(NoticeLevel::Success, format!("Displaying data for {}", ticker)),
        ticker,
        start: request.start,
        end: request.end,
        chart,
        info,
        recent: tail_rows(&data, RECENT_ROWS),
    })
}

/// Builds the company block. Missing numeric metrics other than market cap
/// read as zero, the way the page has always shown them.
pub fn info_panel(profile: &CompanyProfile) -> InfoPanel {
    let text = |v: &Option<String>| v.clone().unwrap_or_else(|| "N/A".to_string());

    let logo = match profile.logo_url.as_deref().filter(|u| !u.is_empty()) {
        Some(url) => Logo::Image {
            url: url.to_string(),
            width: LOGO_WIDTH,
        },
        None => Logo::Caption {
            text: "No Logo".to_string(),
        },
    };

    let header = CompanyHeader {
        name: text(&profile.long_name),
        sector: text(&profile.sector),
        industry: text(&profile.industry),
        website: text(&profile.website),
        website_href: profile.website.clone().unwrap_or_else(|| "#".to_string()),
        logo,
    };

    let metric = |label: &str, value: String| Metric {
        label: label.to_string(),
        value,
    };

    let metrics = vec![
        metric("Current Price", format_price(profile.current_price.unwrap_or(0.0))),
        metric("Market Cap", format_currency(profile.market_cap)),
        metric("Trailing P/E", format_ratio(profile.trailing_pe.unwrap_or(0.0))),
        metric("Dividend Yield", format_percent(profile.dividend_yield.unwrap_or(0.0))),
        metric("52-Week High", format_price(profile.fifty_two_week_high.unwrap_or(0.0))),
        metric("52-Week Low", format_price(profile.fifty_two_week_low.unwrap_or(0.0))),
    ];

    InfoPanel::Available {
        header,
        summary: profile
            .long_business_summary
            .clone()
            .unwrap_or_else(|| "No summary available.".to_string()),
        metrics,
    }
}

/// The last `n` bars with their indicator values, oldest first.
pub fn tail_rows(data: &IndicatorSeries, n: usize) -> Vec<TableRow> {
    let bars = data.series.bars();
    let skip = bars.len().saturating_sub(n);

    bars.iter()
        .enumerate()
        .skip(skip)
        .map(|(i, bar)| TableRow {
            date: bar.date,
            open: bar.open,
            high: bar.high,
            low: bar.low,
            close: bar.close,
            volume: bar.volume,
            indicators: data
                .columns
                .iter()
                .map(|c| (c.name.clone(), c.values.get(i).copied().flatten()))
                .collect::<BTreeMap<_, _>>(),
        })
        .collect()
}
