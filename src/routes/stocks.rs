use std::sync::OnceLock;

use axum::extract::{Query, State};
use axum::routing::get;
use axum::{Json, Router};
use chrono::{NaiveDate, Utc};
use regex::Regex;
use serde::Deserialize;
use tracing::{error, info, warn};

use crate::config::parse_windows;
use crate::errors::AppError;
use crate::models::{AnalysisReport, Notice};
use crate::services::analysis_service::{self, AnalysisRequest};
use crate::services::fetcher::normalize_ticker;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(landing))
        .route("/analyze", get(analyze))
}

#[derive(Debug, Deserialize)]
struct AnalyzeQuery {
    ticker: Option<String>,
    start: Option<String>,
    end: Option<String>,
    windows: Option<String>,
}

fn ticker_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    // letters/digits plus the punctuation exchanges use: BRK.B, ^GSPC, EURUSD=X, BF-B
    PATTERN.get_or_init(|| Regex::new(r"^\^?[A-Z0-9][A-Z0-9.=\-]{0,14}$").expect("valid ticker regex"))
}

fn parse_date(field: &str, raw: &str) -> Result<NaiveDate, AppError> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| AppError::Validation(format!("{} must be YYYY-MM-DD, got '{}'", field, raw)))
}

/// Fills omitted query fields from the configured defaults and validates the rest.
fn build_request(query: AnalyzeQuery, state: &AppState) -> Result<AnalysisRequest, AppError> {
    let ticker = match query.ticker {
        Some(raw) => normalize_ticker(&raw),
        None => state.defaults.ticker.clone(),
    };
    if ticker.is_empty() {
        return Err(AppError::MissingTicker);
    }
    if !ticker_pattern().is_match(&ticker) {
        return Err(AppError::Validation(format!("'{}' is not a valid ticker symbol", ticker)));
    }

    let start = match query.start.as_deref() {
        Some(raw) => parse_date("start", raw)?,
        None => state.defaults.start,
    };
    let end = match query.end.as_deref() {
        Some(raw) => parse_date("end", raw)?,
        None => Utc::now().date_naive(),
    };
    let windows = match query.windows.as_deref() {
        Some(raw) => parse_windows(raw).map_err(AppError::Validation)?,
        None => state.defaults.windows.clone(),
    };

    Ok(AnalysisRequest {
        ticker,
        start,
        end,
        windows,
    })
}

async fn landing() -> Json<Notice> {
    info!("GET /api/stocks - Landing notice");
    Json(analysis_service::landing())
}

async fn analyze(
    Query(query): Query<AnalyzeQuery>,
    State(state): State<AppState>,
) -> Result<Json<AnalysisReport>, AppError> {
    let request = build_request(query, &state)?;
    info!(
        "GET /api/stocks/analyze - {} from {} to {}",
        request.ticker, request.start, request.end
    );

    analysis_service::analyze(state.provider.as_ref(), &request)
        .await
        .map(Json)
        .map_err(|e| {
            match &e {
                AppError::NotFound(_) | AppError::RateLimited => {
                    warn!("Analysis for {} failed: {}", request.ticker, e)
                }
                _ => error!("Analysis for {} failed: {}", request.ticker, e),
            }
            e
        })
}
