use chrono::NaiveDate;
use tracing::{info, warn};

use crate::errors::FetchError;
use crate::external::market_data::{MarketDataProvider, ProviderError};
use crate::models::{CompanyProfile, OhlcvSeries};

/// Upper-cases and trims user input into a ticker symbol.
pub fn normalize_ticker(raw: &str) -> String {
    raw.trim().to_uppercase()
}

/// Fetches daily bars for `[start, end)`. A single attempt; no retry or caching.
///
/// An empty result is an error, never an empty series.
pub async fn fetch_series(
    provider: &dyn MarketDataProvider,
    ticker: &str,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<OhlcvSeries, FetchError> {
    let ticker = normalize_ticker(ticker);

    match provider.fetch_history(&ticker, start, end).await {
        Ok(bars) if bars.is_empty() => {
            warn!("No bars for {} between {} and {}", ticker, start, end);
            Err(FetchError::EmptyResult { ticker })
        }
        Ok(bars) => {
            let series = OhlcvSeries::new(ticker, bars);
            info!("✓ Fetched {} bars for {}", series.len(), series.ticker());
            Ok(series)
        }
        Err(ProviderError::NotFound) => {
            warn!("Provider does not know ticker {}", ticker);
            Err(FetchError::EmptyResult { ticker })
        }
        Err(e) => {
            warn!("✗ Failed to fetch history for {}: {}", ticker, e);
            Err(FetchError::Provider(e))
        }
    }
}

pub async fn fetch_profile(
    provider: &dyn MarketDataProvider,
    ticker: &str,
) -> Result<CompanyProfile, FetchError> {
    let ticker = normalize_ticker(ticker);

    provider.fetch_profile(&ticker).await.map_err(|e| {
        warn!("Failed to fetch profile for {}: {}", ticker, e);
        FetchError::ProfileFetch(e)
    })
}
