use async_trait::async_trait;
use chrono::NaiveDate;
use thiserror::Error;

use crate::models::{CompanyProfile, OhlcvBar};

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("network error: {0}")]
    Network(String),

    #[error("bad response: {0}")]
    BadResponse(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("rate limited")]
    RateLimited,

    #[error("unauthorized")]
    Unauthorized,

    #[error("not found")]
    NotFound,
}

#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Short identifier reported by the health endpoint.
    fn name(&self) -> &'static str;

    /// Daily bars for `ticker` from `start` (inclusive) to `end` (exclusive).
    async fn fetch_history(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<OhlcvBar>, ProviderError>;

    async fn fetch_profile(&self, ticker: &str) -> Result<CompanyProfile, ProviderError>;
}
