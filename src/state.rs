use std::sync::Arc;

use chrono::NaiveDate;

use crate::external::market_data::MarketDataProvider;

/// Request defaults applied when the query string leaves a field out.
#[derive(Debug, Clone)]
pub struct AnalysisDefaults {
    pub ticker: String,
    pub start: NaiveDate,
    pub windows: Vec<usize>,
}

#[derive(Clone)]
pub struct AppState {
    pub provider: Arc<dyn MarketDataProvider>,
    pub defaults: Arc<AnalysisDefaults>,
}
