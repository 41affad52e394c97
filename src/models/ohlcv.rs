use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One daily price bar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OhlcvBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

/// Daily bars for a single ticker, ascending by date with one bar per date.
///
/// OHLC consistency (high >= open/close >= low) is trusted from the provider.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OhlcvSeries {
    ticker: String,
    bars: Vec<OhlcvBar>,
}

impl OhlcvSeries {
    /// Sorts the bars by date. When a date repeats, the bar supplied last wins.
    pub fn new(ticker: impl Into<String>, mut bars: Vec<OhlcvBar>) -> Self {
        // stable sort keeps supply order within a date
        bars.sort_by_key(|b| b.date);

        let mut deduped: Vec<OhlcvBar> = Vec::with_capacity(bars.len());
        for bar in bars {
            match deduped.last_mut() {
                Some(last) if last.date == bar.date => *last = bar,
                _ => deduped.push(bar),
            }
        }

        Self {
            ticker: ticker.into(),
            bars: deduped,
        }
    }

    pub fn ticker(&self) -> &str {
        &self.ticker
    }

    pub fn bars(&self) -> &[OhlcvBar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.bars.iter().map(|b| b.date).collect()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.bars.first().map(|b| b.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.bars.last().map(|b| b.date)
    }
}
