use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::ChartSpec;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// A one-line message shown above the page content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn new(level: NoticeLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
        }
    }
}

/// Everything the page shows after a successful analysis.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisReport {
    pub ticker: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub notice: Notice,
    pub chart: ChartSpec,
    pub info: InfoPanel,
    pub recent: Vec<TableRow>,
}

/// Company information block. Falls back to a warning when the profile call failed.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum InfoPanel {
    Available {
        header: CompanyHeader,
        summary: String,
        metrics: Vec<Metric>,
    },
    Unavailable {
        error: Notice,
        warning: Notice,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompanyHeader {
    pub name: String,
    pub sector: String,
    pub industry: String,
    pub website: String,
    pub website_href: String,
    pub logo: Logo,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Logo {
    Image { url: String, width: u32 },
    Caption { text: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Metric {
    pub label: String,
    pub value: String,
}

/// One row of the raw-data table, with any moving averages computed for that day.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableRow {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
    #[serde(flatten)]
    pub indicators: BTreeMap<String, Option<f64>>,
}
