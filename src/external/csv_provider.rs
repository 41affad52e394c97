use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::NaiveDate;
use csv::ReaderBuilder;

use crate::external::market_data::{MarketDataProvider, ProviderError};
use crate::models::{CompanyProfile, OhlcvBar};

/// Reads daily bars from `<dir>/<TICKER>.csv` and profiles from
/// `<dir>/<TICKER>.profile.json`.
///
/// The CSV needs `Date,Open,High,Low,Close,Volume` headers in any case and order.
pub struct CsvProvider {
    dir: PathBuf,
}

impl CsvProvider {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    fn file_for(&self, ticker: &str, suffix: &str) -> Result<PathBuf, ProviderError> {
        if ticker.is_empty() || ticker.contains(|c: char| c == '/' || c == '\\') || ticker.starts_with('.') {
            return Err(ProviderError::BadResponse(format!("invalid ticker '{}'", ticker)));
        }
        Ok(self.dir.join(format!("{}{}", ticker, suffix)))
    }
}

async fn read_file(path: &Path) -> Result<String, ProviderError> {
    match tokio::fs::read_to_string(path).await {
        Ok(contents) => Ok(contents),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(ProviderError::NotFound),
        Err(e) => Err(ProviderError::Network(format!("{}: {}", path.display(), e))),
    }
}

struct Columns {
    date: usize,
    open: usize,
    high: usize,
    low: usize,
    close: usize,
    volume: Option<usize>,
}

impl Columns {
    fn from_headers(headers: &csv::StringRecord) -> Result<Self, ProviderError> {
        let lower: Vec<String> = headers.iter().map(|h| h.trim().to_lowercase()).collect();
        let find = |name: &str| lower.iter().position(|h| h == name);
        let require = |name: &str| {
            find(name).ok_or_else(|| ProviderError::Parse(format!("missing '{}' column", name)))
        };

        Ok(Self {
            date: require("date")?,
            open: require("open")?,
            high: require("high")?,
            low: require("low")?,
            close: require("close")?,
            volume: find("volume"),
        })
    }
}

fn parse_price(record: &csv::StringRecord, idx: usize, line: usize) -> Result<f64, ProviderError> {
    let raw = record.get(idx).unwrap_or("").trim();
    raw.parse::<f64>()
        .map_err(|_| ProviderError::Parse(format!("line {}: bad number '{}'", line, raw)))
}

fn parse_volume(raw: &str) -> u64 {
    let raw = raw.trim();
    raw.parse::<u64>()
        .ok()
        .or_else(|| raw.parse::<f64>().ok().map(|v| v.max(0.0) as u64))
        .unwrap_or(0)
}

pub fn parse_bars(
    contents: &str,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<Vec<OhlcvBar>, ProviderError> {
    let mut reader = ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(contents.as_bytes());

    let headers = reader
        .headers()
        .map_err(|e| ProviderError::Parse(e.to_string()))?
        .clone();
    let cols = Columns::from_headers(&headers)?;

    let mut bars = Vec::new();
    for (i, record) in reader.records().enumerate() {
        let record = record.map_err(|e| ProviderError::Parse(e.to_string()))?;
        let line = i + 2;

        let raw_date = record.get(cols.date).unwrap_or("");
        // also accept "2023-01-03 00:00:00" style timestamps
        let date = NaiveDate::parse_from_str(raw_date.get(..10).unwrap_or(raw_date), "%Y-%m-%d")
            .map_err(|_| ProviderError::Parse(format!("line {}: bad date '{}'", line, raw_date)))?;

        if date < start || date >= end {
            continue;
        }

        bars.push(OhlcvBar {
            date,
            open: parse_price(&record, cols.open, line)?,
            high: parse_price(&record, cols.high, line)?,
            low: parse_price(&record, cols.low, line)?,
            close: parse_price(&record, cols.close, line)?,
            volume: cols
                .volume
                .and_then(|idx| record.get(idx))
                .map(parse_volume)
                .unwrap_or(0),
        });
    }

    Ok(bars)
}

#[async_trait]
impl MarketDataProvider for CsvProvider {
    fn name(&self) -> &'static str {
        "csv"
    }

    async fn fetch_history(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<OhlcvBar>, ProviderError> {
        let path = self.file_for(ticker, ".csv")?;
        let contents = read_file(&path).await?;
        parse_bars(&contents, start, end)
    }

    async fn fetch_profile(&self, ticker: &str) -> Result<CompanyProfile, ProviderError> {
        let path = self.file_for(ticker, ".profile.json")?;
        let contents = read_file(&path).await?;

        let mut profile: CompanyProfile =
            serde_json::from_str(&contents).map_err(|e| ProviderError::Parse(e.to_string()))?;

        if profile.logo_url.is_none() {
            profile.logo_url = profile
                .website
                .as_deref()
                .and_then(CompanyProfile::logo_from_website);
        }
        Ok(profile)
    }
}
