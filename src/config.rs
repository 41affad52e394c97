use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{anyhow, bail, Context, Result};
use chrono::NaiveDate;

use crate::services::indicators::DEFAULT_WINDOWS;

#[derive(Debug, Clone, PartialEq)]
pub enum ProviderKind {
    Yahoo,
    Csv(PathBuf),
    Mock,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub provider: ProviderKind,
    pub default_ticker: String,
    pub default_start: NaiveDate,
    pub windows: Vec<usize>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup, so tests don't touch the process env.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let bind_addr = lookup("BIND_ADDR")
            .unwrap_or_else(|| "0.0.0.0:3000".to_string())
            .parse::<SocketAddr>()
            .context("BIND_ADDR must look like 0.0.0.0:3000")?;

        let provider_name = lookup("MARKET_DATA_PROVIDER").unwrap_or_else(|| "yahoo".to_string());
        let provider = match provider_name.to_lowercase().as_str() {
            "yahoo" => ProviderKind::Yahoo,
            "mock" => ProviderKind::Mock,
            "csv" => {
                let dir = lookup("MARKET_DATA_DIR")
                    .ok_or_else(|| anyhow!("MARKET_DATA_PROVIDER=csv requires MARKET_DATA_DIR"))?;
                ProviderKind::Csv(PathBuf::from(dir))
            }
            other => bail!(
                "Invalid MARKET_DATA_PROVIDER: {}. Must be 'yahoo', 'csv', or 'mock'",
                other
            ),
        };

        let default_start = match lookup("DEFAULT_START_DATE") {
            Some(raw) => NaiveDate::parse_from_str(&raw, "%Y-%m-%d")
                .with_context(|| format!("DEFAULT_START_DATE '{}' is not YYYY-MM-DD", raw))?,
            None => NaiveDate::from_ymd_opt(2023, 1, 1)
                .ok_or_else(|| anyhow!("invalid built-in start date"))?,
        };

        let windows = match lookup("MOVING_AVERAGE_WINDOWS") {
            Some(raw) => parse_windows(&raw).map_err(|e| anyhow!("MOVING_AVERAGE_WINDOWS: {}", e))?,
            None => DEFAULT_WINDOWS.to_vec(),
        };

        Ok(Self {
            bind_addr,
            provider,
            default_ticker: lookup("DEFAULT_TICKER").unwrap_or_else(|| "AAPL".to_string()),
            default_start,
            windows,
        })
    }
}

/// Parses a comma-separated list of positive window lengths, e.g. `"50,200"`.
/// Repeats are dropped, keeping first-seen order.
pub fn parse_windows(raw: &str) -> std::result::Result<Vec<usize>, String> {
    let mut windows = Vec::new();
    for s in raw.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        let window = match s.parse::<usize>() {
            Ok(0) => return Err("window lengths must be positive".to_string()),
            Ok(w) => w,
            Err(_) => return Err(format!("'{}' is not a window length", s)),
        };
        if !windows.contains(&window) {
            windows.push(window);
        }
    }
    Ok(windows)
}
