use async_trait::async_trait;
use chrono::{Datelike, NaiveDate, Weekday};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::external::market_data::{MarketDataProvider, ProviderError};
use crate::models::{CompanyProfile, OhlcvBar};

/// Generates a random-walk price history for demos and local development.
///
/// The walk is seeded from the ticker so repeated requests draw the same chart.
pub struct MockProvider {
    start_price: f64,
}

impl MockProvider {
    pub fn new() -> Self {
        Self { start_price: 100.0 }
    }

    fn seed(ticker: &str) -> u64 {
        ticker
            .bytes()
            .fold(0xcbf2_9ce4_8422_2325_u64, |h, b| (h ^ b as u64).wrapping_mul(0x100_0000_01b3))
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MarketDataProvider for MockProvider {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn fetch_history(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<OhlcvBar>, ProviderError> {
        let mut rng = StdRng::seed_from_u64(Self::seed(ticker));
        let mut current = self.start_price;

        let bars = start
            .iter_days()
            .take_while(|d| *d < end)
            .filter(|d| !matches!(d.weekday(), Weekday::Sat | Weekday::Sun))
            .map(|date| {
                let open = current;
                current *= 1.0 + (rng.random::<f64>() - 0.5) * 0.02;
                let close = current;

                OhlcvBar {
                    date,
                    open,
                    high: open.max(close) * (1.0 + rng.random::<f64>() * 0.005),
                    low: open.min(close) * (1.0 - rng.random::<f64>() * 0.005),
                    close,
                    volume: rng.random_range(1_000_000..10_000_000),
                }
            })
            .collect();

        Ok(bars)
    }

    async fn fetch_profile(&self, ticker: &str) -> Result<CompanyProfile, ProviderError> {
        Ok(CompanyProfile {
            long_name: Some(format!("{} (simulated)", ticker)),
            sector: Some("Simulated".to_string()),
            industry: Some("Random Walk".to_string()),
            long_business_summary: Some(format!(
                "Synthetic price history generated locally for {}.",
                ticker
            )),
            current_price: Some(self.start_price),
            market_cap: Some(self.start_price * 1_000_000_000.0),
            ..CompanyProfile::default()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[tokio::test]
    async fn test_mock_history_skips_weekends() {
        let provider = MockProvider::new();
        // 2023-01-02 is a Monday; two full weeks
        let bars = provider
            .fetch_history("TEST", date("2023-01-02"), date("2023-01-16"))
            .await
            .unwrap();

        assert_eq!(bars.len(), 10);
        assert!(bars
            .iter()
            .all(|b| !matches!(b.date.weekday(), Weekday::Sat | Weekday::Sun)));
    }

    #[tokio::test]
    async fn test_mock_history_is_deterministic_per_ticker() {
        let provider = MockProvider::new();
        let a = provider.fetch_history("AAPL", date("2023-01-01"), date("2023-03-01")).await.unwrap();
        let b = provider.fetch_history("AAPL", date("2023-01-01"), date("2023-03-01")).await.unwrap();
        let c = provider.fetch_history("MSFT", date("2023-01-01"), date("2023-03-01")).await.unwrap();

        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[tokio::test]
    async fn test_mock_bars_are_well_formed() {
        let provider = MockProvider::new();
        let bars = provider
            .fetch_history("AAPL", date("2023-01-01"), date("2023-12-31"))
            .await
            .unwrap();

        for bar in bars {
            assert!(bar.high >= bar.open.max(bar.close));
            assert!(bar.low <= bar.open.min(bar.close));
            assert!(bar.low > 0.0);
        }
    }
}
