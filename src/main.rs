use std::sync::Arc;

use stock_analyzer::app;
use stock_analyzer::config::{AppConfig, ProviderKind};
use stock_analyzer::external::csv_provider::CsvProvider;
use stock_analyzer::external::market_data::MarketDataProvider;
use stock_analyzer::external::mock::MockProvider;
use stock_analyzer::external::yahoofinance::YahooFinanceProvider;
use stock_analyzer::logging::{init_logging, LoggingConfig};
use stock_analyzer::state::{AnalysisDefaults, AppState};
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    // Initialize logging FIRST
    init_logging(LoggingConfig::from_env())?;

    let config = AppConfig::from_env()?;

    let provider: Arc<dyn MarketDataProvider> = match &config.provider {
        ProviderKind::Yahoo => {
            tracing::info!("📊 Using market data provider: Yahoo Finance");
            Arc::new(YahooFinanceProvider::new())
        }
        ProviderKind::Csv(dir) => {
            tracing::info!("📊 Using market data provider: CSV files in {}", dir.display());
            Arc::new(CsvProvider::new(dir))
        }
        ProviderKind::Mock => {
            tracing::info!("📊 Using market data provider: simulated random walk");
            Arc::new(MockProvider::new())
        }
    };

    let state = AppState {
        provider,
        defaults: Arc::new(AnalysisDefaults {
            ticker: config.default_ticker.clone(),
            start: config.default_start,
            windows: config.windows.clone(),
        }),
    };
    let app = app::create_app(state);

    let listener = TcpListener::bind(config.bind_addr).await?;
    tracing::info!("🚀 Stock analyzer running at http://{}/", config.bind_addr);
    axum::serve(listener, app).await?;

    Ok(())
}
