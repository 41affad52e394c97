pub mod market_data;
pub mod yahoofinance;
pub mod csv_provider;
pub mod mock;
