pub mod fetcher;
pub mod indicators;
pub mod chart_builder;
pub mod analysis_service;
