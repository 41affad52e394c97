mod ohlcv;
mod profile;
mod indicator;
mod chart;
mod analysis;

pub use ohlcv::{OhlcvBar, OhlcvSeries};
pub use profile::{lenient_f64, CompanyProfile};
pub use indicator::{IndicatorColumn, IndicatorSeries};
pub use chart::{ChartLayer, ChartLayout, ChartSpec};
pub use analysis::{
    AnalysisReport, CompanyHeader, InfoPanel, Logo, Metric, Notice, NoticeLevel, TableRow,
};
