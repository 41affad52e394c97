use serde::Serialize;

use crate::models::OhlcvSeries;

/// A derived series aligned to the bars of an [`OhlcvSeries`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndicatorColumn {
    pub name: String,
    pub window: usize,
    pub values: Vec<Option<f64>>,
}

/// Bars plus the moving-average columns computed over them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndicatorSeries {
    pub series: OhlcvSeries,
    pub columns: Vec<IndicatorColumn>,
}

impl IndicatorSeries {
    pub fn column(&self, name: &str) -> Option<&IndicatorColumn> {
        self.columns.iter().find(|c| c.name == name)
    }
}
