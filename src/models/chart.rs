use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Declarative chart handed to the rendering front-end.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSpec {
    pub layers: Vec<ChartLayer>,
    pub layout: ChartLayout,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChartLayer {
    Candlestick {
        name: String,
        dates: Vec<NaiveDate>,
        open: Vec<f64>,
        high: Vec<f64>,
        low: Vec<f64>,
        close: Vec<f64>,
    },
    Line {
        name: String,
        dates: Vec<NaiveDate>,
        values: Vec<Option<f64>>,
        color: String,
        width: u32,
    },
}

impl ChartLayer {
    pub fn name(&self) -> &str {
        match self {
            ChartLayer::Candlestick { name, .. } => name,
            ChartLayer::Line { name, .. } => name,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartLayout {
    pub title: String,
    pub x_axis_title: String,
    pub y_axis_title: String,
    pub range_slider: bool,
    pub template: String,
}
