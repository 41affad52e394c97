use crate::models::{ChartLayer, ChartLayout, ChartSpec, IndicatorSeries};

const LINE_PALETTE: [&str; 4] = ["teal", "gold", "crimson", "lightgreen"];

fn line_color(window: usize, index: usize) -> String {
    match window {
        50 => "orange".to_string(),
        200 => "purple".to_string(),
        _ => LINE_PALETTE[index % LINE_PALETTE.len()].to_string(),
    }
}

/// Shapes the series into a candlestick layer plus one line per moving average.
/// No numbers are computed here.
pub fn build_chart(data: &IndicatorSeries, label: &str) -> ChartSpec {
    let bars = data.series.bars();
    let dates = data.series.dates();

    let mut layers = Vec::with_capacity(data.columns.len() + 1);
    layers.push(ChartLayer::Candlestick {
        name: "Candlestick".to_string(),
        dates: dates.clone(),
        open: bars.iter().map(|b| b.open).collect(),
        high: bars.iter().map(|b| b.high).collect(),
        low: bars.iter().map(|b| b.low).collect(),
        close: bars.iter().map(|b| b.close).collect(),
    });

    layers.extend(data.columns.iter().enumerate().map(|(i, col)| ChartLayer::Line {
        name: format!("{}-Day Moving Average", col.window),
        dates: dates.clone(),
        values: col.values.clone(),
        color: line_color(col.window, i),
        width: 1,
    }));

    ChartSpec {
        layers,
        layout: ChartLayout {
            title: format!("{} Stock Analysis", label),
            x_axis_title: "Date".to_string(),
            y_axis_title: "Stock Price (USD)".to_string(),
            range_slider: true,
            template: "plotly_dark".to_string(),
        },
    }
}
