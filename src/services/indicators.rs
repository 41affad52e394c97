use crate::models::{IndicatorColumn, IndicatorSeries, OhlcvSeries};

/// Windows the page asks for when the caller doesn't choose.
pub const DEFAULT_WINDOWS: [usize; 2] = [50, 200];

/// Simple Moving Average (SMA)
/// Returns a vector aligned with `values`:
/// - `None` until enough values exist
/// - `Some(avg)` after `window` values
pub fn sma(values: &[f64], window: usize) -> Vec<Option<f64>> {
    if window == 0 {
        return vec![None; values.len()];
    }

    // Running sum via scan; subtract the value that falls out of the window.
    values
        .iter()
        .enumerate()
        .scan(0.0_f64, move |sum, (i, &v)| {
            *sum += v;
            if i >= window {
                *sum -= values[i - window];
            }

            let out = if i + 1 >= window {
                Some(*sum / window as f64)
            } else {
                None
            };

            Some(out)
        })
        .collect()
}

pub fn column_name(window: usize) -> String {
    format!("MA{}", window)
}

/// Adds one trailing SMA column over `close` per distinct window. The input is left untouched.
pub fn with_moving_averages(series: &OhlcvSeries, windows: &[usize]) -> IndicatorSeries {
    let closes = series.closes();

    let columns = windows
        .iter()
        .enumerate()
        .filter(|&(i, window)| !windows[..i].contains(window))
        .map(|(_, &window)| IndicatorColumn {
            name: column_name(window),
            window,
            values: sma(&closes, window),
        })
        .collect();

    IndicatorSeries {
        series: series.clone(),
        columns,
    }
}
