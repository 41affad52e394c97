const TRILLION: f64 = 1_000_000_000_000.0;
const BILLION: f64 = 1_000_000_000.0;
const MILLION: f64 = 1_000_000.0;

/// Formats a dollar amount with a magnitude suffix.
///
/// Tiers use strict comparisons, so exactly one billion still reads as millions.
/// Absent and non-finite values render as `N/A`.
pub fn format_currency(value: Option<f64>) -> String {
    let Some(num) = value.filter(|v| v.is_finite()) else {
        return "N/A".to_string();
    };

    if num > TRILLION {
        format!("${:.2} T", num / TRILLION)
    } else if num > BILLION {
        format!("${:.2} B", num / BILLION)
    } else if num > MILLION {
        format!("${:.2} M", num / MILLION)
    } else {
        format!("${}", with_thousands(num))
    }
}

pub fn format_price(value: f64) -> String {
    format!("${:.2}", value)
}

pub fn format_ratio(value: f64) -> String {
    format!("{:.2}", value)
}

/// `fraction` is a ratio (0.0055 -> "0.55%").
pub fn format_percent(fraction: f64) -> String {
    format!("{:.2}%", fraction * 100.0)
}

/// Two decimals with comma-grouped integer digits.
fn with_thousands(num: f64) -> String {
    let fixed = format!("{:.2}", num.abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let digits: Vec<char> = int_part.chars().collect();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.iter().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(*ch);
    }

    // -0.001 rounds to "0.00"; don't print a sign for it
    let sign = if num < 0.0 && fixed != "0.00" { "-" } else { "" };
    format!("{}{}.{}", sign, grouped, frac_part)
}
